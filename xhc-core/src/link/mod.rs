//! Host link handling
//!
//! Everything that talks back to the host or tracks whether it is still
//! there: the rate-limited report sender, the periodic keepalive and the
//! report timeout monitor.

pub mod keepalive;
pub mod monitor;
pub mod sender;

pub use keepalive::Keepalive;
pub use monitor::{LinkMonitor, LinkState};
pub use sender::{ReportSender, SendStatus};

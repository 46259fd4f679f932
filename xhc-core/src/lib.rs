//! Board-agnostic pendant logic
//!
//! This crate contains everything between the USB stack and the display
//! that does not depend on specific hardware:
//!
//! - Transport trait towards the host
//! - Rate-limited outbound report sender and keepalive
//! - Host link monitor
//! - Configuration type definitions
//! - The [`Pendant`] state object tying reassembly, rendering and sending
//!   together

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod link;
pub mod pendant;
pub mod traits;

pub use config::PendantConfig;
pub use error::PendantError;
pub use link::{Keepalive, LinkMonitor, LinkState, ReportSender, SendStatus};
pub use pendant::Pendant;
pub use traits::{HidTransport, TransportError};

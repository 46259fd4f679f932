//! Hardware abstraction traits
//!
//! The pendant logic only needs one seam towards the USB stack; the display
//! seam is `xhc_display::DisplayBackend`.

pub mod transport;

pub use transport::{HidTransport, TransportError};

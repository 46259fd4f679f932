//! Inter-task channels
//!
//! The USB control handler and the pendant task never share mutable state.
//! Chunks are copied into [`CHUNKS`]; outbound reports leave through
//! [`OUTBOUND`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::AtomicBool;
use xhc_protocol::{RawChunk, INPUT_REPORT_LEN};

/// Host chunks waiting for reassembly
///
/// Sized for more than one full report so a slow redraw does not drop data.
pub static CHUNKS: Channel<CriticalSectionRawMutex, RawChunk, 16> = Channel::new();

/// Encoded input reports waiting for the interrupt IN endpoint
pub static OUTBOUND: Channel<CriticalSectionRawMutex, [u8; INPUT_REPORT_LEN], 4> = Channel::new();

/// Set while the host has the device configured
pub static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);

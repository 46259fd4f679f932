//! Periodic keepalive reports
//!
//! The host drops the pendant if it hears nothing for a while, so an idle
//! report (no buttons, no wheel movement) goes out on a fixed period. It
//! passes through the same rate limit as real input and is simply skipped
//! when real input went out moments before.

use xhc_protocol::WheelMode;

use super::sender::{ReportSender, SendStatus};
use crate::traits::{HidTransport, TransportError};

/// Keepalive timer
#[derive(Debug, Clone)]
pub struct Keepalive {
    interval_ms: u32,
    wheel_mode: WheelMode,
    last_attempt_ms: Option<u32>,
}

impl Keepalive {
    /// Create a keepalive firing every `interval_ms` with the selector at `wheel_mode`
    pub const fn new(interval_ms: u32, wheel_mode: WheelMode) -> Self {
        Self {
            interval_ms,
            wheel_mode,
            last_attempt_ms: None,
        }
    }

    /// Whether a keepalive is due at `now_ms`
    pub fn is_due(&self, now_ms: u32) -> bool {
        match self.last_attempt_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
            None => true,
        }
    }

    /// Send a keepalive if one is due
    ///
    /// Returns `None` when no keepalive was due. The period restarts on every
    /// attempt, whatever the outcome.
    pub fn poll<T: HidTransport>(
        &mut self,
        sender: &mut ReportSender,
        transport: &mut T,
        now_ms: u32,
    ) -> Result<Option<SendStatus>, TransportError> {
        if !self.is_due(now_ms) {
            return Ok(None);
        }
        self.last_attempt_ms = Some(now_ms);
        sender
            .try_send(transport, 0, 0, self.wheel_mode, 0, now_ms)
            .map(Some)
    }
}

//! Pendant configuration
//!
//! All timing constants of the pendant in one place. Nothing here is
//! persisted; with the `serde` feature a board crate can embed the values in
//! its own configuration format.

use xhc_display::DEFAULT_REFRESH_INTERVAL_MS;
use xhc_protocol::WheelMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing and keepalive settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PendantConfig {
    /// Fallback full redraw interval. Default: 500.
    pub refresh_interval_ms: u32,
    /// Minimum time between outbound reports. Default: 10.
    pub send_interval_ms: u32,
    /// Time between keepalive reports. Default: 100.
    pub keepalive_interval_ms: u32,
    /// Selector position reported by keepalives. Default: X axis.
    pub keepalive_wheel_mode: WheelMode,
    /// Silence after which the link is shown as down. Default: 1000.
    pub link_timeout_ms: u32,
}

impl Default for PendantConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            send_interval_ms: 10,
            keepalive_interval_ms: 100,
            keepalive_wheel_mode: WheelMode::AxisX,
            link_timeout_ms: 1000,
        }
    }
}

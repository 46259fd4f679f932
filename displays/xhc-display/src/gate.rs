//! Redraw gate
//!
//! Decides per decoded report whether a full field pass is worth running.
//! The check compares packed raw position words, never decoded floats, and
//! falls back to a timed refresh so fields the gate does not track (step,
//! overrides) still reach the screen.

use xhc_protocol::report::SLOT_COUNT;
use xhc_protocol::OutputReport;

/// Default time between fallback refreshes
pub const DEFAULT_REFRESH_INTERVAL_MS: u32 = 500;

/// Why a full pass was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RedrawReason {
    /// Nothing has been drawn since start-up or the last reset
    Initial,
    /// At least one position slot changed
    PositionChanged,
    /// The refresh interval elapsed without position changes
    Refresh,
}

/// Position dirty cache plus fallback refresh timer
#[derive(Debug, Clone)]
pub struct RedrawGate {
    /// Last seen packed slot per axis, `None` until first seen
    positions: [Option<u32>; SLOT_COUNT],
    /// Time of the last completed full pass
    last_pass_ms: Option<u32>,
    refresh_interval_ms: u32,
}

impl Default for RedrawGate {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL_MS)
    }
}

impl RedrawGate {
    /// Create a gate with the given fallback refresh interval
    pub const fn new(refresh_interval_ms: u32) -> Self {
        Self {
            positions: [None; SLOT_COUNT],
            last_pass_ms: None,
            refresh_interval_ms,
        }
    }

    /// Forget everything; the next check requests a full pass
    pub fn reset(&mut self) {
        self.positions = [None; SLOT_COUNT];
        self.last_pass_ms = None;
    }

    /// Compare `report` against the cache and record its positions
    ///
    /// Returns the reason for a full pass, or `None` to skip the cycle.
    pub fn check(&mut self, report: &OutputReport, now_ms: u32) -> Option<RedrawReason> {
        let mut changed = false;
        for (cached, slot) in self.positions.iter_mut().zip(report.positions.iter()) {
            let packed = Some(slot.packed());
            if *cached != packed {
                *cached = packed;
                changed = true;
            }
        }

        match self.last_pass_ms {
            None => Some(RedrawReason::Initial),
            Some(_) if changed => Some(RedrawReason::PositionChanged),
            Some(last) if now_ms.wrapping_sub(last) > self.refresh_interval_ms => {
                Some(RedrawReason::Refresh)
            }
            Some(_) => None,
        }
    }

    /// Record that a full pass completed at `now_ms`
    pub fn mark_redrawn(&mut self, now_ms: u32) {
        self.last_pass_ms = Some(now_ms);
    }

    /// Time of the last completed full pass
    pub fn last_pass_ms(&self) -> Option<u32> {
        self.last_pass_ms
    }
}

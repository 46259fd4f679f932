//! Pendant error type

use xhc_display::DisplayError;

use crate::traits::TransportError;

/// Errors surfaced by [`crate::Pendant`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendantError {
    /// The display backend failed
    Display(DisplayError),
    /// The host transport failed
    Transport(TransportError),
}

impl From<DisplayError> for PendantError {
    fn from(e: DisplayError) -> Self {
        PendantError::Display(e)
    }
}

impl From<TransportError> for PendantError {
    fn from(e: TransportError) -> Self {
        PendantError::Transport(e)
    }
}

//! Outbound HID transport trait

use xhc_protocol::INPUT_REPORT_LEN;

/// Errors from the USB side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Outbound queue is full; try again on a later cycle
    Busy,
    /// Host is not connected or the endpoint is gone
    Disconnected,
}

/// Trait for whatever carries input reports to the host
///
/// Implementations must not block: a full queue is reported as
/// [`TransportError::Busy`].
pub trait HidTransport {
    /// Queue one encoded input report
    fn send_report(&mut self, report: &[u8; INPUT_REPORT_LEN]) -> Result<(), TransportError>;
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn send_report(&mut self, report: &[u8; INPUT_REPORT_LEN]) -> Result<(), TransportError> {
        (**self).send_report(report)
    }
}

//! Outbound report sender
//!
//! Enforces the minimum spacing between input reports and stamps each one
//! with the XOR key derived from the host's rolling key.

use xhc_protocol::{InputReport, WheelMode};

use crate::traits::{HidTransport, TransportError};

/// Outcome of a send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    /// The report was handed to the transport
    Sent,
    /// Too soon after the previous report, or the transport queue is full
    Busy,
}

/// Rate-limited input report sender
#[derive(Debug, Clone)]
pub struct ReportSender {
    interval_ms: u32,
    /// Time of the last successful send
    last_send_ms: Option<u32>,
    /// Day byte of the most recent host report
    rolling_key: u8,
}

impl ReportSender {
    /// Create a sender enforcing `interval_ms` between reports
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_send_ms: None,
            rolling_key: 0,
        }
    }

    /// Adopt the rolling key of a freshly decoded host report
    pub fn set_rolling_key(&mut self, key: u8) {
        self.rolling_key = key;
    }

    /// Current rolling key
    pub fn rolling_key(&self) -> u8 {
        self.rolling_key
    }

    /// Time of the last successful send
    pub fn last_send_ms(&self) -> Option<u32> {
        self.last_send_ms
    }

    /// Check the rate limit without sending
    pub fn is_ready(&self, now_ms: u32) -> bool {
        match self.last_send_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
            None => true,
        }
    }

    /// Build and send an input report unless the rate limit forbids it
    ///
    /// Never blocks. A full transport queue is reported as
    /// [`SendStatus::Busy`]; only a disconnected transport is an error.
    pub fn try_send<T: HidTransport>(
        &mut self,
        transport: &mut T,
        buttons1: u8,
        buttons2: u8,
        wheel_mode: WheelMode,
        wheel_delta: i8,
        now_ms: u32,
    ) -> Result<SendStatus, TransportError> {
        if !self.is_ready(now_ms) {
            return Ok(SendStatus::Busy);
        }

        let report = InputReport::new(buttons1, buttons2, wheel_mode, wheel_delta, self.rolling_key);
        match transport.send_report(&report.encode()) {
            Ok(()) => {
                self.last_send_ms = Some(now_ms);
                #[cfg(feature = "defmt")]
                defmt::trace!("sent {}", report);
                Ok(SendStatus::Sent)
            }
            Err(TransportError::Busy) => Ok(SendStatus::Busy),
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("input report dropped: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use heapless::Vec;
    use xhc_protocol::INPUT_REPORT_LEN;

    /// Transport that keeps every report it accepts
    #[derive(Default)]
    pub struct Capture {
        pub sent: Vec<[u8; INPUT_REPORT_LEN], 32>,
        pub fail_with: Option<TransportError>,
    }

    impl HidTransport for Capture {
        fn send_report(&mut self, report: &[u8; INPUT_REPORT_LEN]) -> Result<(), TransportError> {
            if let Some(e) = self.fail_with {
                return Err(e);
            }
            self.sent.push(*report).map_err(|_| TransportError::Busy)
        }
    }

    #[test]
    fn test_first_send_not_rate_limited() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture::default();

        let status = sender
            .try_send(&mut transport, 0, 0, WheelMode::AxisX, 0, 3)
            .unwrap();
        assert_eq!(status, SendStatus::Sent);
        assert_eq!(sender.last_send_ms(), Some(3));
    }

    #[test]
    fn test_send_floor() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture::default();

        sender.try_send(&mut transport, 0, 0, WheelMode::AxisX, 0, 100).unwrap();
        assert_eq!(
            sender.try_send(&mut transport, 0, 0, WheelMode::AxisX, 0, 109).unwrap(),
            SendStatus::Busy
        );
        assert_eq!(
            sender.try_send(&mut transport, 0, 0, WheelMode::AxisX, 0, 110).unwrap(),
            SendStatus::Sent
        );
        assert_eq!(transport.sent.len(), 2);
    }

    #[test]
    fn test_xor_key_uses_rolling_key() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture::default();
        sender.set_rolling_key(0x5A);

        sender.try_send(&mut transport, 0x0F, 0x01, WheelMode::Feed, -3, 0).unwrap();
        let report = InputReport::decode(&transport.sent[0]).unwrap();
        assert_eq!(report.xor_key, 0x5A ^ 0x0F);
        assert_eq!(report.rolling_key(), 0x5A);
        assert_eq!(report.wheel_mode, WheelMode::Feed);
        assert_eq!(report.wheel_delta, -3);
    }

    #[test]
    fn test_transport_busy_is_not_an_error() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture {
            fail_with: Some(TransportError::Busy),
            ..Default::default()
        };

        let status = sender.try_send(&mut transport, 0, 0, WheelMode::Off, 0, 0).unwrap();
        assert_eq!(status, SendStatus::Busy);
        // Failed sends do not arm the rate limit
        assert_eq!(sender.last_send_ms(), None);
    }

    #[test]
    fn test_disconnected_propagates() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture {
            fail_with: Some(TransportError::Disconnected),
            ..Default::default()
        };

        assert_eq!(
            sender.try_send(&mut transport, 0, 0, WheelMode::Off, 0, 0),
            Err(TransportError::Disconnected)
        );
    }

    #[test]
    fn test_rate_limit_across_wraparound() {
        let mut sender = ReportSender::new(10);
        let mut transport = Capture::default();

        sender.try_send(&mut transport, 0, 0, WheelMode::Off, 0, u32::MAX - 2).unwrap();
        assert!(!sender.is_ready(5));
        assert!(sender.is_ready(7));
    }
}

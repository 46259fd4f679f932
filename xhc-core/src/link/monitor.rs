//! Host link monitor
//!
//! Tracks when the last complete host report was decoded and flags the link
//! as down after a period of silence.

/// Whether the host is currently feeding reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No report yet, or none within the timeout
    Offline,
    /// Reports are arriving
    Online,
}

/// Report timeout tracker
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    timeout_ms: u32,
    last_report_ms: Option<u32>,
    state: LinkState,
}

impl LinkMonitor {
    /// Create a monitor that drops the link after `timeout_ms` of silence
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            last_report_ms: None,
            state: LinkState::Offline,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Time of the last decoded report
    pub fn last_report_ms(&self) -> Option<u32> {
        self.last_report_ms
    }

    /// Record a decoded report
    ///
    /// Returns `true` if this brought the link up.
    pub fn report_received(&mut self, now_ms: u32) -> bool {
        self.last_report_ms = Some(now_ms);
        let was_offline = self.state == LinkState::Offline;
        self.state = LinkState::Online;
        if was_offline {
            #[cfg(feature = "defmt")]
            defmt::debug!("host link up");
        }
        was_offline
    }

    /// Check for a timeout
    ///
    /// Returns `true` if the link just went down.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let Some(last) = self.last_report_ms else {
            return false;
        };
        if self.state == LinkState::Online && now_ms.wrapping_sub(last) > self.timeout_ms {
            self.state = LinkState::Offline;
            #[cfg(feature = "defmt")]
            defmt::warn!("no host report for {} ms", now_ms.wrapping_sub(last));
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_offline() {
        let mut link = LinkMonitor::new(1000);
        assert_eq!(link.state(), LinkState::Offline);
        assert!(!link.poll(5000));
    }

    #[test]
    fn test_link_up_once() {
        let mut link = LinkMonitor::new(1000);
        assert!(link.report_received(10));
        assert!(!link.report_received(20));
        assert_eq!(link.state(), LinkState::Online);
    }

    #[test]
    fn test_timeout() {
        let mut link = LinkMonitor::new(1000);
        link.report_received(0);

        assert!(!link.poll(1000));
        assert!(link.poll(1001));
        assert_eq!(link.state(), LinkState::Offline);
        // Reported once
        assert!(!link.poll(2000));

        assert!(link.report_received(2500));
    }
}

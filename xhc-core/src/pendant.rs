//! Pendant state object
//!
//! [`Pendant`] owns every piece of mutable state: the chunk assembler, the
//! render caches, the outbound sender and the link timers. The caller drives
//! it from two places:
//!
//! - [`Pendant::on_chunk`] for every chunk the host writes
//! - [`Pendant::poll`] on a periodic tick for keepalives and the link timeout
//!
//! Both take the current millisecond tick so all timing comes from a single
//! monotonic counter. Neither blocks.

use xhc_display::{
    DisplayBackend, FieldId, Layout, RenderOutcome, Renderer, STATUS_OFFLINE, STATUS_ONLINE,
};
use xhc_protocol::{ChunkAssembler, CoordinateSystem, OutputReport, WheelMode};

use crate::config::PendantConfig;
use crate::error::PendantError;
use crate::link::{Keepalive, LinkMonitor, LinkState, ReportSender, SendStatus};
use crate::traits::HidTransport;

/// Caller-owned pendant state
#[derive(Debug, Clone)]
pub struct Pendant {
    config: PendantConfig,
    assembler: ChunkAssembler,
    renderer: Renderer,
    sender: ReportSender,
    keepalive: Keepalive,
    link: LinkMonitor,
    last_report: Option<OutputReport>,
}

impl Default for Pendant {
    fn default() -> Self {
        Self::new(PendantConfig::default(), Layout::default())
    }
}

impl Pendant {
    /// Create the pendant state; nothing is drawn until [`Pendant::start`]
    pub fn new(config: PendantConfig, layout: Layout) -> Self {
        Self {
            config,
            assembler: ChunkAssembler::new(),
            renderer: Renderer::new(layout, config.refresh_interval_ms),
            sender: ReportSender::new(config.send_interval_ms),
            keepalive: Keepalive::new(config.keepalive_interval_ms, config.keepalive_wheel_mode),
            link: LinkMonitor::new(config.link_timeout_ms),
            last_report: None,
        }
    }

    /// Paint the static screen
    pub fn start<D: DisplayBackend>(&mut self, display: &mut D) -> Result<(), PendantError> {
        self.renderer.draw_static(display)?;
        #[cfg(feature = "defmt")]
        defmt::info!("pendant started");
        Ok(())
    }

    /// Handle one chunk written by the host
    ///
    /// Returns `None` while a report is still incomplete, otherwise what the
    /// renderer did with it.
    pub fn on_chunk<D: DisplayBackend>(
        &mut self,
        chunk: &[u8],
        now_ms: u32,
        display: &mut D,
    ) -> Result<Option<RenderOutcome>, PendantError> {
        let Some(report) = self.assembler.feed(chunk) else {
            return Ok(None);
        };

        self.last_report = Some(report);
        self.sender.set_rolling_key(report.rolling_key());

        if self.link.report_received(now_ms) {
            self.sync_status(display)?;
        }

        let outcome = self.renderer.render(&report, now_ms, display)?;
        Ok(Some(outcome))
    }

    /// Periodic tick: keepalive and link timeout
    ///
    /// Returns the keepalive outcome, `None` if none was due.
    pub fn poll<T: HidTransport, D: DisplayBackend>(
        &mut self,
        now_ms: u32,
        transport: &mut T,
        display: &mut D,
    ) -> Result<Option<SendStatus>, PendantError> {
        let keepalive = self.keepalive.poll(&mut self.sender, transport, now_ms);

        self.link.poll(now_ms);
        // Every tick: a failed status draw is retried until it sticks
        self.sync_status(display)?;

        Ok(keepalive?)
    }

    fn sync_status<D: DisplayBackend>(&mut self, display: &mut D) -> Result<(), PendantError> {
        let text = match self.link.state() {
            LinkState::Online => STATUS_ONLINE,
            LinkState::Offline => STATUS_OFFLINE,
        };
        self.renderer.update_field(FieldId::Status, text, display)?;
        Ok(())
    }

    /// Send real input (buttons, selector, wheel) to the host
    pub fn send_input<T: HidTransport>(
        &mut self,
        transport: &mut T,
        buttons1: u8,
        buttons2: u8,
        wheel_mode: WheelMode,
        wheel_delta: i8,
        now_ms: u32,
    ) -> Result<SendStatus, PendantError> {
        Ok(self
            .sender
            .try_send(transport, buttons1, buttons2, wheel_mode, wheel_delta, now_ms)?)
    }

    /// Decoded value of an axis from the latest report
    ///
    /// `0.0` before the first report or for an axis index of 3 or more.
    pub fn axis(&self, system: CoordinateSystem, axis: usize) -> f32 {
        self.last_report
            .map(|report| report.axis(system, axis))
            .unwrap_or(0.0)
    }

    /// Latest decoded report
    pub fn last_report(&self) -> Option<&OutputReport> {
        self.last_report.as_ref()
    }

    /// Current host link state
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Rolling key used for outbound reports
    pub fn rolling_key(&self) -> u8 {
        self.sender.rolling_key()
    }

    /// Active configuration
    pub fn config(&self) -> &PendantConfig {
        &self.config
    }

    /// Renderer (read-only, e.g. to inspect field text)
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::sender::tests::Capture;
    use crate::traits::TransportError;
    use embedded_graphics::pixelcolor::Rgb565;
    use xhc_display::{DisplayError, Font, RedrawReason};
    use xhc_protocol::{AxisPosition, InputReport, ASSEMBLY_CAPACITY, CHUNK_SIZE, OUTPUT_REPORT_LEN};

    /// Backend that only counts draw calls
    #[derive(Default)]
    struct Counter {
        chars: usize,
        fills: usize,
        /// Reject every call while set
        broken: bool,
    }

    impl DisplayBackend for Counter {
        fn fill_rect(
            &mut self,
            _: u16,
            _: u16,
            _: u16,
            _: u16,
            _: Rgb565,
        ) -> Result<(), DisplayError> {
            if self.broken {
                return Err(DisplayError::Communication);
            }
            self.fills += 1;
            Ok(())
        }

        fn draw_char(
            &mut self,
            _: u16,
            _: u16,
            _: char,
            _: Font,
            _: Rgb565,
            _: Rgb565,
        ) -> Result<(), DisplayError> {
            if self.broken {
                return Err(DisplayError::Communication);
            }
            self.chars += 1;
            Ok(())
        }

        fn glyph_size(&self, font: Font) -> (u16, u16) {
            match font {
                Font::Small => (6, 10),
                Font::Medium => (7, 13),
                Font::Large => (10, 20),
            }
        }

        fn dimensions(&self) -> (u16, u16) {
            (160, 128)
        }
    }

    fn chunks(report: &OutputReport) -> [[u8; CHUNK_SIZE]; ASSEMBLY_CAPACITY / CHUNK_SIZE] {
        let mut bytes = [0u8; ASSEMBLY_CAPACITY];
        bytes[..OUTPUT_REPORT_LEN].copy_from_slice(&report.encode());
        let mut out = [[0u8; CHUNK_SIZE]; ASSEMBLY_CAPACITY / CHUNK_SIZE];
        for (chunk, src) in out.iter_mut().zip(bytes.chunks(CHUNK_SIZE)) {
            chunk.copy_from_slice(src);
        }
        out
    }

    fn sample_report(day: u8) -> OutputReport {
        let mut report = OutputReport {
            day,
            step_multiplier: 1,
            feed_override: 200,
            spindle_override: 100,
            ..Default::default()
        };
        report.positions[0] = AxisPosition::new(12, 5000, false);
        report.positions[4] = AxisPosition::new(3, 25, true);
        report
    }

    fn deliver(
        pendant: &mut Pendant,
        report: &OutputReport,
        now_ms: u32,
        display: &mut Counter,
    ) -> Option<RenderOutcome> {
        let mut outcome = None;
        for chunk in chunks(report) {
            if let Some(o) = pendant.on_chunk(&chunk, now_ms, display).unwrap() {
                outcome = Some(o);
            }
        }
        outcome
    }

    #[test]
    fn test_start_shows_offline() {
        let mut pendant = Pendant::default();
        let mut display = Counter::default();

        pendant.start(&mut display).unwrap();
        assert_eq!(pendant.renderer().field_text(FieldId::Status), STATUS_OFFLINE);
        assert_eq!(pendant.link_state(), LinkState::Offline);
        assert_eq!(pendant.axis(CoordinateSystem::Work, 0), 0.0);
    }

    #[test]
    fn test_report_decoded_after_last_chunk() {
        let mut pendant = Pendant::default();
        let mut display = Counter::default();
        pendant.start(&mut display).unwrap();

        let report = sample_report(0x42);
        let frames = chunks(&report);
        for chunk in &frames[..5] {
            assert_eq!(pendant.on_chunk(chunk, 0, &mut display).unwrap(), None);
        }
        let outcome = pendant.on_chunk(&frames[5], 0, &mut display).unwrap();
        assert!(matches!(
            outcome,
            Some(RenderOutcome::Redrawn {
                reason: RedrawReason::Initial,
                ..
            })
        ));

        assert_eq!(pendant.last_report(), Some(&report));
        assert_eq!(pendant.rolling_key(), 0x42);
        assert_eq!(pendant.link_state(), LinkState::Online);
        assert!((pendant.axis(CoordinateSystem::Work, 0) - 12.5).abs() < 1e-4);
        assert!((pendant.axis(CoordinateSystem::Machine, 1) + 3.0025).abs() < 1e-4);
        assert_eq!(pendant.axis(CoordinateSystem::Machine, 3), 0.0);
        assert_eq!(pendant.renderer().field_text(FieldId::WorkX), "+12.5000");
        assert_eq!(pendant.renderer().field_text(FieldId::MachineY), "-3.0025");
        assert_eq!(pendant.renderer().field_text(FieldId::Step), "0.001");
    }

    #[test]
    fn test_repeated_report_skips_drawing() {
        let mut pendant = Pendant::default();
        let mut display = Counter::default();
        let report = sample_report(1);

        deliver(&mut pendant, &report, 0, &mut display);
        let before = (display.chars, display.fills);

        assert_eq!(
            deliver(&mut pendant, &report, 20, &mut display),
            Some(RenderOutcome::Skipped)
        );
        assert_eq!((display.chars, display.fills), before);
    }

    #[test]
    fn test_keepalive_carries_rolling_key() {
        let mut pendant = Pendant::default();
        let mut display = Counter::default();
        let mut transport = Capture::default();

        deliver(&mut pendant, &sample_report(0x99), 0, &mut display);
        assert_eq!(
            pendant.poll(0, &mut transport, &mut display).unwrap(),
            Some(SendStatus::Sent)
        );
        assert_eq!(pendant.poll(50, &mut transport, &mut display).unwrap(), None);

        let sent = InputReport::decode(&transport.sent[0]).unwrap();
        assert_eq!(sent, InputReport::keepalive(WheelMode::AxisX, 0x99));
    }

    #[test]
    fn test_input_rate_limited() {
        let mut pendant = Pendant::default();
        let mut transport = Capture::default();

        assert_eq!(
            pendant.send_input(&mut transport, 0x02, 0, WheelMode::AxisY, 1, 0).unwrap(),
            SendStatus::Sent
        );
        assert_eq!(
            pendant.send_input(&mut transport, 0x02, 0, WheelMode::AxisY, 1, 5).unwrap(),
            SendStatus::Busy
        );
    }

    #[test]
    fn test_link_timeout_and_recovery() {
        let config = PendantConfig {
            link_timeout_ms: 200,
            ..Default::default()
        };
        let mut pendant = Pendant::new(config, Layout::default());
        let mut display = Counter::default();
        let mut transport = Capture::default();
        let report = sample_report(7);

        pendant.start(&mut display).unwrap();
        deliver(&mut pendant, &report, 0, &mut display);
        assert_eq!(pendant.renderer().field_text(FieldId::Status), STATUS_ONLINE);

        pendant.poll(200, &mut transport, &mut display).unwrap();
        assert_eq!(pendant.link_state(), LinkState::Online);
        pendant.poll(201, &mut transport, &mut display).unwrap();
        assert_eq!(pendant.link_state(), LinkState::Offline);
        assert_eq!(pendant.renderer().field_text(FieldId::Status), STATUS_OFFLINE);

        // Same positions: the gate skips the pass but the status still comes back
        assert_eq!(
            deliver(&mut pendant, &report, 210, &mut display),
            Some(RenderOutcome::Skipped)
        );
        assert_eq!(pendant.renderer().field_text(FieldId::Status), STATUS_ONLINE);
    }

    #[test]
    fn test_disconnected_transport_still_runs_link_monitor() {
        let mut pendant = Pendant::default();
        let mut display = Counter::default();
        let mut transport = Capture {
            fail_with: Some(TransportError::Disconnected),
            ..Default::default()
        };

        deliver(&mut pendant, &sample_report(0), 0, &mut display);
        assert_eq!(
            pendant.poll(2000, &mut transport, &mut display),
            Err(PendantError::Transport(TransportError::Disconnected))
        );
        assert_eq!(pendant.link_state(), LinkState::Offline);
    }

    #[test]
    fn test_offline_status_retried_after_display_error() {
        let config = PendantConfig {
            link_timeout_ms: 200,
            ..Default::default()
        };
        let mut pendant = Pendant::new(config, Layout::default());
        let mut display = Counter::default();
        let mut transport = Capture::default();

        pendant.start(&mut display).unwrap();
        deliver(&mut pendant, &sample_report(3), 0, &mut display);

        display.broken = true;
        assert_eq!(
            pendant.poll(201, &mut transport, &mut display),
            Err(PendantError::Display(DisplayError::Communication))
        );
        assert_eq!(pendant.link_state(), LinkState::Offline);

        display.broken = false;
        pendant.poll(300, &mut transport, &mut display).unwrap();
        assert_eq!(pendant.renderer().field_text(FieldId::Status), STATUS_OFFLINE);

        // Once shown, later ticks draw nothing
        let before = (display.chars, display.fills);
        pendant.poll(1000, &mut transport, &mut display).unwrap();
        assert_eq!((display.chars, display.fills), before);
    }
}

//! Pendant screen renderer
//!
//! Two levels keep display traffic down:
//! 1. [`RedrawGate`] skips a decode cycle entirely unless a position word
//!    changed or the fallback refresh is due.
//! 2. A full pass pushes every field through its [`FieldCache`], which only
//!    draws the character cells that differ.
//!
//! Percentage bars are not diffed; a bar is two rectangle fills.

use xhc_protocol::{AxisPosition, CoordinateSystem, OutputReport, AXIS_COUNT};

use crate::backend::{DisplayBackend, DisplayError, Font};
use crate::field::FieldCache;
use crate::format::{format_position, format_step, override_percent};
use crate::gate::{RedrawGate, RedrawReason};
use crate::layout::{FieldSlot, Layout, Rect};

/// Status text while reports are arriving
pub const STATUS_ONLINE: &str = "ON";

/// Status text before the first report and after the link times out
pub const STATUS_OFFLINE: &str = "OFF";

/// Step text shown before the first report
const INITIAL_STEP: &str = "0.001";

/// Bar fill shown before the first report
const INITIAL_BAR_PERCENT: u8 = 25;

const STATUS_LABEL: &str = "POS:";
const STEP_LABEL: &str = "STEP:";

/// Text fields on the pendant screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    WorkX,
    WorkY,
    WorkZ,
    MachineX,
    MachineY,
    MachineZ,
    /// Link status ("ON"/"OFF")
    Status,
    /// Step multiplier
    Step,
}

/// Number of text fields
pub const FIELD_COUNT: usize = 8;

impl FieldId {
    /// Every field in full-pass order
    pub const ALL: [FieldId; FIELD_COUNT] = [
        FieldId::WorkX,
        FieldId::WorkY,
        FieldId::WorkZ,
        FieldId::MachineX,
        FieldId::MachineY,
        FieldId::MachineZ,
        FieldId::Status,
        FieldId::Step,
    ];

    /// Field showing an axis, `None` if `axis >= 3`
    pub fn axis(system: CoordinateSystem, axis: usize) -> Option<Self> {
        let fields = match system {
            CoordinateSystem::Work => [FieldId::WorkX, FieldId::WorkY, FieldId::WorkZ],
            CoordinateSystem::Machine => [FieldId::MachineX, FieldId::MachineY, FieldId::MachineZ],
        };
        fields.get(axis).copied()
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Override bars in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bar {
    /// Feed-rate override
    Feed,
    /// Spindle-speed override
    Spindle,
}

/// Result of one decode cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOutcome {
    /// Nothing changed and no refresh was due
    Skipped,
    /// A full pass ran
    Redrawn {
        reason: RedrawReason,
        /// Character cells actually drawn
        cells: usize,
    },
}

/// Incremental renderer for the pendant screen
#[derive(Debug, Clone)]
pub struct Renderer {
    layout: Layout,
    fields: [FieldCache; FIELD_COUNT],
    gate: RedrawGate,
}

impl Renderer {
    /// Create a renderer with the given layout and fallback refresh interval
    pub fn new(layout: Layout, refresh_interval_ms: u32) -> Self {
        Self {
            layout,
            fields: core::array::from_fn(|_| FieldCache::new()),
            gate: RedrawGate::new(refresh_interval_ms),
        }
    }

    /// Get the layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Text currently shown by a field
    pub fn field_text(&self, id: FieldId) -> &str {
        self.fields[id.index()].text()
    }

    /// Forget the screen contents; the next report triggers a full redraw
    pub fn invalidate(&mut self) {
        for field in &mut self.fields {
            field.invalidate();
        }
        self.gate.reset();
    }

    fn slot<D: DisplayBackend>(&self, id: FieldId, display: &D) -> FieldSlot {
        let layout = &self.layout;
        let (medium, _) = display.glyph_size(Font::Medium);
        let (small, _) = display.glyph_size(Font::Small);
        match id {
            FieldId::WorkX => layout.position_slot(layout.work_block_y, 0, medium),
            FieldId::WorkY => layout.position_slot(layout.work_block_y, 1, medium),
            FieldId::WorkZ => layout.position_slot(layout.work_block_y, 2, medium),
            FieldId::MachineX => layout.position_slot(layout.machine_block_y, 0, medium),
            FieldId::MachineY => layout.position_slot(layout.machine_block_y, 1, medium),
            FieldId::MachineZ => layout.position_slot(layout.machine_block_y, 2, medium),
            FieldId::Status => layout.status_slot(
                layout.status_label_x,
                STATUS_LABEL.len() as u16 + 1,
                layout.status_cells,
                small,
            ),
            FieldId::Step => layout.status_slot(
                layout.step_label_x,
                STEP_LABEL.len() as u16 + 1,
                layout.step_cells,
                small,
            ),
        }
    }

    fn bar_rect<D: DisplayBackend>(&self, bar: Bar, display: &D) -> Rect {
        let (small, _) = display.glyph_size(Font::Small);
        match bar {
            Bar::Feed => self.layout.feed_bar(small),
            Bar::Spindle => self.layout.spindle_bar(small),
        }
    }

    /// Paint the fixed parts of the screen and reset every field
    pub fn draw_static<D: DisplayBackend>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        let layout = self.layout;
        let palette = layout.palette;
        let (width, height) = display.dimensions();
        let (small, _) = display.glyph_size(Font::Small);

        display.fill_rect(0, 0, width, height, palette.background)?;

        for (block_y, header) in [(layout.work_block_y, "WC"), (layout.machine_block_y, "MC")] {
            display.draw_text(
                layout.margin_left,
                block_y,
                header,
                Font::Large,
                palette.foreground,
                palette.background,
            )?;
            for (axis, label) in ["X:", "Y:", "Z:"].iter().enumerate() {
                display.draw_text(
                    layout.axis_label_x,
                    layout.axis_row_y(block_y, axis),
                    label,
                    Font::Medium,
                    palette.foreground,
                    palette.background,
                )?;
            }
        }

        display.fill_rect(
            layout.margin_left,
            layout.separator_y,
            layout.width.saturating_sub(layout.margin_left.saturating_add(layout.margin_right)),
            1,
            palette.line,
        )?;

        let bar_y = layout.status_bar_y();
        display.fill_rect(0, bar_y, layout.width, layout.status_bar_height, palette.status_bar)?;

        let text_y = layout.status_text_y();
        for (x, label) in [(layout.status_label_x, STATUS_LABEL), (layout.step_label_x, STEP_LABEL)] {
            display.draw_text(x, text_y, label, Font::Small, palette.status_text, palette.status_bar)?;
        }

        // Bar labels sit two cells left of their boxes
        let label_y = layout.bar_y().saturating_sub(1);
        for (bar, label) in [(Bar::Spindle, "S"), (Bar::Feed, "F")] {
            let rect = self.bar_rect(bar, display);
            display.draw_text(
                rect.x.saturating_sub(small.saturating_mul(2)),
                label_y,
                label,
                Font::Small,
                palette.status_text,
                palette.status_bar,
            )?;
        }

        for field in &mut self.fields {
            field.invalidate();
        }
        self.gate.reset();

        self.update_field(FieldId::Status, STATUS_OFFLINE, display)?;
        self.update_field(FieldId::Step, INITIAL_STEP, display)?;
        self.update_bar(Bar::Spindle, INITIAL_BAR_PERCENT, display)?;
        self.update_bar(Bar::Feed, INITIAL_BAR_PERCENT, display)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("static screen drawn");
        Ok(())
    }

    /// Show `text` in a field, drawing only the cells that changed
    ///
    /// Returns the number of character cells drawn.
    pub fn update_field<D: DisplayBackend>(
        &mut self,
        id: FieldId,
        text: &str,
        display: &mut D,
    ) -> Result<usize, DisplayError> {
        let slot = self.slot(id, display);
        self.fields[id.index()].update(&slot, text, display)
    }

    /// Show a position in a field
    pub fn update_position<D: DisplayBackend>(
        &mut self,
        id: FieldId,
        position: AxisPosition,
        display: &mut D,
    ) -> Result<usize, DisplayError> {
        self.update_field(id, format_position(position).as_str(), display)
    }

    /// Fill an override bar to `percent` (clamped to 100)
    pub fn update_bar<D: DisplayBackend>(
        &mut self,
        bar: Bar,
        percent: u8,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        let rect = self.bar_rect(bar, display);
        let palette = self.layout.palette;
        let percent = percent.min(100);

        display.fill_rect(rect.x, rect.y, rect.width, rect.height, palette.bar_empty)?;
        let fill = (rect.width as u32 * percent as u32 / 100) as u16;
        if fill > 0 {
            display.fill_rect(rect.x, rect.y, fill, rect.height, palette.bar_fill)?;
        }
        Ok(())
    }

    /// Push every field of `report` through the caches
    ///
    /// Returns the number of character cells drawn.
    pub fn full_pass<D: DisplayBackend>(
        &mut self,
        report: &OutputReport,
        display: &mut D,
    ) -> Result<usize, DisplayError> {
        let mut cells = 0;

        for system in [CoordinateSystem::Work, CoordinateSystem::Machine] {
            for axis in 0..AXIS_COUNT {
                if let (Some(id), Some(position)) =
                    (FieldId::axis(system, axis), report.position(system, axis))
                {
                    cells += self.update_position(id, position, display)?;
                }
            }
        }

        cells += self.update_field(FieldId::Status, STATUS_ONLINE, display)?;
        cells += self.update_field(
            FieldId::Step,
            format_step(report.step_multiplier()).as_str(),
            display,
        )?;

        self.update_bar(Bar::Feed, override_percent(report.feed_override()), display)?;
        self.update_bar(Bar::Spindle, override_percent(report.spindle_override()), display)?;

        Ok(cells)
    }

    /// Run one decode cycle: gate check, then a full pass if needed
    pub fn render<D: DisplayBackend>(
        &mut self,
        report: &OutputReport,
        now_ms: u32,
        display: &mut D,
    ) -> Result<RenderOutcome, DisplayError> {
        let Some(reason) = self.gate.check(report, now_ms) else {
            return Ok(RenderOutcome::Skipped);
        };

        match self.full_pass(report, display) {
            Ok(cells) => {
                self.gate.mark_redrawn(now_ms);
                #[cfg(feature = "defmt")]
                defmt::trace!("full pass ({}): {} cells", reason, cells);
                Ok(RenderOutcome::Redrawn { reason, cells })
            }
            Err(e) => {
                // Fields that failed are stale; the next report must run a pass
                self.gate.reset();
                Err(e)
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Layout::default(), crate::gate::DEFAULT_REFRESH_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::tests::{Op, Recorder};

    fn report(x: u16, frac: u16) -> OutputReport {
        let mut report = OutputReport {
            feed_override: 100,
            spindle_override: 300,
            step_multiplier: 10,
            ..Default::default()
        };
        report.positions[0] = AxisPosition::new(x, frac, false);
        report
    }

    #[test]
    fn test_draw_static_resets_fields() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();

        renderer.draw_static(&mut display).unwrap();
        assert_eq!(renderer.field_text(FieldId::Status), STATUS_OFFLINE);
        assert_eq!(renderer.field_text(FieldId::Step), "0.001");
        assert_eq!(renderer.field_text(FieldId::WorkX), "");
        // Background first
        assert_eq!(display.ops[0], Op::Fill { x: 0, y: 0, width: 160 });
    }

    #[test]
    fn test_first_report_draws_all_fields() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();
        renderer.draw_static(&mut display).unwrap();
        display.clear();

        let outcome = renderer.render(&report(0, 0), 0, &mut display).unwrap();
        // 6 × "+0.0000", "OFF" → "ON" (1 cell), "0.001" → "0.010" (2 cells)
        assert_eq!(
            outcome,
            RenderOutcome::Redrawn {
                reason: RedrawReason::Initial,
                cells: 6 * 7 + 1 + 2,
            }
        );
        assert_eq!(renderer.field_text(FieldId::MachineZ), "+0.0000");
        assert_eq!(renderer.field_text(FieldId::Status), STATUS_ONLINE);
    }

    #[test]
    fn test_unchanged_report_skips_cycle() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();
        renderer.render(&report(1, 0), 0, &mut display).unwrap();
        display.clear();

        let outcome = renderer.render(&report(1, 0), 100, &mut display).unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped);
        assert!(display.ops.is_empty());
    }

    #[test]
    fn test_position_change_draws_one_cell() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();
        renderer.render(&report(0, 0), 0, &mut display).unwrap();
        display.clear();

        let outcome = renderer.render(&report(1, 0), 20, &mut display).unwrap();
        assert_eq!(
            outcome,
            RenderOutcome::Redrawn {
                reason: RedrawReason::PositionChanged,
                cells: 1,
            }
        );
        assert_eq!(display.chars(), 1);
        assert_eq!(renderer.field_text(FieldId::WorkX), "+1.0000");
    }

    #[test]
    fn test_fallback_refresh_timing() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();
        renderer.render(&report(3, 0), 1000, &mut display).unwrap();

        assert_eq!(
            renderer.render(&report(3, 0), 1500, &mut display).unwrap(),
            RenderOutcome::Skipped
        );
        display.clear();

        let outcome = renderer.render(&report(3, 0), 1501, &mut display).unwrap();
        assert_eq!(
            outcome,
            RenderOutcome::Redrawn {
                reason: RedrawReason::Refresh,
                cells: 0,
            }
        );
        // Only the two bars are repainted
        assert_eq!(display.chars(), 0);
        assert!(display.fills() >= 2);
    }

    #[test]
    fn test_bar_fill_clamped() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();

        renderer.update_bar(Bar::Spindle, 250, &mut display).unwrap();
        assert_eq!(display.fills(), 2);
        assert_eq!(display.ops[1], Op::Fill { x: 16, y: 116, width: 60 });

        display.clear();
        renderer.update_bar(Bar::Feed, 0, &mut display).unwrap();
        assert_eq!(display.fills(), 1);
    }

    #[test]
    fn test_axis_field_lookup() {
        assert_eq!(FieldId::axis(CoordinateSystem::Machine, 1), Some(FieldId::MachineY));
        assert_eq!(FieldId::axis(CoordinateSystem::Work, 3), None);
    }

    #[test]
    fn test_failed_pass_forces_redraw() {
        use embedded_graphics::pixelcolor::Rgb565;

        struct Broken;
        impl DisplayBackend for Broken {
            fn fill_rect(&mut self, _: u16, _: u16, _: u16, _: u16, _: Rgb565) -> Result<(), DisplayError> {
                Err(DisplayError::Communication)
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
                Err(DisplayError::Communication)
            }

            fn glyph_size(&self, _: Font) -> (u16, u16) {
                (6, 10)
            }
            fn dimensions(&self) -> (u16, u16) {
                (160, 128)
            }
        }

        let mut renderer = Renderer::default();
        assert_eq!(
            renderer.render(&report(1, 0), 0, &mut Broken),
            Err(DisplayError::Communication)
        );

        let mut display = Recorder::default();
        let outcome = renderer.render(&report(1, 0), 1, &mut display).unwrap();
        assert!(matches!(
            outcome,
            RenderOutcome::Redrawn {
                reason: RedrawReason::Initial,
                ..
            }
        ));
    }

    #[test]
    fn test_partial_failure_repaints_field() {
        let mut renderer = Renderer::default();
        let mut display = Recorder::default();
        renderer.render(&report(0, 0), 0, &mut display).unwrap();
        display.clear();

        // Erasing the changed cell succeeds, drawing the '1' fails
        display.fail_at = Some(1);
        assert_eq!(
            renderer.render(&report(1, 0), 20, &mut display),
            Err(DisplayError::Communication)
        );
        display.clear();

        // Same text the cache last held, yet the damaged field is repainted
        let outcome = renderer.render(&report(0, 0), 40, &mut display).unwrap();
        assert!(matches!(outcome, RenderOutcome::Redrawn { cells: 7, .. }));
        assert_eq!(renderer.field_text(FieldId::WorkX), "+0.0000");

        display.clear();
        let outcome = renderer.render(&report(0, 0), 600, &mut display).unwrap();
        assert_eq!(
            outcome,
            RenderOutcome::Redrawn {
                reason: RedrawReason::Refresh,
                cells: 0,
            }
        );
    }
}

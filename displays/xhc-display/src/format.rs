//! Text formatting for screen fields
//!
//! Positions are formatted from the raw fixed-point parts so the rendered
//! text never depends on float rounding.

use core::fmt::Write;

use heapless::String;
use xhc_protocol::AxisPosition;

/// Longest text a field can hold ("+65538.2767" plus slack)
pub const FIELD_TEXT_LEN: usize = 12;

/// Field text buffer
pub type FieldText = String<FIELD_TEXT_LEN>;

/// Format a position as a signed value with four decimals, e.g. `-100.0050`
///
/// A zero magnitude is always rendered as `+0.0000`.
pub fn format_position(position: AxisPosition) -> FieldText {
    let units = position.magnitude_units();
    let sign = if position.is_negative() && units != 0 {
        '-'
    } else {
        '+'
    };

    let mut text = FieldText::new();
    // Cannot overflow: the largest magnitude is 11 characters
    let _ = write!(text, "{}{}.{:04}", sign, units / 10_000, units % 10_000);
    text
}

/// Format the step multiplier as `step / 1000` "." `step % 1000`, e.g. `0.010`
pub fn format_step(step_multiplier: u8) -> FieldText {
    let mut text = FieldText::new();
    let step = step_multiplier as u16;
    let _ = write!(text, "{}.{:03}", step / 1000, step % 1000);
    text
}

/// Convert a raw override to a bar percentage, 200 and above is a full bar
pub fn override_percent(raw: u16) -> u8 {
    (raw / 2).min(100) as u8
}

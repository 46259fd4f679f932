//! Per-field character diffing
//!
//! Each text field remembers the string it last put on screen. An update
//! touches only the cells whose character changed, so a position ticking from
//! `+0.0000` to `+1.0000` costs one glyph instead of seven.

use crate::backend::{DisplayBackend, DisplayError};
use crate::format::{FieldText, FIELD_TEXT_LEN};
use crate::layout::{Align, FieldSlot};

/// Last rendered text of one field
#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    text: FieldText,
    /// A draw failed midway; the slot holds an unknown mix of old and new
    stale: bool,
}

/// Replacement for characters the fonts cannot draw
const UNPRINTABLE: char = '?';

/// Clip `text` to the slot width, replacing non-ASCII characters
fn clip(text: &str, cells: u8) -> FieldText {
    let limit = (cells as usize).min(FIELD_TEXT_LEN);
    let mut clipped = FieldText::new();
    for ch in text.chars().take(limit) {
        let ch = if ch.is_ascii() && !ch.is_ascii_control() {
            ch
        } else {
            UNPRINTABLE
        };
        // Cannot fail: at most `limit` single-byte pushes
        let _ = clipped.push(ch);
    }
    clipped
}

/// Character shown in `cell` for a string anchored in a slot
fn char_at(text: &[u8], cell: usize, cells: usize, align: Align) -> Option<u8> {
    let index = match align {
        Align::Left => cell,
        Align::Right => cell.checked_sub(cells - text.len())?,
    };
    text.get(index).copied()
}

impl FieldCache {
    /// Create an empty cache (nothing drawn yet)
    pub const fn new() -> Self {
        Self {
            text: FieldText::new(),
            stale: false,
        }
    }

    /// Text currently on screen
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Forget what is on screen; the next update draws every character
    pub fn invalidate(&mut self) {
        self.text.clear();
    }

    /// Bring the field on screen in line with `text`
    ///
    /// Returns the number of character cells drawn. Identical text draws
    /// nothing. If the backend fails midway the field is marked stale and
    /// the next update clears the slot and draws every character.
    pub fn update<D: DisplayBackend>(
        &mut self,
        slot: &FieldSlot,
        text: &str,
        display: &mut D,
    ) -> Result<usize, DisplayError> {
        let new = clip(text, slot.cells);
        if !self.stale && new == self.text {
            return Ok(0);
        }

        match self.draw(slot, &new, display) {
            Ok(drawn) => {
                self.text = new;
                self.stale = false;
                Ok(drawn)
            }
            Err(e) => {
                self.text.clear();
                self.stale = true;
                Err(e)
            }
        }
    }

    fn draw<D: DisplayBackend>(
        &self,
        slot: &FieldSlot,
        new: &FieldText,
        display: &mut D,
    ) -> Result<usize, DisplayError> {
        let (advance, height) = display.glyph_size(slot.font);
        if self.stale {
            let width = advance.saturating_mul(slot.cells as u16);
            display.fill_rect(slot.x, slot.y, width, height, slot.bg)?;
        }

        let cells = new.len().max(self.text.len()).max(slot.cells as usize);
        let old = self.text.as_bytes();
        let fresh = new.as_bytes();

        let mut drawn = 0;
        // Run of cells that held text before and are now empty
        let mut blank: Option<(usize, usize)> = None;

        for cell in 0..cells {
            let before = char_at(old, cell, cells, slot.align);
            let after = char_at(fresh, cell, cells, slot.align);
            let x = slot.x.saturating_add(advance.saturating_mul(cell as u16));

            match (before, after) {
                (Some(b), Some(a)) if a == b => {}
                (Some(_), Some(a)) => {
                    display.fill_rect(x, slot.y, advance, height, slot.bg)?;
                    display.draw_char(x, slot.y, a as char, slot.font, slot.fg, slot.bg)?;
                    drawn += 1;
                }
                (None, Some(a)) => {
                    display.draw_char(x, slot.y, a as char, slot.font, slot.fg, slot.bg)?;
                    drawn += 1;
                }
                (Some(_), None) => {
                    blank = Some(match blank {
                        Some((start, _)) => (start, cell + 1),
                        None => (cell, cell + 1),
                    });
                }
                (None, None) => {}
            }
        }

        if let Some((start, end)) = blank {
            let x = slot.x.saturating_add(advance.saturating_mul(start as u16));
            let width = advance.saturating_mul((end - start) as u16);
            display.fill_rect(x, slot.y, width, height, slot.bg)?;
        }

        Ok(drawn)
    }
}

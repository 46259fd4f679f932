//! Display backend trait
//!
//! The renderer only ever asks for two primitives: fill a rectangle and draw
//! one character cell. Everything else (glyph shapes, panel commands) lives
//! behind this trait.

use embedded_graphics::pixelcolor::Rgb565;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Buffer overflow
    BufferOverflow,
}

/// Font sizes used by the pendant screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// Status bar text
    Small,
    /// Axis labels and position values
    Medium,
    /// Coordinate block headers
    Large,
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for the pendant screen.
/// Coordinates are in pixels with the origin at the top-left corner.
pub trait DisplayBackend {
    /// Fill a rectangle with a solid color
    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Draw a single character cell, background included
    ///
    /// `(x, y)` is the top-left corner of the cell.
    fn draw_char(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        font: Font,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Cell size `(advance, height)` of a font in pixels
    fn glyph_size(&self, font: Font) -> (u16, u16);

    /// Get the pixel dimensions `(width, height)`
    fn dimensions(&self) -> (u16, u16);

    /// Draw a string left to right, one cell per character
    fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        font: Font,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DisplayError> {
        let (advance, _) = self.glyph_size(font);
        let mut cx = x;
        for ch in text.chars() {
            self.draw_char(cx, y, ch, font, fg, bg)?;
            cx = cx.saturating_add(advance);
        }
        Ok(())
    }
}

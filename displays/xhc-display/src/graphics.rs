//! `DisplayBackend` over any embedded-graphics draw target
//!
//! Panel drivers only need to implement `DrawTarget<Color = Rgb565>`; text
//! uses the mono fonts bundled with embedded-graphics.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_7X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use crate::backend::{DisplayBackend, DisplayError, Font};

fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &FONT_6X10,
        Font::Medium => &FONT_7X13,
        Font::Large => &FONT_10X20,
    }
}

/// Adapter from a `DrawTarget` to [`DisplayBackend`]
pub struct GraphicsBackend<D> {
    target: D,
}

impl<D> GraphicsBackend<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Wrap a draw target
    pub fn new(target: D) -> Self {
        Self { target }
    }

    /// Borrow the underlying target
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Mutably borrow the underlying target
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Unwrap the adapter
    pub fn release(self) -> D {
        self.target
    }

    fn check_origin(&self, x: u16, y: u16) -> Result<(), DisplayError> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return Err(DisplayError::InvalidCoordinates);
        }
        Ok(())
    }
}

impl<D> DisplayBackend for GraphicsBackend<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        self.check_origin(x, y)?;
        let area = Rectangle::new(
            Point::new(x as i32, y as i32),
            Size::new(width as u32, height as u32),
        );
        self.target
            .fill_solid(&area, color)
            .map_err(|_| DisplayError::Communication)
    }

    fn draw_char(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        font: Font,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DisplayError> {
        self.check_origin(x, y)?;
        let style = MonoTextStyleBuilder::new()
            .font(mono_font(font))
            .text_color(fg)
            .background_color(bg)
            .build();

        let mut buf = [0u8; 4];
        let text = ch.encode_utf8(&mut buf);
        Text::with_baseline(text, Point::new(x as i32, y as i32), style, Baseline::Top)
            .draw(&mut self.target)
            .map(|_| ())
            .map_err(|_| DisplayError::Communication)
    }

    fn glyph_size(&self, font: Font) -> (u16, u16) {
        let font = mono_font(font);
        (
            (font.character_size.width + font.character_spacing) as u16,
            font.character_size.height as u16,
        )
    }

    fn dimensions(&self) -> (u16, u16) {
        let size = self.target.bounding_box().size;
        (size.width as u16, size.height as u16)
    }
}

//! ST7735 TFT Display Driver
//!
//! Driver for 160x128 ST7735-based TFT panels over SPI, landscape, RGB565.
//! There is no frame buffer: every draw goes straight to panel RAM through
//! an address window, which is what makes per-cell redraws cheap.

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use xhc_display::DisplayError;

/// Display dimensions (landscape)
const WIDTH: u16 = 160;
const HEIGHT: u16 = 128;

/// Pixels per SPI burst when streaming a fill
const BURST_PIXELS: usize = 32;

/// ST7735 commands
mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// MADCTL: row/column exchange + column mirror = landscape, BGR panel order
const MADCTL_LANDSCAPE: u8 = 0x60 | 0x08;

/// 16 bits per pixel
const COLMOD_RGB565: u8 = 0x05;

/// ST7735 TFT driver
pub struct St7735<SPI, CS, DC, RST> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
}

impl<SPI, CS, DC, RST> St7735<SPI, CS, DC, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a new ST7735 driver
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST) -> Self {
        Self { spi, cs, dc, rst }
    }

    /// Hardware reset and initialization sequence
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Communication)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(|_| DisplayError::Communication)?;
        delay.delay_ms(120);

        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(150);
        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(255);

        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        self.command(cmd::MADCTL, &[MADCTL_LANDSCAPE])?;
        self.command(cmd::INVOFF, &[])?;
        self.command(cmd::NORON, &[])?;
        delay.delay_ms(10);
        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(100);

        Ok(())
    }

    /// Send a command followed by its parameters
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        let result = self.command_inner(command, params);
        self.cs.set_high().map_err(|_| DisplayError::Communication)?;
        result
    }

    fn command_inner(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Communication)?;
        self.spi.write(&[command]).map_err(|_| DisplayError::Communication)?;
        self.spi.flush().map_err(|_| DisplayError::Communication)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(|_| DisplayError::Communication)?;
            self.spi.write(params).map_err(|_| DisplayError::Communication)?;
            self.spi.flush().map_err(|_| DisplayError::Communication)?;
        }
        Ok(())
    }

    /// Stream pixel data after RAMWR
    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        self.dc.set_high().map_err(|_| DisplayError::Communication)?;
        let result = self
            .spi
            .write(bytes)
            .and_then(|_| self.spi.flush())
            .map_err(|_| DisplayError::Communication);
        self.cs.set_high().map_err(|_| DisplayError::Communication)?;
        result
    }

    /// Set the RAM address window (inclusive corners) and start a write
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(cmd::CASET, &[x0h, x0l, x1h, x1l])?;
        self.command(cmd::RASET, &[y0h, y0l, y1h, y1l])?;
        self.command(cmd::RAMWR, &[])
    }

    /// Window covering `area`, `None` if it is empty or leaves the screen
    fn window_for(&self, area: &Rectangle) -> Option<(u16, u16, u16, u16)> {
        if area.intersection(&self.bounding_box()) != *area {
            return None;
        }
        let bottom_right = area.bottom_right()?;
        Some((
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        ))
    }

    /// Stream colors into the current window in bursts
    fn stream(&mut self, colors: impl Iterator<Item = Rgb565>) -> Result<(), DisplayError> {
        let mut burst = [0u8; BURST_PIXELS * 2];
        let mut len = 0;
        for color in colors {
            let raw = RawU16::from(color).into_inner().to_be_bytes();
            burst[len..len + 2].copy_from_slice(&raw);
            len += 2;
            if len == burst.len() {
                self.data(&burst)?;
                len = 0;
            }
        }
        if len > 0 {
            self.data(&burst[..len])?;
        }
        Ok(())
    }
}

impl<SPI, CS, DC, RST> OriginDimensions for St7735<SPI, CS, DC, RST> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<SPI, CS, DC, RST> DrawTarget for St7735<SPI, CS, DC, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            let (x, y) = (point.x as u16, point.y as u16);
            self.set_window(x, y, x, y)?;
            self.data(&RawU16::from(color).into_inner().to_be_bytes())?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let Some((x0, y0, x1, y1)) = self.window_for(area) else {
            // Partly off screen: per-pixel path clips
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        };
        self.set_window(x0, y0, x1, y1)?;
        let count = (area.size.width * area.size.height) as usize;
        self.stream(colors.into_iter().take(count))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some((x0, y0, x1, y1)) = self.window_for(&area) else {
            return Ok(());
        };
        self.set_window(x0, y0, x1, y1)?;
        let count = (area.size.width * area.size.height) as usize;
        self.stream(core::iter::repeat(color).take(count))
    }
}

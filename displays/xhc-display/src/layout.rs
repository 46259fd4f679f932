//! Screen layout
//!
//! All geometry lives in [`Layout`]; [`Layout::default()`] reproduces the
//! pendant's 160×128 landscape screen:
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ WC      X:                   +0.0000   │  work_block_y
//! │         Y:                   +0.0000   │
//! │         Z:                   +0.0000   │
//! ├────────────────────────────────────────┤  separator_y
//! │ MC      X:                   +0.0000   │  machine_block_y
//! │         Y:                   +0.0000   │
//! │         Z:                   +0.0000   │
//! │                                        │
//! ├────────────────────────────────────────┤  status bar
//! │ POS: ON              STEP: 0.001       │
//! │ S [#####     ]       F [#######   ]    │
//! └────────────────────────────────────────┘
//! ```

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

use crate::backend::Font;

/// Which edge of a field stays fixed when its text changes length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    /// First character is pinned to the field origin
    Left,
    /// Last character is pinned to the field's right edge
    Right,
}

/// Screen colors (RGB565)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Main background
    pub background: Rgb565,
    /// Labels and position values
    pub foreground: Rgb565,
    /// Separator line between the coordinate blocks
    pub line: Rgb565,
    /// Status bar background
    pub status_bar: Rgb565,
    /// Status bar text
    pub status_text: Rgb565,
    /// Unfilled part of a percentage bar
    pub bar_empty: Rgb565,
    /// Filled part of a percentage bar
    pub bar_fill: Rgb565,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb565::WHITE,
            foreground: Rgb565::BLACK,
            line: Rgb565::new(0x10, 0x20, 0x10),
            status_bar: Rgb565::BLUE,
            status_text: Rgb565::WHITE,
            bar_empty: Rgb565::BLACK,
            bar_fill: Rgb565::GREEN,
        }
    }
}

/// Resolved placement of a text field on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// X of the leftmost cell
    pub x: u16,
    /// Top of the cells
    pub y: u16,
    /// Number of character cells
    pub cells: u8,
    /// Anchored edge
    pub align: Align,
    /// Font used for every cell
    pub font: Font,
    /// Text color
    pub fg: Rgb565,
    /// Cell background
    pub bg: Rgb565,
}

/// Rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Configuration for the screen layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Screen width in pixels. Default: 160.
    pub width: u16,
    /// Screen height in pixels. Default: 128.
    pub height: u16,
    /// Left margin for block headers. Default: 2.
    pub margin_left: u16,
    /// Right margin. Default: 2.
    pub margin_right: u16,
    /// Extra gap between the position values and the right margin. Default: 5.
    pub value_inset: u16,
    /// X of the "X:"/"Y:"/"Z:" labels. Default: 40.
    pub axis_label_x: u16,
    /// Top of the work coordinate block. Default: 2.
    pub work_block_y: u16,
    /// Top of the machine coordinate block. Default: 50.
    pub machine_block_y: u16,
    /// Vertical distance between axis rows. Default: 14.
    pub row_pitch: u16,
    /// Y of the separator line. Default: 45.
    pub separator_y: u16,
    /// Height of the status bar at the bottom. Default: 26.
    pub status_bar_height: u16,
    /// Offset of the text row inside the status bar. Default: 2.
    pub status_text_dy: u16,
    /// Offset of the percentage bars inside the status bar. Default: 14.
    pub bar_dy: u16,
    /// Height of a percentage bar. Default: 9.
    pub bar_height: u16,
    /// Width of a percentage bar. Default: 60.
    pub bar_width: u16,
    /// X of the "POS:" label. Default: 4.
    pub status_label_x: u16,
    /// X of the "STEP:" label. Default: 84.
    pub step_label_x: u16,
    /// Cells reserved for a position value. Default: 11.
    pub position_cells: u8,
    /// Cells reserved for the status text. Default: 5.
    pub status_cells: u8,
    /// Cells reserved for the step text. Default: 5.
    pub step_cells: u8,
    /// Colors
    pub palette: Palette,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 160,
            height: 128,
            margin_left: 2,
            margin_right: 2,
            value_inset: 5,
            axis_label_x: 40,
            work_block_y: 2,
            machine_block_y: 50,
            row_pitch: 14,
            separator_y: 45,
            status_bar_height: 26,
            status_text_dy: 2,
            bar_dy: 14,
            bar_height: 9,
            bar_width: 60,
            status_label_x: 4,
            step_label_x: 84,
            position_cells: 11,
            status_cells: 5,
            step_cells: 5,
            palette: Palette::default(),
        }
    }
}

impl Layout {
    /// Top of the status bar
    pub fn status_bar_y(&self) -> u16 {
        self.height.saturating_sub(self.status_bar_height)
    }

    /// Top of the status text row
    pub fn status_text_y(&self) -> u16 {
        self.status_bar_y().saturating_add(self.status_text_dy)
    }

    /// Top of the percentage bars
    pub fn bar_y(&self) -> u16 {
        self.status_bar_y().saturating_add(self.bar_dy)
    }

    /// Top of an axis row inside a coordinate block
    pub fn axis_row_y(&self, block_y: u16, axis: usize) -> u16 {
        block_y.saturating_add(self.row_pitch.saturating_mul(axis as u16))
    }

    /// Right-anchored slot for a position value
    ///
    /// `advance` is the medium font cell width supplied by the backend.
    pub fn position_slot(&self, block_y: u16, axis: usize, advance: u16) -> FieldSlot {
        let right_edge = self
            .width
            .saturating_sub(self.margin_right.saturating_add(self.value_inset));
        FieldSlot {
            x: right_edge.saturating_sub(advance.saturating_mul(self.position_cells as u16)),
            y: self.axis_row_y(block_y, axis),
            cells: self.position_cells,
            align: Align::Right,
            font: Font::Medium,
            fg: self.palette.foreground,
            bg: self.palette.background,
        }
    }

    /// Left-anchored slot after a status bar label of `label_cells` characters
    pub fn status_slot(&self, label_x: u16, label_cells: u16, cells: u8, advance: u16) -> FieldSlot {
        FieldSlot {
            x: label_x.saturating_add(advance.saturating_mul(label_cells)),
            y: self.status_text_y(),
            cells,
            align: Align::Left,
            font: Font::Small,
            fg: self.palette.status_text,
            bg: self.palette.status_bar,
        }
    }

    /// Spindle override bar, left half of the status bar
    pub fn spindle_bar(&self, advance: u16) -> Rect {
        Rect::new(
            self.status_label_x.saturating_add(advance.saturating_mul(2)),
            self.bar_y(),
            self.bar_width,
            self.bar_height,
        )
    }

    /// Feed override bar, right half of the status bar
    pub fn feed_bar(&self, advance: u16) -> Rect {
        Rect::new(
            self.step_label_x.saturating_add(advance.saturating_mul(2)),
            self.bar_y(),
            self.bar_width,
            self.bar_height,
        )
    }
}

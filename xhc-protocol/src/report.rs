//! Host → pendant output report
//!
//! Wire format (37 bytes, little-endian, no padding):
//! - MAGIC (2 bytes): 0xFDFE
//! - DAY (1 byte): rolling key
//! - POS (6 × 4 bytes): integer part u16, fractional part u16 (bit 15 = sign)
//! - FEED_OVR, SPINDLE_OVR, FEED, SPINDLE (4 × u16)
//! - STEP (1 byte): step multiplier
//! - STATE (1 byte)
//!
//! Slots 0-2 hold the work coordinates X/Y/Z, slots 3-5 the machine coordinates.

use crate::MAGIC;

/// Logical size of an output report
pub const OUTPUT_REPORT_LEN: usize = 37;

/// Axes per coordinate system
pub const AXIS_COUNT: usize = 3;

/// Position slots carried by one report
pub const SLOT_COUNT: usize = 2 * AXIS_COUNT;

const SIGN_BIT: u16 = 0x8000;
const FRACTION_MASK: u16 = 0x7FFF;

/// Fraction units per integer unit
pub const FRACTION_SCALE: u32 = 10_000;

const OFFSET_DAY: usize = 2;
const OFFSET_POS: usize = 3;
const OFFSET_FEED_OVR: usize = 27;
const OFFSET_SPINDLE_OVR: usize = 29;
const OFFSET_FEED: usize = 31;
const OFFSET_SPINDLE: usize = 33;
const OFFSET_STEP: usize = 35;
const OFFSET_STATE: usize = 36;

/// Coordinate system selector for axis lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordinateSystem {
    /// Work coordinates (slots 0-2)
    Work,
    /// Machine coordinates (slots 3-5)
    Machine,
}

impl CoordinateSystem {
    fn slot_base(self) -> usize {
        match self {
            CoordinateSystem::Work => 0,
            CoordinateSystem::Machine => AXIS_COUNT,
        }
    }
}

/// One signed fixed-point position slot as carried on the wire
///
/// The value is `integer + (fraction & 0x7FFF) / 10000`, negated when bit 15
/// of `fraction` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisPosition {
    /// Integer part (magnitude)
    pub integer: u16,
    /// Fractional part, bit 15 is the sign
    pub fraction: u16,
}

impl AxisPosition {
    /// Build a slot from its magnitude parts
    ///
    /// `fraction_digits` is in units of 1/10000 and is truncated to 15 bits.
    pub const fn new(integer: u16, fraction_digits: u16, negative: bool) -> Self {
        let mut fraction = fraction_digits & FRACTION_MASK;
        if negative {
            fraction |= SIGN_BIT;
        }
        Self { integer, fraction }
    }

    /// True if the sign bit is set
    pub const fn is_negative(&self) -> bool {
        self.fraction & SIGN_BIT != 0
    }

    /// Fraction in units of 1/10000, sign bit stripped
    pub const fn fraction_digits(&self) -> u16 {
        self.fraction & FRACTION_MASK
    }

    /// Magnitude in units of 1/10000
    ///
    /// A fraction field above 9999 carries into the integer part, exactly as
    /// the float conversion does.
    pub const fn magnitude_units(&self) -> u32 {
        self.integer as u32 * FRACTION_SCALE + self.fraction_digits() as u32
    }

    /// Both raw fields packed into one word, used for change detection
    pub const fn packed(&self) -> u32 {
        ((self.integer as u32) << 16) | self.fraction as u32
    }

    /// Engineering-unit value
    pub fn to_f32(&self) -> f32 {
        let value = self.integer as f32 + self.fraction_digits() as f32 / FRACTION_SCALE as f32;
        if self.is_negative() {
            -value
        } else {
            value
        }
    }
}

/// A decoded host → pendant report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputReport {
    /// Rolling key ("day") mixed into input reports
    pub day: u8,
    /// Position slots: WC X/Y/Z then MC X/Y/Z
    pub positions: [AxisPosition; SLOT_COUNT],
    /// Feed-rate override
    pub feed_override: u16,
    /// Spindle-speed override
    pub spindle_override: u16,
    /// Feed rate
    pub feed_rate: u16,
    /// Spindle speed
    pub spindle_speed: u16,
    /// Step multiplier
    pub step_multiplier: u8,
    /// Machine state byte
    pub state: u8,
}

fn read_u16(bytes: &[u8; OUTPUT_REPORT_LEN], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn write_u16(bytes: &mut [u8; OUTPUT_REPORT_LEN], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

impl OutputReport {
    /// Decode a report from its wire bytes
    ///
    /// The magic marker is not checked here; the chunk assembler only ever
    /// hands over buffers that started with it.
    pub fn decode(bytes: &[u8; OUTPUT_REPORT_LEN]) -> Self {
        let mut positions = [AxisPosition::default(); SLOT_COUNT];
        for (i, slot) in positions.iter_mut().enumerate() {
            let base = OFFSET_POS + i * 4;
            *slot = AxisPosition {
                integer: read_u16(bytes, base),
                fraction: read_u16(bytes, base + 2),
            };
        }

        Self {
            day: bytes[OFFSET_DAY],
            positions,
            feed_override: read_u16(bytes, OFFSET_FEED_OVR),
            spindle_override: read_u16(bytes, OFFSET_SPINDLE_OVR),
            feed_rate: read_u16(bytes, OFFSET_FEED),
            spindle_speed: read_u16(bytes, OFFSET_SPINDLE),
            step_multiplier: bytes[OFFSET_STEP],
            state: bytes[OFFSET_STATE],
        }
    }

    /// Encode this report into wire bytes, magic marker included
    pub fn encode(&self) -> [u8; OUTPUT_REPORT_LEN] {
        let mut bytes = [0u8; OUTPUT_REPORT_LEN];
        write_u16(&mut bytes, 0, MAGIC);
        bytes[OFFSET_DAY] = self.day;
        for (i, slot) in self.positions.iter().enumerate() {
            let base = OFFSET_POS + i * 4;
            write_u16(&mut bytes, base, slot.integer);
            write_u16(&mut bytes, base + 2, slot.fraction);
        }
        write_u16(&mut bytes, OFFSET_FEED_OVR, self.feed_override);
        write_u16(&mut bytes, OFFSET_SPINDLE_OVR, self.spindle_override);
        write_u16(&mut bytes, OFFSET_FEED, self.feed_rate);
        write_u16(&mut bytes, OFFSET_SPINDLE, self.spindle_speed);
        bytes[OFFSET_STEP] = self.step_multiplier;
        bytes[OFFSET_STATE] = self.state;
        bytes
    }

    /// Raw position slot for an axis, `None` if `axis >= 3`
    pub fn position(&self, system: CoordinateSystem, axis: usize) -> Option<AxisPosition> {
        if axis >= AXIS_COUNT {
            return None;
        }
        Some(self.positions[system.slot_base() + axis])
    }

    /// Decoded axis value
    ///
    /// An axis index of 3 or more yields `0.0`.
    pub fn axis(&self, system: CoordinateSystem, axis: usize) -> f32 {
        self.position(system, axis)
            .map(|p| p.to_f32())
            .unwrap_or(0.0)
    }

    /// Rolling key byte
    pub fn rolling_key(&self) -> u8 {
        self.day
    }

    /// Feed rate
    pub fn feed_rate(&self) -> u16 {
        self.feed_rate
    }

    /// Spindle speed
    pub fn spindle_speed(&self) -> u16 {
        self.spindle_speed
    }

    /// Feed-rate override
    pub fn feed_override(&self) -> u16 {
        self.feed_override
    }

    /// Spindle-speed override
    pub fn spindle_override(&self) -> u16 {
        self.spindle_override
    }

    /// Step multiplier
    pub fn step_multiplier(&self) -> u8 {
        self.step_multiplier
    }
}

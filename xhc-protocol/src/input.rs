//! Pendant → host input report

use crate::INPUT_REPORT_ID;

/// Size of an input report on the wire
pub const INPUT_REPORT_LEN: usize = 6;

/// Errors that can occur when parsing an input report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Report is not exactly six bytes
    WrongLength,
    /// First byte is not the input report id
    WrongReportId,
    /// Rotary selector byte is not a known position
    UnknownWheelMode,
}

/// Rotary selector positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WheelMode {
    /// Jog wheel disabled
    #[default]
    Off,
    /// Jog X axis
    AxisX,
    /// Jog Y axis
    AxisY,
    /// Jog Z axis
    AxisZ,
    /// Jog A axis
    AxisA,
    /// Spindle override
    Spindle,
    /// Feed override
    Feed,
}

// Wire format values
const WHEEL_OFF: u8 = 0x00;
const WHEEL_X: u8 = 0x11;
const WHEEL_Y: u8 = 0x12;
const WHEEL_Z: u8 = 0x13;
const WHEEL_A: u8 = 0x14;
const WHEEL_SPINDLE: u8 = 0x15;
const WHEEL_FEED: u8 = 0x16;

impl WheelMode {
    /// Parse a selector position from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            WHEEL_OFF => Some(WheelMode::Off),
            WHEEL_X => Some(WheelMode::AxisX),
            WHEEL_Y => Some(WheelMode::AxisY),
            WHEEL_Z => Some(WheelMode::AxisZ),
            WHEEL_A => Some(WheelMode::AxisA),
            WHEEL_SPINDLE => Some(WheelMode::Spindle),
            WHEEL_FEED => Some(WheelMode::Feed),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            WheelMode::Off => WHEEL_OFF,
            WheelMode::AxisX => WHEEL_X,
            WheelMode::AxisY => WHEEL_Y,
            WheelMode::AxisZ => WHEEL_Z,
            WheelMode::AxisA => WHEEL_A,
            WheelMode::Spindle => WHEEL_SPINDLE,
            WheelMode::Feed => WHEEL_FEED,
        }
    }

    /// Returns true if the wheel jogs an axis
    pub fn is_axis(&self) -> bool {
        matches!(
            self,
            WheelMode::AxisX | WheelMode::AxisY | WheelMode::AxisZ | WheelMode::AxisA
        )
    }
}

/// One input report: buttons, selector, wheel delta and the XOR key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputReport {
    /// Button matrix byte 1
    pub buttons1: u8,
    /// Button matrix byte 2
    pub buttons2: u8,
    /// Rotary selector position
    pub wheel_mode: WheelMode,
    /// Signed jog wheel delta since the last report
    pub wheel_delta: i8,
    /// Rolling key XOR `buttons1`
    pub xor_key: u8,
}

impl InputReport {
    /// Build a report, deriving the XOR key from the host's rolling key
    pub fn new(
        buttons1: u8,
        buttons2: u8,
        wheel_mode: WheelMode,
        wheel_delta: i8,
        rolling_key: u8,
    ) -> Self {
        Self {
            buttons1,
            buttons2,
            wheel_mode,
            wheel_delta,
            xor_key: rolling_key ^ buttons1,
        }
    }

    /// Idle report: no buttons, no wheel movement
    pub fn keepalive(wheel_mode: WheelMode, rolling_key: u8) -> Self {
        Self::new(0, 0, wheel_mode, 0, rolling_key)
    }

    /// Encode into wire bytes
    pub fn encode(&self) -> [u8; INPUT_REPORT_LEN] {
        [
            INPUT_REPORT_ID,
            self.buttons1,
            self.buttons2,
            self.wheel_mode.to_byte(),
            self.wheel_delta as u8,
            self.xor_key,
        ]
    }

    /// Parse a report from wire bytes (host side)
    pub fn decode(bytes: &[u8]) -> Result<Self, ReportError> {
        if bytes.len() != INPUT_REPORT_LEN {
            return Err(ReportError::WrongLength);
        }
        if bytes[0] != INPUT_REPORT_ID {
            return Err(ReportError::WrongReportId);
        }
        let wheel_mode = WheelMode::from_byte(bytes[3]).ok_or(ReportError::UnknownWheelMode)?;

        Ok(Self {
            buttons1: bytes[1],
            buttons2: bytes[2],
            wheel_mode,
            wheel_delta: bytes[4] as i8,
            xor_key: bytes[5],
        })
    }

    /// Recover the rolling key the report was built with
    pub fn rolling_key(&self) -> u8 {
        self.xor_key ^ self.buttons1
    }
}

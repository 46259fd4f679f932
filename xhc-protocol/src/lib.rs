//! WHB04 Pendant Wire Protocol
//!
//! This crate defines the USB-HID protocol spoken between a CNC host (LinuxCNC
//! style XHC driver) and the pendant. The host pushes its machine state as a
//! 37-byte report split into 7-byte feature-report chunks; the pendant answers
//! with 6-byte input reports carrying buttons, the rotary selector and the
//! jog wheel delta.
//!
//! # Protocol Overview
//!
//! Host → pendant report, reassembled from chunks:
//! ```text
//! ┌───────┬─────┬───────────────────┬──────────────────────┬──────┬───────┐
//! │ MAGIC │ DAY │ 6 × (INT, FRAC)   │ F_OVR S_OVR FEED SPD │ STEP │ STATE │
//! │ 2B    │ 1B  │ 24B               │ 4 × 2B               │ 1B   │ 1B    │
//! └───────┴─────┴───────────────────┴──────────────────────┴──────┴───────┘
//! ```
//!
//! Chunks carry no index. The magic marker at the start of a chunk is the only
//! framing signal, and seeing it always restarts assembly.

#![no_std]
#![deny(unsafe_code)]

pub mod chunk;
pub mod input;
pub mod report;

pub use chunk::{ChunkAssembler, RawChunk, ASSEMBLY_CAPACITY, CHUNK_SIZE};
pub use input::{InputReport, ReportError, WheelMode, INPUT_REPORT_LEN};
pub use report::{AxisPosition, CoordinateSystem, OutputReport, AXIS_COUNT, OUTPUT_REPORT_LEN};

/// Report marker at offset 0 of every host → pendant report (little-endian)
pub const MAGIC: u16 = 0xFDFE;

/// USB vendor id reported by WHB04 pendants
pub const VENDOR_ID: u16 = 0x10CE;

/// USB product id of the WHB04 variant
pub const PRODUCT_ID: u16 = 0xEB70;

/// Report id of pendant → host input reports
pub const INPUT_REPORT_ID: u8 = 0x04;

/// Report id of the host → pendant feature report that carries one chunk
pub const CHUNK_REPORT_ID: u8 = 0x06;

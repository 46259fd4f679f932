//! Incremental screen renderer for the XHC pendant
//!
//! This crate provides:
//! - `DisplayBackend` trait with the two primitives the renderer needs
//! - `FieldCache` per-field character diffing
//! - `RedrawGate` that skips decode cycles with unchanged positions
//! - `Renderer` tying the caches to the pendant [`Layout`]
//! - `GraphicsBackend` adapting any embedded-graphics `DrawTarget`
//!
//! # Architecture
//!
//! The renderer never redraws the whole screen after start-up. Each decoded
//! report first goes through the gate; if a pass runs, each field only
//! repaints the character cells whose glyph changed. Panel drivers stay in
//! the firmware and only need to implement `DrawTarget<Color = Rgb565>`.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod field;
pub mod format;
pub mod gate;
pub mod graphics;
pub mod layout;
pub mod renderer;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError, Font};
pub use field::FieldCache;
pub use format::{format_position, format_step, override_percent, FieldText};
pub use gate::{RedrawGate, RedrawReason, DEFAULT_REFRESH_INTERVAL_MS};
pub use graphics::GraphicsBackend;
pub use layout::{Align, FieldSlot, Layout, Palette, Rect};
pub use renderer::{Bar, FieldId, RenderOutcome, Renderer, STATUS_OFFLINE, STATUS_ONLINE};

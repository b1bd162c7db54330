//! Hormone-driven social agent simulation.
//!
//! The engine lives in `oxyworld_core`; this crate runs it in the background
//! and exposes the per-tick snapshot stream and run controls.

pub mod app;

pub use oxyworld_core as core;
pub use oxyworld_data as data;

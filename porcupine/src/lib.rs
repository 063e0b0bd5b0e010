//! Porcupine property-based testing library.
//!
//! This is the main entry point for Porcupine, re-exporting the engine
//! from `porcupine-core`.

pub use porcupine_core::*;

//! Core engine for Porcupine property-based testing.
//!
//! This crate provides the building blocks of the engine: composable
//! generators with edge cases and exhaustive enumeration, candidates that
//! know how to shrink, the shrinking search and the property runner.

pub mod candidate;
pub mod combine;
pub mod data;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod exhaustive;
pub mod falsifier;
pub mod gen;
pub mod property;
pub mod scope;
pub mod shrinking;

// Re-export the main types
pub use candidate::Candidate;
pub use combine::{Candidates, Generators};
pub use data::*;
pub use distance::ShrinkDistance;
pub use edge_cases::EdgeCases;
pub use error::*;
pub use exhaustive::Exhaustive;
pub use falsifier::{filtered, Falsifier, TryResult};
pub use gen::choice::{Supplier, WeightedChoice};
pub use gen::numeric::Integral;
pub use gen::Gen;
pub use property::{for_all, Property};
pub use scope::Scope;
pub use shrinking::{shrink, FalsifiedSample, ShrinkOutcome, ShrinkingState};

//! Core primitives.
//!
//! Deterministic randomness and the validated word list. Nothing here
//! knows about players, rounds or transports.

pub mod rng;
pub mod words;

// Re-export core types
pub use rng::{DeterministicRng, RandomSource};
pub use words::{WordList, WordListError};

// src/simulation/mod.rs

//! Statevector evolution for the fixed gate set, plus Born-rule measurement
//! with cascading collapse. The engine itself is internal; sessions drive it
//! and expose the resulting state read-only.

mod results;
pub(crate) mod engine;

// Re-export the main public interface types
pub use results::Measurement;

//! Reserva NLU crate - advisory intent and field extraction.
//!
//! Provides the [`NluAdapter`] trait, a Gemini-backed implementation and a
//! null implementation for offline runs. Output is always treated as a hint;
//! callers validate every extracted field before using it.

pub mod adapter;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod types;

pub use adapter::{NluAdapter, NullAdapter};
pub use error::NluError;
pub use gemini::GeminiAdapter;
pub use types::{NluGuess, NluIntent};

//! Conversational interface for Reserva.
//!
//! A scripted dialogue that collects reservation fields one message at a
//! time, with optional NLU hints, and commits them to the reservation store.

pub mod engine;
pub mod error;
pub mod intent;
pub mod replies;
pub mod state;

pub use engine::ConversationEngine;
pub use error::ChatError;
pub use intent::MenuChoice;
pub use state::{
    ConversationSnapshot, ConversationState, LastAction, ReservationDraft, ReservationField, Step,
};

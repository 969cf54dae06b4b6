//! Application state shared across all route handlers.
//!
//! AppState holds references to the reservation store and the conversation
//! engine. It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use reserva_chat::ConversationEngine;
use reserva_core::config::ReservaConfig;
use reserva_nlu::NluAdapter;
use reserva_storage::ReservationStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (read-only after startup).
    pub config: Arc<ReservaConfig>,
    /// In-memory reservation records.
    pub store: Arc<ReservationStore>,
    /// Chat dialogue engine, sharing `store`.
    pub engine: Arc<ConversationEngine>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build the state with a fresh store and an engine using `nlu`.
    pub fn new(config: ReservaConfig, nlu: Arc<dyn NluAdapter>) -> Self {
        let store = Arc::new(ReservationStore::new());
        let engine = Arc::new(ConversationEngine::new(
            Arc::clone(&store),
            nlu,
            config.chat.clone(),
        ));
        Self {
            config: Arc::new(config),
            store,
            engine,
            start_time: Instant::now(),
        }
    }
}

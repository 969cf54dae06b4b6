//! Reserva API crate - axum HTTP server and route handlers.
//!
//! Provides the REST API: reservation CRUD under `/api/reservations`,
//! the chat endpoint under `/api/chat`, and a health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;

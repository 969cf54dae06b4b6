//! Error types for the reservation store.

/// Errors from reservation store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Reservation not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

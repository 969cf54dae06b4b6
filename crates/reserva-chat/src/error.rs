//! Error types for the conversation engine.

use reserva_storage::StoreError;

/// Errors from the conversation engine.
///
/// Unknown reservation ids are part of the dialogue and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::StorageError(err.to_string())
    }
}

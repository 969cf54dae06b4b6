use async_trait::async_trait;

use crate::types::NluGuess;

/// A natural-language-understanding backend.
///
/// `analyze` never fails from the caller's point of view: implementations
/// log their own faults and fall back to [`NluGuess::unknown`].
#[async_trait]
pub trait NluAdapter: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    async fn analyze(&self, text: &str) -> NluGuess;
}

/// Adapter that never understands anything. Used when NLU is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAdapter;

#[async_trait]
impl NluAdapter for NullAdapter {
    fn name(&self) -> &str {
        "null"
    }

    async fn analyze(&self, _text: &str) -> NluGuess {
        NluGuess::unknown("NLU disabled")
    }
}

//! Error taxonomy for the retrieval core.
//!
//! Each collaborator (store, embedding client, chat client) gets its own
//! `thiserror` enum so callers can match on failure mode; handlers collapse
//! everything to `anyhow::Error` at the HTTP boundary, the same way the
//! original ingestion handlers did.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store transport error: {0}")]
    Transport(#[from] tokio_postgres::Error),
    #[error("vector index unavailable")]
    IndexUnavailable,
    #[error("document store call timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding client transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding client call timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat model transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat model returned no completion choices")]
    EmptyResponse,
    #[error("chat model call timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("retrieval pipeline not initialized: {0}")]
    NotReady(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error(transparent)]
    Chat(#[from] ChatError),
}

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("unknown conversation: {0}")]
    NotFound(String),
}

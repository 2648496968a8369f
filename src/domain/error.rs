use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline itself, as opposed to the services it calls.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("embedding count mismatch: sent {expected} texts, received {received} embeddings")]
    EmbeddingCountMismatch { expected: usize, received: usize },

    #[error("invalid splitter settings: {0}")]
    InvalidSplitter(String),
}

use thiserror::Error;

/// Failure taxonomy for the ingestion and retrieval pipeline.
///
/// Per-file (`Conversion`, `Chunking`) and per-chunk (`Embedding`) errors are
/// isolated by the services and never abort sibling work in the same batch.
/// `StoreUnavailable` is a hard stop for every pipeline operation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Chunking failed: {0}")]
    Chunking(String),

    #[error("Vector store is unavailable")]
    StoreUnavailable,

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn chunking(msg: impl Into<String>) -> Self {
        Self::Chunking(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

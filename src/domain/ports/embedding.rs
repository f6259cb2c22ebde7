use async_trait::async_trait;

use crate::domain::{errors::Result, Embedding};

/// Deterministic mapping from text to a fixed-length vector.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding>;
    fn dimension(&self) -> usize;
}

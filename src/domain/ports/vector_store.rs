use async_trait::async_trait;

use crate::domain::{errors::Result, DocumentChunk, Embedding, SearchResult};

/// Named-collection vector storage.
///
/// Embeddings are computed by the caller; this port only persists and
/// searches vectors. Collection creation must be atomic: a reader never
/// observes a partially created collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drops any collection with this name (absence is not an error) and
    /// creates an empty one sized for `dimension` vectors.
    async fn recreate_collection(&self, name: &str, dimension: usize) -> Result<()>;

    async fn upsert(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<()>;

    /// The `top_k` nearest chunks by vector similarity, best first.
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    async fn list_collections(&self) -> Result<Vec<String>>;

    async fn collection_exists(&self, name: &str) -> Result<bool>;
}

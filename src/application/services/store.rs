use std::sync::Arc;

use tracing::{instrument, warn};

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    CollectionHandle, DocumentChunk, PipelineError, Result, SearchResult,
};

/// Named-collection store binding a vector backend to one embedding
/// function.
///
/// The store exclusively owns chunk persistence: the ingestion pipeline
/// writes through it and nothing holds chunk references outside it.
pub struct EmbeddingStore {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
}

impl EmbeddingStore {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
        }
    }

    /// Drops any existing collection with this name and creates an empty
    /// one. Idempotent: absence of the old collection is not an error.
    #[instrument(skip(self))]
    pub async fn replace_collection(&self, name: &str) -> Result<CollectionHandle> {
        self.vector_store
            .recreate_collection(name, self.embedding.dimension())
            .await?;
        Ok(CollectionHandle::new(name))
    }

    /// Embeds and persists each chunk, returning how many were stored.
    ///
    /// A chunk whose embedding or upsert fails is logged and skipped; the
    /// rest of the batch continues. Only store unavailability aborts.
    #[instrument(skip(self, chunks), fields(collection = handle.name(), count = chunks.len()))]
    pub async fn insert(
        &self,
        handle: &CollectionHandle,
        chunks: &[DocumentChunk],
    ) -> Result<usize> {
        let mut stored = 0;
        for chunk in chunks {
            let embedding = match self.embedding.embed(&chunk.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(chunk_id = %chunk.id, error = %e, "skipping chunk: embedding failed");
                    continue;
                }
            };

            match self
                .vector_store
                .upsert(handle.name(), chunk, &embedding)
                .await
            {
                Ok(()) => stored += 1,
                Err(PipelineError::StoreUnavailable) => return Err(PipelineError::StoreUnavailable),
                Err(e) => {
                    warn!(chunk_id = %chunk.id, error = %e, "skipping chunk: upsert failed");
                }
            }
        }
        Ok(stored)
    }

    /// Embeds the query and returns the `top_k` nearest chunks, best first.
    #[instrument(skip(self))]
    pub async fn similarity_search(
        &self,
        handle: &CollectionHandle,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store
            .search(handle.name(), &embedding, top_k)
            .await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.vector_store.list_collections().await
    }

    pub async fn get_collection(&self, name: &str) -> Result<CollectionHandle> {
        if self.vector_store.collection_exists(name).await? {
            Ok(CollectionHandle::new(name))
        } else {
            Err(PipelineError::not_found(format!("collection {name}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryCollectionStore;
    use crate::testing::FakeEmbedding;
    use std::path::Path;

    fn store_with(embedding: FakeEmbedding) -> EmbeddingStore {
        EmbeddingStore::new(
            Arc::new(embedding),
            Arc::new(InMemoryCollectionStore::new()),
        )
    }

    fn chunk(index: usize, text: &str) -> DocumentChunk {
        DocumentChunk::new(Path::new("/data/notes.txt"), index, text)
    }

    #[tokio::test]
    async fn replace_collection_is_idempotent_and_empty() {
        let store = store_with(FakeEmbedding::new());

        let handle = store.replace_collection("user_data").await.unwrap();
        store
            .insert(&handle, &[chunk(0, "alpha beta gamma")])
            .await
            .unwrap();

        // replacing again discards the contents and leaves a single entry
        let handle = store.replace_collection("user_data").await.unwrap();
        let handle2 = store.replace_collection("user_data").await.unwrap();
        assert_eq!(handle, handle2);

        let names = store.list_collections().await.unwrap();
        assert_eq!(names, vec!["user_data".to_string()]);

        let results = store
            .similarity_search(&handle, "alpha", 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn insert_skips_failing_chunk_and_keeps_the_rest() {
        let store = store_with(FakeEmbedding::failing_on(["poison"]));
        let handle = store.replace_collection("user_data").await.unwrap();

        let chunks = vec![
            chunk(0, "first section about apples"),
            chunk(1, "poison pill that cannot embed"),
            chunk(2, "third section about oranges"),
        ];
        let stored = store.insert(&handle, &chunks).await.unwrap();
        assert_eq!(stored, 2);

        let results = store
            .similarity_search(&handle, "section", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.text.contains("poison")));
    }

    #[tokio::test]
    async fn get_collection_reports_missing_names() {
        let store = store_with(FakeEmbedding::new());
        store.replace_collection("user_data").await.unwrap();

        assert!(store.get_collection("user_data").await.is_ok());
        let err = store.get_collection("nope").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}

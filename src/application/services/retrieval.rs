use std::sync::Arc;

use tracing::instrument;

use crate::application::services::store::EmbeddingStore;
use crate::domain::{CollectionHandle, PipelineError, Result, SearchResult};

/// Free-text retrieval over the embedding store's collections.
pub struct RetrievalService {
    store: Option<Arc<EmbeddingStore>>,
    default_top_k: usize,
}

impl RetrievalService {
    pub fn new(store: Option<Arc<EmbeddingStore>>, default_top_k: usize) -> Self {
        Self {
            store,
            default_top_k,
        }
    }

    /// Searches every collection with the per-collection default k, merges
    /// the hits, and returns the overall best `default_top_k`.
    #[instrument(skip(self))]
    pub async fn query_all(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.query_all_top_k(query, self.default_top_k).await
    }

    /// Scores are sorted descending with a stable sort: equal scores keep
    /// per-collection order, collections in `list_collections` order.
    #[instrument(skip(self))]
    pub async fn query_all_top_k(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let store = self.store()?;

        let mut merged = Vec::new();
        for name in store.list_collections().await? {
            let handle = CollectionHandle::new(&name);
            let results = store
                .similarity_search(&handle, query, self.default_top_k)
                .await?;
            merged.extend(results);
        }

        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(top_k);
        Ok(merged)
    }

    /// Queries one collection directly; `top_k` is caller-controlled and
    /// no cross-collection merge happens.
    #[instrument(skip(self))]
    pub async fn query_single(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let store = self.store()?;
        let handle = store.get_collection(collection).await?;
        store.similarity_search(&handle, query, top_k).await
    }

    fn store(&self) -> Result<&Arc<EmbeddingStore>> {
        self.store.as_ref().ok_or(PipelineError::StoreUnavailable)
    }
}

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{
    ports::VectorStore, DocumentChunk, Embedding, PipelineError, Result, SearchResult,
};

/// In-memory named-collection store for tests and local runs.
///
/// Collections are keyed in a `BTreeMap`, so `list_collections` order is
/// deterministic (lexicographic).
pub struct InMemoryCollectionStore {
    collections: RwLock<BTreeMap<String, Vec<(DocumentChunk, Embedding)>>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryCollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryCollectionStore {
    async fn recreate_collection(&self, name: &str, _dimension: usize) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| PipelineError::not_found(format!("collection {collection}")))?;

        entries.retain(|(c, _)| c.id != chunk.id);
        entries.push((chunk.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        let entries = collections
            .get(collection)
            .ok_or_else(|| PipelineError::not_found(format!("collection {collection}")))?;

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                text: chunk.text.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        Ok(collections.keys().cloned().collect())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self
            .collections
            .read()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        Ok(collections.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn chunk(index: usize, text: &str) -> DocumentChunk {
        DocumentChunk::new(Path::new("doc.txt"), index, text)
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let store = InMemoryCollectionStore::new();
        store.recreate_collection("c", 3).await.unwrap();

        store
            .upsert("c", &chunk(0, "near"), &Embedding::new(vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert("c", &chunk(1, "far"), &Embedding::new(vec![0.0, 1.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .search("c", &Embedding::new(vec![1.0, 0.0, 0.0]), 2)
            .await
            .unwrap();
        assert_eq!(results[0].text, "near");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn upsert_replaces_same_id() {
        let store = InMemoryCollectionStore::new();
        store.recreate_collection("c", 2).await.unwrap();

        let first = chunk(0, "old text");
        let second = chunk(0, "new text");
        store
            .upsert("c", &first, &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert("c", &second, &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .search("c", &Embedding::new(vec![1.0, 0.0]), 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "new text");
    }

    #[tokio::test]
    async fn recreate_drops_previous_contents() {
        let store = InMemoryCollectionStore::new();
        store.recreate_collection("c", 2).await.unwrap();
        store
            .upsert("c", &chunk(0, "stale"), &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap();

        store.recreate_collection("c", 2).await.unwrap();
        let results = store
            .search("c", &Embedding::new(vec![1.0, 0.0]), 10)
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(store.list_collections().await.unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let store = InMemoryCollectionStore::new();
        let err = store
            .search("ghost", &Embedding::new(vec![1.0]), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, DocumentChunk, Embedding, PipelineError, Result, SearchResult,
};

/// Qdrant-backed named-collection store.
pub struct QdrantCollectionStore {
    client: Qdrant,
}

impl QdrantCollectionStore {
    /// Connects and probes the service. An unreachable Qdrant fails here,
    /// so the caller can mark the store unavailable up front instead of
    /// discovering it on the first ingest.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| PipelineError::external(e.to_string()))?;

        let store = Self { client };
        store
            .client
            .list_collections()
            .await
            .map_err(|_| PipelineError::StoreUnavailable)?;
        Ok(store)
    }

    /// Qdrant point ids must be integers or UUIDs; chunk ids are readable
    /// strings, so fold a v5 UUID of the id into a u64 and keep the string
    /// in the payload.
    fn point_id(chunk_id: &str) -> u64 {
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes());
        let bytes = uuid.as_bytes();
        u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])
    }
}

#[async_trait]
impl VectorStore for QdrantCollectionStore {
    async fn recreate_collection(&self, name: &str, dimension: usize) -> Result<()> {
        // absent collection is fine; only creation errors matter
        if let Err(e) = self.client.delete_collection(name).await {
            tracing::debug!(collection = name, error = %e, "delete_collection skipped");
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                    dimension as u64,
                    Distance::Cosine,
                )),
            )
            .await
            .map_err(|e| PipelineError::external(e.to_string()))?;
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<()> {
        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id,
            "text": chunk.text,
            "chunk_index": chunk.metadata.chunk_index,
            "source": chunk.metadata.source,
            "filename": chunk.metadata.filename,
            "page": chunk.metadata.page,
        })
        .try_into()
        .map_err(|_| PipelineError::internal("failed to build point payload"))?;

        let point = PointStruct::new(
            Self::point_id(&chunk.id),
            embedding.as_slice().to_vec(),
            payload,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]))
            .await
            .map_err(|e| PipelineError::external(e.to_string()))?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| PipelineError::external(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| {
                let text = point.payload.get("text")?.as_str()?.to_string();
                Some(SearchResult {
                    text,
                    score: point.score,
                })
            })
            .collect())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| PipelineError::external(e.to_string()))?;
        Ok(response
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_collections().await?.iter().any(|n| n == name))
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, Semaphore};
use tracing::{instrument, warn};

use crate::application::services::store::EmbeddingStore;
use crate::domain::{
    chunking::chunk_markdown, ports::DocumentConverter, DocumentChunk, PipelineError, Result,
};

/// The collection every upload batch writes into. It is replaced wholesale
/// on each batch: chunks from earlier uploads do not survive.
pub const USER_COLLECTION: &str = "user_data";

#[derive(Debug, Clone, Serialize)]
pub struct FileIngestReport {
    pub filename: String,
    pub success: bool,
    pub chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchIngestReport {
    pub files: Vec<FileIngestReport>,
    pub chunks_inserted: usize,
}

impl BatchIngestReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.success).count()
    }
}

/// Orchestrates convert → chunk → store for upload batches.
///
/// All files of a batch are converted and chunked first (failures isolated
/// per file), then the `user_data` collection is replaced exactly once and
/// every surviving chunk is bulk-inserted. Concurrent batches are
/// serialized on the collection lock so delete/create/insert sequences
/// never interleave.
pub struct IngestionService {
    converter: Arc<dyn DocumentConverter>,
    store: Option<Arc<EmbeddingStore>>,
    chunk_size: usize,
    chunk_overlap: usize,
    collection_lock: Mutex<()>,
    conversion_permits: Semaphore,
}

impl IngestionService {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        store: Option<Arc<EmbeddingStore>>,
        chunk_size: usize,
        chunk_overlap: usize,
        max_concurrent_conversions: usize,
    ) -> Self {
        Self {
            converter,
            store,
            chunk_size,
            chunk_overlap,
            collection_lock: Mutex::new(()),
            conversion_permits: Semaphore::new(max_concurrent_conversions.max(1)),
        }
    }

    /// Ingests one file; `Ok(false)` means this file failed to convert or
    /// chunk. Store unavailability is the only hard error.
    pub async fn ingest(&self, path: &Path) -> Result<bool> {
        let report = self.ingest_batch(&[path.to_path_buf()]).await?;
        Ok(report.files.first().is_some_and(|f| f.success))
    }

    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn ingest_batch(&self, paths: &[PathBuf]) -> Result<BatchIngestReport> {
        let store = self
            .store
            .as_ref()
            .ok_or(PipelineError::StoreUnavailable)?;

        let prepared =
            futures::future::join_all(paths.iter().map(|path| self.prepare(path))).await;

        let mut files = Vec::with_capacity(paths.len());
        let mut batch_chunks: Vec<DocumentChunk> = Vec::new();
        for (path, outcome) in paths.iter().zip(prepared) {
            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("file")
                .to_string();

            match outcome {
                Ok(chunks) => {
                    files.push(FileIngestReport {
                        filename,
                        success: true,
                        chunks: chunks.len(),
                        error: None,
                    });
                    batch_chunks.extend(chunks);
                }
                Err(e) => {
                    warn!(file = %filename, error = %e, "file skipped");
                    files.push(FileIngestReport {
                        filename,
                        success: false,
                        chunks: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // Hold the lock across replace + insert so a concurrent batch (or
        // reader resolving the handle) never sees a half-built collection.
        let _guard = self.collection_lock.lock().await;
        let handle = store.replace_collection(USER_COLLECTION).await?;
        let chunks_inserted = store.insert(&handle, &batch_chunks).await?;

        Ok(BatchIngestReport {
            files,
            chunks_inserted,
        })
    }

    /// Convert on the blocking pool (bounded), then chunk.
    async fn prepare(&self, path: &Path) -> Result<Vec<DocumentChunk>> {
        let _permit = self
            .conversion_permits
            .acquire()
            .await
            .map_err(|_| PipelineError::internal("conversion pool closed"))?;

        let converter = self.converter.clone();
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || converter.convert(&owned))
            .await
            .map_err(|e| PipelineError::internal(format!("conversion task failed: {e}")))??;

        let chunks = chunk_markdown(&text, self.chunk_size, self.chunk_overlap)?;
        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(index, text)| DocumentChunk::new(path, index, text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryCollectionStore, MarkdownConverter};
    use crate::testing::FakeEmbedding;
    use std::io::Write;

    fn service(embedding: FakeEmbedding) -> (IngestionService, Arc<EmbeddingStore>) {
        let store = Arc::new(EmbeddingStore::new(
            Arc::new(embedding),
            Arc::new(InMemoryCollectionStore::new()),
        ));
        let service = IngestionService::new(
            Arc::new(MarkdownConverter::new()),
            Some(store.clone()),
            1024,
            64,
            2,
        );
        (service, store)
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn batch_keeps_chunks_from_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "apples.txt", "apples grow on trees in autumn");
        let b = write_file(&dir, "boats.txt", "boats float across the harbor");

        let (service, store) = service(FakeEmbedding::new());
        let report = service.ingest_batch(&[a, b]).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.chunks_inserted, 2);

        let handle = store.get_collection(USER_COLLECTION).await.unwrap();
        let results = store.similarity_search(&handle, "anything", 10).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert!(texts.iter().any(|t| t.contains("apples")));
        assert!(texts.iter().any(|t| t.contains("boats")));

        let names = store.list_collections().await.unwrap();
        assert_eq!(names, vec![USER_COLLECTION.to_string()]);
    }

    #[tokio::test]
    async fn conversion_failure_is_isolated_to_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "good.txt", "readable content survives");
        let missing = dir.path().join("missing.txt");

        let (service, store) = service(FakeEmbedding::new());
        let report = service.ingest_batch(&[missing, good]).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        assert!(!report.files[0].success);
        assert!(report.files[0].error.is_some());
        assert!(report.files[1].success);

        let handle = store.get_collection(USER_COLLECTION).await.unwrap();
        let results = store.similarity_search(&handle, "readable", 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn embedding_failures_do_not_fail_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "mixed.txt", "healthy text with a poison marker inside");

        let (service, _store) = service(FakeEmbedding::failing_on(["poison"]));
        let report = service.ingest_batch(&[path]).await.unwrap();

        // the file converted and chunked fine; the chunk just failed to embed
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.chunks_inserted, 0);
    }

    #[tokio::test]
    async fn unavailable_store_fails_fast() {
        let service = IngestionService::new(
            Arc::new(MarkdownConverter::new()),
            None,
            1024,
            64,
            2,
        );
        let err = service.ingest(Path::new("whatever.txt")).await.unwrap_err();
        assert!(matches!(err, PipelineError::StoreUnavailable));
    }

    #[tokio::test]
    async fn single_file_ingest_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "note.txt", "a short note about nothing much");

        let (service, _store) = service(FakeEmbedding::new());
        assert!(service.ingest(&path).await.unwrap());
    }
}

mod ingestion;
mod retrieval;
mod store;

pub use ingestion::{BatchIngestReport, FileIngestReport, IngestionService, USER_COLLECTION};
pub use retrieval::RetrievalService;
pub use store::EmbeddingStore;

//! Application layer - use cases and orchestration.
//!
//! Services here orchestrate domain logic over the domain ports (traits)
//! and never depend on concrete adapters.

pub mod services;

pub use services::{
    BatchIngestReport, EmbeddingStore, FileIngestReport, IngestionService, RetrievalService,
    USER_COLLECTION,
};

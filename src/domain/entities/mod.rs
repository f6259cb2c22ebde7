mod document;
mod embedding;

pub use document::{ChunkMetadata, CollectionHandle, DocumentChunk, SearchResult, StoredFile};
pub use embedding::Embedding;

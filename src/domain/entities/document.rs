use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded file as it exists in the data directory.
///
/// Identity is the filename; the file lives on disk until it is explicitly
/// deleted through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// A bounded slice of a document's normalized text, the unit of storage
/// and retrieval.
///
/// Chunk ids are derived from the source file stem (`{stem}_{index}`), so
/// re-ingesting the same file produces the same ids. Chunks are immutable
/// and are discarded when their owning collection is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub index: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(source: &Path, index: usize, text: impl Into<String>) -> Self {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        let filename = source
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file");

        Self {
            id: format!("{stem}_{index}"),
            index,
            text: text.into(),
            metadata: ChunkMetadata {
                source: source.to_string_lossy().into_owned(),
                filename: filename.to_string(),
                chunk_index: index,
                page: 0,
            },
        }
    }
}

/// Fixed metadata persisted alongside every chunk.
///
/// `page` is always 0: chunking operates on the whole normalized document,
/// not per page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub filename: String,
    pub chunk_index: usize,
    pub page: usize,
}

/// A single ranked hit from a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
}

/// Handle to a named collection in the embedding store.
///
/// Handles are only produced by `replace_collection` and `get_collection`,
/// so holding one implies the collection existed at the time it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    name: String,
}

impl CollectionHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn chunk_id_derives_from_file_stem() {
        let path = PathBuf::from("/data/report.pdf");
        let chunk = DocumentChunk::new(&path, 3, "body");

        assert_eq!(chunk.id, "report_3");
        assert_eq!(chunk.metadata.filename, "report.pdf");
        assert_eq!(chunk.metadata.chunk_index, 3);
        assert_eq!(chunk.metadata.page, 0);
    }
}

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::{PipelineError, Result, StoredFile};

/// Data directory holding uploaded documents, addressed by filename.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PipelineError::internal(format!("creating {}: {e}", self.root.display())))
    }

    /// Resolves a client-supplied name to a path inside the data
    /// directory; only the final path component is kept.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::not_found(format!("file {filename}")))?;
        Ok(self.root.join(name))
    }

    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(filename)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PipelineError::internal(format!("writing {}: {e}", path.display())))?;
        Ok(path)
    }

    pub async fn list(&self) -> Result<Vec<StoredFile>> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| PipelineError::internal(format!("reading {}: {e}", self.root.display())))?;

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| PipelineError::internal(e.to_string()))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| PipelineError::internal(e.to_string()))?;
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Removes the file from disk. Its chunks stay in the collection until
    /// the next replace.
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(PipelineError::not_found(format!("file {filename}")));
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| PipelineError::internal(format!("deleting {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_list_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.ensure_root().await.unwrap();

        storage.save("a.txt", b"alpha").await.unwrap();
        storage.save("b.txt", b"beta").await.unwrap();

        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].size, 5);

        storage.delete("a.txt").await.unwrap();
        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "b.txt");
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.ensure_root().await.unwrap();

        let err = storage.delete("ghost.txt").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn client_paths_are_flattened_to_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.ensure_root().await.unwrap();

        let path = storage.save("../../escape.txt", b"x").await.unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert_eq!(path.file_name().unwrap(), "escape.txt");
    }
}

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::domain::{PipelineError, Result};

pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const TOOL_KEY_VAR: &str = "TOOL_API_KEY";

/// Credential file of `KEY=value` lines.
///
/// Every update that actually changes a value bumps the version counter;
/// services holding credential-derived clients compare versions and
/// rebuild lazily instead of rebuilding on every write.
pub struct EnvStore {
    path: PathBuf,
    version: AtomicU64,
}

/// Key presence flags; values are never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct EnvStatus {
    pub env_exists: bool,
    pub openai_key: bool,
    pub tool_key: bool,
}

impl EnvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: AtomicU64::new(0),
        }
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn status(&self) -> Result<EnvStatus> {
        if !self.path.exists() {
            return Ok(EnvStatus {
                env_exists: false,
                openai_key: false,
                tool_key: false,
            });
        }

        let vars = self.read_vars()?;
        let has = |name: &str| vars.iter().any(|(key, _)| key == name);
        Ok(EnvStatus {
            env_exists: true,
            openai_key: has(OPENAI_KEY_VAR),
            tool_key: has(TOOL_KEY_VAR),
        })
    }

    /// Writes the provided keys back to the file (other keys untouched),
    /// exports them to the process environment, and bumps the version when
    /// a value changed. Returns whether anything changed.
    pub fn update(&self, openai_key: Option<&str>, tool_key: Option<&str>) -> Result<bool> {
        let mut vars = if self.path.exists() {
            self.read_vars()?
        } else {
            Vec::new()
        };

        let mut changed = false;
        for (name, value) in [(OPENAI_KEY_VAR, openai_key), (TOOL_KEY_VAR, tool_key)] {
            let Some(value) = value else { continue };

            match vars.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) if existing.as_str() == value => {}
                Some((_, existing)) => {
                    *existing = value.to_string();
                    changed = true;
                }
                None => {
                    vars.push((name.to_string(), value.to_string()));
                    changed = true;
                }
            }
            std::env::set_var(name, value);
        }

        let content: String = vars
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect();
        std::fs::write(&self.path, content)
            .map_err(|e| PipelineError::internal(format!("writing {}: {e}", self.path.display())))?;

        if changed {
            self.version.fetch_add(1, Ordering::Release);
        }
        Ok(changed)
    }

    fn read_vars(&self) -> Result<Vec<(String, String)>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PipelineError::internal(format!("reading {}: {e}", self.path.display())))?;

        Ok(content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                line.split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));

        let status = store.status().unwrap();
        assert!(!status.env_exists);
        assert!(!status.openai_key);
    }

    #[test]
    fn update_creates_file_and_bumps_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));

        assert_eq!(store.version(), 0);
        assert!(store.update(Some("sk-first"), None).unwrap());
        assert_eq!(store.version(), 1);

        let status = store.status().unwrap();
        assert!(status.env_exists);
        assert!(status.openai_key);
        assert!(!status.tool_key);
    }

    #[test]
    fn unchanged_value_does_not_bump_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvStore::new(dir.path().join(".env"));

        store.update(Some("sk-same"), None).unwrap();
        assert!(!store.update(Some("sk-same"), None).unwrap());
        assert_eq!(store.version(), 1);

        assert!(store.update(Some("sk-other"), None).unwrap());
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn unrelated_keys_survive_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# comment\nCUSTOM=keep\n").unwrap();

        let store = EnvStore::new(&path);
        store.update(None, Some("tool-key")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("CUSTOM=keep"));
        assert!(content.contains("TOOL_API_KEY=tool-key"));
    }
}

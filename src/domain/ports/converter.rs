use std::path::Path;

use crate::domain::errors::Result;

/// Turns an uploaded file into normalized markdown text.
///
/// Conversion is blocking work (PDF and office parsing); callers run it on
/// the blocking pool. Unsupported or unreadable input fails with
/// `PipelineError::Conversion`, which the pipeline treats as a per-file
/// failure rather than a batch abort.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, path: &Path) -> Result<String>;
}

//! Deterministic test doubles shared across unit tests.

use async_trait::async_trait;

use crate::domain::{ports::EmbeddingService, Embedding, PipelineError, Result};

/// Embeds text as a letter-frequency vector.
///
/// Deterministic and cheap, and texts that share vocabulary really do
/// score closer under cosine similarity, so retrieval tests behave like
/// the real thing.
pub struct FakeEmbedding {
    fail_on: Vec<String>,
}

impl FakeEmbedding {
    pub fn new() -> Self {
        Self { fail_on: Vec::new() }
    }

    /// Fails any embed whose text contains one of the markers.
    pub fn failing_on<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_on: markers.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if let Some(marker) = self.fail_on.iter().find(|m| text.contains(m.as_str())) {
            return Err(PipelineError::embedding(format!(
                "refusing to embed text containing {marker:?}"
            )));
        }

        let mut bins = vec![0.0f32; 27];
        for c in text.chars() {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() {
                bins[(c as u8 - b'a') as usize] += 1.0;
            } else if !c.is_whitespace() {
                bins[26] += 1.0;
            }
        }
        Ok(Embedding::new(bins))
    }

    fn dimension(&self) -> usize {
        27
    }
}

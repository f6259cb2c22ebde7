use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, Embedding, PipelineError, Result};
use crate::infrastructure::config::EmbeddingConfig;

/// OpenAI text embeddings via rig.
///
/// The provider client is rebuilt from the process environment on every
/// call, so a credential update takes effect without reconstructing this
/// service.
pub struct TextEmbedding {
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if std::env::var("OPENAI_API_KEY")
            .map(|v| v.is_empty())
            .unwrap_or(true)
        {
            return Err(PipelineError::embedding("OPENAI_API_KEY is not configured"));
        }

        let client = openai::Client::from_env();
        let model = client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| PipelineError::embedding(e.to_string()))?
            .build()
            .await
            .map_err(|e| PipelineError::embedding(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                Embedding::new(vec_f32)
            })
            .ok_or_else(|| PipelineError::embedding("no embedding returned"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

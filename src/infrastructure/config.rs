use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::chunking::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub qdrant_url: String,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub env_file: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tool_turns: usize,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_concurrent_conversions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(".data"),
                env_file: PathBuf::from(".env"),
                max_upload_bytes: 50 * 1024 * 1024,
            },
            qdrant_url: "http://localhost:6334".to_string(),
            llm: LlmConfig {
                model: "gpt-4.1".to_string(),
                timeout_seconds: 120,
                max_tool_turns: 5,
                system_prompt: "You are a helpful assistant with access to the user's uploaded \
                                documents. Use the search_documents tool to ground your answers \
                                in them when the question could relate to stored content."
                    .to_string(),
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
            },
            chunking: ChunkingConfig {
                chunk_size: DEFAULT_CHUNK_SIZE,
                chunk_overlap: DEFAULT_CHUNK_OVERLAP,
                max_concurrent_conversions: 4,
            },
            retrieval: RetrievalConfig { top_k: 4 },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables where present.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(port) = v.parse() {
                config.server.port = port;
            }
        }
        if let Ok(v) = std::env::var("QDRANT_URL") {
            config.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            config.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ENV_FILE") {
            config.storage.env_file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            config.llm.model = v;
        }
        if let Ok(v) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = v;
        }
        if let Ok(v) = std::env::var("EMBEDDING_DIMENSION") {
            if let Ok(dimension) = v.parse() {
                config.embedding.dimension = dimension;
            }
        }

        config
    }
}

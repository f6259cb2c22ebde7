pub mod agent;
pub mod config;
pub mod convert;
pub mod embedding;
pub mod env_store;
pub mod storage;
pub mod tools;
pub mod vector_store;

pub use agent::{AgentHandle, ChatAgent};
pub use config::AppConfig;
pub use convert::MarkdownConverter;
pub use embedding::TextEmbedding;
pub use env_store::{EnvStatus, EnvStore};
pub use storage::FileStorage;
pub use tools::RetrievalTool;
pub use vector_store::{InMemoryCollectionStore, QdrantCollectionStore};

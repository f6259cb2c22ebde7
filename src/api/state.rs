use std::sync::Arc;

use crate::application::{IngestionService, RetrievalService};
use crate::infrastructure::{AgentHandle, AppConfig, EnvStore, FileStorage};

/// Everything a request handler needs.
///
/// Owned by the server and passed into handlers by cloning cheap `Arc`s;
/// there is no process-global state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<FileStorage>,
    pub env_store: Arc<EnvStore>,
    pub ingestion: Arc<IngestionService>,
    pub retrieval: Arc<RetrievalService>,
    pub agent: Arc<AgentHandle>,
    pub store_available: bool,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<AppConfig>,
        storage: Arc<FileStorage>,
        env_store: Arc<EnvStore>,
        ingestion: Arc<IngestionService>,
        retrieval: Arc<RetrievalService>,
        agent: Arc<AgentHandle>,
        store_available: bool,
    ) -> Self {
        Self {
            config,
            storage,
            env_store,
            ingestion,
            retrieval,
            agent,
            store_available,
        }
    }
}

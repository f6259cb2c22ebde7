use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_agent::api::{create_router, AppState};
use doc_agent::application::{EmbeddingStore, IngestionService, RetrievalService};
use doc_agent::infrastructure::{
    AgentHandle, AppConfig, EnvStore, FileStorage, MarkdownConverter, QdrantCollectionStore,
    TextEmbedding,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,doc_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::from_env());

    let storage = Arc::new(FileStorage::new(config.storage.data_dir.clone()));
    storage.ensure_root().await?;

    let env_store = Arc::new(EnvStore::new(config.storage.env_file.clone()));

    // An unreachable vector store disables ingestion and retrieval rather
    // than failing startup; pipeline calls then fail fast.
    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let store = match QdrantCollectionStore::connect(&config.qdrant_url).await {
        Ok(qdrant) => {
            info!(url = %config.qdrant_url, "vector store connected");
            Some(Arc::new(EmbeddingStore::new(embedding, Arc::new(qdrant))))
        }
        Err(e) => {
            warn!(error = %e, "vector store unavailable; ingestion and retrieval disabled");
            None
        }
    };
    let store_available = store.is_some();

    let ingestion = Arc::new(IngestionService::new(
        Arc::new(MarkdownConverter::new()),
        store.clone(),
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
        config.chunking.max_concurrent_conversions,
    ));
    let retrieval = Arc::new(RetrievalService::new(store, config.retrieval.top_k));
    let agent = Arc::new(AgentHandle::new(
        env_store.clone(),
        retrieval.clone(),
        config.clone(),
    ));

    let state = AppState::new(
        config.clone(),
        storage,
        env_store,
        ingestion,
        retrieval,
        agent,
        store_available,
    );
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

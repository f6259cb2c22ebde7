pub mod chat;
pub mod env;
pub mod files;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);
    let max_upload = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/chat", post(chat::chat))
        .route("/list_files", get(files::list_files))
        .route("/upload_files", post(files::upload_files))
        .route("/delete_file", post(files::delete_file))
        .route("/get_env", get(env::get_env))
        .route("/update_env", post(env::update_env))
        .route("/reinitialize_agent", post(env::reinitialize_agent))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::infrastructure::EnvStatus;

#[derive(Debug, Serialize)]
pub struct EnvStatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: EnvStatus,
}

pub async fn get_env(State(state): State<AppState>) -> Result<Json<EnvStatusResponse>, StatusCode> {
    state
        .env_store
        .status()
        .map(|status| {
            Json(EnvStatusResponse {
                success: true,
                status,
            })
        })
        .map_err(|e| {
            tracing::error!(error = %e, "reading credential file failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnvRequest {
    pub openai_key: Option<String>,
    pub tool_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateEnvResponse {
    pub success: bool,
    pub changed: bool,
}

/// Persists the keys and bumps the credential version; the agent and the
/// embedding client pick the change up lazily on their next use.
pub async fn update_env(
    State(state): State<AppState>,
    Json(request): Json<UpdateEnvRequest>,
) -> Result<Json<UpdateEnvResponse>, StatusCode> {
    let changed = state
        .env_store
        .update(request.openai_key.as_deref(), request.tool_key.as_deref())
        .map_err(|e| {
            tracing::error!(error = %e, "updating credential file failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(UpdateEnvResponse {
        success: true,
        changed,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReinitializeResponse {
    pub success: bool,
    pub message: String,
}

pub async fn reinitialize_agent(State(state): State<AppState>) -> Json<ReinitializeResponse> {
    match state.agent.reinitialize().await {
        Ok(()) => Json(ReinitializeResponse {
            success: true,
            message: "Agent reinitialized successfully".into(),
        }),
        Err(e) => Json(ReinitializeResponse {
            success: false,
            message: e.to_string(),
        }),
    }
}

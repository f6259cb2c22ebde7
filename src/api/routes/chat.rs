use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Chat never surfaces an HTTP error status; faults come back as a
/// readable message in the response body.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = match state.agent.current().await {
        Ok(agent) => match agent.chat(&request.message, &request.context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "agent execution failed");
                format!("Error processing your request: {e}")
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "agent unavailable");
            format!("Error processing your request: {e}")
        }
    };

    Json(ChatResponse { response })
}

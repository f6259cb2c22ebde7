use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::application::FileIngestReport;
use crate::domain::{PipelineError, StoredFile};

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<StoredFile>,
}

pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<ListFilesResponse>, StatusCode> {
    state
        .storage
        .list()
        .await
        .map(|files| Json(ListFilesResponse { files }))
        .map_err(|e| {
            tracing::error!(error = %e, "listing files failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileIngestReport>,
}

/// Saves every uploaded file, then runs one ingestion batch over all of
/// them: the collection is replaced once and chunks from each file of the
/// batch are kept.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, StatusCode> {
    let mut saved = Vec::new();
    let mut names = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!(error = %e, "reading multipart field failed");
        StatusCode::BAD_REQUEST
    })? {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| {
            tracing::error!(file = %filename, error = %e, "reading upload failed");
            StatusCode::BAD_REQUEST
        })?;

        let path = state.storage.save(&filename, &data).await.map_err(|e| {
            tracing::error!(file = %filename, error = %e, "saving upload failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        saved.push(path);
        names.push(filename);
    }

    // an empty batch must not reach the pipeline: replacing the collection
    // with nothing would wipe previously ingested content
    if saved.is_empty() {
        return Ok(Json(UploadResponse {
            success: false,
            message: "No files provided".into(),
            files: Vec::new(),
            failures: Vec::new(),
        }));
    }

    let report = match state.ingestion.ingest_batch(&saved).await {
        Ok(report) => report,
        Err(PipelineError::StoreUnavailable) => return Err(StatusCode::SERVICE_UNAVAILABLE),
        Err(e) => {
            tracing::error!(error = %e, "batch ingestion failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let failures: Vec<FileIngestReport> = report
        .files
        .iter()
        .filter(|f| !f.success)
        .cloned()
        .collect();

    Ok(Json(UploadResponse {
        success: true,
        message: format!(
            "Successfully uploaded and processed {} of {} files",
            report.succeeded(),
            names.len()
        ),
        files: names,
        failures,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteFileResponse {
    pub success: bool,
    pub message: String,
}

/// Removes the file from disk only; its chunks stay in the collection
/// until the next upload replaces it.
pub async fn delete_file(
    State(state): State<AppState>,
    Json(request): Json<DeleteFileRequest>,
) -> Result<Json<DeleteFileResponse>, StatusCode> {
    match state.storage.delete(&request.filename).await {
        Ok(()) => Ok(Json(DeleteFileResponse {
            success: true,
            message: format!("Successfully deleted {}", request.filename),
        })),
        Err(PipelineError::NotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!(error = %e, "deleting file failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

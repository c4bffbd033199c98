use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use crate::models::{AnalysisProgress, AnalysisResult, AppState, SampleFile};
use crate::types::{AppError, AppResult};
use crate::workflow::UploadWorkflow;

// Headroom over the sample size limit so the workflow's own validation is
// what rejects oversized files, not the transport.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = (state.config.backend.max_upload_bytes + MULTIPART_OVERHEAD) as usize;
    Router::new()
        .route("/api/analyze", post(analyze_sample))
        .route("/api/analyze/progress", get(current_progress))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn analyze_sample(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<AnalysisResult>> {
    // One analysis run at a time per process.
    let _run = state
        .run_guard
        .try_lock()
        .map_err(|_| AppError::Conflict("an analysis run is already in progress".to_string()))?;

    let file = read_sample_field(multipart).await?;
    info!(filename = %file.filename, size = file.size(), "Analysis request received");

    let (mut workflow, mut progress_rx) = UploadWorkflow::new(
        state.backend.clone(),
        state.config.backend.max_upload_bytes,
    );
    workflow.select_file(file)?;

    // Mirror progress snapshots into the slot the progress endpoint reads.
    let slot = state.progress.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(snapshot) = progress_rx.recv().await {
            *slot.write().await = Some(snapshot);
        }
    });

    let outcome = workflow.start().await;
    drop(workflow);
    let _ = forwarder.await;
    *state.progress.write().await = None;

    let result = outcome?;
    state.history.append(result.clone()).await;
    Ok(Json(result))
}

async fn current_progress(State(state): State<AppState>) -> Json<Option<AnalysisProgress>> {
    Json(state.progress.read().await.clone())
}

/// Pull the uploaded video out of the multipart body.
async fn read_sample_field(mut multipart: Multipart) -> AppResult<SampleFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("sample.mp4").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {}", e)))?;

        return Ok(SampleFile { filename, content_type, data });
    }

    Err(AppError::InvalidRequest(
        "multipart body is missing a 'file' field".to_string(),
    ))
}

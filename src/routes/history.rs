use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::{AnalysisResult, AppState};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/history", get(list_history))
        .route("/api/history/{id}", get(get_result).delete(delete_result))
        .with_state(state)
}

async fn list_history(State(state): State<AppState>) -> Json<Vec<AnalysisResult>> {
    Json(state.history.list().await)
}

async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AnalysisResult>> {
    state
        .history
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("analysis {}", id)))
}

async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.history.remove(&id).await {
        info!(id = %id, "Analysis removed from history");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("analysis {}", id)))
    }
}

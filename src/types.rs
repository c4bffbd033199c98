// Error types shared across the crate

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Video upload failed: {0}")]
    UploadFailure(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidFileType(_) => (StatusCode::BAD_REQUEST, "INVALID_FILE_TYPE"),
            AppError::FileTooLarge { .. } => (StatusCode::BAD_REQUEST, "FILE_TOO_LARGE"),
            AppError::UploadFailure(_) => (StatusCode::BAD_GATEWAY, "UPLOAD_FAILURE"),
            AppError::AnalysisFailure(_) => (StatusCode::BAD_GATEWAY, "ANALYSIS_FAILURE"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (
                AppError::InvalidFileType("image/png".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::FileTooLarge { size: 200, limit: 100 },
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::UploadFailure("storage rejected".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::AnalysisFailure("no payload".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (
                AppError::Conflict("run in progress".into()),
                StatusCode::CONFLICT,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}

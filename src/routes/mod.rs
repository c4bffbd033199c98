//! API Routes
//!
//! HTTP endpoints for the application:
//! - `/api/analyze` - Upload a sample video and run one analysis
//! - `/api/analyze/progress` - Progress of the in-flight run
//! - `/api/history` - Session analysis history (list, get, delete)
//! - `/api/health` - Health check and backend mode
//! - `/` - Served frontend page

pub mod analyze;
pub mod health;
pub mod history;
pub mod ui;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(analyze::router(state.clone()))
        .merge(history::router(state.clone()))
        .merge(health::router(state))
        .merge(ui::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tokio::sync::{Mutex, RwLock};
    use tower::ServiceExt;

    use crate::config::{BackendConfig, Config, ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
    use crate::gateway;
    use crate::history::HistoryRegistry;
    use crate::models::AnalysisResult;

    fn offline_state() -> AppState {
        let config = Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec![],
            },
            backend: BackendConfig {
                url: None,
                api_key: None,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        };
        AppState {
            backend: gateway::from_config(&config.backend),
            config,
            history: HistoryRegistry::default(),
            progress: Arc::new(RwLock::new(None)),
            run_guard: Arc::new(Mutex::new(())),
        }
    }

    fn multipart_request(filename: &str, content_type: &str) -> Request<Body> {
        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n\
             fake frame bytes\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_offline_mode() {
        let app = create_router(offline_state());

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend_mode"], "offline");
    }

    #[tokio::test]
    async fn test_analyze_offline_end_to_end() {
        let state = offline_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(multipart_request("sample.mp4", "video/mp4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result: AnalysisResult = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(result.filename, "sample.mp4");
        assert!((20..70).contains(&result.sperm_count));

        // Landed in history, and no stale progress remains.
        assert_eq!(state.history.len().await, 1);
        assert!(state.progress.read().await.is_none());

        let listed = app
            .oneshot(Request::get("/api/history").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(listed).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_video_upload() {
        let state = offline_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(multipart_request("image.png", "image/png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INVALID_FILE_TYPE");
        assert_eq!(state.history.len().await, 0);
    }

    #[tokio::test]
    async fn test_second_concurrent_run_gets_conflict() {
        let state = offline_state();
        let app = create_router(state.clone());

        // Hold the run guard as an in-flight analysis would.
        let _active_run = state.run_guard.lock().await;

        let response = app
            .oneshot(multipart_request("sample.mp4", "video/mp4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(state.history.len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_history_id_is_not_found() {
        let app = create_router(offline_state());

        let response = app
            .oneshot(
                Request::get("/api/history/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_history_entry() {
        let state = offline_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(multipart_request("sample.mp4", "video/mp4"))
            .await
            .unwrap();
        let result: AnalysisResult = serde_json::from_value(json_body(response).await).unwrap();

        let deleted = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/history/{}", result.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.history.len().await, 0);

        let again = app
            .oneshot(
                Request::delete(format!("/api/history/{}", result.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}

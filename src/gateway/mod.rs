//! Remote Analysis Gateway
//!
//! Two operations against the external analysis backend: upload a sample
//! video and get back a dereferenceable URL, then submit that URL for
//! analysis. When no backend is configured both operations are satisfied by
//! a local offline substitute with bounded pseudo-random results.

pub mod offline;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::BackendConfig;
use crate::models::{RawAnalysis, SampleFile};
use crate::types::AppResult;

/// Location of an uploaded sample in remote (or substitute) storage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedSample {
    pub public_url: String,
    pub file_path: String,
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Persist a pre-validated video file and return its public URL.
    async fn upload_sample(&self, file: &SampleFile) -> AppResult<UploadedSample>;

    /// Run the analysis pipeline against an uploaded sample URL.
    async fn analyze_sample(&self, video_url: &str) -> AppResult<RawAnalysis>;

    /// Identifier reported by the health endpoint ("remote" or "offline").
    fn mode(&self) -> &'static str;
}

/// Select the backend adapter from configuration.
///
/// The choice is made once at startup and is immutable afterwards.
pub fn from_config(config: &BackendConfig) -> Arc<dyn AnalysisBackend> {
    match (&config.url, &config.api_key) {
        (Some(url), Some(api_key)) => {
            info!(url = %url, "Using remote analysis backend");
            Arc::new(remote::RemoteBackend::new(url, api_key))
        }
        _ => {
            info!("Analysis backend not configured, running in offline mode");
            Arc::new(offline::OfflineBackend::new())
        }
    }
}

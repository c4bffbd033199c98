// Remote backend adapter
//
// Talks to the managed analysis backend over HTTP:
// 1. Storage upload: POST {base}/storage/v1/videos/{path} with the raw bytes
// 2. Analysis function: POST {base}/functions/v1/analyze with the sample URL

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::gateway::{AnalysisBackend, UploadedSample};
use crate::models::{RawAnalysis, SampleFile};
use crate::types::{AppError, AppResult};

pub struct RemoteBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    video_url: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageUploadResponse {
    #[serde(default)]
    public_url: Option<String>,
}

#[derive(Deserialize)]
struct BackendErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RemoteBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Storage key for an uploaded sample, unique per upload.
    fn storage_path(filename: &str) -> String {
        let extension = filename.rsplit('.').next().unwrap_or("mp4");
        format!(
            "public/video_{}.{}",
            chrono::Utc::now().timestamp_millis(),
            extension
        )
    }

    /// Extract the backend's error detail from a failed response body.
    fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<BackendErrorResponse>(body) {
            if let Some(detail) = parsed.error.or(parsed.message) {
                return format!("backend error ({}): {}", status, detail);
            }
        }
        format!("backend error ({}): {}", status, body)
    }
}

#[async_trait]
impl AnalysisBackend for RemoteBackend {
    async fn upload_sample(&self, file: &SampleFile) -> AppResult<UploadedSample> {
        let file_path = Self::storage_path(&file.filename);
        let url = format!("{}/storage/v1/videos/{}", self.base_url, file_path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", file.content_type.clone())
            .body(file.data.clone())
            .send()
            .await
            .map_err(|e| AppError::UploadFailure(format!("storage request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UploadFailure(Self::error_detail(status, &body)));
        }

        let upload: StorageUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailure(format!("unreadable storage response: {}", e)))?;

        // A nominally successful upload without a resolvable URL is unusable.
        let public_url = upload
            .public_url
            .unwrap_or_else(|| format!("{}/storage/v1/videos/{}", self.base_url, file_path));
        if public_url.is_empty() {
            return Err(AppError::UploadFailure(
                "no public URL for the uploaded video".to_string(),
            ));
        }

        Ok(UploadedSample { public_url, file_path })
    }

    async fn analyze_sample(&self, video_url: &str) -> AppResult<RawAnalysis> {
        let url = format!("{}/functions/v1/analyze", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&AnalyzeRequest { video_url })
            .send()
            .await
            .map_err(|e| AppError::AnalysisFailure(format!("analysis request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AnalysisFailure(Self::error_detail(status, &body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AnalysisFailure(format!("unusable analysis payload: {}", e)))
    }

    fn mode(&self) -> &'static str {
        "remote"
    }
}

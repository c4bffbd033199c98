use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::gateway::AnalysisBackend;
use crate::history::HistoryRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn AnalysisBackend>,
    pub history: HistoryRegistry,
    /// Latest progress snapshot of the in-flight run, if any.
    pub progress: Arc<RwLock<Option<AnalysisProgress>>>,
    /// Held for the duration of one analysis run so at most one is in flight.
    pub run_guard: Arc<Mutex<()>>,
}

// Core models based on the analysis result schema

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub filename: String,
    pub sperm_count: u32,
    /// Average velocity in µm/s.
    pub speed_avg: f64,
    pub movement_pattern: MovementPattern,
    /// Density in million/mL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration: Option<f64>,
    /// Overall motility percentage in [0, 100].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motility: Option<f64>,
    /// Total motile count in millions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_motile_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morphology: Option<Morphology>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Wall-clock analysis duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Percentage partition of observed objects by movement class.
///
/// The three values are reported as-is from the analysis backend; the sum is
/// not validated or normalized to 100.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementPattern {
    pub progressive: f64,
    pub non_progressive: f64,
    pub immobile: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Morphology {
    pub normal: f64,
    pub abnormal: f64,
}

/// Analysis payload as returned by the backend.
///
/// `id`, `timestamp` and `filename` are optional on the wire; the workflow
/// controller fills them in at completion time when the backend omits them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub filename: Option<String>,
    pub sperm_count: u32,
    pub speed_avg: f64,
    pub movement_pattern: MovementPattern,
    #[serde(default)]
    pub concentration: Option<f64>,
    #[serde(default)]
    pub motility: Option<f64>,
    #[serde(default)]
    pub total_motile_count: Option<f64>,
    #[serde(default)]
    pub morphology: Option<Morphology>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Uploading,
    Processing,
    Analyzing,
    Complete,
}

/// Transient snapshot of one in-flight analysis run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisProgress {
    pub stage: ProgressStage,
    /// Percentage in [0, 100], non-decreasing within one run.
    pub progress: u8,
    pub message: String,
}

/// A user-supplied video file awaiting analysis.
#[derive(Debug, Clone)]
pub struct SampleFile {
    pub filename: String,
    pub content_type: String,
    pub data: bytes::Bytes,
}

impl SampleFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

// API response types

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub backend_mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_analysis_accepts_sparse_payload() {
        let payload = serde_json::json!({
            "spermCount": 42,
            "speedAvg": 24.5,
            "movementPattern": {
                "progressive": 55.0,
                "nonProgressive": 30.0,
                "immobile": 15.0
            }
        });

        let raw: RawAnalysis = serde_json::from_value(payload).unwrap();
        assert_eq!(raw.sperm_count, 42);
        assert!(raw.id.is_none());
        assert!(raw.timestamp.is_none());
        assert!(raw.concentration.is_none());
        assert!(raw.morphology.is_none());
    }

    #[test]
    fn test_progress_stage_serializes_lowercase() {
        let progress = AnalysisProgress {
            stage: ProgressStage::Uploading,
            progress: 0,
            message: "Uploading sample video".to_string(),
        };
        let value = serde_json::to_value(&progress).unwrap();
        assert_eq!(value["stage"], "uploading");
    }
}

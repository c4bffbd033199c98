// Offline substitute backend
//
// Selected when the analysis backend is unconfigured. Both operations are
// satisfied locally, with no network traffic; analysis values are drawn
// uniformly from bounded ranges that mirror plausible lab readings.

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::gateway::{AnalysisBackend, UploadedSample};
use crate::models::{Morphology, MovementPattern, RawAnalysis, SampleFile};
use crate::types::AppResult;

pub struct OfflineBackend;

impl OfflineBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisBackend for OfflineBackend {
    async fn upload_sample(&self, file: &SampleFile) -> AppResult<UploadedSample> {
        debug!(filename = %file.filename, "Offline mode: simulating video upload");
        Ok(UploadedSample {
            public_url: format!("offline://{}", file.filename),
            file_path: format!("offline/{}", file.filename),
        })
    }

    async fn analyze_sample(&self, video_url: &str) -> AppResult<RawAnalysis> {
        debug!(video_url = %video_url, "Offline mode: simulating video analysis");
        let mut rng = rand::thread_rng();

        Ok(RawAnalysis {
            id: None,
            timestamp: None,
            filename: None,
            sperm_count: rng.gen_range(20..70),
            speed_avg: rng.gen_range(15..45) as f64,
            movement_pattern: MovementPattern {
                progressive: rng.gen_range(30..70) as f64,
                non_progressive: rng.gen_range(20..50) as f64,
                immobile: rng.gen_range(10..30) as f64,
            },
            concentration: Some(rng.gen_range(20..100) as f64),
            motility: Some(rng.gen_range(40..80) as f64),
            total_motile_count: Some(rng.gen_range(50..150) as f64),
            morphology: Some(Morphology {
                normal: rng.gen_range(60..90) as f64,
                abnormal: rng.gen_range(10..50) as f64,
            }),
            processing_time: Some(12.0),
        })
    }

    fn mode(&self) -> &'static str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> SampleFile {
        SampleFile {
            filename: "sample.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            data: bytes::Bytes::from_static(b"frames"),
        }
    }

    #[tokio::test]
    async fn test_upload_echoes_filename() {
        let backend = OfflineBackend::new();
        let uploaded = backend.upload_sample(&sample_file()).await.unwrap();
        assert_eq!(uploaded.public_url, "offline://sample.mp4");
        assert_eq!(uploaded.file_path, "offline/sample.mp4");
    }

    #[tokio::test]
    async fn test_analysis_values_stay_within_bounds() {
        let backend = OfflineBackend::new();

        for _ in 0..200 {
            let raw = backend.analyze_sample("offline://sample.mp4").await.unwrap();

            assert!((20..70).contains(&raw.sperm_count));
            assert!((15.0..45.0).contains(&raw.speed_avg));
            assert!((30.0..70.0).contains(&raw.movement_pattern.progressive));
            assert!((20.0..50.0).contains(&raw.movement_pattern.non_progressive));
            assert!((10.0..30.0).contains(&raw.movement_pattern.immobile));
            assert!((20.0..100.0).contains(&raw.concentration.unwrap()));
            assert!((40.0..80.0).contains(&raw.motility.unwrap()));
            assert!((50.0..150.0).contains(&raw.total_motile_count.unwrap()));

            let morphology = raw.morphology.unwrap();
            assert!((60.0..90.0).contains(&morphology.normal));
            assert!((10.0..50.0).contains(&morphology.abnormal));
            assert!((0.0..=100.0).contains(&morphology.normal));

            assert_eq!(raw.processing_time, Some(12.0));
        }
    }
}

//! Upload Workflow Controller
//!
//! Drives one analysis run from a validated file to a finished
//! [`AnalysisResult`]: validate, upload, analyze, in strict sequence. The
//! analyze call never starts before the upload resolves, and it receives
//! exactly the URL the upload returned. Progress snapshots are emitted at
//! stage boundaries and are non-decreasing within a run; the emitter
//! enforces that, not the caller.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::gateway::AnalysisBackend;
use crate::models::{AnalysisProgress, AnalysisResult, ProgressStage, SampleFile};
use crate::types::{AppError, AppResult};

const PROGRESS_UPLOAD_START: u8 = 0;
const PROGRESS_UPLOAD_DONE: u8 = 30;
const PROGRESS_PROCESSING: u8 = 50;
const PROGRESS_ANALYZING: u8 = 80;
const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected,
    Uploading,
    Processing,
    Analyzing,
    Complete,
    Failed,
}

pub struct UploadWorkflow {
    backend: Arc<dyn AnalysisBackend>,
    max_upload_bytes: u64,
    state: WorkflowState,
    file: Option<SampleFile>,
    last_progress: Option<AnalysisProgress>,
    events: mpsc::UnboundedSender<AnalysisProgress>,
}

impl UploadWorkflow {
    /// Create a controller plus the receiving end of its progress stream.
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        max_upload_bytes: u64,
    ) -> (Self, mpsc::UnboundedReceiver<AnalysisProgress>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let workflow = Self {
            backend,
            max_upload_bytes,
            state: WorkflowState::Idle,
            file: None,
            last_progress: None,
            events,
        };
        (workflow, receiver)
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Current progress snapshot of the in-flight run, if any.
    pub fn progress(&self) -> Option<&AnalysisProgress> {
        self.last_progress.as_ref()
    }

    /// Validate a file and make it the current selection.
    ///
    /// Rejects non-video media types and files above the size limit before
    /// any gateway call. A valid file replaces the previous selection.
    pub fn select_file(&mut self, file: SampleFile) -> AppResult<()> {
        let media_type: mime::Mime = file
            .content_type
            .parse()
            .map_err(|_| AppError::InvalidFileType(file.content_type.clone()))?;
        if media_type.type_() != mime::VIDEO {
            return Err(AppError::InvalidFileType(file.content_type.clone()));
        }

        if file.size() > self.max_upload_bytes {
            return Err(AppError::FileTooLarge {
                size: file.size(),
                limit: self.max_upload_bytes,
            });
        }

        info!(filename = %file.filename, size = file.size(), "Sample file selected");
        self.file = Some(file);
        self.state = WorkflowState::FileSelected;
        Ok(())
    }

    /// Run one analysis: upload, then analyze, emitting staged progress.
    ///
    /// Requires a selected file; the same file may be resubmitted after a
    /// failure without re-selecting. The finished result is yielded exactly
    /// once, and the caller owns it from then on.
    pub async fn start(&mut self) -> AppResult<AnalysisResult> {
        if !matches!(self.state, WorkflowState::FileSelected | WorkflowState::Failed) {
            return Err(AppError::InvalidRequest(
                "no file selected for analysis".to_string(),
            ));
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("no file selected for analysis".to_string()))?;

        self.state = WorkflowState::Uploading;
        self.emit(ProgressStage::Uploading, PROGRESS_UPLOAD_START, "Uploading sample video...");

        let uploaded = match self.backend.upload_sample(&file).await {
            Ok(uploaded) => uploaded,
            Err(err) => return Err(self.fail(err)),
        };
        self.emit(ProgressStage::Uploading, PROGRESS_UPLOAD_DONE, "Upload complete");

        self.state = WorkflowState::Processing;
        self.emit(ProgressStage::Processing, PROGRESS_PROCESSING, "Processing video...");

        self.state = WorkflowState::Analyzing;
        self.emit(ProgressStage::Analyzing, PROGRESS_ANALYZING, "Analyzing sperm motility...");

        let raw = match self.backend.analyze_sample(&uploaded.public_url).await {
            Ok(raw) => raw,
            Err(err) => return Err(self.fail(err)),
        };

        self.state = WorkflowState::Complete;
        self.emit(ProgressStage::Complete, PROGRESS_COMPLETE, "Analysis complete!");

        // Fill the fields the backend may omit; the filename falls back to
        // the original selection.
        let result = AnalysisResult {
            id: raw
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            timestamp: raw.timestamp.unwrap_or_else(chrono::Utc::now),
            filename: raw.filename.unwrap_or(file.filename),
            sperm_count: raw.sperm_count,
            speed_avg: raw.speed_avg,
            movement_pattern: raw.movement_pattern,
            concentration: raw.concentration,
            motility: raw.motility,
            total_motile_count: raw.total_motile_count,
            morphology: raw.morphology,
            video_url: Some(uploaded.public_url),
            processing_time: raw.processing_time,
        };

        info!(id = %result.id, filename = %result.filename, "Analysis run complete");
        Ok(result)
    }

    /// Leave a terminal state: Complete returns to Idle, Failed returns to
    /// FileSelected so the same file can be resubmitted.
    pub fn acknowledge(&mut self) {
        match self.state {
            WorkflowState::Complete => {
                self.file = None;
                self.last_progress = None;
                self.state = WorkflowState::Idle;
            }
            WorkflowState::Failed => {
                self.state = if self.file.is_some() {
                    WorkflowState::FileSelected
                } else {
                    WorkflowState::Idle
                };
            }
            _ => {}
        }
    }

    /// Clear the selected file and progress regardless of current state.
    pub fn reset(&mut self) {
        self.file = None;
        self.last_progress = None;
        self.state = WorkflowState::Idle;
    }

    fn emit(&mut self, stage: ProgressStage, progress: u8, message: &str) {
        // Snapshots never move backwards within a run.
        let floor = self.last_progress.as_ref().map_or(0, |p| p.progress);
        let snapshot = AnalysisProgress {
            stage,
            progress: progress.max(floor),
            message: message.to_string(),
        };
        self.last_progress = Some(snapshot.clone());
        // The receiver may be gone when nobody observes progress.
        let _ = self.events.send(snapshot);
    }

    fn fail(&mut self, err: AppError) -> AppError {
        error!(error = %err, "Analysis run failed");
        self.last_progress = None;
        self.state = WorkflowState::Failed;
        err
    }
}

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::AnalysisResult;

/// Session-scoped store of completed analyses, newest first.
///
/// Results are immutable once appended; the only mutation the registry
/// supports besides append is removal by id.
#[derive(Clone, Default)]
pub struct HistoryRegistry {
    inner: Arc<RwLock<Vec<AnalysisResult>>>,
}

impl HistoryRegistry {
    pub async fn append(&self, result: AnalysisResult) {
        let mut guard = self.inner.write().await;
        guard.insert(0, result);
    }

    pub async fn list(&self) -> Vec<AnalysisResult> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    pub async fn get(&self, id: &str) -> Option<AnalysisResult> {
        let guard = self.inner.read().await;
        guard.iter().find(|r| r.id == id).cloned()
    }

    /// Remove one result by id. Returns false when no such result exists.
    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|r| r.id != id);
        guard.len() < before
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

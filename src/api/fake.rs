//! In-memory [`ReviewApi`] for unit tests.
//!
//! Behaves like the backend for the calls the workspace makes: deletions and
//! restores mutate the stored lists, overrides replace the interval counts.
//! Any operation can be forced to fail by name.

use std::collections::VecDeque;
use std::sync::Mutex;

use review::consts::INTERVAL_COUNT;
use review::{DetectedItem, ItemId, ItemKind, Metrics};
use serde_json::json;

use super::types::{CaseSummary, Detections, FileInfo, Job, PaloObjects, ProcessingStatus, ReprocessResponse};
use super::{CaseId, ReviewApi};
use crate::error::ApiError;

pub(crate) struct FakeState {
    pub file_url: String,
    pub palos: Vec<DetectedItem>,
    pub marks: Vec<DetectedItem>,
    pub scale_mm_per_px: Option<f64>,
    pub metrics: Metrics,
    pub jobs: VecDeque<Result<Job, ApiError>>,
    pub failing: Vec<&'static str>,
    pub calls: Vec<String>,
    pub saved_overrides: Vec<[i64; INTERVAL_COUNT]>,
}

pub(crate) struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    /// 12 palos laid out 25 px apart and 5 marks, counts `[10, 12, 9, 11, 8]`.
    pub fn new() -> Self {
        let palos = (1..=12)
            .map(|i: i64| DetectedItem::new(i, [100.0 + 25.0 * i as f64, 300.0, 6.0, 40.0]))
            .collect();
        let marks = (1..=5)
            .map(|i: i64| DetectedItem::new(format!("mark_{i}").as_str(), [200.0 * i as f64, 750.0, 30.0, 8.0]))
            .collect();
        Self {
            state: Mutex::new(FakeState {
                file_url: "http://files.test/sheet-42.png".into(),
                palos,
                marks,
                scale_mm_per_px: Some(0.0847),
                metrics: metrics_with_counts([10, 12, 9, 11, 8]),
                jobs: VecDeque::new(),
                failing: Vec::new(),
                calls: Vec::new(),
                saved_overrides: Vec::new(),
            }),
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.push(operation);
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn push_job(&self, job: Result<Job, ApiError>) {
        self.state.lock().unwrap().jobs.push_back(job);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_owned());
        if state.failing.contains(&operation) {
            return Err(ApiError::Network("connection refused".into()));
        }
        Ok(state)
    }
}

pub(crate) fn metrics_with_counts(counts: [i64; INTERVAL_COUNT]) -> Metrics {
    serde_json::from_value(json!({
        "total_count": counts.iter().sum::<i64>(),
        "by_interval": { "counts": counts },
        "stats": { "nor": 4.2, "tremor_suggested": false },
        "confidence_level": "High"
    }))
    .unwrap()
}

pub(crate) fn job(status: ProcessingStatus, progress: i64) -> Job {
    Job {
        id: 1,
        case_id: 42,
        status,
        progress,
        current_step: None,
        error_message: None,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait::async_trait]
impl ReviewApi for FakeApi {
    async fn file_info(&self, _case_id: CaseId) -> Result<FileInfo, ApiError> {
        let state = self.enter("file")?;
        Ok(FileInfo { url: state.file_url.clone() })
    }

    async fn detections(&self, _case_id: CaseId) -> Result<Detections, ApiError> {
        let state = self.enter("detections")?;
        Ok(Detections {
            palo_objects: PaloObjects { palos: Some(state.palos.clone()), marks: Some(state.marks.clone()) },
            scale_mm_per_px: state.scale_mm_per_px,
        })
    }

    async fn metrics(&self, _case_id: CaseId) -> Result<Metrics, ApiError> {
        let state = self.enter("metrics")?;
        Ok(state.metrics.clone())
    }

    async fn delete_item(&self, _case_id: CaseId, item_id: &ItemId, kind: ItemKind) -> Result<(), ApiError> {
        let mut state = self.enter("delete")?;
        let list = match kind {
            ItemKind::Palo => &mut state.palos,
            ItemKind::Mark => &mut state.marks,
        };
        let before = list.len();
        list.retain(|item| &item.id != item_id);
        if list.len() == before {
            return Err(ApiError::Backend { status: 404, detail: Some("Item not found".into()) });
        }
        Ok(())
    }

    async fn restore_item(&self, _case_id: CaseId, item: &DetectedItem, kind: ItemKind) -> Result<(), ApiError> {
        let mut state = self.enter("restore")?;
        match kind {
            ItemKind::Palo => state.palos.push(item.clone()),
            ItemKind::Mark => state.marks.push(item.clone()),
        }
        Ok(())
    }

    async fn save_overrides(&self, _case_id: CaseId, counts: [i64; INTERVAL_COUNT]) -> Result<(), ApiError> {
        let mut state = self.enter("overrides")?;
        state.saved_overrides.push(counts);
        state.metrics = metrics_with_counts(counts);
        Ok(())
    }

    async fn reprocess(&self, _case_id: CaseId) -> Result<ReprocessResponse, ApiError> {
        let _state = self.enter("reprocess")?;
        Ok(ReprocessResponse { status: "reprocessing".into(), job_id: Some(2) })
    }

    async fn latest_job(&self, _case_id: CaseId) -> Result<Job, ApiError> {
        let mut state = self.enter("job")?;
        state
            .jobs
            .pop_front()
            .unwrap_or(Ok(job(ProcessingStatus::Done, 100)))
    }

    async fn list_cases(&self) -> Result<Vec<CaseSummary>, ApiError> {
        let _state = self.enter("cases")?;
        Ok(vec![CaseSummary {
            id: 42,
            patient_code: "P-042".into(),
            status: ProcessingStatus::Done,
            created_at: None,
        }])
    }

    async fn approve_dataset(&self, _case_id: CaseId) -> Result<String, ApiError> {
        let _state = self.enter("approve")?;
        Ok("Case approved for the dataset.".into())
    }
}

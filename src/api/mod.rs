//! Backend API surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ReviewApi` is the seam between the review controller and the backend.
//! `http::HttpApi` is the production implementation; tests substitute an
//! in-memory fake. `types` holds the wire schema.

#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod types;

use review::consts::INTERVAL_COUNT;
use review::{DetectedItem, ItemId, ItemKind, Metrics};

use crate::error::ApiError;
pub use http::HttpApi;
use types::{CaseSummary, Detections, FileInfo, Job, ReprocessResponse};

/// Backend case identifier.
pub type CaseId = i64;

/// Backend operations used by the review client. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ReviewApi: Send + Sync {
    /// `GET /cases/{id}/file`
    async fn file_info(&self, case_id: CaseId) -> Result<FileInfo, ApiError>;

    /// `GET /cases/{id}/detections`
    async fn detections(&self, case_id: CaseId) -> Result<Detections, ApiError>;

    /// `GET /cases/{id}/metrics`
    async fn metrics(&self, case_id: CaseId) -> Result<Metrics, ApiError>;

    /// `DELETE /cases/{id}/detections/items/{item_id}?type=palo|mark`
    async fn delete_item(&self, case_id: CaseId, item_id: &ItemId, kind: ItemKind) -> Result<(), ApiError>;

    /// `POST /cases/{id}/detections/items?type=palo|mark` with the item as body.
    async fn restore_item(&self, case_id: CaseId, item: &DetectedItem, kind: ItemKind) -> Result<(), ApiError>;

    /// `PUT /cases/{id}/metrics/overrides` with `{"counts": [..5]}`.
    async fn save_overrides(&self, case_id: CaseId, counts: [i64; INTERVAL_COUNT]) -> Result<(), ApiError>;

    /// `POST /cases/{id}/reprocess`
    async fn reprocess(&self, case_id: CaseId) -> Result<ReprocessResponse, ApiError>;

    /// `GET /cases/{id}/jobs/latest`
    async fn latest_job(&self, case_id: CaseId) -> Result<Job, ApiError>;

    /// `GET /cases`
    async fn list_cases(&self) -> Result<Vec<CaseSummary>, ApiError>;

    /// `POST /cases/{id}/dataset-approve`, returning the backend's message.
    async fn approve_dataset(&self, case_id: CaseId) -> Result<String, ApiError>;
}

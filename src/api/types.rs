//! Wire schema for backend responses.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use review::DetectedItem;
use serde::{Deserialize, Serialize};

/// `GET /cases/{id}/file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub url: String,
}

/// `GET /cases/{id}/detections`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    #[serde(default)]
    pub palo_objects: PaloObjects,
    #[serde(default)]
    pub scale_mm_per_px: Option<f64>,
}

/// Both item lists; either may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaloObjects {
    #[serde(default)]
    pub palos: Option<Vec<DetectedItem>>,
    #[serde(default)]
    pub marks: Option<Vec<DetectedItem>>,
}

impl Detections {
    /// Split into `(palos, marks)`, treating missing lists as empty.
    #[must_use]
    pub fn into_lists(self) -> (Vec<DetectedItem>, Vec<DetectedItem>) {
        (
            self.palo_objects.palos.unwrap_or_default(),
            self.palo_objects.marks.unwrap_or_default(),
        )
    }
}

/// Processing status shared by cases and jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Queued,
    Processing,
    Done,
    Failed,
    /// Any status this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl ProcessingStatus {
    /// Whether polling should stop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        })
    }
}

/// `GET /cases/{id}/jobs/latest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub case_id: i64,
    pub status: ProcessingStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One row of `GET /cases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: i64,
    pub patient_code: String,
    pub status: ProcessingStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `POST /cases/{id}/reprocess`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprocessResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub job_id: Option<i64>,
}

/// `POST /cases/{id}/dataset-approve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `PUT /cases/{id}/metrics/overrides` body.
#[derive(Debug, Serialize)]
pub(crate) struct OverridesRequest<'a> {
    pub counts: &'a [i64],
}

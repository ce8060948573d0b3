//! Async review controller for one case.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ReviewWorkspace` owns a [`ReviewCore`] and a [`ReviewApi`]. Input goes to
//! the core first; the core answers with an [`Action`] and the controller
//! performs the matching backend call. Local state changes only after the
//! backend confirms, then the case is re-fetched so the view matches the
//! backend.
//!
//! ERROR HANDLING
//! ==============
//! Every failed call is logged and raises an error notification. The error is
//! also returned so one-shot callers can exit non-zero; an interactive caller
//! just keeps going. Nothing is retried.

#[cfg(test)]
#[path = "workspace_test.rs"]
mod workspace_test;

use std::sync::Arc;
use std::time::{Duration, Instant};

use review::consts::INTERVAL_COUNT;
use review::geometry::Point;
use review::input::{Key, Modifiers};
use review::{Action, ItemId, ItemKind, ReviewCore};

use crate::api::{CaseId, ReviewApi};
use crate::error::ApiError;
use crate::notify::{Notification, Notifier};
use crate::poll::{JobPoller, spawn_job_poller};

/// Which pieces of a load failed, with their errors.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<(&'static str, ApiError)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consume the report, yielding the first failure if any.
    ///
    /// # Errors
    ///
    /// Returns the first failed piece's error.
    pub fn into_result(self) -> Result<(), ApiError> {
        match self.failures.into_iter().next() {
            Some((_, e)) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct ReviewWorkspace<A: ReviewApi + ?Sized> {
    api: Arc<A>,
    case_id: CaseId,
    core: ReviewCore,
    notifier: Notifier,
    poll_interval: Duration,
}

impl<A: ReviewApi + ?Sized + 'static> ReviewWorkspace<A> {
    #[must_use]
    pub fn new(api: Arc<A>, case_id: CaseId, poll_interval: Duration) -> Self {
        Self {
            api,
            case_id,
            core: ReviewCore::new(case_id.to_string()),
            notifier: Notifier::new(),
            poll_interval,
        }
    }

    #[must_use]
    pub fn case_id(&self) -> CaseId {
        self.case_id
    }

    #[must_use]
    pub fn core(&self) -> &ReviewCore {
        &self.core
    }

    /// Direct access for purely local toggles (edit mode, overlay, calibration arming).
    pub fn core_mut(&mut self) -> &mut ReviewCore {
        &mut self.core
    }

    /// The notification visible right now.
    pub fn notification(&mut self) -> Option<&Notification> {
        self.notifier.current(Instant::now())
    }

    /// Remove and return the visible notification.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notifier.take(Instant::now())
    }

    // --- Loading ---

    /// Fetch the image URL, detections and metrics concurrently.
    ///
    /// Each piece that arrives replaces its local counterpart; a failed piece
    /// leaves the previous value in place.
    pub async fn load(&mut self) -> LoadReport {
        let (file, detections, metrics) = tokio::join!(
            self.api.file_info(self.case_id),
            self.api.detections(self.case_id),
            self.api.metrics(self.case_id),
        );
        let mut report = LoadReport::default();

        match file {
            Ok(file) => self.core.apply_file(file.url),
            Err(e) => report.failures.push(("file", e)),
        }
        match detections {
            Ok(detections) => {
                let scale = detections.scale_mm_per_px;
                let (palos, marks) = detections.into_lists();
                self.core.apply_detections(palos, marks, scale);
            }
            Err(e) => report.failures.push(("detections", e)),
        }
        match metrics {
            Ok(metrics) => self.core.apply_metrics(metrics),
            Err(e) => report.failures.push(("metrics", e)),
        }

        for (piece, e) in &report.failures {
            tracing::error!(case_id = self.case_id, piece, error = %e, "case data fetch failed");
        }
        if let Some((_, e)) = report.failures.first() {
            self.notifier.error(e.user_message(), Instant::now());
        } else {
            tracing::info!(
                case_id = self.case_id,
                palos = self.core.items().len(ItemKind::Palo),
                marks = self.core.items().len(ItemKind::Mark),
                "case data loaded"
            );
        }
        report
    }

    // --- Mutations ---

    /// Delete an item on the backend, then make it undoable and re-fetch.
    ///
    /// Returns `Ok(false)` when no such item is loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged in that case.
    pub async fn delete(&mut self, id: &ItemId, kind: ItemKind) -> Result<bool, ApiError> {
        let Some(item) = self.core.item(id, kind).cloned() else {
            tracing::debug!(case_id = self.case_id, item_id = %id, %kind, "delete ignored: item not loaded");
            return Ok(false);
        };
        if let Err(e) = self.api.delete_item(self.case_id, id, kind).await {
            return Err(self.fail("delete item", e));
        }
        self.core.record_delete(item, kind);
        self.notifier.item_success(format!("{} removed.", kind.label()), Instant::now());
        self.refetch().await;
        Ok(true)
    }

    /// Restore the most recent deletion. Returns `Ok(false)` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the undo entry stays on the stack.
    pub async fn undo(&mut self) -> Result<bool, ApiError> {
        let Some(pending) = self.core.pending_undo().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self
            .api
            .restore_item(self.case_id, pending.item(), pending.kind())
            .await
        {
            return Err(self.fail("undo delete", e));
        }
        self.core.complete_undo();
        self.notifier.item_success("Deletion undone.", Instant::now());
        self.refetch().await;
        Ok(true)
    }

    /// Update one override field from free-form input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] outside override mode or for a bad index.
    pub fn set_override(&mut self, index: usize, raw: &str) -> Result<(), ApiError> {
        Ok(self.core.set_override(index, raw)?)
    }

    /// Send the current override counts and leave override mode.
    ///
    /// # Errors
    ///
    /// Returns the backend error; override mode stays active.
    pub async fn save_overrides(&mut self) -> Result<(), ApiError> {
        let counts = self.core.override_counts();
        if let Err(e) = self.api.save_overrides(self.case_id, counts).await {
            return Err(self.fail("save overrides", e));
        }
        self.core.finish_override();
        self.notifier.success("Interval counts saved.", Instant::now());
        self.refetch().await;
        Ok(())
    }

    /// Replace all interval counts in one step.
    ///
    /// # Errors
    ///
    /// See [`ReviewWorkspace::save_overrides`].
    pub async fn override_counts(&mut self, counts: [i64; INTERVAL_COUNT]) -> Result<(), ApiError> {
        self.core.begin_override();
        for (index, value) in counts.into_iter().enumerate() {
            self.core.set_override_value(index, value)?;
        }
        self.save_overrides().await
    }

    /// Ask the backend to discard edits and rerun detection.
    ///
    /// Without confirmation nothing is sent and `Ok(None)` is returned. On
    /// success local edits (undo history, override and calibration state) are
    /// dropped and the returned poller follows the new job.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn reprocess(&mut self, confirmed: bool) -> Result<Option<JobPoller>, ApiError> {
        if !confirmed {
            tracing::info!(case_id = self.case_id, "reprocess not confirmed");
            return Ok(None);
        }
        match self.api.reprocess(self.case_id).await {
            Ok(response) => {
                tracing::info!(case_id = self.case_id, job_id = ?response.job_id, status = %response.status, "reprocess started");
                self.core.reset_edits();
                self.notifier.success("Reprocessing started.", Instant::now());
                Ok(Some(self.watch_job()))
            }
            Err(e) => Err(self.fail("reprocess", e)),
        }
    }

    /// Poll this case's latest job.
    #[must_use]
    pub fn watch_job(&self) -> JobPoller {
        spawn_job_poller(Arc::clone(&self.api), self.case_id, self.poll_interval)
    }

    /// Mark the case as approved for the training dataset.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn approve_dataset(&mut self) -> Result<String, ApiError> {
        match self.api.approve_dataset(self.case_id).await {
            Ok(message) => {
                self.notifier.success(message.clone(), Instant::now());
                Ok(message)
            }
            Err(e) => Err(self.fail("approve dataset", e)),
        }
    }

    // --- Input ---

    /// Route a click through the core and perform what it asks for.
    ///
    /// # Errors
    ///
    /// Returns the backend error of a requested deletion.
    pub async fn click(&mut self, pt: Point) -> Result<Action, ApiError> {
        let action = self.core.on_click(pt);
        match &action {
            Action::DeleteRequested { id, kind } => {
                self.delete(id, *kind).await?;
            }
            Action::Calibrated { mm_per_px } => {
                tracing::info!(case_id = self.case_id, mm_per_px, "manual calibration");
                self.notifier
                    .success(format!("Calibrated: {mm_per_px:.4} mm/px"), Instant::now());
            }
            Action::CalibrationRejected => {
                self.notifier
                    .error("Calibration points coincide; click two distinct points.", Instant::now());
            }
            Action::None
            | Action::UndoRequested
            | Action::CalibrationPoint(_)
            | Action::CalibrationCancelled => {}
        }
        Ok(action)
    }

    /// Route a key press through the core and perform what it asks for.
    ///
    /// # Errors
    ///
    /// Returns the backend error of a requested undo.
    pub async fn key(&mut self, key: &Key, modifiers: Modifiers) -> Result<Action, ApiError> {
        let action = self.core.on_key(key, modifiers);
        if action == Action::UndoRequested {
            self.undo().await?;
        }
        Ok(action)
    }

    // --- Helpers ---

    async fn refetch(&mut self) {
        let report = self.load().await;
        if !report.is_complete() {
            tracing::warn!(case_id = self.case_id, failed = report.failures.len(), "refetch incomplete");
        }
    }

    fn fail(&mut self, operation: &'static str, e: ApiError) -> ApiError {
        tracing::error!(case_id = self.case_id, operation, error = %e, "backend call failed");
        self.notifier.error(e.user_message(), Instant::now());
        e
    }
}

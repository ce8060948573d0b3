//! The review workspace for one case.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ReviewCore` is the local projection of a case under review. The host loads
//! backend data into it, forwards clicks and key presses, and acts on the
//! returned [`Action`]s (issuing the backend call, then confirming the result
//! back through `record_delete` / `complete_undo`). Nothing here blocks or
//! performs IO, so overlapping host requests can only race at the backend.

#[cfg(test)]
#[path = "workspace_test.rs"]
mod workspace_test;

use crate::calibration::{Calibration, CalibrationStep};
use crate::consts::INTERVAL_COUNT;
use crate::error::ReviewError;
use crate::geometry::Point;
use crate::input::{Key, Modifiers};
use crate::item::{DetectedItem, ItemId, ItemKind, ItemSet};
use crate::metrics::Metrics;
use crate::overlay;
use crate::overrides::OverrideEditor;
use crate::undo::{UndoAction, UndoStack};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    /// The reviewer clicked an item in edit mode; the host should delete it.
    DeleteRequested { id: ItemId, kind: ItemKind },
    /// The undo shortcut was pressed.
    UndoRequested,
    /// First calibration point captured.
    CalibrationPoint(Point),
    /// Second calibration point captured and a scale derived.
    Calibrated { mm_per_px: f64 },
    /// Calibration points coincided; calibration stays armed.
    CalibrationRejected,
    /// Calibration was disarmed without a result.
    CalibrationCancelled,
}

#[derive(Debug, Clone)]
pub struct ReviewCore {
    case_id: String,
    image_url: Option<String>,
    items: ItemSet,
    metrics: Option<Metrics>,
    backend_mm_per_px: Option<f64>,
    natural_width: f64,
    edit_mode: bool,
    show_overlay: bool,
    undo: UndoStack,
    calibration: Calibration,
    overrides: OverrideEditor,
}

impl ReviewCore {
    #[must_use]
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            image_url: None,
            items: ItemSet::default(),
            metrics: None,
            backend_mm_per_px: None,
            natural_width: 0.0,
            edit_mode: false,
            show_overlay: true,
            undo: UndoStack::new(),
            calibration: Calibration::new(),
            overrides: OverrideEditor::new(),
        }
    }

    // --- Data inputs ---

    /// Store the displayable image URL.
    pub fn apply_file(&mut self, url: String) {
        self.image_url = Some(url);
    }

    /// Replace both item lists with a fresh backend snapshot.
    pub fn apply_detections(&mut self, palos: Vec<DetectedItem>, marks: Vec<DetectedItem>, mm_per_px: Option<f64>) {
        self.items = ItemSet::new(palos, marks);
        self.backend_mm_per_px = mm_per_px;
    }

    /// Replace the metrics snapshot.
    ///
    /// Override counts follow the backend unless the reviewer is mid-edit, in
    /// which case only the value restored on cancel is updated.
    pub fn apply_metrics(&mut self, metrics: Metrics) {
        self.overrides.rebase(metrics.interval_counts());
        self.metrics = Some(metrics);
    }

    /// Record the rendered image's natural width for overlay scaling.
    pub fn set_natural_width(&mut self, width: f64) {
        self.natural_width = width;
    }

    // --- Toggles ---

    /// Flip edit mode, returning the new value.
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    /// Flip overlay visibility, returning the new value.
    pub fn toggle_overlay(&mut self) -> bool {
        self.show_overlay = !self.show_overlay;
        self.show_overlay
    }

    // --- Deletion / undo ---

    /// Confirm a backend deletion: drop the item locally and make it undoable.
    pub fn record_delete(&mut self, item: DetectedItem, kind: ItemKind) {
        self.items.remove(&item.id, kind);
        self.undo.push(UndoAction::Delete { item, kind });
    }

    /// The action the next undo would revert, if any.
    #[must_use]
    pub fn pending_undo(&self) -> Option<&UndoAction> {
        self.undo.peek()
    }

    /// Confirm a backend restore: pop the undo entry and put the item back locally.
    pub fn complete_undo(&mut self) -> Option<UndoAction> {
        let action = self.undo.pop()?;
        self.items.insert(action.item().clone(), action.kind());
        Some(action)
    }

    /// Forget everything the reviewer did locally.
    ///
    /// Used once the backend has discarded manual edits (reprocessing): undo
    /// entries would replay deletions into a new detection set, so they are
    /// dropped together with any open override or calibration.
    pub fn reset_edits(&mut self) {
        self.undo = UndoStack::new();
        self.overrides.cancel();
        self.calibration.cancel();
        self.edit_mode = false;
    }

    // --- Overrides ---

    pub fn begin_override(&mut self) {
        self.overrides.begin();
    }

    pub fn cancel_override(&mut self) {
        self.overrides.cancel();
    }

    /// # Errors
    ///
    /// Fails outside override mode or for an index past the last interval.
    pub fn set_override(&mut self, index: usize, raw: &str) -> Result<(), ReviewError> {
        self.overrides.set_from_input(index, raw)
    }

    /// Set one interval from an already-parsed value.
    ///
    /// # Errors
    ///
    /// Same as [`ReviewCore::set_override`].
    pub fn set_override_value(&mut self, index: usize, value: i64) -> Result<(), ReviewError> {
        self.overrides.set(index, value)
    }

    /// The counts a save would transmit.
    #[must_use]
    pub fn override_counts(&self) -> [i64; INTERVAL_COUNT] {
        self.overrides.counts()
    }

    /// Confirm a backend save and leave override mode.
    pub fn finish_override(&mut self) {
        self.overrides.finish();
    }

    // --- Calibration ---

    pub fn arm_calibration(&mut self) {
        self.calibration.arm();
    }

    // --- Input events ---

    /// Route a display-space click.
    ///
    /// With overlays shown and edit mode on, a click on an overlay requests its
    /// deletion and stops there. Every other click goes to calibration.
    pub fn on_click(&mut self, pt: Point) -> Action {
        if self.show_overlay && self.edit_mode {
            if let Some((item, kind)) = overlay::hit_test(&self.items, pt, self.display_scale()) {
                return Action::DeleteRequested { id: item.id.clone(), kind };
            }
        }
        match self.calibration.click(pt) {
            Ok(CalibrationStep::Ignored) => Action::None,
            Ok(CalibrationStep::FirstPoint(p)) => Action::CalibrationPoint(p),
            Ok(CalibrationStep::Calibrated { mm_per_px }) => Action::Calibrated { mm_per_px },
            Err(_) => Action::CalibrationRejected,
        }
    }

    /// Route a key press.
    pub fn on_key(&mut self, key: &Key, modifiers: Modifiers) -> Action {
        if key.is_undo(modifiers) {
            return Action::UndoRequested;
        }
        if key.is_escape() && self.calibration.is_armed() {
            self.calibration.cancel();
            return Action::CalibrationCancelled;
        }
        Action::None
    }

    // --- Queries ---

    #[must_use]
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// Look up an item by id within one list.
    #[must_use]
    pub fn item(&self, id: &ItemId, kind: ItemKind) -> Option<&DetectedItem> {
        self.items.find(id, kind)
    }

    #[must_use]
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Scale stored by the backend with the detections.
    #[must_use]
    pub fn backend_mm_per_px(&self) -> Option<f64> {
        self.backend_mm_per_px
    }

    /// Scale from the reviewer's manual calibration.
    #[must_use]
    pub fn manual_mm_per_px(&self) -> Option<f64> {
        self.calibration.mm_per_px()
    }

    #[must_use]
    pub fn display_scale(&self) -> f64 {
        overlay::display_scale(self.natural_width)
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.show_overlay
    }

    /// Whether overlays react to clicks.
    #[must_use]
    pub fn overlays_interactive(&self) -> bool {
        self.show_overlay && self.edit_mode
    }

    #[must_use]
    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_armed()
    }

    #[must_use]
    pub fn calibration_points(&self) -> &[Point] {
        self.calibration.points()
    }

    #[must_use]
    pub fn is_overriding(&self) -> bool {
        self.overrides.is_active()
    }

    /// Whether override edits differ from the last loaded counts.
    #[must_use]
    pub fn overrides_dirty(&self) -> bool {
        self.overrides.is_dirty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

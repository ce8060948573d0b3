//! Shared numeric constants for the review crate.

// ── Test layout ─────────────────────────────────────────────────

/// Number of timed intervals in one palográfico test sheet.
pub const INTERVAL_COUNT: usize = 5;

// ── Calibration ─────────────────────────────────────────────────

/// Real-world length of the reference segment marked during calibration (10 cm).
pub const CALIBRATION_REFERENCE_MM: f64 = 100.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Width, in display pixels, the scanned sheet is rendered at.
pub const DISPLAY_WIDTH_PX: f64 = 800.0;

/// Horizontal padding added on each side of an interval mark's box, in image pixels.
pub const MARK_PAD_X_PX: f64 = 8.0;

/// Vertical padding added on each side of an interval mark's box, in image pixels.
pub const MARK_PAD_Y_PX: f64 = 4.0;

// ── Notifications ───────────────────────────────────────────────

/// How long the confirmation for a deletion or an undo stays visible.
pub const ITEM_TOAST_MS: u64 = 2_000;

/// How long the confirmation for saved overrides and error toasts stay visible.
pub const LONG_TOAST_MS: u64 = 3_000;

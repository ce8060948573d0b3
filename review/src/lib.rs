//! Review workspace state for palográfico case correction.
//!
//! This crate holds everything the reviewer manipulates while correcting the
//! automated detections of one case: the detected strokes ("palos") and
//! interval marks, the edit/overlay toggles, the undo stack of deletions, the
//! two-click ruler calibration and the per-interval override counts. It does
//! no IO. The host (the `palografico` client) performs the backend calls and
//! feeds their results back in, acting on the [`workspace::Action`]s returned
//! from input handlers.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`workspace`] | Top-level [`workspace::ReviewCore`] and input routing |
//! | [`item`] | Detected items, their ids and kinds |
//! | [`metrics`] | Backend metrics snapshot |
//! | [`undo`] | LIFO stack of reversible deletions |
//! | [`calibration`] | Two-click ruler calibration |
//! | [`overrides`] | Manual per-interval count editor |
//! | [`overlay`] | Display scaling and overlay hit-testing |
//! | [`geometry`] | Points and rectangles |
//! | [`input`] | Keyboard keys and modifiers |
//! | [`consts`] | Shared numeric constants |
//! | [`error`] | Rejected state transitions |

pub mod calibration;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod input;
pub mod item;
pub mod metrics;
pub mod overlay;
pub mod overrides;
pub mod undo;
pub mod workspace;

pub use error::ReviewError;
pub use item::{DetectedItem, ItemId, ItemKind, ItemSet};
pub use metrics::Metrics;
pub use workspace::{Action, ReviewCore};

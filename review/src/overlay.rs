//! Overlay geometry: where each detected item is drawn over the sheet and
//! which item a display-space click lands on.
//!
//! The sheet is rendered at a fixed display width, so image-space boxes are
//! scaled by `DISPLAY_WIDTH_PX / natural_width`. Marks are drawn padded to stay
//! grabbable and are stacked above palos.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use crate::consts::{DISPLAY_WIDTH_PX, MARK_PAD_X_PX, MARK_PAD_Y_PX};
use crate::geometry::{Point, Rect};
use crate::item::{DetectedItem, ItemKind, ItemSet};

/// Image-to-display scale for a sheet of the given natural width.
///
/// Falls back to 1.0 for a non-positive width (image not loaded yet).
#[must_use]
pub fn display_scale(natural_width: f64) -> f64 {
    if natural_width > 0.0 { DISPLAY_WIDTH_PX / natural_width } else { 1.0 }
}

/// Display-space rectangle for one item.
#[must_use]
pub fn overlay_rect(item: &DetectedItem, kind: ItemKind, scale: f64) -> Rect {
    let rect = item.rect();
    let padded = match kind {
        ItemKind::Palo => rect,
        ItemKind::Mark => Rect::new(
            rect.x - MARK_PAD_X_PX,
            rect.y - MARK_PAD_Y_PX,
            rect.width + 2.0 * MARK_PAD_X_PX,
            rect.height + 2.0 * MARK_PAD_Y_PX,
        ),
    };
    padded.scaled(scale)
}

/// The topmost item under `pt`, if any.
///
/// Marks sit above palos; within a list later items sit above earlier ones.
#[must_use]
pub fn hit_test(items: &ItemSet, pt: Point, scale: f64) -> Option<(&DetectedItem, ItemKind)> {
    [ItemKind::Mark, ItemKind::Palo].into_iter().find_map(move |kind| {
        items
            .list(kind)
            .iter()
            .rev()
            .find(|item| overlay_rect(item, kind, scale).contains(pt))
            .map(|item| (item, kind))
    })
}

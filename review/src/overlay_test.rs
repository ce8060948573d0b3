#![allow(clippy::float_cmp)]

use super::*;
use crate::item::ItemId;

fn sample_set() -> ItemSet {
    ItemSet::new(
        vec![
            DetectedItem::new(1, [100.0, 100.0, 10.0, 40.0]),
            DetectedItem::new(2, [200.0, 100.0, 10.0, 40.0]),
        ],
        vec![DetectedItem::new("mark_1", [150.0, 100.0, 4.0, 40.0])],
    )
}

// =============================================================
// display_scale
// =============================================================

#[test]
fn display_scale_fits_sheet_to_display_width() {
    assert_eq!(display_scale(1600.0), 0.5);
    assert_eq!(display_scale(800.0), 1.0);
}

#[test]
fn display_scale_defaults_for_unknown_width() {
    assert_eq!(display_scale(0.0), 1.0);
    assert_eq!(display_scale(-5.0), 1.0);
}

// =============================================================
// overlay_rect
// =============================================================

#[test]
fn palo_rect_is_scaled_bbox() {
    let item = DetectedItem::new(1, [100.0, 50.0, 10.0, 40.0]);
    assert_eq!(overlay_rect(&item, ItemKind::Palo, 0.5), Rect::new(50.0, 25.0, 5.0, 20.0));
}

#[test]
fn mark_rect_is_padded_before_scaling() {
    let item = DetectedItem::new("m", [100.0, 50.0, 10.0, 40.0]);
    assert_eq!(overlay_rect(&item, ItemKind::Mark, 0.5), Rect::new(46.0, 23.0, 13.0, 24.0));
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_test_finds_palo() {
    let set = sample_set();
    let (item, kind) = hit_test(&set, Point::new(205.0, 120.0), 1.0).unwrap();
    assert_eq!(item.id, ItemId::Int(2));
    assert_eq!(kind, ItemKind::Palo);
}

#[test]
fn hit_test_uses_padded_mark_area() {
    let set = sample_set();
    let (item, kind) = hit_test(&set, Point::new(145.0, 98.0), 1.0).unwrap();
    assert_eq!(item.id, ItemId::from("mark_1"));
    assert_eq!(kind, ItemKind::Mark);
}

#[test]
fn hit_test_prefers_marks_over_palos() {
    let set = ItemSet::new(
        vec![DetectedItem::new(1, [0.0, 0.0, 50.0, 50.0])],
        vec![DetectedItem::new("m", [20.0, 20.0, 5.0, 5.0])],
    );
    let (_, kind) = hit_test(&set, Point::new(22.0, 22.0), 1.0).unwrap();
    assert_eq!(kind, ItemKind::Mark);
}

#[test]
fn hit_test_misses_empty_space() {
    let set = sample_set();
    assert!(hit_test(&set, Point::new(500.0, 500.0), 1.0).is_none());
}

#[test]
fn hit_test_respects_scale() {
    let set = sample_set();
    assert!(hit_test(&set, Point::new(205.0, 120.0), 0.5).is_none());
    assert!(hit_test(&set, Point::new(102.0, 60.0), 0.5).is_some());
}

#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::Size;
use crate::store::{PartialCanvasItem, SourceItem};

// =============================================================
// Helpers
// =============================================================

fn make_item() -> CanvasItem {
    let source = SourceItem { id: "pants".into(), name: None, image_url: Some("https://img/pants.png".into()) };
    CanvasItem::from_source(&source, "https://img/pants.png", Size::new(200.0, 100.0), Size::new(600.0, 800.0), 200.0)
}

/// Store with one 200x100 item at (100, 100), selected.
fn store_with_item() -> (ItemStore, ItemId) {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item());
    store.update_item(&id, &PartialCanvasItem::position(100.0, 100.0), true);
    (store, id)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// ResizeAnchor
// =============================================================

#[test]
fn anchor_edges_are_consistent() {
    for anchor in ResizeAnchor::ALL {
        assert!(!(anchor.moves_west() && anchor.moves_east()));
        assert!(!(anchor.moves_north() && anchor.moves_south()));
        let (ux, uy) = anchor.unit_position();
        assert_eq!(anchor.moves_west(), ux == 0.0);
        assert_eq!(anchor.moves_east(), ux == 1.0);
        assert_eq!(anchor.moves_north(), uy == 0.0);
        assert_eq!(anchor.moves_south(), uy == 1.0);
    }
}

#[test]
fn anchor_cursors() {
    assert_eq!(ResizeAnchor::N.cursor(), "ns-resize");
    assert_eq!(ResizeAnchor::W.cursor(), "ew-resize");
    assert_eq!(ResizeAnchor::Ne.cursor(), "nesw-resize");
    assert_eq!(ResizeAnchor::Se.cursor(), "nwse-resize");
}

// =============================================================
// Handle positions
// =============================================================

#[test]
fn handle_positions_unrotated() {
    let (store, id) = store_with_item();
    let item = store.get(&id).unwrap();
    assert_eq!(handle_position(item, ResizeAnchor::Nw), pt(100.0, 100.0));
    assert_eq!(handle_position(item, ResizeAnchor::Se), pt(300.0, 200.0));
    assert_eq!(handle_position(item, ResizeAnchor::E), pt(300.0, 150.0));
    assert_eq!(rotate_handle_position(item, 24.0), pt(200.0, 76.0));
}

#[test]
fn handle_positions_follow_rotation() {
    let (mut store, id) = store_with_item();
    store.update_item(&id, &PartialCanvasItem { rotation: Some(180.0), ..Default::default() }, true);
    let item = store.get(&id).unwrap();
    let nw = handle_position(item, ResizeAnchor::Nw);
    assert!((nw.x - 300.0).abs() < 1e-9);
    assert!((nw.y - 200.0).abs() < 1e-9);
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn empty_space_misses() {
    let (store, id) = store_with_item();
    assert!(hit_test(pt(20.0, 20.0), &store, 1.0, Some(id)).is_none());
}

#[test]
fn body_hit() {
    let (store, id) = store_with_item();
    let hit = hit_test(pt(200.0, 150.0), &store, 1.0, None).unwrap();
    assert_eq!(hit, Hit { item_id: id, part: HitPart::Body });
}

#[test]
fn handles_only_hit_when_selected() {
    let (store, id) = store_with_item();
    let hit = hit_test(pt(301.0, 201.0), &store, 1.0, Some(id)).unwrap();
    assert_eq!(hit.part, HitPart::ResizeHandle(ResizeAnchor::Se));
    assert!(hit_test(pt(303.0, 203.0), &store, 1.0, None).is_none());
}

#[test]
fn rotate_handle_hit() {
    let (store, id) = store_with_item();
    let hit = hit_test(pt(200.0, 77.0), &store, 1.0, Some(id)).unwrap();
    assert_eq!(hit.part, HitPart::RotateHandle);
}

#[test]
fn rotate_handle_offset_is_in_screen_pixels() {
    let (store, id) = store_with_item();
    // 24 screen px above the top edge: 12 canvas px at zoom 2.
    let zoomed = hit_test(pt(200.0, 88.0), &store, 2.0, Some(id)).map(|h| h.part);
    assert_eq!(zoomed, Some(HitPart::RotateHandle));
    assert!(hit_test(pt(200.0, 88.0), &store, 1.0, Some(id)).is_none());
    assert_eq!(rotate_handle_position(store.get(&id).unwrap(), screen_dist_to_canvas(24.0, 2.0)), pt(200.0, 88.0));
}

#[test]
fn handle_slop_shrinks_with_zoom() {
    let (store, id) = store_with_item();
    // 6 canvas px away: inside 8px slop at zoom 1, outside 4px slop at zoom 2.
    assert!(matches!(
        hit_test(pt(306.0, 150.0), &store, 1.0, Some(id)).map(|h| h.part),
        Some(HitPart::ResizeHandle(ResizeAnchor::E))
    ));
    assert!(hit_test(pt(306.0, 150.0), &store, 2.0, Some(id)).is_none());
}

#[test]
fn topmost_body_wins() {
    let (mut store, below) = store_with_item();
    let above = store.place_item(make_item());
    store.update_item(&above, &PartialCanvasItem::position(150.0, 120.0), true);
    let hit = hit_test(pt(200.0, 150.0), &store, 1.0, None).unwrap();
    assert_eq!(hit.item_id, above);
    let hit = hit_test(pt(120.0, 110.0), &store, 1.0, None).unwrap();
    assert_eq!(hit.item_id, below);
}

#[test]
fn hidden_items_are_not_hit() {
    let (mut store, id) = store_with_item();
    store.toggle_visible(&id);
    assert!(hit_test(pt(200.0, 150.0), &store, 1.0, Some(id)).is_none());
}

#[test]
fn rotated_body_uses_local_frame() {
    let (mut store, id) = store_with_item();
    store.update_item(&id, &PartialCanvasItem { rotation: Some(90.0), ..Default::default() }, true);
    let item = store.get(&id).unwrap();
    // Rotated 90 degrees the box spans x 150..250, y 50..250.
    assert!(body_contains(item, pt(200.0, 60.0)));
    assert!(!body_contains(item, pt(110.0, 150.0)));
}

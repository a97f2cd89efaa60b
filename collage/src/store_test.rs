#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Helpers
// =============================================================

fn source(id: &str) -> SourceItem {
    SourceItem { id: id.to_owned(), name: Some(format!("item {id}")), image_url: Some(format!("https://img/{id}.png")) }
}

fn make_item(z: i64) -> CanvasItem {
    let mut item = CanvasItem::from_source(
        &source("shirt"),
        "https://img/shirt.png",
        Size::new(400.0, 800.0),
        Size::new(600.0, 800.0),
        180.0,
    );
    item.z_index = z;
    item
}

/// Insert an item with an exact z-index, bypassing `place_item`'s stacking.
fn insert_with_z(store: &mut ItemStore, z: i64) -> ItemId {
    let id = store.place_item(make_item(0));
    store.update_item(&id, &PartialCanvasItem { z_index: Some(z), ..Default::default() }, true);
    id
}

fn z_of(store: &ItemStore, id: &ItemId) -> i64 {
    store.get(id).map(|item| item.z_index).unwrap()
}

// =============================================================
// CanvasItem::from_source
// =============================================================

#[test]
fn from_source_keeps_aspect_at_base_width() {
    let item = make_item(0);
    assert_eq!(item.width, 180.0);
    assert_eq!(item.height, 360.0);
}

#[test]
fn from_source_centers_on_canvas() {
    let item = make_item(0);
    assert_eq!(item.x, 210.0);
    assert_eq!(item.y, 220.0);
}

#[test]
fn from_source_defaults() {
    let item = make_item(0);
    assert_eq!(item.source_id, "shirt");
    assert_eq!(item.rotation, 0.0);
    assert_eq!(item.opacity, 1.0);
    assert!(item.visible);
    assert!(!item.locked);
    assert!(!item.flip_x && !item.flip_y);
    assert!(item.crop.is_none());
    assert_eq!(item.natural_size(), Size::new(400.0, 800.0));
}

#[test]
fn effective_crop_defaults_to_full_image() {
    let item = make_item(0);
    assert_eq!(item.effective_crop(), CropData { x: 0.0, y: 0.0, width: 400.0, height: 800.0 });
}

#[test]
fn crop_validity_checks_bounds_and_minimum() {
    let natural = Size::new(400.0, 800.0);
    assert!(CropData { x: 0.0, y: 0.0, width: 400.0, height: 800.0 }.is_valid_for(natural));
    assert!(!CropData { x: 360.0, y: 0.0, width: 50.0, height: 50.0 }.is_valid_for(natural));
    assert!(!CropData { x: 0.0, y: 0.0, width: 49.0, height: 100.0 }.is_valid_for(natural));
    assert!(!CropData { x: -1.0, y: 0.0, width: 100.0, height: 100.0 }.is_valid_for(natural));
}

#[test]
fn crop_validity_on_tiny_image_requires_full_cover() {
    let natural = Size::new(30.0, 40.0);
    assert!(CropData::full(natural).is_valid_for(natural));
    assert!(!CropData { x: 0.0, y: 0.0, width: 20.0, height: 40.0 }.is_valid_for(natural));
}

#[test]
fn canvas_item_serde_round_trip() {
    let mut item = make_item(3);
    item.crop = Some(CropData { x: 1.0, y: 2.0, width: 100.0, height: 120.0 });
    let json = serde_json::to_string(&item).unwrap();
    let back: CanvasItem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, item);
}

#[test]
fn source_item_tolerates_missing_optionals() {
    let src: SourceItem = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
    assert_eq!(src.id, "abc");
    assert!(src.name.is_none());
    assert!(src.image_url.is_none());
}

// =============================================================
// ItemStore: placement and queries
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = ItemStore::new();
    assert!(store.is_empty());
    assert!(store.selection().is_none());
    assert_eq!(store.max_z(), 0);
    assert_eq!(store.min_z(), 0);
    assert!(!store.can_undo());
}

#[test]
fn place_item_stacks_on_top_and_selects() {
    let mut store = ItemStore::new();
    let a = store.place_item(make_item(0));
    let b = store.place_item(make_item(0));
    assert_eq!(z_of(&store, &a), 1);
    assert_eq!(z_of(&store, &b), 2);
    assert_eq!(store.selection(), Some(b));
    assert_eq!(store.history().len(), 3);
}

#[test]
fn sorted_items_orders_by_z_stable() {
    let mut store = ItemStore::new();
    let a = insert_with_z(&mut store, 5);
    let b = insert_with_z(&mut store, 1);
    let c = insert_with_z(&mut store, 5);
    let order: Vec<ItemId> = store.sorted_items().iter().map(|item| item.unique_id).collect();
    assert_eq!(order, vec![b, a, c]);
}

#[test]
fn select_unknown_id_clears_selection() {
    let mut store = ItemStore::new();
    store.place_item(make_item(0));
    assert!(store.select(Some(Uuid::new_v4())));
    assert!(store.selection().is_none());
    assert!(!store.select(None));
}

// =============================================================
// ItemStore: update / remove / duplicate
// =============================================================

#[test]
fn update_without_commit_leaves_history_alone() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    let len = store.history().len();
    assert!(store.update_item(&id, &PartialCanvasItem::position(5.0, 6.0), false));
    assert_eq!(store.history().len(), len);
    assert_eq!(store.get(&id).unwrap().x, 5.0);
}

#[test]
fn update_unknown_item_returns_false() {
    let mut store = ItemStore::new();
    assert!(!store.update_item(&Uuid::new_v4(), &PartialCanvasItem::position(1.0, 1.0), true));
    assert_eq!(store.history().len(), 1);
}

#[test]
fn update_applies_only_present_fields() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.update_item(&id, &PartialCanvasItem { rotation: Some(45.0), ..Default::default() }, true);
    let item = store.get(&id).unwrap();
    assert_eq!(item.rotation, 45.0);
    assert_eq!(item.width, 180.0);
}

#[test]
fn crop_update_sets_and_clears() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    let crop = CropData { x: 10.0, y: 10.0, width: 100.0, height: 100.0 };
    store.update_item(&id, &PartialCanvasItem { crop: Some(CropUpdate::Set(crop)), ..Default::default() }, true);
    assert_eq!(store.get(&id).unwrap().crop, Some(crop));
    store.update_item(&id, &PartialCanvasItem { crop: Some(CropUpdate::Clear), ..Default::default() }, true);
    assert!(store.get(&id).unwrap().crop.is_none());
}

#[test]
fn remove_selected_item_clears_selection() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    let removed = store.remove_item(&id);
    assert_eq!(removed.map(|item| item.unique_id), Some(id));
    assert!(store.selection().is_none());
    assert!(store.is_empty());
}

#[test]
fn remove_unknown_item_is_none() {
    let mut store = ItemStore::new();
    assert!(store.remove_item(&Uuid::new_v4()).is_none());
}

#[test]
fn duplicate_offsets_and_stacks_on_top() {
    let mut store = ItemStore::new();
    let id = insert_with_z(&mut store, 3);
    store.update_item(&id, &PartialCanvasItem::position(100.0, 100.0), true);

    let copy_id = store.duplicate_item(&id).unwrap();
    let copy = store.get(&copy_id).unwrap();
    assert_ne!(copy_id, id);
    assert_eq!(copy.x, 120.0);
    assert_eq!(copy.y, 120.0);
    assert_eq!(copy.z_index, 4);
    assert_eq!(copy.source_id, "shirt");
    assert_eq!(store.selection(), Some(copy_id));
}

// =============================================================
// ItemStore: layering
// =============================================================

#[test]
fn bring_to_front_and_send_to_back() {
    let mut store = ItemStore::new();
    let a = insert_with_z(&mut store, 1);
    let b = insert_with_z(&mut store, 5);
    assert!(store.bring_to_front(&a));
    assert_eq!(z_of(&store, &a), 6);
    assert!(store.send_to_back(&a));
    assert_eq!(z_of(&store, &a), 4);
    assert!(z_of(&store, &a) < z_of(&store, &b));
}

#[test]
fn move_layer_up_swaps_with_nearest_above() {
    let mut store = ItemStore::new();
    let a = insert_with_z(&mut store, 1);
    let b = insert_with_z(&mut store, 5);
    let c = insert_with_z(&mut store, 9);
    assert!(store.move_layer_up(&a));
    assert_eq!(z_of(&store, &a), 5);
    assert_eq!(z_of(&store, &b), 1);
    assert_eq!(z_of(&store, &c), 9);
}

#[test]
fn move_layer_down_swaps_with_nearest_below() {
    let mut store = ItemStore::new();
    let a = insert_with_z(&mut store, 1);
    let b = insert_with_z(&mut store, 5);
    let c = insert_with_z(&mut store, 9);
    assert!(store.move_layer_down(&c));
    assert_eq!(z_of(&store, &c), 5);
    assert_eq!(z_of(&store, &b), 9);
    assert_eq!(z_of(&store, &a), 1);
}

#[test]
fn move_layer_at_extremes_does_not_commit() {
    let mut store = ItemStore::new();
    let a = insert_with_z(&mut store, 1);
    let c = insert_with_z(&mut store, 9);
    let len = store.history().len();
    assert!(!store.move_layer_up(&c));
    assert!(!store.move_layer_down(&a));
    assert_eq!(store.history().len(), len);
}

// =============================================================
// ItemStore: property edits
// =============================================================

#[test]
fn opacity_is_clamped() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.set_opacity(&id, 0.0, true);
    assert_eq!(store.get(&id).unwrap().opacity, 0.1);
    store.set_opacity(&id, 1.5, true);
    assert_eq!(store.get(&id).unwrap().opacity, 1.0);
    store.set_opacity(&id, 0.5, true);
    assert_eq!(store.get(&id).unwrap().opacity, 0.5);
}

#[test]
fn rotate_by_wraps_around() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.rotate_by(&id, -90.0);
    assert_eq!(store.get(&id).unwrap().rotation, 270.0);
    store.rotate_by(&id, 90.0);
    assert_eq!(store.get(&id).unwrap().rotation, 0.0);
}

#[test]
fn toggles_flip_lock_and_visibility() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.toggle_flip_x(&id);
    store.toggle_flip_y(&id);
    store.toggle_locked(&id);
    store.toggle_visible(&id);
    let item = store.get(&id).unwrap();
    assert!(item.flip_x && item.flip_y && item.locked);
    assert!(!item.visible);
}

// =============================================================
// ItemStore: clear, reset, undo/redo
// =============================================================

#[test]
fn clear_canvas_requires_confirmation() {
    let mut store = ItemStore::new();
    store.place_item(make_item(0));
    assert!(!store.clear_canvas(|| false));
    assert_eq!(store.len(), 1);
    assert!(store.clear_canvas(|| true));
    assert!(store.is_empty());
    assert!(store.selection().is_none());
}

#[test]
fn clear_empty_canvas_never_asks() {
    let mut store = ItemStore::new();
    let mut asked = false;
    assert!(!store.clear_canvas(|| {
        asked = true;
        true
    }));
    assert!(!asked);
}

#[test]
fn clear_canvas_is_undoable() {
    let mut store = ItemStore::new();
    store.place_item(make_item(0));
    store.place_item(make_item(0));
    store.clear_canvas(|| true);
    assert!(store.undo());
    assert_eq!(store.len(), 2);
}

#[test]
fn undo_restores_previous_collection() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.update_item(&id, &PartialCanvasItem::position(1.0, 2.0), true);
    assert!(store.undo());
    assert_eq!(store.get(&id).unwrap().x, 210.0);
    assert!(store.redo());
    assert_eq!(store.get(&id).unwrap().x, 1.0);
}

#[test]
fn undo_past_placement_prunes_selection() {
    let mut store = ItemStore::new();
    store.place_item(make_item(0));
    assert!(store.undo());
    assert!(store.is_empty());
    assert!(store.selection().is_none());
}

#[test]
fn history_caps_at_thirty_entries() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    for n in 0..40 {
        store.update_item(&id, &PartialCanvasItem::position(f64::from(n), 0.0), true);
    }
    assert_eq!(store.history().len(), 30);
    assert!(!store.can_redo());
}

#[test]
fn edit_after_undo_drops_redo() {
    let mut store = ItemStore::new();
    let id = store.place_item(make_item(0));
    store.update_item(&id, &PartialCanvasItem::position(1.0, 1.0), true);
    store.undo();
    assert!(store.can_redo());
    store.update_item(&id, &PartialCanvasItem::position(2.0, 2.0), true);
    assert!(!store.can_redo());
}

#[test]
fn reset_drops_items_and_history() {
    let mut store = ItemStore::new();
    store.place_item(make_item(0));
    store.reset();
    assert!(store.is_empty());
    assert!(!store.can_undo());
    assert_eq!(store.history().len(), 1);
}

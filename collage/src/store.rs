//! Canvas item model and the store that owns the placed-item collection.
//!
//! This module defines what sits on the collage surface (`CanvasItem`), the
//! read-only input it is placed from (`SourceItem`), the crop rectangle kept
//! in natural image pixels (`CropData`), a sparse-update type for incremental
//! edits (`PartialCanvasItem`), and the `ItemStore` that is the only thing
//! allowed to mutate the collection.
//!
//! Every discrete edit commits a full snapshot to the store's [`History`].
//! Continuous gestures call [`ItemStore::update_item`] with `commit = false`
//! on every frame and commit once when the gesture ends.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DUPLICATE_OFFSET, MAX_HISTORY, MAX_OPACITY, MIN_CROP_SIZE, MIN_OPACITY};
use crate::geometry::{Rect, Size, height_for_aspect, normalize_degrees};
use crate::history::History;

/// Identifier of a placed item, distinct from its source item's id.
pub type ItemId = Uuid;

/// A clothing record offered to the builder by the host. Never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Crop rectangle in the source image's natural pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropData {
    /// The rectangle covering the whole natural image.
    #[must_use]
    pub fn full(natural: Size) -> Self {
        Self { x: 0.0, y: 0.0, width: natural.width, height: natural.height }
    }

    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether the rectangle lies inside the image and respects the minimum side length.
    ///
    /// Images smaller than the floor only require the rectangle to cover them fully.
    #[must_use]
    pub fn is_valid_for(&self, natural: Size) -> bool {
        let min_w = MIN_CROP_SIZE.min(natural.width);
        let min_h = MIN_CROP_SIZE.min(natural.height);
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= natural.width + f64::EPSILON
            && self.y + self.height <= natural.height + f64::EPSILON
            && self.width >= min_w
            && self.height >= min_h
    }
}

/// A source item placed on the canvas.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasItem {
    /// Identity of this placement; duplicates get a fresh one.
    pub unique_id: ItemId,
    /// Id of the source item this was placed from.
    pub source_id: String,
    /// Display name copied from the source item.
    pub name: Option<String>,
    /// Image URL copied from the source item; also the image cache key.
    pub image_url: String,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking order; higher draws on top. Values need not be contiguous.
    pub z_index: i64,
    /// Clockwise rotation in degrees around the box center.
    pub rotation: f64,
    /// Opacity in `[0.1, 1.0]`.
    pub opacity: f64,
    /// Locked items reject drag, resize, rotate, and forward layer moves.
    pub locked: bool,
    /// Hidden items stay in the collection but are not rendered or exported.
    pub visible: bool,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Crop rectangle in natural pixels; `None` shows the whole image.
    pub crop: Option<CropData>,
    pub natural_width: f64,
    pub natural_height: f64,
}

impl CanvasItem {
    /// Build a new item for `source` at the base width, keeping the image's aspect ratio,
    /// centered on a canvas of size `canvas`.
    ///
    /// `z_index` is left at zero; the store assigns the stacking order on insert.
    #[must_use]
    pub fn from_source(source: &SourceItem, image_url: &str, natural: Size, canvas: Size, base_width: f64) -> Self {
        let width = base_width;
        let height = height_for_aspect(width, natural.width, natural.height);
        Self {
            unique_id: Uuid::new_v4(),
            source_id: source.id.clone(),
            name: source.name.clone(),
            image_url: image_url.to_owned(),
            x: (canvas.width - width) * 0.5,
            y: (canvas.height - height) * 0.5,
            width,
            height,
            z_index: 0,
            rotation: 0.0,
            opacity: MAX_OPACITY,
            locked: false,
            visible: true,
            flip_x: false,
            flip_y: false,
            crop: None,
            natural_width: natural.width,
            natural_height: natural.height,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn natural_size(&self) -> Size {
        Size::new(self.natural_width, self.natural_height)
    }

    /// The crop rectangle in effect: the stored crop or the full image.
    #[must_use]
    pub fn effective_crop(&self) -> CropData {
        self.crop.unwrap_or_else(|| CropData::full(self.natural_size()))
    }
}

/// How a partial update touches the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropUpdate {
    Set(CropData),
    Clear,
}

/// Sparse update for a canvas item. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialCanvasItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropUpdate>,
}

impl PartialCanvasItem {
    /// A position-only update.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// A position-and-size update.
    #[must_use]
    pub fn bounds(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Default::default()
        }
    }

    fn apply_to(&self, item: &mut CanvasItem) {
        if let Some(x) = self.x {
            item.x = x;
        }
        if let Some(y) = self.y {
            item.y = y;
        }
        if let Some(w) = self.width {
            item.width = w;
        }
        if let Some(h) = self.height {
            item.height = h;
        }
        if let Some(z) = self.z_index {
            item.z_index = z;
        }
        if let Some(r) = self.rotation {
            item.rotation = r;
        }
        if let Some(o) = self.opacity {
            item.opacity = o;
        }
        if let Some(l) = self.locked {
            item.locked = l;
        }
        if let Some(v) = self.visible {
            item.visible = v;
        }
        if let Some(f) = self.flip_x {
            item.flip_x = f;
        }
        if let Some(f) = self.flip_y {
            item.flip_y = f;
        }
        match self.crop {
            Some(CropUpdate::Set(crop)) => item.crop = Some(crop),
            Some(CropUpdate::Clear) => item.crop = None,
            None => {}
        }
    }
}

/// A full copy of the placed-item collection; the unit of undo history.
pub type CanvasSnapshot = Vec<CanvasItem>;

/// Owner of the placed items, the selection, and the undo history.
#[derive(Debug, Clone)]
pub struct ItemStore {
    items: Vec<CanvasItem>,
    selected: Option<ItemId>,
    history: History<CanvasSnapshot>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Create an empty store with the default history depth.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_depth(MAX_HISTORY)
    }

    #[must_use]
    pub fn with_history_depth(depth: usize) -> Self {
        Self { items: Vec::new(), selected: None, history: History::with_depth(Vec::new(), depth) }
    }

    // --- Queries ---

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.unique_id == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items sorted bottom-to-top by `z_index`; ties keep insertion order.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<&CanvasItem> {
        let mut items: Vec<&CanvasItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.z_index);
        items
    }

    /// Highest `z_index`, or 0 when empty.
    #[must_use]
    pub fn max_z(&self) -> i64 {
        self.items.iter().map(|item| item.z_index).max().unwrap_or(0)
    }

    /// Lowest `z_index`, or 0 when empty.
    #[must_use]
    pub fn min_z(&self) -> i64 {
        self.items.iter().map(|item| item.z_index).min().unwrap_or(0)
    }

    #[must_use]
    pub fn history(&self) -> &History<CanvasSnapshot> {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Selection ---

    #[must_use]
    pub fn selection(&self) -> Option<ItemId> {
        self.selected
    }

    /// The selected item, if it still exists.
    #[must_use]
    pub fn selected_item(&self) -> Option<&CanvasItem> {
        self.selected.and_then(|id| self.get(&id))
    }

    /// Change the selection. Returns true when it changed.
    pub fn select(&mut self, id: Option<ItemId>) -> bool {
        let id = id.filter(|id| self.get(id).is_some());
        if self.selected == id {
            return false;
        }
        self.selected = id;
        true
    }

    // --- Mutations ---

    /// Record the current collection as a new history entry.
    pub fn commit(&mut self) {
        self.history.commit(self.items.clone());
        tracing::debug!(len = self.history.len(), index = self.history.index(), "history commit");
    }

    /// Insert a prepared item on top of the stack, select it, and commit.
    pub fn place_item(&mut self, mut item: CanvasItem) -> ItemId {
        item.z_index = self.max_z() + 1;
        let id = item.unique_id;
        self.items.push(item);
        self.selected = Some(id);
        self.commit();
        id
    }

    /// Merge `partial` into the item with `id`. Commits unless `commit` is false.
    ///
    /// Returns false if no such item exists.
    pub fn update_item(&mut self, id: &ItemId, partial: &PartialCanvasItem, commit: bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.unique_id == *id) else {
            return false;
        };
        partial.apply_to(item);
        if commit {
            self.commit();
        }
        true
    }

    /// Remove an item, clearing the selection if it pointed there.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<CanvasItem> {
        let pos = self.items.iter().position(|item| item.unique_id == *id)?;
        let removed = self.items.remove(pos);
        if self.selected == Some(*id) {
            self.selected = None;
        }
        self.commit();
        Some(removed)
    }

    /// Clone an item with a new id, offset it, put it on top, and select it.
    pub fn duplicate_item(&mut self, id: &ItemId) -> Option<ItemId> {
        let mut copy = self.get(id)?.clone();
        copy.unique_id = Uuid::new_v4();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = self.max_z() + 1;
        let new_id = copy.unique_id;
        self.items.push(copy);
        self.selected = Some(new_id);
        self.commit();
        Some(new_id)
    }

    pub fn bring_to_front(&mut self, id: &ItemId) -> bool {
        let z = self.max_z() + 1;
        self.update_item(id, &PartialCanvasItem { z_index: Some(z), ..Default::default() }, true)
    }

    pub fn send_to_back(&mut self, id: &ItemId) -> bool {
        let z = self.min_z() - 1;
        self.update_item(id, &PartialCanvasItem { z_index: Some(z), ..Default::default() }, true)
    }

    /// Swap z-index with the nearest item strictly above. Returns false if already on top.
    pub fn move_layer_up(&mut self, id: &ItemId) -> bool {
        let Some(current) = self.get(id).map(|item| item.z_index) else {
            return false;
        };
        let neighbor = self
            .items
            .iter()
            .filter(|item| item.z_index > current)
            .min_by_key(|item| item.z_index)
            .map(|item| (item.unique_id, item.z_index));
        self.swap_z(id, current, neighbor)
    }

    /// Swap z-index with the nearest item strictly below. Returns false if already at the bottom.
    pub fn move_layer_down(&mut self, id: &ItemId) -> bool {
        let Some(current) = self.get(id).map(|item| item.z_index) else {
            return false;
        };
        let neighbor = self
            .items
            .iter()
            .filter(|item| item.z_index < current)
            .max_by_key(|item| item.z_index)
            .map(|item| (item.unique_id, item.z_index));
        self.swap_z(id, current, neighbor)
    }

    fn swap_z(&mut self, id: &ItemId, current: i64, neighbor: Option<(ItemId, i64)>) -> bool {
        let Some((other_id, other_z)) = neighbor else {
            return false;
        };
        for item in &mut self.items {
            if item.unique_id == *id {
                item.z_index = other_z;
            } else if item.unique_id == other_id {
                item.z_index = current;
            }
        }
        self.commit();
        true
    }

    /// Empty the canvas once `confirm` agrees. Does nothing on an empty canvas.
    pub fn clear_canvas<F: FnOnce() -> bool>(&mut self, confirm: F) -> bool {
        if self.items.is_empty() || !confirm() {
            return false;
        }
        self.items.clear();
        self.selected = None;
        self.commit();
        true
    }

    /// Drop all items and history without recording an entry.
    pub fn reset(&mut self) {
        self.items.clear();
        self.selected = None;
        self.history.reset(Vec::new());
    }

    pub fn undo(&mut self) -> bool {
        let items = &mut self.items;
        let moved = self.history.undo(|snapshot| items.clone_from(snapshot));
        if moved {
            self.prune_selection();
            tracing::debug!(index = self.history.index(), "undo");
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let items = &mut self.items;
        let moved = self.history.redo(|snapshot| items.clone_from(snapshot));
        if moved {
            self.prune_selection();
            tracing::debug!(index = self.history.index(), "redo");
        }
        moved
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.get(&id).is_none() {
                self.selected = None;
            }
        }
    }

    // --- Per-item property edits ---

    /// Set opacity, clamped to `[0.1, 1.0]`.
    pub fn set_opacity(&mut self, id: &ItemId, opacity: f64, commit: bool) -> bool {
        let opacity = opacity.clamp(MIN_OPACITY, MAX_OPACITY);
        self.update_item(id, &PartialCanvasItem { opacity: Some(opacity), ..Default::default() }, commit)
    }

    /// Rotate by `delta` degrees, keeping the result in `[0, 360)`.
    pub fn rotate_by(&mut self, id: &ItemId, delta: f64) -> bool {
        let Some(rotation) = self.get(id).map(|item| normalize_degrees(item.rotation + delta)) else {
            return false;
        };
        self.update_item(id, &PartialCanvasItem { rotation: Some(rotation), ..Default::default() }, true)
    }

    pub fn toggle_flip_x(&mut self, id: &ItemId) -> bool {
        let Some(flip) = self.get(id).map(|item| !item.flip_x) else {
            return false;
        };
        self.update_item(id, &PartialCanvasItem { flip_x: Some(flip), ..Default::default() }, true)
    }

    pub fn toggle_flip_y(&mut self, id: &ItemId) -> bool {
        let Some(flip) = self.get(id).map(|item| !item.flip_y) else {
            return false;
        };
        self.update_item(id, &PartialCanvasItem { flip_y: Some(flip), ..Default::default() }, true)
    }

    pub fn toggle_locked(&mut self, id: &ItemId) -> bool {
        let Some(locked) = self.get(id).map(|item| !item.locked) else {
            return false;
        };
        self.update_item(id, &PartialCanvasItem { locked: Some(locked), ..Default::default() }, true)
    }

    pub fn toggle_visible(&mut self, id: &ItemId) -> bool {
        let Some(visible) = self.get(id).map(|item| !item.visible) else {
            return false;
        };
        self.update_item(id, &PartialCanvasItem { visible: Some(visible), ..Default::default() }, true)
    }
}

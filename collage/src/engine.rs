//! Top-level collage engine: routes input to the viewport, item store, and crop tool.
//!
//! The host forwards raw pointer, wheel, and keyboard events and toolbar
//! commands; every handler returns a list of [`Action`]s describing what the
//! host must do next (repaint, change cursor, attach or detach global pointer
//! listeners). The engine never talks to the network itself: images arrive
//! through an [`ImageSource`] and exports leave through a [`SaveSink`].
//!
//! Pointer capture is scoped to a gesture. [`Action::CapturePointer`] is
//! emitted when a drag starts and [`Action::ReleasePointer`] when it ends or
//! is cancelled, so the host listens on the window only in between.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tiny_skia::{Color, Pixmap};

use crate::config::CollageConfig;
use crate::consts::{MIN_ITEM_SIZE, ROTATE_SNAP_DEG, ROTATE_STEP_DEG};
use crate::crop::CropSession;
use crate::export::{self, ExportArtifact, ExportError, SaveSink};
use crate::geometry::{Point, Rect, Size, bearing_deg, height_for_aspect, normalize_degrees, rotate_about, snap_to_grid};
use crate::hit::{self, HitPart, ResizeAnchor};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::loader::{ImageCache, ImageSource, LoadedImage, load_source};
use crate::render::{self, RenderError, SceneTransform};
use crate::store::{CanvasItem, CropUpdate, ItemId, ItemStore, PartialCanvasItem, SourceItem};
use crate::viewport::Viewport;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed and should be repainted.
    RenderNeeded,
    /// Change the pointer cursor (CSS cursor name).
    SetCursor(String),
    /// A drag started: start listening for pointer move/up on the window.
    CapturePointer,
    /// The drag ended: stop listening on the window.
    ReleasePointer,
    /// The selected item changed.
    SelectionChanged(Option<ItemId>),
    /// The crop modal opened for this item.
    CropOpened(ItemId),
    /// The crop modal closed.
    CropClosed,
}

/// The collage editor: item store, viewport, crop session, decoded images, and input state.
pub struct Engine {
    pub store: ItemStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub crop: Option<CropSession>,
    pub images: ImageCache,
    pub config: CollageConfig,
    is_saving: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(CollageConfig::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: CollageConfig) -> Self {
        Self {
            store: ItemStore::with_history_depth(config.history_depth),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::Idle,
            crop: None,
            images: ImageCache::new(),
            config,
            is_saving: false,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<ItemId> {
        self.store.selection()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.store.get(id)
    }

    #[must_use]
    pub fn canvas_size(&self) -> Size {
        self.config.canvas
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Whether an export is in flight; the Save control should be disabled while true.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    // --- Adding items ---

    /// Place an item whose image has finished loading, centered and on top, and select it.
    pub fn place_loaded(&mut self, source: &SourceItem, url: &str, image: LoadedImage) -> Vec<Action> {
        let item =
            CanvasItem::from_source(source, url, image.natural_size(), self.config.canvas, self.config.base_item_width);
        self.images.insert(url, image);
        let id = self.store.place_item(item);
        tracing::debug!(item_id = %id, source_id = %source.id, "item added");
        vec![Action::SelectionChanged(Some(id)), Action::RenderNeeded]
    }

    /// Load `source`'s image and place it. Silently does nothing if there is no image or it fails to load.
    ///
    /// This holds the engine for the duration of the load; hosts that need to stay responsive
    /// call [`load_source`] themselves and then [`Self::place_loaded`].
    pub async fn add_item(&mut self, source: &SourceItem, loader: &dyn ImageSource) -> Vec<Action> {
        match load_source(source, loader).await {
            Some((url, image)) => self.place_loaded(source, &url, image),
            None => Vec::new(),
        }
    }

    // --- Toolbar ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        vec![Action::SetCursor(self.idle_cursor().to_owned())]
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.ui.snap_to_grid = enabled;
    }

    /// Tell the engine whether a text field has keyboard focus.
    pub fn set_text_input_focus(&mut self, focused: bool) {
        self.ui.text_input_focused = focused;
    }

    /// Change the selection directly (e.g. from a layers panel).
    pub fn select(&mut self, id: Option<ItemId>) -> Vec<Action> {
        if self.store.select(id) {
            vec![Action::SelectionChanged(self.store.selection()), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn undo(&mut self) -> Vec<Action> {
        if self.is_busy() {
            return Vec::new();
        }
        let before = self.store.selection();
        let moved = self.store.undo();
        self.after_history_move(moved, before)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        if self.is_busy() {
            return Vec::new();
        }
        let before = self.store.selection();
        let moved = self.store.redo();
        self.after_history_move(moved, before)
    }

    fn after_history_move(&mut self, moved: bool, before: Option<ItemId>) -> Vec<Action> {
        if !moved {
            return Vec::new();
        }
        let mut actions = vec![Action::RenderNeeded];
        if self.store.selection() != before {
            actions.push(Action::SelectionChanged(self.store.selection()));
        }
        actions
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Vec<Action> {
        if self.is_busy() {
            return Vec::new();
        }
        let was_selected = self.store.selection() == Some(*id);
        if self.store.remove_item(id).is_none() {
            return Vec::new();
        }
        let mut actions = vec![Action::RenderNeeded];
        if was_selected {
            actions.push(Action::SelectionChanged(None));
        }
        actions
    }

    pub fn duplicate_item(&mut self, id: &ItemId) -> Vec<Action> {
        match self.store.duplicate_item(id) {
            Some(new_id) => vec![Action::SelectionChanged(Some(new_id)), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Move to the top of the stack. Locked items stay put.
    pub fn bring_to_front(&mut self, id: &ItemId) -> Vec<Action> {
        if self.is_locked(id) {
            return Vec::new();
        }
        render_if(self.store.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.send_to_back(id))
    }

    /// Swap with the next item up. Locked items stay put.
    pub fn move_layer_up(&mut self, id: &ItemId) -> Vec<Action> {
        if self.is_locked(id) {
            return Vec::new();
        }
        render_if(self.store.move_layer_up(id))
    }

    pub fn move_layer_down(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.move_layer_down(id))
    }

    /// Opacity slider. Pass `commit = false` while the slider is dragged and `true` on release.
    pub fn set_opacity(&mut self, id: &ItemId, opacity: f64, commit: bool) -> Vec<Action> {
        render_if(self.store.set_opacity(id, opacity, commit))
    }

    pub fn rotate_by(&mut self, id: &ItemId, delta_deg: f64) -> Vec<Action> {
        render_if(self.store.rotate_by(id, delta_deg))
    }

    /// Rotate-right toolbar button.
    pub fn rotate_clockwise(&mut self, id: &ItemId) -> Vec<Action> {
        self.rotate_by(id, ROTATE_STEP_DEG)
    }

    /// Rotate-left toolbar button.
    pub fn rotate_counter_clockwise(&mut self, id: &ItemId) -> Vec<Action> {
        self.rotate_by(id, -ROTATE_STEP_DEG)
    }

    pub fn toggle_flip_x(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.toggle_flip_x(id))
    }

    pub fn toggle_flip_y(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.toggle_flip_y(id))
    }

    pub fn toggle_locked(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.toggle_locked(id))
    }

    pub fn toggle_visible(&mut self, id: &ItemId) -> Vec<Action> {
        render_if(self.store.toggle_visible(id))
    }

    /// Remove every item once `confirm` agrees.
    pub fn clear_canvas<F: FnOnce() -> bool>(&mut self, confirm: F) -> Vec<Action> {
        let had_selection = self.store.selection().is_some();
        if !self.store.clear_canvas(confirm) {
            return Vec::new();
        }
        let mut actions = vec![Action::RenderNeeded];
        if had_selection {
            actions.push(Action::SelectionChanged(None));
        }
        actions
    }

    /// Drop all items, history, images, and view state, as when the builder is torn down.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.crop = None;
        self.store.reset();
        self.images.clear();
        self.viewport.reset_view();
        actions.push(Action::SelectionChanged(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let before = self.viewport.zoom;
        self.viewport.zoom_in();
        render_if(self.viewport.zoom != before)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let before = self.viewport.zoom;
        self.viewport.zoom_out();
        render_if(self.viewport.zoom != before)
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.viewport.reset_view();
        vec![Action::RenderNeeded]
    }

    /// Fit the whole canvas into a container of the given size.
    pub fn fit_to_view(&mut self, container: Size) -> Vec<Action> {
        self.viewport.fit_to_view(container, self.config.canvas, self.config.fit_margin);
        vec![Action::RenderNeeded]
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.is_busy() {
            return Vec::new();
        }

        if button == Button::Middle || (button == Button::Primary && self.ui.pans_on_primary()) {
            self.viewport.begin_pan(screen_pt);
            self.input = InputState::Panning;
            return vec![Action::CapturePointer, Action::SetCursor("grabbing".to_owned())];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        let Some(hit) = hit::hit_test(canvas_pt, &self.store, self.viewport.zoom, self.store.selection()) else {
            return self.select(None);
        };

        let mut actions = self.select(Some(hit.item_id));
        let Some(item) = self.store.get(&hit.item_id) else {
            return actions;
        };
        if item.locked {
            return actions;
        }

        self.input = match hit.part {
            HitPart::Body => InputState::DraggingItem {
                id: item.unique_id,
                start_canvas: canvas_pt,
                orig_x: item.x,
                orig_y: item.y,
            },
            HitPart::ResizeHandle(anchor) => InputState::ResizingItem {
                id: item.unique_id,
                anchor,
                start_canvas: canvas_pt,
                orig_x: item.x,
                orig_y: item.y,
                orig_w: item.width,
                orig_h: item.height,
            },
            HitPart::RotateHandle => {
                let center = item.bounds().center();
                InputState::RotatingItem {
                    id: item.unique_id,
                    center,
                    start_bearing: bearing_deg(center, canvas_pt),
                    orig_rotation: item.rotation,
                }
            }
        };
        tracing::debug!(item_id = %hit.item_id, part = ?hit.part, "gesture started");
        actions.push(Action::CapturePointer);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        match self.input.clone() {
            InputState::Idle => vec![Action::SetCursor(self.hover_cursor(canvas_pt).to_owned())],
            InputState::Panning => render_if(self.viewport.pan_to(screen_pt)),
            InputState::DraggingItem { id, start_canvas, orig_x, orig_y } => {
                let delta = canvas_pt.sub(start_canvas);
                let partial = PartialCanvasItem::position(orig_x + delta.x, orig_y + delta.y);
                render_if(self.store.update_item(&id, &partial, false))
            }
            InputState::ResizingItem { id, anchor, start_canvas, orig_x, orig_y, orig_w, orig_h } => {
                let rotation = self.store.get(&id).map_or(0.0, |item| item.rotation);
                let local_delta = rotate_about(canvas_pt.sub(start_canvas), Point::default(), -rotation);
                let rect = resize_bounds(Rect::new(orig_x, orig_y, orig_w, orig_h), anchor, local_delta, MIN_ITEM_SIZE);
                render_if(self.store.update_item(&id, &PartialCanvasItem::bounds(rect), false))
            }
            InputState::RotatingItem { id, center, start_bearing, orig_rotation } => {
                let mut rotation = normalize_degrees(orig_rotation + bearing_deg(center, canvas_pt) - start_bearing);
                if modifiers.shift {
                    rotation = normalize_degrees(snap_to_grid(rotation, ROTATE_SNAP_DEG));
                }
                let partial = PartialCanvasItem { rotation: Some(rotation), ..Default::default() };
                render_if(self.store.update_item(&id, &partial, false))
            }
            InputState::CropDragging { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let mut actions = match state {
            InputState::Idle | InputState::CropDragging { .. } => {
                self.input = state;
                return Vec::new();
            }
            InputState::Panning => {
                self.viewport.end_pan();
                vec![Action::SetCursor(self.idle_cursor().to_owned())]
            }
            InputState::DraggingItem { id, orig_x, orig_y, .. } => self.finish_drag(&id, orig_x, orig_y),
            InputState::ResizingItem { id, orig_x, orig_y, orig_w, orig_h, .. } => {
                self.finish_resize(&id, Rect::new(orig_x, orig_y, orig_w, orig_h))
            }
            InputState::RotatingItem { id, orig_rotation, .. } => self.finish_rotate(&id, orig_rotation),
        };
        actions.push(Action::ReleasePointer);
        actions
    }

    /// Abort any gesture in progress (e.g. on unmount or focus loss).
    ///
    /// Item geometry returns to where the gesture started and nothing is committed.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        match state {
            InputState::Idle => return Vec::new(),
            InputState::Panning => self.viewport.end_pan(),
            InputState::DraggingItem { id, orig_x, orig_y, .. } => {
                self.store.update_item(&id, &PartialCanvasItem::position(orig_x, orig_y), false);
            }
            InputState::ResizingItem { id, orig_x, orig_y, orig_w, orig_h, .. } => {
                let partial = PartialCanvasItem::bounds(Rect::new(orig_x, orig_y, orig_w, orig_h));
                self.store.update_item(&id, &partial, false);
            }
            InputState::RotatingItem { id, orig_rotation, .. } => {
                let partial = PartialCanvasItem { rotation: Some(orig_rotation), ..Default::default() };
                self.store.update_item(&id, &partial, false);
            }
            InputState::CropDragging { .. } => {
                if let Some(session) = self.crop.as_mut() {
                    session.end_drag();
                }
            }
        }
        vec![Action::ReleasePointer, Action::RenderNeeded]
    }

    fn finish_drag(&mut self, id: &ItemId, orig_x: f64, orig_y: f64) -> Vec<Action> {
        let Some(item) = self.store.get(id) else {
            return Vec::new();
        };
        let (mut x, mut y) = (item.x, item.y);
        if self.ui.snap_to_grid {
            x = snap_to_grid(x, self.config.grid_size);
            y = snap_to_grid(y, self.config.grid_size);
        }
        if x == orig_x && y == orig_y {
            // Nothing moved: restore any sub-grid drift without a history entry.
            self.store.update_item(id, &PartialCanvasItem::position(x, y), false);
            return vec![Action::RenderNeeded];
        }
        self.store.update_item(id, &PartialCanvasItem::position(x, y), true);
        vec![Action::RenderNeeded]
    }

    fn finish_resize(&mut self, id: &ItemId, orig: Rect) -> Vec<Action> {
        let Some(item) = self.store.get(id) else {
            return Vec::new();
        };
        let mut rect = item.bounds();
        if self.ui.snap_to_grid {
            let grid = self.config.grid_size;
            rect = Rect::new(
                snap_to_grid(rect.x, grid),
                snap_to_grid(rect.y, grid),
                snap_to_grid(rect.width, grid).max(grid),
                snap_to_grid(rect.height, grid).max(grid),
            );
        }
        let changed = rect != orig;
        self.store.update_item(id, &PartialCanvasItem::bounds(rect), changed);
        vec![Action::RenderNeeded]
    }

    fn finish_rotate(&mut self, id: &ItemId, orig_rotation: f64) -> Vec<Action> {
        let Some(rotation) = self.store.get(id).map(|item| item.rotation) else {
            return Vec::new();
        };
        if rotation != orig_rotation {
            self.store.commit();
        }
        vec![Action::RenderNeeded]
    }

    /// Ctrl/Cmd + wheel zooms by one step per tick; plain wheel is left to the host.
    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !modifiers.command() || self.crop.is_some() {
            return Vec::new();
        }
        let before = self.viewport.zoom;
        self.viewport.zoom_by_wheel(delta.dy);
        render_if(self.viewport.zoom != before)
    }

    // --- Keyboard ---

    /// Global shortcuts: undo/redo, delete, escape, and hold-space-to-pan.
    ///
    /// Suppressed entirely while a text field has focus.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.text_input_focused {
            return Vec::new();
        }
        if modifiers.command() && key.is("z") {
            return if modifiers.shift { self.redo() } else { self.undo() };
        }
        if modifiers.command() && key.is("y") {
            return self.redo();
        }
        if key.is("Delete") || key.is("Backspace") {
            return match self.store.selection() {
                Some(id) => self.remove_item(&id),
                None => Vec::new(),
            };
        }
        if key.is("Escape") {
            if self.crop.is_some() {
                return self.cancel_crop();
            }
            return self.select(None);
        }
        if is_space(key) && !self.ui.space_held {
            self.ui.space_held = true;
            if !self.input.is_active() {
                return vec![Action::SetCursor("grab".to_owned())];
            }
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if is_space(key) && self.ui.space_held {
            self.ui.space_held = false;
            if !self.input.is_active() {
                return vec![Action::SetCursor(self.idle_cursor().to_owned())];
            }
        }
        Vec::new()
    }

    // --- Crop tool ---

    /// Open the crop modal for `id`, showing its source image at `display` size.
    pub fn open_crop(&mut self, id: &ItemId, display: Size) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let Some(item) = self.store.get(id) else {
            return Vec::new();
        };
        self.crop = Some(CropSession::open(item, display));
        vec![Action::CropOpened(*id), Action::RenderNeeded]
    }

    /// Update the modal's displayed image size after a layout change.
    pub fn set_crop_display_size(&mut self, display: Size) {
        if let Some(session) = self.crop.as_mut() {
            session.set_display_size(display);
        }
    }

    /// Pointer down inside the crop modal, in display pixels.
    pub fn on_crop_pointer_down(&mut self, display_pt: Point) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let Some(session) = self.crop.as_mut() else {
            return Vec::new();
        };
        let Some(handle) = session.handle_at(display_pt) else {
            return Vec::new();
        };
        session.begin_drag(handle, display_pt);
        self.input = InputState::CropDragging { handle };
        vec![Action::CapturePointer, Action::RenderNeeded]
    }

    pub fn on_crop_pointer_move(&mut self, display_pt: Point) -> Vec<Action> {
        if !matches!(self.input, InputState::CropDragging { .. }) {
            return Vec::new();
        }
        let Some(session) = self.crop.as_mut() else {
            return Vec::new();
        };
        render_if(session.drag_to(display_pt))
    }

    pub fn on_crop_pointer_up(&mut self, _display_pt: Point) -> Vec<Action> {
        if !matches!(self.input, InputState::CropDragging { .. }) {
            return Vec::new();
        }
        self.input = InputState::Idle;
        if let Some(session) = self.crop.as_mut() {
            session.end_drag();
        }
        vec![Action::ReleasePointer, Action::RenderNeeded]
    }

    /// Start the working rectangle over from the full image.
    pub fn reset_crop(&mut self) -> Vec<Action> {
        let Some(session) = self.crop.as_mut() else {
            return Vec::new();
        };
        session.reset();
        vec![Action::RenderNeeded]
    }

    /// Write the working rectangle to the item, refit its height to the crop's aspect ratio, and close.
    pub fn apply_crop(&mut self) -> Vec<Action> {
        let mut actions = self.release_crop_drag();
        let Some(session) = self.crop.take() else {
            return actions;
        };
        let rect = session.rect();
        if let Some(width) = self.store.get(&session.item_id()).map(|item| item.width) {
            let partial = PartialCanvasItem {
                crop: Some(CropUpdate::Set(rect)),
                height: Some(height_for_aspect(width, rect.width, rect.height)),
                ..Default::default()
            };
            self.store.update_item(&session.item_id(), &partial, true);
        }
        actions.push(Action::CropClosed);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Clear the item's crop, restore its original aspect ratio, and close.
    pub fn remove_crop(&mut self) -> Vec<Action> {
        let mut actions = self.release_crop_drag();
        let Some(session) = self.crop.take() else {
            return actions;
        };
        if let Some(item) = self.store.get(&session.item_id()) {
            let partial = PartialCanvasItem {
                crop: Some(CropUpdate::Clear),
                height: Some(height_for_aspect(item.width, item.natural_width, item.natural_height)),
                ..Default::default()
            };
            self.store.update_item(&session.item_id(), &partial, true);
        }
        actions.push(Action::CropClosed);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Close the modal without touching the item.
    pub fn cancel_crop(&mut self) -> Vec<Action> {
        let mut actions = self.release_crop_drag();
        if self.crop.take().is_none() {
            return actions;
        }
        actions.push(Action::CropClosed);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn release_crop_drag(&mut self) -> Vec<Action> {
        if matches!(self.input, InputState::CropDragging { .. }) {
            self.input = InputState::Idle;
            return vec![Action::ReleasePointer];
        }
        Vec::new()
    }

    // --- Export ---

    /// Deselect, flatten the canvas to PNG, and mark a save as in flight.
    ///
    /// On success the caller hands the artifact to its save function and then calls
    /// [`Self::finish_save`]. The returned actions report the cleared selection. On
    /// failure nothing is in flight and both items and selection are untouched.
    ///
    /// # Errors
    ///
    /// [`ExportError::InProgress`] while a previous save is unfinished, otherwise any
    /// rasterization error.
    pub fn begin_export(&mut self) -> Result<(ExportArtifact, Vec<Action>), ExportError> {
        if self.is_saving {
            tracing::warn!("save requested while another is in progress");
            return Err(ExportError::InProgress);
        }
        let previous = self.store.selection();
        self.store.select(None);
        let items = self.store.sorted_items();
        match export::rasterize(&items, &self.images, self.config.canvas, self.config.export_scale) {
            Ok(artifact) => {
                self.is_saving = true;
                tracing::info!(width = artifact.width, height = artifact.height, bytes = artifact.png.len(), "collage exported");
                let actions = if previous.is_some() {
                    vec![Action::SelectionChanged(None), Action::RenderNeeded]
                } else {
                    Vec::new()
                };
                Ok((artifact, actions))
            }
            Err(e) => {
                tracing::error!(error = %e, "collage export failed");
                self.store.select(previous);
                Err(e)
            }
        }
    }

    /// Re-enable saving after the host's save function finished.
    pub fn finish_save(&mut self) {
        self.is_saving = false;
    }

    /// Export and hand the PNG to `sink`, once.
    ///
    /// Returns the actions from clearing the selection, so the host can refresh its panels.
    ///
    /// # Errors
    ///
    /// Any [`ExportError`] from rasterization or from the sink. Items are left as they were.
    pub async fn save(&mut self, sink: &dyn SaveSink) -> Result<Vec<Action>, ExportError> {
        let (artifact, actions) = self.begin_export()?;
        let result = sink.save(artifact).await;
        self.finish_save();
        match result {
            Ok(()) => Ok(actions),
            Err(e) => {
                tracing::error!(error = %e, "save sink failed");
                Err(e)
            }
        }
    }

    // --- Render ---

    /// Paint the on-screen view (viewport applied, selection chrome included).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a visible item's image is not loaded.
    pub fn render(&self, pixmap: &mut Pixmap, dpr: f64) -> Result<(), RenderError> {
        pixmap.fill(Color::TRANSPARENT);
        let view = SceneTransform::for_viewport(&self.viewport, dpr);
        render::paint_canvas_background(pixmap, self.config.canvas, view);
        render::paint_scene(pixmap, &self.store.sorted_items(), &self.images, view, self.store.selected_item())
    }

    // --- Helpers ---

    /// A gesture holds the pointer or the crop modal is open; history and canvas input wait.
    fn is_busy(&self) -> bool {
        self.input.is_active() || self.crop.is_some()
    }

    fn is_locked(&self, id: &ItemId) -> bool {
        self.store.get(id).is_some_and(|item| item.locked)
    }

    fn idle_cursor(&self) -> &'static str {
        if self.ui.pans_on_primary() { "grab" } else { "default" }
    }

    fn hover_cursor(&self, canvas_pt: Point) -> &'static str {
        if self.ui.pans_on_primary() {
            return "grab";
        }
        match hit::hit_test(canvas_pt, &self.store, self.viewport.zoom, self.store.selection()) {
            None => "default",
            Some(hit) if self.is_locked(&hit.item_id) => "not-allowed",
            Some(hit) => match hit.part {
                HitPart::Body => "move",
                HitPart::ResizeHandle(anchor) => anchor.cursor(),
                HitPart::RotateHandle => "grab",
            },
        }
    }
}

fn render_if(changed: bool) -> Vec<Action> {
    if changed { vec![Action::RenderNeeded] } else { Vec::new() }
}

fn is_space(key: &Key) -> bool {
    key.0 == " " || key.is("Space") || key.is("Spacebar")
}

/// New bounds after dragging `anchor` by `delta` (in the item's unrotated frame).
///
/// The edge opposite the handle stays put; neither side shrinks below `min`.
#[must_use]
pub fn resize_bounds(orig: Rect, anchor: ResizeAnchor, delta: Point, min: f64) -> Rect {
    let mut rect = orig;
    if anchor.moves_west() {
        let right = orig.x + orig.width;
        rect.x = (orig.x + delta.x).min(right - min);
        rect.width = right - rect.x;
    } else if anchor.moves_east() {
        rect.width = (orig.width + delta.x).max(min);
    }
    if anchor.moves_north() {
        let bottom = orig.y + orig.height;
        rect.y = (orig.y + delta.y).min(bottom - min);
        rect.height = bottom - rect.y;
    } else if anchor.moves_south() {
        rect.height = (orig.height + delta.y).max(min);
    }
    rect
}

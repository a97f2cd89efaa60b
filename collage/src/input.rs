//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up, carrying what is needed to compute deltas from a stable
//! baseline and commit a single history entry on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::crop::CropHandle;
use crate::geometry::Point;
use crate::hit::ResizeAnchor;
use crate::store::ItemId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pick, move, resize, and rotate items (default).
    #[default]
    Select,
    /// Drag anywhere to pan the view.
    Pan,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"z"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive = down.
    pub dy: f64,
}

/// Persistent UI state visible to the renderer and toolbar.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Quantize positions and sizes to the grid when a gesture ends.
    pub snap_to_grid: bool,
    /// Space is held: primary drags pan regardless of tool.
    pub space_held: bool,
    /// A text field has focus: keyboard shortcuts are suppressed.
    pub text_input_focused: bool,
}

impl UiState {
    /// Whether a primary-button drag should pan instead of acting on items.
    #[must_use]
    pub fn pans_on_primary(&self) -> bool {
        self.tool == Tool::Pan || self.space_held
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Panning the view; the anchor lives in the viewport.
    Panning,
    /// Moving an item.
    DraggingItem {
        id: ItemId,
        /// Canvas-space pointer position at gesture start.
        start_canvas: Point,
        orig_x: f64,
        orig_y: f64,
    },
    /// Resizing an item by one of its eight handles.
    ResizingItem {
        id: ItemId,
        anchor: ResizeAnchor,
        start_canvas: Point,
        orig_x: f64,
        orig_y: f64,
        orig_w: f64,
        orig_h: f64,
    },
    /// Rotating an item around its center.
    RotatingItem {
        id: ItemId,
        center: Point,
        /// Pointer bearing at gesture start, degrees.
        start_bearing: f64,
        orig_rotation: f64,
    },
    /// Dragging inside the crop modal; the drag itself lives in the crop session.
    CropDragging { handle: CropHandle },
}

impl InputState {
    /// Whether a gesture currently holds pointer capture.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

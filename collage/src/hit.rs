#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::geometry::{Point, rotate_about, screen_dist_to_canvas};
use crate::store::{CanvasItem, ItemId, ItemStore};

/// Which part of an item was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    /// Handle position as a fraction of the box, `(0,0)` top-left to `(1,1)` bottom-right.
    #[must_use]
    pub fn unit_position(self) -> (f64, f64) {
        match self {
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
            Self::Nw => (0.0, 0.0),
        }
    }

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    /// Whether dragging this handle moves the right edge.
    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    /// Whether dragging this handle moves the bottom edge.
    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    /// CSS cursor name for hovering this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub item_id: ItemId,
    pub part: HitPart,
}

/// Canvas-space position of a resize handle on an item, rotation included.
#[must_use]
pub fn handle_position(item: &CanvasItem, anchor: ResizeAnchor) -> Point {
    let (ux, uy) = anchor.unit_position();
    let local = Point::new(item.x + item.width * ux, item.y + item.height * uy);
    rotate_about(local, item.bounds().center(), item.rotation)
}

/// Canvas-space position of the rotate handle, `offset` canvas units above the top edge.
#[must_use]
pub fn rotate_handle_position(item: &CanvasItem, offset: f64) -> Point {
    let local = Point::new(item.x + item.width * 0.5, item.y - offset);
    rotate_about(local, item.bounds().center(), item.rotation)
}

/// Test which item (if any) is under `canvas_pt`.
///
/// The selected item's handles are checked first, then visible item bodies from the top of the
/// stack down. Handle slop is given in screen pixels and scaled by `zoom`.
#[must_use]
pub fn hit_test(canvas_pt: Point, store: &ItemStore, zoom: f64, selected_id: Option<ItemId>) -> Option<Hit> {
    let slop = screen_dist_to_canvas(HANDLE_RADIUS_PX, zoom);

    if let Some(item) = selected_id.and_then(|id| store.get(&id)).filter(|item| item.visible) {
        let rotate = rotate_handle_position(item, screen_dist_to_canvas(ROTATE_HANDLE_OFFSET_PX, zoom));
        if distance(canvas_pt, rotate) <= slop {
            return Some(Hit { item_id: item.unique_id, part: HitPart::RotateHandle });
        }
        for anchor in ResizeAnchor::ALL {
            if distance(canvas_pt, handle_position(item, anchor)) <= slop {
                return Some(Hit { item_id: item.unique_id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    store
        .sorted_items()
        .into_iter()
        .rev()
        .filter(|item| item.visible)
        .find(|item| body_contains(item, canvas_pt))
        .map(|item| Hit { item_id: item.unique_id, part: HitPart::Body })
}

/// Whether `pt` lies inside the item's rotated box.
#[must_use]
pub fn body_contains(item: &CanvasItem, pt: Point) -> bool {
    let bounds = item.bounds();
    let local = rotate_about(pt, bounds.center(), -item.rotation);
    bounds.contains(local)
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

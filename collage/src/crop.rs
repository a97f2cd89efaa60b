//! Crop tool: a modal sub-editor over one item's source image.
//!
//! A [`CropSession`] exists only while the crop modal is open. It holds a
//! working rectangle in natural image pixels and the size at which the image
//! is currently displayed in the modal. Pointer positions arrive in display
//! pixels and are converted to natural pixels on every move, so a modal that
//! reflows mid-drag (see [`CropSession::set_display_size`]) keeps tracking
//! the pointer correctly.
//!
//! Invalid geometry is clamped, never rejected: a drag that would push the
//! rectangle past the image edge or below the minimum side simply stops
//! making progress in that direction.
//!
//! ```text
//! Closed ──open──▶ Viewing ──begin_drag──▶ Dragging(Move | Resize)
//!                     ▲                          │
//!                     └────────end_drag──────────┘
//! Viewing ──apply / remove / cancel──▶ Closed      (engine)
//! Viewing ──reset──▶ Viewing                        (full image)
//! ```

#[cfg(test)]
#[path = "crop_test.rs"]
mod crop_test;

use crate::consts::{CROP_HANDLE_RADIUS_PX, MIN_CROP_SIZE};
use crate::geometry::{Point, Rect, Size, display_delta_to_natural, natural_rect_to_display};
use crate::hit::ResizeAnchor;
use crate::store::{CanvasItem, CropData, ItemId};

/// What a crop drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    /// Translate the whole rectangle.
    Move,
    /// Drag one of the eight edge/corner handles.
    Resize(ResizeAnchor),
}

/// Observable phase of an open crop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPhase {
    Viewing,
    Dragging(CropHandle),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CropDrag {
    handle: CropHandle,
    start_pointer: Point,
    start_rect: CropData,
}

/// Working state of the crop modal for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    item_id: ItemId,
    natural: Size,
    display: Size,
    rect: CropData,
    drag: Option<CropDrag>,
}

impl CropSession {
    /// Open a session seeded from the item's crop, or the full image if it has none.
    ///
    /// `display` is the size at which the modal shows the full source image.
    #[must_use]
    pub fn open(item: &CanvasItem, display: Size) -> Self {
        let natural = item.natural_size();
        let rect = sanitize(item.effective_crop(), natural);
        Self { item_id: item.unique_id, natural, display, rect, drag: None }
    }

    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// The working rectangle in natural pixels.
    #[must_use]
    pub fn rect(&self) -> CropData {
        self.rect
    }

    #[must_use]
    pub fn natural_size(&self) -> Size {
        self.natural
    }

    #[must_use]
    pub fn display_size(&self) -> Size {
        self.display
    }

    /// The working rectangle in display pixels, for drawing the overlay.
    #[must_use]
    pub fn display_rect(&self) -> Rect {
        natural_rect_to_display(self.rect.to_rect(), self.natural, self.display)
    }

    #[must_use]
    pub fn phase(&self) -> CropPhase {
        match self.drag {
            Some(drag) => CropPhase::Dragging(drag.handle),
            None => CropPhase::Viewing,
        }
    }

    /// Update the displayed image size, e.g. after the modal reflows.
    pub fn set_display_size(&mut self, display: Size) {
        self.display = display;
    }

    /// Which handle (if any) is under a display-space point. Handles win over the body.
    #[must_use]
    pub fn handle_at(&self, pt: Point) -> Option<CropHandle> {
        let rect = self.display_rect();
        for anchor in ResizeAnchor::ALL {
            let (ux, uy) = anchor.unit_position();
            let hx = rect.x + rect.width * ux;
            let hy = rect.y + rect.height * uy;
            if (pt.x - hx).hypot(pt.y - hy) <= CROP_HANDLE_RADIUS_PX {
                return Some(CropHandle::Resize(anchor));
            }
        }
        rect.contains(pt).then_some(CropHandle::Move)
    }

    /// Start dragging `handle` from display-space `pointer`.
    pub fn begin_drag(&mut self, handle: CropHandle, pointer: Point) {
        self.drag = Some(CropDrag { handle, start_pointer: pointer, start_rect: self.rect });
    }

    /// Follow the pointer. Returns false when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let delta = display_delta_to_natural(pointer.sub(drag.start_pointer), self.natural, self.display);
        self.rect = match drag.handle {
            CropHandle::Move => moved(drag.start_rect, delta, self.natural),
            CropHandle::Resize(anchor) => resized(drag.start_rect, anchor, delta, self.natural),
        };
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start over from the full image without closing.
    pub fn reset(&mut self) {
        self.drag = None;
        self.rect = CropData::full(self.natural);
    }
}

/// Minimum side lengths; images smaller than the floor use their own size.
fn min_size(natural: Size) -> Size {
    Size::new(MIN_CROP_SIZE.min(natural.width), MIN_CROP_SIZE.min(natural.height))
}

/// Clamp into `[lo, hi]`, preferring `hi` if the range is empty.
fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Force a rectangle to satisfy the bounds and minimum-size invariant.
#[must_use]
pub fn sanitize(rect: CropData, natural: Size) -> CropData {
    let min = min_size(natural);
    let width = clamp_range(rect.width, min.width, natural.width);
    let height = clamp_range(rect.height, min.height, natural.height);
    CropData {
        x: clamp_range(rect.x, 0.0, natural.width - width),
        y: clamp_range(rect.y, 0.0, natural.height - height),
        width,
        height,
    }
}

fn moved(start: CropData, delta: Point, natural: Size) -> CropData {
    CropData {
        x: clamp_range(start.x + delta.x, 0.0, natural.width - start.width),
        y: clamp_range(start.y + delta.y, 0.0, natural.height - start.height),
        ..start
    }
}

fn resized(start: CropData, anchor: ResizeAnchor, delta: Point, natural: Size) -> CropData {
    let min = min_size(natural);
    let mut rect = start;

    if anchor.moves_west() {
        let right = start.x + start.width;
        rect.x = clamp_range(start.x + delta.x, 0.0, right - min.width);
        rect.width = right - rect.x;
    } else if anchor.moves_east() {
        rect.width = clamp_range(start.width + delta.x, min.width, natural.width - start.x);
    }

    if anchor.moves_north() {
        let bottom = start.y + start.height;
        rect.y = clamp_range(start.y + delta.y, 0.0, bottom - min.height);
        rect.height = bottom - rect.y;
    } else if anchor.moves_south() {
        rect.height = clamp_range(start.height + delta.y, min.height, natural.height - start.y);
    }

    rect
}

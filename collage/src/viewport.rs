#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::geometry::{self, Point, Size};

/// Pan/zoom state of the editing surface.
///
/// `offset` is in screen pixels. `zoom` is a scale factor (1.0 = no zoom).
/// Neither ever touches stored item coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset: Point,
    pub zoom: f64,
    #[serde(skip)]
    pan_anchor: Option<PanAnchor>,
}

/// Pointer and offset captured when a pan gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnchor {
    pointer: Point,
    offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { offset: Point::default(), zoom: 1.0, pan_anchor: None }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(offset: Point, zoom: f64) -> Self {
        Self { offset, zoom: clamp_zoom(zoom), pan_anchor: None }
    }

    // --- Coordinate conversions ---

    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        geometry::screen_to_canvas(screen, self.offset, self.zoom)
    }

    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        geometry::canvas_to_screen(canvas, self.offset, self.zoom)
    }

    #[must_use]
    pub fn screen_dist_to_canvas(&self, dist: f64) -> f64 {
        geometry::screen_dist_to_canvas(dist, self.zoom)
    }

    // --- Pan ---

    /// Start a pan gesture anchored at `pointer`.
    pub fn begin_pan(&mut self, pointer: Point) {
        self.pan_anchor = Some(PanAnchor { pointer, offset: self.offset });
    }

    /// Move the pan to follow `pointer`. Returns false when no pan is active.
    pub fn pan_to(&mut self, pointer: Point) -> bool {
        let Some(anchor) = self.pan_anchor else {
            return false;
        };
        self.offset = anchor.offset.add(pointer.sub(anchor.pointer));
        true
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Shift the offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
    }

    // --- Zoom ---

    /// Set zoom, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(step(self.zoom, ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(step(self.zoom, -ZOOM_STEP));
    }

    /// One wheel tick: scrolling up (negative `dy`) zooms in. Zero delta does nothing.
    pub fn zoom_by_wheel(&mut self, dy: f64) {
        if dy < 0.0 {
            self.zoom_in();
        } else if dy > 0.0 {
            self.zoom_out();
        }
    }

    #[must_use]
    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    #[must_use]
    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    // --- Presets ---

    /// Back to the origin at 100%.
    pub fn reset_view(&mut self) {
        self.offset = Point::default();
        self.zoom = 1.0;
        self.pan_anchor = None;
    }

    /// Largest zoom no greater than 1.0 at which `canvas` fits inside `container` less `margin`.
    ///
    /// Resets the offset so the canvas sits at its home position.
    pub fn fit_to_view(&mut self, container: Size, canvas: Size, margin: f64) {
        self.zoom = fit_zoom(container, canvas, margin);
        self.offset = Point::default();
        self.pan_anchor = None;
    }
}

/// Zoom that fits `canvas` into `container` minus `margin`, capped at 1.0 and clamped to the zoom range.
#[must_use]
pub fn fit_zoom(container: Size, canvas: Size, margin: f64) -> f64 {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return 1.0;
    }
    let zx = (container.width - margin) / canvas.width;
    let zy = (container.height - margin) / canvas.height;
    zx.min(zy).min(1.0).clamp(MIN_ZOOM, MAX_ZOOM)
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Add `delta` and round to two decimals so repeated steps do not drift.
fn step(zoom: f64, delta: f64) -> f64 {
    ((zoom + delta) * 100.0).round() / 100.0
}

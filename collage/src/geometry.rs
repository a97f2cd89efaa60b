//! Coordinate spaces and the pure math that moves points between them.
//!
//! Three spaces are in play:
//!
//! - **screen**: pixels on the editing surface, after pan and zoom.
//! - **canvas**: the logical composition surface; item positions live here.
//! - **natural**: pixels of a source image at its original resolution; crop
//!   rectangles live here.
//!
//! Every conversion goes through this module so that viewport, drag, crop,
//! and export code never hand-roll a scale or translate.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::store::CropData;

/// A point in screen, canvas, or natural space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

// =============================================================
// Screen <-> canvas
// =============================================================

/// Convert a screen-space point to canvas coordinates under the given pan offset and zoom.
#[must_use]
pub fn screen_to_canvas(screen: Point, offset: Point, zoom: f64) -> Point {
    Point::new((screen.x - offset.x) / zoom, (screen.y - offset.y) / zoom)
}

/// Convert a canvas-space point to screen coordinates under the given pan offset and zoom.
#[must_use]
pub fn canvas_to_screen(canvas: Point, offset: Point, zoom: f64) -> Point {
    Point::new(canvas.x * zoom + offset.x, canvas.y * zoom + offset.y)
}

/// Convert a screen-space distance to a canvas-space distance.
#[must_use]
pub fn screen_dist_to_canvas(dist: f64, zoom: f64) -> f64 {
    dist / zoom
}

// =============================================================
// Display <-> natural
// =============================================================

/// Ratio of natural pixels per displayed pixel along each axis.
///
/// A zero display dimension yields a ratio of 1.0 on that axis.
#[must_use]
pub fn display_to_natural_scale(natural: Size, displayed: Size) -> Point {
    let sx = if displayed.width > 0.0 { natural.width / displayed.width } else { 1.0 };
    let sy = if displayed.height > 0.0 { natural.height / displayed.height } else { 1.0 };
    Point::new(sx, sy)
}

/// Convert a display-space pointer delta into natural image pixels.
#[must_use]
pub fn display_delta_to_natural(delta: Point, natural: Size, displayed: Size) -> Point {
    let scale = display_to_natural_scale(natural, displayed);
    Point::new(delta.x * scale.x, delta.y * scale.y)
}

/// Convert a natural-space rectangle into display coordinates.
#[must_use]
pub fn natural_rect_to_display(rect: Rect, natural: Size, displayed: Size) -> Rect {
    let scale = display_to_natural_scale(natural, displayed);
    Rect::new(rect.x / scale.x, rect.y / scale.y, rect.width / scale.x, rect.height / scale.y)
}

// =============================================================
// Snapping and rotation
// =============================================================

/// Quantize `value` to the nearest multiple of `grid`.
///
/// A non-positive grid leaves the value untouched.
#[must_use]
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Rotate `pt` about `center` by `degrees` clockwise (y axis pointing down).
#[must_use]
pub fn rotate_about(pt: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = pt.x - center.x;
    let dy = pt.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Wrap an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Angle in degrees of the vector from `center` to `pt`, measured clockwise from "up".
#[must_use]
pub fn bearing_deg(center: Point, pt: Point) -> f64 {
    (pt.y - center.y).atan2(pt.x - center.x).to_degrees() + 90.0
}

// =============================================================
// Crop placement
// =============================================================

/// Where to draw the full source image so that only the crop rectangle fills the item box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Horizontal scale from natural to display pixels.
    pub sx: f64,
    /// Vertical scale from natural to display pixels.
    pub sy: f64,
    /// Offset of the full image's top-left corner inside the item box.
    pub offset: Point,
    /// Rendered size of the full image.
    pub size: Size,
}

/// Compute the image placement for an item box of size `display`.
///
/// Without a crop, the whole natural image is stretched to the box.
#[must_use]
pub fn crop_placement(display: Size, natural: Size, crop: Option<&CropData>) -> ImagePlacement {
    let (cx, cy, cw, ch) = match crop {
        Some(c) => (c.x, c.y, c.width, c.height),
        None => (0.0, 0.0, natural.width, natural.height),
    };
    let sx = if cw > 0.0 { display.width / cw } else { 1.0 };
    let sy = if ch > 0.0 { display.height / ch } else { 1.0 };
    ImagePlacement {
        sx,
        sy,
        offset: Point::new(-cx * sx, -cy * sy),
        size: Size::new(natural.width * sx, natural.height * sy),
    }
}

/// Height that preserves the aspect ratio `ratio_w : ratio_h` at `width`.
#[must_use]
pub fn height_for_aspect(width: f64, ratio_w: f64, ratio_h: f64) -> f64 {
    if ratio_w <= 0.0 || ratio_h <= 0.0 {
        return width;
    }
    width / (ratio_w / ratio_h)
}

//! Rendering: paints the collage scene into a `tiny_skia::Pixmap`.
//!
//! This module is the only place that touches pixels. It receives read-only
//! views of the items and the image cache plus a [`SceneTransform`] mapping
//! canvas space to pixmap space, and never mutates application state. The
//! same code paints the on-screen view (zoomed, panned, with selection
//! chrome) and the export (fixed scale, no chrome).
//!
//! Per item, the full source image is drawn through a chain of transforms:
//!
//! ```text
//! view · translate(center) · rotate · translate(-size/2) · flip · placement
//! ```
//!
//! and clipped to the item's box, so only the crop rectangle shows.
#![allow(clippy::cast_possible_truncation)]

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use tiny_skia::{Color, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::geometry::{Point, Size, crop_placement, screen_dist_to_canvas};
use crate::hit::ResizeAnchor;
use crate::loader::ImageCache;
use crate::store::CanvasItem;
use crate::viewport::Viewport;

/// Selection outline color.
const SELECTION_RGBA: (u8, u8, u8, u8) = (59, 130, 246, 255);
/// Outline color for a selected but locked item.
const LOCKED_RGBA: (u8, u8, u8, u8) = (148, 163, 184, 255);
/// Selection outline width in screen pixels.
const SELECTION_STROKE_PX: f64 = 1.5;

/// Error raised while painting the scene.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An item refers to an image that is not in the cache.
    #[error("image not loaded: {0}")]
    MissingImage(String),
    /// The clip mask could not be allocated.
    #[error("failed to allocate {width}x{height} clip mask")]
    Mask { width: u32, height: u32 },
}

/// Uniform scale plus translation from canvas space to pixmap pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub scale: f64,
    pub offset: Point,
}

impl SceneTransform {
    /// Canvas pixels scaled by `scale`, anchored at the pixmap origin.
    #[must_use]
    pub fn scaled(scale: f64) -> Self {
        Self { scale, offset: Point::default() }
    }

    /// The on-screen mapping for `viewport` on a backing store with device pixel ratio `dpr`.
    #[must_use]
    pub fn for_viewport(viewport: &Viewport, dpr: f64) -> Self {
        Self {
            scale: viewport.zoom * dpr,
            offset: Point::new(viewport.offset.x * dpr, viewport.offset.y * dpr),
        }
    }

    #[must_use]
    pub fn to_transform(self) -> Transform {
        Transform::from_row(
            self.scale as f32,
            0.0,
            0.0,
            self.scale as f32,
            self.offset.x as f32,
            self.offset.y as f32,
        )
    }
}

/// Fill the logical canvas area with opaque white.
pub fn paint_canvas_background(pixmap: &mut Pixmap, canvas: Size, view: SceneTransform) {
    let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, canvas.width as f32, canvas.height as f32) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    pixmap.fill_rect(rect, &paint, view.to_transform(), None);
}

/// Paint `items` (already sorted bottom to top) and, if given, the selection chrome for `selected`.
///
/// Hidden items are skipped.
///
/// # Errors
///
/// Returns [`RenderError::MissingImage`] if a visible item's image is not cached, or
/// [`RenderError::Mask`] if a clip mask cannot be allocated.
pub fn paint_scene(
    pixmap: &mut Pixmap,
    items: &[&CanvasItem],
    cache: &ImageCache,
    view: SceneTransform,
    selected: Option<&CanvasItem>,
) -> Result<(), RenderError> {
    for item in items.iter().filter(|item| item.visible) {
        paint_item(pixmap, item, cache, view)?;
    }
    if let Some(item) = selected.filter(|item| item.visible) {
        paint_selection(pixmap, item, view);
    }
    Ok(())
}

/// Transform from the item's local box `[0, w] x [0, h]` to pixmap space.
#[must_use]
pub fn item_box_transform(item: &CanvasItem, view: SceneTransform) -> Transform {
    let center = item.bounds().center();
    view.to_transform()
        .pre_translate(center.x as f32, center.y as f32)
        .pre_rotate(item.rotation as f32)
        .pre_translate((-item.width * 0.5) as f32, (-item.height * 0.5) as f32)
}

fn paint_item(pixmap: &mut Pixmap, item: &CanvasItem, cache: &ImageCache, view: SceneTransform) -> Result<(), RenderError> {
    let image = cache
        .get(&item.image_url)
        .ok_or_else(|| RenderError::MissingImage(item.image_url.clone()))?;
    let Some(clip) = tiny_skia::Rect::from_xywh(0.0, 0.0, item.width as f32, item.height as f32) else {
        // Zero-area item: nothing to draw.
        return Ok(());
    };

    let box_transform = item_box_transform(item, view);

    let (width, height) = (pixmap.width(), pixmap.height());
    let mut mask = Mask::new(width, height).ok_or(RenderError::Mask { width, height })?;
    mask.fill_path(&PathBuilder::from_rect(clip), FillRule::Winding, true, box_transform);

    let mut flipped = box_transform;
    if item.flip_x {
        flipped = flipped.pre_translate(item.width as f32, 0.0).pre_scale(-1.0, 1.0);
    }
    if item.flip_y {
        flipped = flipped.pre_translate(0.0, item.height as f32).pre_scale(1.0, -1.0);
    }

    let placement = crop_placement(Size::new(item.width, item.height), image.natural_size(), item.crop.as_ref());
    let image_transform = flipped
        .pre_translate(placement.offset.x as f32, placement.offset.y as f32)
        .pre_scale(placement.sx as f32, placement.sy as f32);

    let paint = PixmapPaint { opacity: item.opacity as f32, quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    pixmap.draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, image_transform, Some(&mask));
    Ok(())
}

/// Outline plus resize and rotate handles, sized in screen pixels.
fn paint_selection(pixmap: &mut Pixmap, item: &CanvasItem, view: SceneTransform) {
    let transform = item_box_transform(item, view);
    let px = screen_dist_to_canvas(1.0, view.scale.max(f64::EPSILON));
    let (r, g, b, a) = if item.locked { LOCKED_RGBA } else { SELECTION_RGBA };

    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let stroke = Stroke { width: (SELECTION_STROKE_PX * px) as f32, ..Stroke::default() };
    if let Some(outline) = tiny_skia::Rect::from_xywh(0.0, 0.0, item.width as f32, item.height as f32) {
        pixmap.stroke_path(&PathBuilder::from_rect(outline), &paint, &stroke, transform, None);
    }

    if item.locked {
        return;
    }

    let half = HANDLE_RADIUS_PX * 0.5 * px;
    for anchor in ResizeAnchor::ALL {
        let (ux, uy) = anchor.unit_position();
        let cx = item.width * ux;
        let cy = item.height * uy;
        if let Some(handle) =
            tiny_skia::Rect::from_xywh((cx - half) as f32, (cy - half) as f32, (half * 2.0) as f32, (half * 2.0) as f32)
        {
            pixmap.fill_path(&PathBuilder::from_rect(handle), &paint, FillRule::Winding, transform, None);
        }
    }

    let rotate_y = -ROTATE_HANDLE_OFFSET_PX * px;
    if let Some(knob) = PathBuilder::from_circle((item.width * 0.5) as f32, rotate_y as f32, half as f32) {
        pixmap.fill_path(&knob, &paint, FillRule::Winding, transform, None);
    }
}

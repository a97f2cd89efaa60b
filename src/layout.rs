//! JSON layout files: which source items to place and how to edit them.
//!
//! ```json
//! {
//!   "items": [
//!     { "source": { "id": "42", "name": "Denim jacket", "image_url": "jacket.png" },
//!       "x": 40, "y": 60, "rotation": 15, "opacity": 0.9,
//!       "crop": { "set": { "x": 0, "y": 0, "width": 300, "height": 300 } } }
//!   ]
//! }
//! ```
//!
//! Every field besides `source` is optional and applied on top of the default
//! placement (centered, base width, original aspect ratio).

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use collage::consts::{MAX_OPACITY, MIN_OPACITY};
use collage::crop;
use collage::engine::Engine;
use collage::geometry::height_for_aspect;
use collage::loader::{ImageSource, load_source};
use collage::store::{CropUpdate, ItemId, PartialCanvasItem, SourceItem};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    pub items: Vec<Placement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    pub source: SourceItem,
    #[serde(flatten)]
    pub edits: PartialCanvasItem,
}

/// What happened to each placement.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    pub placed: Vec<ItemId>,
    /// Source ids whose image was missing or failed to load.
    pub skipped: Vec<String>,
}

/// Load and place every item in `layout`, in order, then apply its edits as one history entry.
pub async fn compose(engine: &mut Engine, layout: &Layout, images: &dyn ImageSource) -> ComposeReport {
    let mut report = ComposeReport::default();
    for placement in &layout.items {
        let Some((url, image)) = load_source(&placement.source, images).await else {
            report.skipped.push(placement.source.id.clone());
            continue;
        };
        engine.place_loaded(&placement.source, &url, image);
        let Some(id) = engine.selection() else {
            continue;
        };
        let edits = normalize_edits(engine, &id, &placement.edits);
        if edits != PartialCanvasItem::default() {
            engine.store.update_item(&id, &edits, true);
        }
        report.placed.push(id);
    }
    engine.select(None);
    report
}

/// Clamp opacity, repair the crop rectangle, and refit the height to a new crop when none is given.
fn normalize_edits(engine: &Engine, id: &ItemId, edits: &PartialCanvasItem) -> PartialCanvasItem {
    let mut edits = edits.clone();
    edits.opacity = edits.opacity.map(|o| o.clamp(MIN_OPACITY, MAX_OPACITY));
    let Some(item) = engine.item(id) else {
        return edits;
    };
    if let Some(CropUpdate::Set(rect)) = edits.crop {
        let rect = crop::sanitize(rect, item.natural_size());
        edits.crop = Some(CropUpdate::Set(rect));
        if edits.height.is_none() {
            let width = edits.width.unwrap_or(item.width);
            edits.height = Some(height_for_aspect(width, rect.width, rect.height));
        }
    }
    edits
}

//! Flatten the canvas to a single PNG and hand it to the host.
//!
//! The export always renders at the logical canvas size times a fixed
//! supersampling factor on opaque white. Zoom and pan are a viewing
//! convenience and never reach this module. Selection chrome is never drawn
//! here; the engine also clears the selection before exporting so the view
//! the user sees afterwards matches the file.
//!
//! Failures are caught at this boundary and leave the canvas untouched.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use async_trait::async_trait;
use tiny_skia::{Color, Pixmap};

use crate::consts::EXPORT_FILE_NAME;
use crate::geometry::Size;
use crate::loader::ImageCache;
use crate::render::{self, RenderError, SceneTransform};
use crate::store::CanvasItem;

/// Error returned by the export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A visible item's image does not permit cross-origin pixel access.
    #[error("image {url} does not allow cross-origin access")]
    CrossOrigin { url: String },
    /// Painting the scene failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The output surface could not be allocated.
    #[error("failed to allocate {width}x{height} export surface")]
    Surface { width: u32, height: u32 },
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    /// Another save has not finished yet.
    #[error("a save is already in progress")]
    InProgress,
    /// The host's save function reported an error.
    #[error("save failed: {0}")]
    Sink(String),
}

impl ExportError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CrossOrigin { .. } | Self::Render(RenderError::MissingImage(_)) => {
                "Could not export the collage. Ensure all images allow cross-origin access, or remove the image that \
                 fails to load and try again."
                    .to_owned()
            }
            Self::InProgress => "The collage is already being saved.".to_owned(),
            Self::Sink(reason) => format!("Could not save the collage: {reason}"),
            Self::Render(_) | Self::Surface { .. } | Self::Encode(_) => {
                "Could not export the collage. Please try again.".to_owned()
            }
        }
    }
}

/// The flattened collage handed to the save sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

/// Host-provided destination for an exported collage (e.g. an upload endpoint).
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist the artifact. Called exactly once per save action.
    async fn save(&self, artifact: ExportArtifact) -> Result<(), ExportError>;
}

/// Pixel size of the export for a logical canvas at `scale`.
#[must_use]
pub fn export_size(canvas: Size, scale: f64) -> (u32, u32) {
    let width = (canvas.width * scale).round().max(1.0) as u32;
    let height = (canvas.height * scale).round().max(1.0) as u32;
    (width, height)
}

/// Render `items` (sorted bottom to top) onto a white surface of `canvas * scale` pixels.
///
/// # Errors
///
/// Returns [`ExportError::CrossOrigin`] if a visible item's image forbids export, and the
/// render, allocation, or encoding errors otherwise.
pub fn rasterize_pixmap(items: &[&CanvasItem], cache: &ImageCache, canvas: Size, scale: f64) -> Result<Pixmap, ExportError> {
    for item in items.iter().filter(|item| item.visible) {
        match cache.get(&item.image_url) {
            Some(image) if !image.export_allowed() => {
                return Err(ExportError::CrossOrigin { url: item.image_url.clone() });
            }
            Some(_) => {}
            None => return Err(RenderError::MissingImage(item.image_url.clone()).into()),
        }
    }

    let (width, height) = export_size(canvas, scale);
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
    pixmap.fill(Color::WHITE);
    render::paint_scene(&mut pixmap, items, cache, SceneTransform::scaled(scale), None)?;
    Ok(pixmap)
}

/// Render and PNG-encode the collage.
///
/// # Errors
///
/// See [`rasterize_pixmap`]; additionally [`ExportError::Encode`] if PNG encoding fails.
pub fn rasterize(items: &[&CanvasItem], cache: &ImageCache, canvas: Size, scale: f64) -> Result<ExportArtifact, ExportError> {
    let pixmap = rasterize_pixmap(items, cache, canvas, scale)?;
    let png = pixmap.encode_png().map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(ExportArtifact { png, width: pixmap.width(), height: pixmap.height(), file_name: EXPORT_FILE_NAME.to_owned() })
}

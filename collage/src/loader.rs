//! Source image loading and the decoded-image cache.
//!
//! The host supplies an [`ImageSource`] that turns an image URL into decoded
//! pixels. Loading is the only suspension point when adding an item: the
//! engine is not borrowed while an image is in flight, so other interactions
//! stay responsive (see [`crate::engine::Engine::place_loaded`]).
//!
//! A load failure is an expected input condition, not an error the user sees:
//! [`load_source`] logs it and returns `None`, and no item is created.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tiny_skia::{IntSize, Pixmap};

use crate::geometry::Size;
use crate::store::SourceItem;

/// Error returned while loading or decoding a source image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The image bytes could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// The bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// The image has a zero dimension or its buffer does not match its size.
    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// No image registered under this URL.
    #[error("no image registered for {0}")]
    NotFound(String),
}

/// A decoded source image.
///
/// `export_allowed` mirrors a browser's cross-origin permission: an image
/// without it can be displayed but taints any raster export that includes it.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pixmap: Arc<Pixmap>,
    export_allowed: bool,
}

impl LoadedImage {
    #[must_use]
    pub fn new(pixmap: Pixmap, export_allowed: bool) -> Self {
        Self { pixmap: Arc::new(pixmap), export_allowed }
    }

    /// The image's true pixel dimensions.
    #[must_use]
    pub fn natural_size(&self) -> Size {
        Size::new(f64::from(self.pixmap.width()), f64::from(self.pixmap.height()))
    }

    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    #[must_use]
    pub fn export_allowed(&self) -> bool {
        self.export_allowed
    }
}

/// Host-provided loader from image URL to decoded pixels.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch and decode the image at `url`.
    async fn load(&self, url: &str) -> Result<LoadedImage, LoadError>;
}

/// An [`ImageSource`] backed by images registered up front.
#[derive(Debug, Default, Clone)]
pub struct MemoryImageSource {
    images: HashMap<String, LoadedImage>,
}

impl MemoryImageSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, image: LoadedImage) {
        self.images.insert(url.into(), image);
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn load(&self, url: &str) -> Result<LoadedImage, LoadError> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(url.to_owned()))
    }
}

/// Load the image for `source`, or `None` if it has no URL or fails to load.
pub async fn load_source(source: &SourceItem, loader: &dyn ImageSource) -> Option<(String, LoadedImage)> {
    let Some(url) = source.image_url.as_deref().filter(|url| !url.is_empty()) else {
        tracing::debug!(source_id = %source.id, "source item has no image; skipping");
        return None;
    };
    match loader.load(url).await {
        Ok(image) => Some((url.to_owned(), image)),
        Err(e) => {
            tracing::warn!(source_id = %source.id, %url, error = %e, "image load failed; skipping");
            None
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP) into a premultiplied pixmap.
///
/// # Errors
///
/// Returns [`LoadError::Decode`] for unsupported or corrupt data and
/// [`LoadError::InvalidDimensions`] for empty images.
pub fn decode_image(bytes: &[u8]) -> Result<Pixmap, LoadError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    pixmap_from_rgba(width, height, rgba.into_raw())
}

/// Build a pixmap from straight (non-premultiplied) RGBA bytes.
///
/// # Errors
///
/// Returns [`LoadError::InvalidDimensions`] if either side is zero or the buffer length
/// does not match `width * height * 4`.
pub fn pixmap_from_rgba(width: u32, height: u32, mut rgba: Vec<u8>) -> Result<Pixmap, LoadError> {
    for px in rgba.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for channel in &mut px[..3] {
            let premultiplied = (u16::from(*channel) * alpha + 127) / 255;
            *channel = u8::try_from(premultiplied).unwrap_or(u8::MAX);
        }
    }
    IntSize::from_wh(width, height)
        .and_then(|size| Pixmap::from_vec(rgba, size))
        .ok_or(LoadError::InvalidDimensions { width, height })
}

/// Decoded images keyed by URL, shared by every item placed from the same source.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    images: HashMap<String, LoadedImage>,
}

impl ImageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, image: LoadedImage) {
        self.images.insert(url.into(), image);
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&LoadedImage> {
        self.images.get(url)
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

//! File-system and HTTP implementations of the engine's host traits.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use collage::export::{ExportArtifact, ExportError, SaveSink};
use collage::loader::{ImageSource, LoadError, LoadedImage, decode_image};

/// Loads `http(s)://` URLs over the network and everything else from disk.
///
/// Relative paths resolve against `base_dir` (the layout file's directory).
pub struct FsImageSource {
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl FsImageSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), client: reqwest::Client::new() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path) }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_err = |reason: String| LoadError::Fetch { url: url.to_owned(), reason };
        let response = self.client.get(url).send().await.map_err(|e| fetch_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status.as_u16())));
        }
        let bytes = response.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageSource for FsImageSource {
    async fn load(&self, url: &str) -> Result<LoadedImage, LoadError> {
        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url).await?
        } else {
            let path = self.resolve(url);
            tokio::fs::read(&path)
                .await
                .map_err(|e| LoadError::Fetch { url: path.display().to_string(), reason: e.to_string() })?
        };
        let pixmap = decode_image(&bytes)?;
        tracing::debug!(%url, width = pixmap.width(), height = pixmap.height(), "image loaded");
        // Everything the CLI can read, it may also write out.
        Ok(LoadedImage::new(pixmap, true))
    }
}

/// Writes the exported PNG to a fixed path.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SaveSink for FileSink {
    async fn save(&self, artifact: ExportArtifact) -> Result<(), ExportError> {
        tokio::fs::write(&self.path, &artifact.png)
            .await
            .map_err(|e| ExportError::Sink(format!("{}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), width = artifact.width, height = artifact.height, "collage written");
        Ok(())
    }
}

//! Image sources for export.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use moleskine_core::storage::{BoxFuture, MemoryStorage, StorageError, StorageResult};
use std::path::PathBuf;

/// Resolves an image URL to encoded bytes (PNG, JPEG, WebP).
///
/// `data:` URLs never reach a source; [`load_image`] decodes them inline.
pub trait ImageSource {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>>;
}

/// Resolves nothing; only inline `data:` images can be drawn.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineOnly;

impl ImageSource for InlineOnly {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>> {
        Box::pin(async move { Err(StorageError::NotFound(url.to_string())) })
    }
}

/// Reads `file://` URLs and plain paths from disk. Relative paths are
/// resolved against `base` when one is set.
#[derive(Debug, Default, Clone)]
pub struct LocalFiles {
    pub base: Option<PathBuf>,
}

impl LocalFiles {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        if url.contains("://") && !url.starts_with("file://") {
            return None;
        }
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.base {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path),
        }
    }
}

impl ImageSource for LocalFiles {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>> {
        Box::pin(async move {
            let path = self
                .resolve(url)
                .ok_or_else(|| StorageError::NotFound(url.to_string()))?;
            std::fs::read(&path).map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))
        })
    }
}

/// Serves blobs uploaded to the same memory store (`memory://` URLs).
impl ImageSource for MemoryStorage {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>> {
        Box::pin(async move {
            url.strip_prefix("memory://")
                .and_then(|path| self.blob(path))
                .ok_or_else(|| StorageError::NotFound(url.to_string()))
        })
    }
}

pub fn is_data_url(url: &str) -> bool {
    url.starts_with("data:")
}

/// Payload of a `data:` URL. Base64 payloads are decoded; anything else is
/// returned as raw bytes. `None` for other URLs or invalid base64.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if meta.ends_with(";base64") {
        STANDARD.decode(payload.trim()).ok()
    } else {
        Some(payload.as_bytes().to_vec())
    }
}

/// Fetch and decode one image.
pub async fn load_image(source: &dyn ImageSource, url: &str) -> Result<RgbaImage, String> {
    let bytes = if is_data_url(url) {
        decode_data_url(url).ok_or_else(|| "malformed data URL".to_string())?
    } else {
        source.fetch(url).await.map_err(|e| e.to_string())?
    };
    image::load_from_memory(&bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| e.to_string())
}

//! Export and import errors.

use thiserror::Error;

/// Errors that abort an export. A single undecodable image never does;
/// it is skipped instead.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Invalid page size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PDF assembly failed: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while importing a PDF.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid PDF: {0}")]
    Pdf(String),
    #[error("Rasterization failed: {0}")]
    Rasterize(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

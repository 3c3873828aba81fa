//! Moleskine Render Library
//!
//! Turns notebook pages into a flat list of [`DrawCommand`]s and executes
//! them: into an RGBA raster for export (text included), or into anything
//! else implementing [`CommandExecutor`]. Also assembles multi-page PDF
//! exports and converts imported PDF pages into background rasters.

mod commands;
mod error;
mod export;
mod import;
mod raster;
mod source;
mod template;
mod text;

pub use commands::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, DrawCommand, arrow_heads, element_commands, page_commands};
pub use error::{ExportError, ImportError};
pub use export::{ExportedDocument, RenderedPage, encode_png, export_notebook, export_page_png, render_page};
pub use import::{PageRasterizer, import_pdf, pdf_page_count, png_data_url};
pub use raster::{CommandExecutor, RasterExecutor};
pub use source::{ImageSource, InlineOnly, LocalFiles, decode_data_url, is_data_url, load_image};
pub use template::{
    CORNELL_CUE_X, CORNELL_SUMMARY_HEIGHT, DOT_PITCH, DOT_RADIUS, GRID_PITCH, LINE_PITCH, LINES_TOP,
    template_commands,
};

#[cfg(feature = "pdfium")]
pub use import::PdfiumRasterizer;

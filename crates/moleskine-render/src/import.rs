//! PDF import: one PNG raster per source page.

use crate::error::ImportError;
use crate::export::encode_png;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use lopdf::Document;
use moleskine_core::storage::BoxFuture;

/// Turns every page of a PDF into pixels, in page order.
pub trait PageRasterizer {
    fn rasterize<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<Vec<RgbaImage>, ImportError>>;
}

/// Number of pages in a PDF.
pub fn pdf_page_count(bytes: &[u8]) -> Result<usize, ImportError> {
    let doc = Document::load_mem(bytes).map_err(|e| ImportError::Pdf(e.to_string()))?;
    Ok(doc.get_pages().len())
}

/// PNG `data:` URL for a raster.
pub fn png_data_url(image: &RgbaImage) -> Result<String, ImportError> {
    let png = encode_png(image).map_err(|e| ImportError::Encode(e.to_string()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Rasterize `bytes` and return one PNG data URL per page, ready for
/// `Notebook::append_imported_pages`.
pub async fn import_pdf(bytes: &[u8], rasterizer: &dyn PageRasterizer) -> Result<Vec<String>, ImportError> {
    let expected = pdf_page_count(bytes)?;
    if expected == 0 {
        return Err(ImportError::Pdf("document has no pages".to_string()));
    }
    let rasters = rasterizer.rasterize(bytes).await?;
    if rasters.len() != expected {
        log::warn!("PDF declares {expected} page(s) but {} were rasterized", rasters.len());
    }
    let urls = rasters.iter().map(png_data_url).collect::<Result<Vec<_>, _>>()?;
    log::info!("Imported {} page(s)", urls.len());
    Ok(urls)
}

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::{BoxFuture, ImportError, PageRasterizer, RgbaImage};
    use pdfium_render::prelude::*;
    use std::path::Path;

    /// Rasterizer backed by the pdfium library.
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
        target_width: u32,
    }

    impl PdfiumRasterizer {
        /// Bind to the system pdfium library; pages are rendered `target_width` pixels wide.
        pub fn new(target_width: u32) -> Result<Self, ImportError> {
            let bindings = Pdfium::bind_to_system_library()
                .map_err(|e| ImportError::Rasterize(format!("Failed to load pdfium: {e:?}")))?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
                target_width,
            })
        }

        /// Bind to a pdfium library at an explicit path.
        pub fn from_library(path: &Path, target_width: u32) -> Result<Self, ImportError> {
            let bindings = Pdfium::bind_to_library(path)
                .map_err(|e| ImportError::Rasterize(format!("Failed to load {}: {e:?}", path.display())))?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
                target_width,
            })
        }

        fn render_all(&self, bytes: &[u8]) -> Result<Vec<RgbaImage>, ImportError> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(bytes, None)
                .map_err(|e| ImportError::Pdf(format!("{e:?}")))?;
            let config = PdfRenderConfig::new().set_target_width(self.target_width as i32);

            let mut rasters = Vec::new();
            for (index, page) in document.pages().iter().enumerate() {
                let bitmap = page
                    .render_with_config(&config)
                    .map_err(|e| ImportError::Rasterize(format!("page {}: {e:?}", index + 1)))?;
                let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
                let raster = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                    .ok_or_else(|| ImportError::Rasterize(format!("page {}: bitmap size mismatch", index + 1)))?;
                rasters.push(raster);
            }
            Ok(rasters)
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<Vec<RgbaImage>, ImportError>> {
            Box::pin(async move { self.render_all(bytes) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_notebook;
    use crate::source::{InlineOnly, decode_data_url};
    use image::Rgba;
    use moleskine_core::{Page, Template};

    /// Produces one solid raster per page it was told about.
    struct Solid(usize);

    impl PageRasterizer for Solid {
        fn rasterize<'a>(&'a self, _bytes: &'a [u8]) -> BoxFuture<'a, Result<Vec<RgbaImage>, ImportError>> {
            let pages = (0..self.0)
                .map(|i| RgbaImage::from_pixel(8, 5, Rgba([i as u8, 0, 0, 255])))
                .collect();
            Box::pin(async move { Ok(pages) })
        }
    }

    struct Failing;

    impl PageRasterizer for Failing {
        fn rasterize<'a>(&'a self, _bytes: &'a [u8]) -> BoxFuture<'a, Result<Vec<RgbaImage>, ImportError>> {
            Box::pin(async { Err(ImportError::Rasterize("boom".into())) })
        }
    }

    fn two_page_pdf() -> Vec<u8> {
        let pages = vec![Page::blank(Template::None), Page::blank(Template::Lines)];
        pollster::block_on(export_notebook(&pages, 80, 50, &InlineOnly))
            .unwrap()
            .bytes
    }

    #[test]
    fn test_import_yields_png_data_urls() {
        let pdf = two_page_pdf();
        assert_eq!(pdf_page_count(&pdf).unwrap(), 2);

        let urls = pollster::block_on(import_pdf(&pdf, &Solid(2))).unwrap();
        assert_eq!(urls.len(), 2);
        for (i, url) in urls.iter().enumerate() {
            assert!(url.starts_with("data:image/png;base64,"));
            let decoded = image::load_from_memory(&decode_data_url(url).unwrap()).unwrap().to_rgba8();
            assert_eq!(decoded.dimensions(), (8, 5));
            assert_eq!(decoded.get_pixel(0, 0).0, [i as u8, 0, 0, 255]);
        }
    }

    #[test]
    fn test_import_rejects_non_pdf() {
        let result = pollster::block_on(import_pdf(b"definitely not a pdf", &Solid(1)));
        assert!(matches!(result, Err(ImportError::Pdf(_))));
    }

    #[test]
    fn test_rasterizer_failure_propagates() {
        let result = pollster::block_on(import_pdf(&two_page_pdf(), &Failing));
        assert!(matches!(result, Err(ImportError::Rasterize(_))));
    }
}

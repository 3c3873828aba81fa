//! Page rasterization and multi-page PDF assembly.

use crate::commands::{DrawCommand, page_commands};
use crate::error::ExportError;
use crate::raster::{CommandExecutor, RasterExecutor};
use crate::source::{ImageSource, load_image};
use image::RgbaImage;
use kurbo::Size;
use lopdf::content::{Content, Operation};
use lopdf::xref::XrefType;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use moleskine_core::Page;
use std::collections::HashSet;

/// One page flattened to pixels.
#[derive(Debug)]
pub struct RenderedPage {
    pub raster: RgbaImage,
    /// Images that could not be fetched or decoded.
    pub skipped_images: usize,
}

/// A finished PDF.
#[derive(Debug)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub skipped_images: usize,
}

fn short_key(key: &str) -> String {
    const MAX: usize = 48;
    if key.chars().count() > MAX {
        format!("{}...", key.chars().take(MAX).collect::<String>())
    } else {
        key.to_string()
    }
}

/// Render `page` at `width x height` canvas units. Every image is awaited
/// before compositing; one that fails to load is skipped.
pub async fn render_page(
    page: &Page,
    width: u32,
    height: u32,
    source: &dyn ImageSource,
) -> Result<RenderedPage, ExportError> {
    let commands = page_commands(page, Size::new(width as f64, height as f64));
    let mut executor = RasterExecutor::new(width, height)?;
    let mut failed = HashSet::new();

    for key in commands.iter().filter_map(DrawCommand::image_key) {
        if executor.has_image(key) || failed.contains(key) {
            continue;
        }
        match load_image(source, key).await {
            Ok(image) => executor.insert_image(key, &image),
            Err(e) => {
                log::warn!("Skipping image {} on page {}: {e}", short_key(key), page.id);
                failed.insert(key);
            }
        }
    }

    executor.execute_all(&commands);
    let skipped_images = failed.len();
    Ok(RenderedPage {
        raster: executor.finish(),
        skipped_images,
    })
}

/// Encode an RGBA raster as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, png::EncodingError> {
    let (width, height) = image.dimensions();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Render a single page to PNG bytes.
pub async fn export_page_png(
    page: &Page,
    width: u32,
    height: u32,
    source: &dyn ImageSource,
) -> Result<Vec<u8>, ExportError> {
    let rendered = render_page(page, width, height, source).await?;
    encode_png(&rendered.raster).map_err(|e| ExportError::Encode(e.to_string()))
}

/// Export `pages` as one PDF, one landscape `width x height` page per
/// notebook page, in order. Pages are rendered one at a time.
pub async fn export_notebook(
    pages: &[Page],
    width: u32,
    height: u32,
    source: &dyn ImageSource,
) -> Result<ExportedDocument, ExportError> {
    if pages.is_empty() {
        return Err(ExportError::Pdf("nothing to export".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(ExportError::InvalidSize { width, height });
    }

    let mut doc = Document::with_version("1.4");
    doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;

    let id_pages = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    let mut skipped_images = 0;
    for (index, page) in pages.iter().enumerate() {
        let rendered = render_page(page, width, height, source).await?;
        skipped_images += rendered.skipped_images;
        let id_page = add_pdf_page(&mut doc, id_pages, &rendered.raster)?;
        kids.push(id_page.into());
        log::debug!("Exported page {}/{}", index + 1, pages.len());
    }

    doc.set_object(
        id_pages,
        dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
        },
    );

    let id_catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => id_pages,
    });
    doc.trailer.set("Root", id_catalog);

    let date = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let id_info = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("Moleskine"),
        "CreationDate" => Object::string_literal(date.clone()),
        "ModDate" => Object::string_literal(date),
    });
    doc.trailer.set("Info", id_info);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| ExportError::Pdf(e.to_string()))?;
    log::info!(
        "Exported {} page(s), {} bytes, {skipped_images} image(s) skipped",
        pages.len(),
        bytes.len()
    );
    Ok(ExportedDocument {
        bytes,
        page_count: pages.len(),
        skipped_images,
    })
}

/// A page showing `raster` stretched over its media box.
fn add_pdf_page(doc: &mut Document, id_pages: ObjectId, raster: &RgbaImage) -> Result<ObjectId, ExportError> {
    let (w, h) = raster.dimensions();
    let id_image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w as i64,
            "Height" => h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        flatten_to_rgb(raster),
    ));

    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                (w as f32).into(),
                0.into(),
                0.into(),
                (h as f32).into(),
                0.into(),
                0.into(),
            ],
        ),
        Operation::new("Do", vec!["Im0".into()]),
        Operation::new("Q", vec![]),
    ];

    let content = Content { operations }
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let id_content = doc.add_object(Stream::new(dictionary! {}, content));
    let id_resources = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => id_image },
    });
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => id_pages,
        "Contents" => id_content,
        "Resources" => id_resources,
    }))
}

/// Drop alpha, compositing over white.
fn flatten_to_rgb(raster: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(raster.as_raw().len() / 4 * 3);
    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for c in [r, g, b] {
            out.push(((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8);
        }
    }
    out
}

//! Editing, export and import wired together.

use image::{Rgba, RgbaImage};
use kurbo::{Point, Size};
use moleskine_core::input::PointerEvent;
use moleskine_core::storage::{BoxFuture, MemoryStorage};
use moleskine_core::{Editor, EditorConfig, Notebook, ToolKind};
use moleskine_render::{
    ImportError, InlineOnly, PageRasterizer, encode_png, export_notebook, import_pdf, render_page,
};

const ORIGIN: Point = Point::new(0.0, 0.0);

fn editor() -> Editor {
    let config = EditorConfig {
        canvas_width: 200.0,
        canvas_height: 120.0,
        fit_padding: 0.0,
        ..EditorConfig::default()
    };
    let size = config.canvas_size();
    let mut editor = Editor::new(Notebook::new("Pipeline"), config);
    editor.set_container(ORIGIN, size);
    editor
}

fn draw(editor: &mut Editor, points: &[(f64, f64)]) {
    let points: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    editor.handle_pointer(PointerEvent::down(points[0]));
    for &p in &points[1..] {
        editor.handle_pointer(PointerEvent::moved(p));
    }
    editor.handle_pointer(PointerEvent::up(points[points.len() - 1]));
}

struct Blank;

impl PageRasterizer for Blank {
    fn rasterize<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<Vec<RgbaImage>, ImportError>> {
        Box::pin(async move {
            let count = moleskine_render::pdf_page_count(bytes)?;
            Ok((0..count)
                .map(|_| RgbaImage::from_pixel(20, 12, Rgba([240, 240, 240, 255])))
                .collect())
        })
    }
}

#[test]
fn uploaded_image_and_strokes_reach_the_raster() {
    let store = MemoryStorage::new();
    let mut e = editor();

    let png = encode_png(&RgbaImage::from_pixel(6, 4, Rgba([0, 0, 255, 255]))).unwrap();
    pollster::block_on(e.upload_image(&store, "blue.png", &png)).unwrap();

    e.set_tool(ToolKind::Rectangle);
    draw(&mut e, &[(10.0, 10.0), (60.0, 50.0)]);

    let page = e.notebook.current_page();
    assert_eq!(page.elements().len(), 2);
    let rendered = pollster::block_on(render_page(page, 200, 120, &store)).unwrap();
    assert_eq!(rendered.skipped_images, 0);
    // The inserted image is centred on the page and covers it.
    assert_eq!(rendered.raster.get_pixel(100, 60).0, [0, 0, 255, 255]);
    // Rectangle outline on top of it.
    assert_ne!(rendered.raster.get_pixel(10, 30).0, [0, 0, 255, 255]);
}

#[test]
fn export_then_import_appends_background_pages() {
    let mut e = editor();
    draw(&mut e, &[(10.0, 10.0), (20.0, 14.0), (30.0, 20.0)]);
    e.add_page(moleskine_core::Template::Cornell);

    let size = Size::new(200.0, 120.0);
    let doc = pollster::block_on(export_notebook(
        e.notebook.pages(),
        size.width as u32,
        size.height as u32,
        &InlineOnly,
    ))
    .unwrap();
    assert_eq!(doc.page_count, 2);

    let rasters = pollster::block_on(import_pdf(&doc.bytes, &Blank)).unwrap();
    assert_eq!(e.import_pages(rasters, "roundtrip.pdf"), 2);
    assert_eq!(e.notebook.page_count(), 4);
    assert_eq!(e.notebook.current_index(), 2);

    let imported = e.notebook.current_page();
    assert!(imported.elements().is_empty());
    assert_eq!(imported.pdf_source_name.as_deref(), Some("roundtrip.pdf"));
    assert_eq!(imported.pdf_source_page_number, Some(1));

    // The imported raster is drawn as the page background.
    let rendered = pollster::block_on(render_page(imported, 200, 120, &InlineOnly)).unwrap();
    assert_eq!(rendered.skipped_images, 0);
    assert_eq!(rendered.raster.get_pixel(100, 60).0, [240, 240, 240, 255]);
}

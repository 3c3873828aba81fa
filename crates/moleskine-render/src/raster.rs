//! Command executors.
//!
//! [`RasterExecutor`] draws into a tiny-skia [`Pixmap`], one canvas unit per
//! pixel. Text is shaped with parley and filled like any other path.

use crate::commands::DrawCommand;
use crate::error::ExportError;
use crate::text::{TextShaper, placeholder};
use image::RgbaImage;
use kurbo::{BezPath, Ellipse, PathEl, Point, Rect, Shape};
use peniko::Color;
use std::collections::HashMap;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

const PATH_TOLERANCE: f64 = 0.1;
/// Opacity of the box drawn when no font can render a label.
const PLACEHOLDER_OPACITY: f64 = 0.4;

/// Consumer of drawing instructions.
pub trait CommandExecutor {
    fn execute(&mut self, command: &DrawCommand);

    fn execute_all(&mut self, commands: &[DrawCommand]) {
        for command in commands {
            self.execute(command);
        }
    }
}

/// Rasterizes commands 1:1 (one canvas unit per pixel).
pub struct RasterExecutor {
    pixmap: Pixmap,
    images: HashMap<String, Pixmap>,
    /// Created on the first label; loading the font collection is not free.
    shaper: Option<TextShaper>,
}

impl RasterExecutor {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            images: HashMap::new(),
            shaper: None,
        })
    }

    /// Make a decoded image available to `Image` commands with this key.
    pub fn insert_image(&mut self, key: impl Into<String>, image: &RgbaImage) {
        let key = key.into();
        match to_pixmap(image) {
            Some(pixmap) => {
                self.images.insert(key, pixmap);
            }
            None => log::debug!("Empty image for {key}; ignoring"),
        }
    }

    pub fn has_image(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The surface as straight-alpha RGBA.
    pub fn finish(self) -> RgbaImage {
        let mut out = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        out
    }

    fn fill_path(&mut self, path: &BezPath, color: Color, opacity: f64) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        self.pixmap
            .fill_path(&path, &paint(color, opacity), FillRule::Winding, Transform::identity(), None);
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, opacity: f64) {
        if width <= 0.0 {
            return;
        }
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color, opacity), &stroke, Transform::identity(), None);
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color) {
        if text.trim().is_empty() || size <= 0.0 {
            return;
        }
        let shaper = self.shaper.get_or_insert_with(TextShaper::new);
        match shaper.outline(text, size, origin) {
            Some(path) => self.fill_path(&path, color, 1.0),
            None => {
                log::debug!("No font available for {text:?}; drawing a placeholder");
                let rect = placeholder(text, size, origin);
                self.fill_path(&rect.to_path(PATH_TOLERANCE), color, PLACEHOLDER_OPACITY);
            }
        }
    }

    fn draw_image(&mut self, key: &str, rect: Rect) {
        let Some(source) = self.images.get(key) else {
            log::debug!("No decoded image for {key}; skipping");
            return;
        };
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let transform = Transform::from_row(
            (rect.width() / source.width() as f64) as f32,
            0.0,
            0.0,
            (rect.height() / source.height() as f64) as f32,
            rect.x0 as f32,
            rect.y0 as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }
}

impl CommandExecutor for RasterExecutor {
    fn execute(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => {
                let rgba = color.to_rgba8();
                self.pixmap
                    .fill(tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a));
            }
            DrawCommand::FillPath { path, color, opacity } => self.fill_path(path, *color, *opacity),
            DrawCommand::StrokePath {
                path,
                color,
                width,
                opacity,
            } => self.stroke_path(path, *color, *width, *opacity),
            DrawCommand::StrokeRect { rect, color, width } => {
                self.stroke_path(&rect.to_path(PATH_TOLERANCE), *color, *width, 1.0)
            }
            DrawCommand::StrokeEllipse { rect, color, width } => {
                let path = Ellipse::from_rect(*rect).to_path(PATH_TOLERANCE);
                self.stroke_path(&path, *color, *width, 1.0)
            }
            DrawCommand::Text {
                origin,
                text,
                size,
                color,
            } => self.draw_text(text, *origin, *size, *color),
            DrawCommand::Image { key, rect } => self.draw_image(key, *rect),
        }
    }
}

fn paint(color: Color, opacity: f64) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, alpha);
    paint.anti_alias = true;
    paint
}

/// `None` for paths with nothing to draw.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c0, c1, p) => builder.cubic_to(
                c0.x as f32,
                c0.y as f32,
                c1.x as f32,
                c1.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Premultiplied copy of a straight-alpha raster.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Color = Color::from_rgba8(255, 255, 255, 255);
    const RED: Color = Color::from_rgba8(255, 0, 0, 255);

    fn surface() -> RasterExecutor {
        let mut exec = RasterExecutor::new(40, 40).unwrap();
        exec.execute(&DrawCommand::Clear(WHITE));
        exec
    }

    fn pixel(exec: &RasterExecutor, x: u32, y: u32) -> [u8; 4] {
        let c = exec.pixmap().pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_zero_size_surface_is_rejected() {
        assert!(matches!(
            RasterExecutor::new(0, 10),
            Err(ExportError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_fill_rect_covers_interior_only() {
        let mut exec = surface();
        exec.execute(&DrawCommand::FillPath {
            path: Rect::new(10.0, 10.0, 20.0, 20.0).to_path(0.1),
            color: RED,
            opacity: 1.0,
        });
        assert_eq!(pixel(&exec, 15, 15), [255, 0, 0, 255]);
        assert_eq!(pixel(&exec, 10, 10), [255, 0, 0, 255]);
        assert_eq!(pixel(&exec, 5, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&exec, 20, 15), [255, 255, 255, 255]);
    }

    #[test]
    fn test_opacity_blends() {
        let mut exec = surface();
        exec.execute(&DrawCommand::FillPath {
            path: Rect::new(0.0, 0.0, 40.0, 40.0).to_path(0.1),
            color: RED,
            opacity: 0.3,
        });
        let [r, g, b, a] = pixel(&exec, 20, 20);
        assert_eq!((r, a), (255, 255));
        assert!((g as i32 - 178).abs() <= 2 && g == b);
    }

    #[test]
    fn test_stroke_overlaps_are_not_double_blended() {
        let mut exec = surface();
        let mut path = BezPath::new();
        path.move_to((5.0, 20.5));
        path.line_to((20.0, 20.5));
        path.line_to((35.0, 20.5));
        exec.execute(&DrawCommand::StrokePath {
            path,
            color: RED,
            width: 6.0,
            opacity: 0.5,
        });
        assert_eq!(pixel(&exec, 20, 20), pixel(&exec, 12, 20));
        assert_eq!(pixel(&exec, 20, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_rect_leaves_center_empty() {
        let mut exec = surface();
        exec.execute(&DrawCommand::StrokeRect {
            rect: Rect::new(5.0, 5.0, 35.0, 35.0),
            color: RED,
            width: 2.0,
        });
        assert_eq!(pixel(&exec, 20, 20), [255, 255, 255, 255]);
        assert_eq!(pixel(&exec, 5, 20), [255, 0, 0, 255]);
    }

    #[test]
    fn test_text_is_drawn_into_the_surface() {
        let mut exec = RasterExecutor::new(200, 60).unwrap();
        exec.execute(&DrawCommand::Clear(WHITE));
        exec.execute(&DrawCommand::Text {
            origin: Point::new(5.0, 45.0),
            text: "WWWW".into(),
            size: 40.0,
            color: RED,
        });
        let image = exec.finish();
        assert!(image.pixels().any(|p| p.0 != [255, 255, 255, 255]));
        // Nothing is drawn above the label's line box.
        assert!((0..200).all(|x| image.get_pixel(x, 0).0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_later_image_covers_earlier_text() {
        let mut exec = RasterExecutor::new(100, 50).unwrap();
        exec.insert_image("blue", &RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        exec.execute_all(&[
            DrawCommand::Clear(WHITE),
            DrawCommand::Text {
                origin: Point::new(5.0, 35.0),
                text: "hidden".into(),
                size: 24.0,
                color: RED,
            },
            DrawCommand::Image {
                key: "blue".into(),
                rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            },
        ]);
        let image = exec.finish();
        assert!(image.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn test_missing_image_is_skipped_and_known_image_is_drawn() {
        let mut exec = surface();
        let rect = Rect::new(10.0, 10.0, 30.0, 30.0);
        exec.execute(&DrawCommand::Image { key: "missing".into(), rect });
        assert_eq!(pixel(&exec, 15, 15), [255, 255, 255, 255]);

        exec.insert_image("blue", &RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        exec.execute(&DrawCommand::Image { key: "blue".into(), rect });
        assert_eq!(pixel(&exec, 15, 15), [0, 0, 255, 255]);
        assert_eq!(pixel(&exec, 5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_paths_outside_surface_are_clipped() {
        let mut exec = surface();
        exec.execute(&DrawCommand::FillPath {
            path: Rect::new(-50.0, -50.0, 100.0, 5.0).to_path(0.1),
            color: RED,
            opacity: 1.0,
        });
        assert_eq!(pixel(&exec, 39, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&exec, 39, 10), [255, 255, 255, 255]);
    }
}

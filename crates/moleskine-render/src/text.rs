//! Text layout with parley. Glyphs are turned into fillable outlines with
//! skrifa so text lands in the raster at its own z-position.

use kurbo::{BezPath, Point, Rect, Vec2};
use moleskine_core::elements::APPROX_GLYPH_WIDTH;
use parley::layout::PositionedLayoutItem;
use parley::{
    Alignment, AlignmentOptions, FontContext, FontFamily, FontStack, GenericFamily, Layout, LayoutContext,
    StyleProperty,
};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};

/// Line advance of the placeholder box, as a multiple of the font size.
const PLACEHOLDER_LINE_HEIGHT: f64 = 1.2;

/// Lays out labels and converts them to outlines.
pub struct TextShaper {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    /// Shaper over the system font collection.
    pub fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Outline of `text` in a sans-serif face, with the first baseline
    /// starting at `origin`. `None` when no font produced a glyph.
    pub fn outline(&mut self, text: &str, size: f64, origin: Point) -> Option<BezPath> {
        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(size as f32));
        builder.push_default(StyleProperty::FontStack(FontStack::Single(FontFamily::Generic(
            GenericFamily::SansSerif,
        ))));
        let mut layout: Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let first_baseline = layout.lines().next()?.metrics().baseline as f64;
        let offset = Vec2::new(origin.x, origin.y - first_baseline);

        let mut path = BezPath::new();
        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let Ok(font_ref) = FontRef::from_index(font.data.data(), font.index) else {
                    log::debug!("Unreadable font in text run; skipping");
                    continue;
                };
                let outlines = font_ref.outline_glyphs();
                for glyph in glyph_run.glyphs() {
                    let baseline = Point::new((x + glyph.x) as f64, (y - glyph.y) as f64) + offset;
                    x += glyph.advance;
                    let Some(outline) = outlines.get(GlyphId::new(glyph.id.into())) else {
                        continue;
                    };
                    let mut pen = GlyphPen {
                        path: &mut path,
                        origin: baseline,
                    };
                    let settings = DrawSettings::unhinted(Size::new(font_size), LocationRef::default());
                    if outline.draw(settings, &mut pen).is_ok() {
                        glyph_count += 1;
                    }
                }
            }
        }
        (glyph_count > 0).then_some(path)
    }
}

/// Box standing in for `text` when no font is available.
pub fn placeholder(text: &str, size: f64, origin: Point) -> Rect {
    let lines = text.lines().count().max(1);
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (longest as f64 * size * APPROX_GLYPH_WIDTH).max(size);
    Rect::new(
        origin.x,
        origin.y - size,
        origin.x + width,
        origin.y - size + lines as f64 * size * PLACEHOLDER_LINE_HEIGHT,
    )
}

/// Writes glyph outlines (y up) into a canvas path (y down).
struct GlyphPen<'a> {
    path: &'a mut BezPath,
    origin: Point,
}

impl GlyphPen<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin.x + x as f64, self.origin.y - y as f64)
    }
}

impl OutlinePen for GlyphPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (c, p) = (self.point(cx0, cy0), self.point(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (c0, c1, p) = (self.point(cx0, cy0), self.point(cx1, cy1), self.point(x, y));
        self.path.curve_to(c0, c1, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_sits_on_baseline() {
        let rect = placeholder("abcd\nef", 10.0, Point::new(5.0, 30.0));
        assert_eq!(rect.x0, 5.0);
        assert_eq!(rect.y0, 20.0);
        assert!((rect.width() - 24.0).abs() < 1e-9);
        assert!((rect.height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_pen_flips_y() {
        let mut path = BezPath::new();
        let mut pen = GlyphPen {
            path: &mut path,
            origin: Point::new(10.0, 50.0),
        };
        pen.move_to(0.0, 0.0);
        pen.line_to(4.0, 8.0);
        pen.close();
        let bbox = kurbo::Shape::bounding_box(&path);
        assert_eq!(bbox, Rect::new(10.0, 42.0, 14.0, 50.0));
    }

    #[test]
    fn test_outline_starts_at_origin_when_a_font_exists() {
        let mut shaper = TextShaper::new();
        // Machines without any system font fall back to the placeholder.
        if let Some(path) = shaper.outline("Hi", 40.0, Point::new(10.0, 60.0)) {
            let bbox = kurbo::Shape::bounding_box(&path);
            assert!(bbox.x0 >= 10.0 - 1.0 && bbox.x1 > bbox.x0);
            assert!(bbox.y1 <= 60.0 + 1.0 && bbox.y0 < 60.0 - 10.0);
        }
    }
}

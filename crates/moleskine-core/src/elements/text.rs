//! Text labels and hyperlinks.
//!
//! Both are anchored at their baseline origin: the box extends upward from
//! `y` by the font size and rightward from `x`.

use super::{ElementId, SerializableColor};
use crate::geometry::rect_contains_inclusive;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Approximate advance of one glyph, as a fraction of the font size.
pub const APPROX_GLYPH_WIDTH: f64 = 0.6;
/// Links render at a fixed size.
pub const LINK_FONT_SIZE: f64 = 16.0;

fn label_box(x: f64, y: f64, text: &str, font_size: f64) -> Rect {
    let width = text.chars().count() as f64 * font_size * APPROX_GLYPH_WIDTH;
    Rect::new(x, y - font_size, x + width, y)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: ElementId,
    pub color: SerializableColor,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

impl TextElement {
    pub fn new(color: SerializableColor, text: String, x: f64, y: f64, font_size: f64) -> Self {
        Self {
            id: ElementId::new(),
            color,
            text,
            x,
            y,
            font_size,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        label_box(self.x, self.y, &self.text, self.font_size)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_inclusive(self.bounds().inflate(tolerance, tolerance), point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkElement {
    pub id: ElementId,
    pub url: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl LinkElement {
    /// An empty label falls back to the URL itself.
    pub fn new(url: String, label: String, x: f64, y: f64) -> Self {
        let label = if label.trim().is_empty() { url.clone() } else { label };
        Self {
            id: ElementId::new(),
            url,
            label,
            x,
            y,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        label_box(self.x, self.y, &self.label, LINK_FONT_SIZE)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_inclusive(self.bounds().inflate(tolerance, tolerance), point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_box_extends_up_from_baseline() {
        let t = TextElement::new(SerializableColor::black(), "hello".into(), 100.0, 200.0, 20.0);
        let b = t.bounds();
        assert_eq!(b, Rect::new(100.0, 180.0, 160.0, 200.0));
        assert!(t.hit_test(Point::new(130.0, 190.0), 0.0));
        assert!(!t.hit_test(Point::new(130.0, 205.0), 0.0));
        assert!(t.hit_test(Point::new(130.0, 205.0), 5.0));
    }

    #[test]
    fn test_link_label_fallback() {
        let l = LinkElement::new("https://example.com".into(), "  ".into(), 0.0, 0.0);
        assert_eq!(l.label, "https://example.com");
        let l = LinkElement::new("https://example.com".into(), "docs".into(), 0.0, 0.0);
        assert_eq!(l.label, "docs");
        assert!((l.bounds().width() - 4.0 * LINK_FONT_SIZE * APPROX_GLYPH_WIDTH).abs() < 1e-9);
    }
}

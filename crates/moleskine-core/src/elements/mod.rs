//! Element definitions for notebook pages.

mod image;
mod shape;
mod stroke;
mod text;

pub use image::ImageElement;
pub use shape::ShapeElement;
pub use stroke::{FreehandStroke, StrokeKind, HIGHLIGHTER_OPACITY};
pub use text::{LinkElement, TextElement, APPROX_GLYPH_WIDTH, LINK_FONT_SIZE};

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Color used for link labels.
    pub const fn link_blue() -> Self {
        Self::new(37, 99, 235, 255)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::new(it.next()??, it.next()??, it.next()??, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for elements: a random base-36 token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut n = Uuid::new_v4().as_u128();
        let mut token = Vec::with_capacity(25);
        while n > 0 {
            token.push(DIGITS[(n % 36) as usize]);
            n /= 36;
        }
        // Pad so short draws still satisfy the minimum length.
        while token.len() < 9 {
            token.push(b'0');
        }
        token.reverse();
        Self(String::from_utf8_lossy(&token).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Everything that can live on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Stroke(FreehandStroke),
    Line(ShapeElement),
    Rectangle(ShapeElement),
    Circle(ShapeElement),
    Arrow(ShapeElement),
    Text(TextElement),
    Link(LinkElement),
    Image(ImageElement),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Stroke(s) => &s.id,
            Element::Line(s) | Element::Rectangle(s) | Element::Circle(s) | Element::Arrow(s) => &s.id,
            Element::Text(t) => &t.id,
            Element::Link(l) => &l.id,
            Element::Image(i) => &i.id,
        }
    }

    /// Short lowercase name of the element kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Stroke(s) => match s.kind {
                StrokeKind::Pen => "pen",
                StrokeKind::Highlighter => "highlighter",
            },
            Element::Line(_) => "line",
            Element::Rectangle(_) => "rectangle",
            Element::Circle(_) => "circle",
            Element::Arrow(_) => "arrow",
            Element::Text(_) => "text",
            Element::Link(_) => "link",
            Element::Image(_) => "image",
        }
    }

    /// Axis-aligned bounds in canvas coordinates (corners normalized).
    pub fn bounds(&self) -> Rect {
        match self {
            Element::Stroke(s) => s.bounds(),
            Element::Line(s) | Element::Rectangle(s) | Element::Circle(s) | Element::Arrow(s) => s.bounds(),
            Element::Text(t) => t.bounds(),
            Element::Link(l) => l.bounds(),
            Element::Image(i) => i.bounds(),
        }
    }

    /// Check if a canvas point hits this element.
    ///
    /// `tolerance` is already expressed in canvas units (divided by zoom).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Element::Stroke(s) => s.hit_test(point, tolerance),
            Element::Line(s) | Element::Arrow(s) => s.hit_test_segment(point, tolerance),
            Element::Rectangle(s) | Element::Circle(s) => s.hit_test_box(point, tolerance),
            Element::Text(t) => t.hit_test(point, tolerance),
            Element::Link(l) => l.hit_test(point, tolerance),
            Element::Image(i) => i.hit_test(point, tolerance),
        }
    }

    /// Shift every positional field by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::Stroke(s) => s.translate(delta),
            Element::Line(s) | Element::Rectangle(s) | Element::Circle(s) | Element::Arrow(s) => s.translate(delta),
            Element::Text(t) => t.translate(delta),
            Element::Link(l) => l.translate(delta),
            Element::Image(i) => i.translate(delta),
        }
    }

    /// Replace the identifier with a fresh one.
    pub fn regenerate_id(&mut self) {
        let new_id = ElementId::new();
        match self {
            Element::Stroke(s) => s.id = new_id,
            Element::Line(s) | Element::Rectangle(s) | Element::Circle(s) | Element::Arrow(s) => s.id = new_id,
            Element::Text(t) => t.id = new_id,
            Element::Link(l) => l.id = new_id,
            Element::Image(i) => i.id = new_id,
        }
    }

    /// Clone with a new id, moved by `offset` on both axes.
    pub fn duplicate_with_offset(&self, offset: f64) -> Element {
        let mut copy = self.clone();
        copy.regenerate_id();
        copy.translate(Vec2::new(offset, offset));
        copy
    }

    /// Check if this element is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Element::Image(_))
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StrokePoint;

    #[test]
    fn test_id_is_base36_and_long_enough() {
        let id = ElementId::new();
        assert!(id.as_str().len() >= 9);
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, ElementId::new());
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(SerializableColor::from_hex("#ff0000"), Some(SerializableColor::new(255, 0, 0, 255)));
        assert_eq!(SerializableColor::from_hex("#0f0"), Some(SerializableColor::new(0, 255, 0, 255)));
        assert_eq!(SerializableColor::from_hex("00000080"), Some(SerializableColor::new(0, 0, 0, 128)));
        assert_eq!(SerializableColor::from_hex("#zz0000"), None);
        assert_eq!(SerializableColor::from_hex("#1234"), None);
        assert_eq!(SerializableColor::new(18, 52, 86, 255).to_hex(), "#123456");
    }

    #[test]
    fn test_duplicate_offsets_every_positional_field() {
        let shape = Element::Rectangle(ShapeElement::new(SerializableColor::black(), 2.0, 10.0, 20.0, 30.0, 40.0));
        let copy = shape.duplicate_with_offset(20.0);
        assert_ne!(copy.id(), shape.id());
        let Element::Rectangle(s) = copy else { panic!("kind changed") };
        assert_eq!((s.x1, s.y1, s.x2, s.y2), (30.0, 40.0, 50.0, 60.0));

        let stroke = Element::Stroke(FreehandStroke::new(
            StrokeKind::Pen,
            SerializableColor::black(),
            2.0,
            vec![StrokePoint::new(0.0, 0.0, 0.5), StrokePoint::new(5.0, 5.0, 0.5)],
        ));
        let Element::Stroke(s) = stroke.duplicate_with_offset(30.0) else { panic!("kind changed") };
        assert_eq!(s.points[0].point(), Point::new(30.0, 30.0));
        assert_eq!(s.points[1].point(), Point::new(35.0, 35.0));
    }

    #[test]
    fn test_duplicate_image_keeps_size() {
        let img = Element::Image(ImageElement::new("u".into(), 100.0, 100.0, 200.0, 100.0));
        let Element::Image(copy) = img.duplicate_with_offset(20.0) else { panic!("kind changed") };
        assert_eq!((copy.x, copy.y, copy.width, copy.height), (120.0, 120.0, 200.0, 100.0));
    }

    #[test]
    fn test_json_tagging() {
        let el = Element::Circle(ShapeElement::new(SerializableColor::black(), 1.0, 0.0, 0.0, 5.0, 5.0));
        let json = serde_json::to_string(&el).unwrap();
        assert!(json.contains("\"type\":\"circle\""));
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, el);
    }
}

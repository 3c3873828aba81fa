//! Embedded raster images.

use super::ElementId;
use crate::geometry::rect_contains_inclusive;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An image placed on a page, referenced by URL.
///
/// The pixels live in the blob store (or inline as a `data:` URL); the page
/// only keeps the placement box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub id: ElementId,
    pub url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Where the image came from (original file name), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ImageElement {
    pub fn new(url: String, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: ElementId::new(),
            url,
            x,
            y,
            width,
            height,
            source: None,
        }
    }

    /// Set the source file name.
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Box containment, edges included, with `tolerance` of slack so a
    /// click on a corner still lands at any zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_inclusive(self.bounds().inflate(tolerance, tolerance), point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Replace the placement box.
    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_hits() {
        let img = ImageElement::new("u".into(), 100.0, 100.0, 200.0, 100.0);
        assert!(img.hit_test(Point::new(100.0, 100.0), 0.0));
        assert!(img.hit_test(Point::new(300.0, 200.0), 0.0));
        assert!(!img.hit_test(Point::new(300.5, 200.0), 0.0));
        assert!(img.hit_test(Point::new(300.5, 200.0), 1.0));
    }

    #[test]
    fn test_set_rect() {
        let mut img = ImageElement::new("u".into(), 0.0, 0.0, 10.0, 10.0);
        img.set_rect(Rect::new(5.0, 6.0, 55.0, 86.0));
        assert_eq!((img.x, img.y, img.width, img.height), (5.0, 6.0, 50.0, 80.0));
    }
}

//! Two-corner shapes: lines, rectangles, circles and arrows.

use super::{ElementId, SerializableColor};
use crate::geometry::{normalized_rect, point_to_segment_dist, rect_contains_inclusive};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry shared by every two-corner shape.
///
/// The corners are stored exactly as drawn; `min`/`max` normalization
/// happens when rendering and hit-testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub id: ElementId,
    pub color: SerializableColor,
    pub width: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl ShapeElement {
    pub fn new(color: SerializableColor, width: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id: ElementId::new(),
            color,
            width,
            x1,
            y1,
            x2,
            y2,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Move the free corner while drawing.
    pub fn set_end(&mut self, point: Point) {
        self.x2 = point.x;
        self.y2 = point.y;
    }

    pub fn bounds(&self) -> Rect {
        normalized_rect(self.x1, self.y1, self.x2, self.y2)
    }

    /// Both extents below `min` means the gesture was an accidental tap.
    pub fn is_degenerate(&self, min: f64) -> bool {
        (self.x2 - self.x1).abs() < min && (self.y2 - self.y1).abs() < min
    }

    /// Nearest-point-on-segment test for lines and arrows.
    pub fn hit_test_segment(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) < tolerance + self.width / 2.0
    }

    /// Normalized bounding box with a margin, for rectangles and circles.
    pub fn hit_test_box(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_inclusive(self.bounds().inflate(tolerance, tolerance), point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x1 += delta.x;
        self.y1 += delta.y;
        self.x2 += delta.x;
        self.y2 += delta.y;
    }
}

//! Freehand pen and highlighter strokes.

use super::{ElementId, SerializableColor};
use crate::geometry::{StrokeOptions, StrokePoint, outline_to_path, stroke_outline};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Highlighter strokes always render at this opacity, whatever the pressure.
pub const HIGHLIGHTER_OPACITY: f64 = 0.3;

/// Which freehand tool produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    #[default]
    Pen,
    Highlighter,
}

/// A freehand drawing (series of pressured samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreehandStroke {
    pub id: ElementId,
    pub kind: StrokeKind,
    pub color: SerializableColor,
    pub width: f64,
    pub points: Vec<StrokePoint>,
}

impl FreehandStroke {
    pub fn new(kind: StrokeKind, color: SerializableColor, width: f64, points: Vec<StrokePoint>) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            color,
            width,
            points,
        }
    }

    /// Outline options for this stroke's kind.
    pub fn options(&self) -> StrokeOptions {
        match self.kind {
            StrokeKind::Pen => StrokeOptions::pen(self.width),
            StrokeKind::Highlighter => StrokeOptions::highlighter(self.width),
        }
    }

    /// Render opacity: fixed for highlighters, opaque for pens.
    pub fn opacity(&self) -> f64 {
        match self.kind {
            StrokeKind::Pen => 1.0,
            StrokeKind::Highlighter => HIGHLIGHTER_OPACITY,
        }
    }

    /// Filled silhouette of the stroke.
    pub fn outline_path(&self) -> BezPath {
        outline_to_path(&stroke_outline(&self.points, &self.options()))
    }

    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let start = Rect::from_points(first.point(), first.point());
        self.points
            .iter()
            .fold(start, |acc, p| acc.union_pt(p.point()))
    }

    /// A sample within `tolerance + width` of the point counts as a hit.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let limit = tolerance + self.width;
        self.points.iter().any(|p| p.point().distance(point) < limit)
    }

    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            p.x += delta.x;
            p.y += delta.y;
        }
    }
}

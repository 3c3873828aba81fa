//! Outline polygon → closed path.

use kurbo::{BezPath, Point};
use std::fmt::Write;

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Convert an outline polygon into a smooth closed path.
///
/// Moves to the first vertex, then emits one quadratic segment per vertex,
/// using the vertex as control point and the midpoint to the next vertex
/// (wrapping around) as end point.
pub fn outline_to_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = outline.first() else {
        return path;
    };

    path.move_to(first);
    for (i, &p) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        path.quad_to(p, midpoint(p, next));
    }
    path.close_path();
    path
}

/// Same path as [`outline_to_path`], formatted as an SVG `d` attribute.
pub fn outline_to_svg(outline: &[Point]) -> String {
    let Some(first) = outline.first() else {
        return String::new();
    };

    let mut d = format!("M {:.2},{:.2} Q", first.x, first.y);
    for (i, &p) in outline.iter().enumerate() {
        let m = midpoint(p, outline[(i + 1) % outline.len()]);
        let _ = write!(d, " {:.2},{:.2} {:.2},{:.2}", p.x, p.y, m.x, m.y);
    }
    d.push_str(" Z");
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    #[test]
    fn test_empty_outline() {
        assert_eq!(outline_to_path(&[]).elements().len(), 0);
        assert!(outline_to_svg(&[]).is_empty());
    }

    #[test]
    fn test_quadratic_midpoints() {
        let outline = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let path = outline_to_path(&outline);
        let els = path.elements();
        assert_eq!(els.len(), 5);
        assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(els[1], PathEl::QuadTo(Point::new(0.0, 0.0), Point::new(5.0, 0.0)));
        assert_eq!(els[2], PathEl::QuadTo(Point::new(10.0, 0.0), Point::new(10.0, 5.0)));
        // Last vertex wraps around to the first.
        assert_eq!(els[3], PathEl::QuadTo(Point::new(10.0, 10.0), Point::new(5.0, 5.0)));
        assert_eq!(els[4], PathEl::ClosePath);
    }

    #[test]
    fn test_svg_string() {
        let outline = [Point::new(0.0, 0.0), Point::new(2.0, 0.0)];
        assert_eq!(outline_to_svg(&outline), "M 0.00,0.00 Q 0.00,0.00 1.00,0.00 2.00,0.00 1.00,0.00 Z");
    }
}

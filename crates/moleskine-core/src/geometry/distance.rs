//! Distance and containment queries.

use kurbo::{Point, Rect, Vec2};

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => point.distance(*single),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Build a rectangle from two free corners, whatever their orientation.
pub fn normalized_rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect {
    Rect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Containment test that includes all four edges.
///
/// `kurbo::Rect::contains` excludes the far edges, which would make a click
/// exactly on an image's bottom-right corner miss.
pub fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance_projection() {
        let d = point_to_segment_dist(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_segment_distance_past_endpoint() {
        let d = point_to_segment_dist(Point::new(13.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_segment() {
        let d = point_to_segment_dist(Point::new(3.0, 4.0), Point::ZERO, Point::ZERO);
        assert!((d - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_polyline_distance() {
        let pts = [Point::ZERO, Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let d = point_to_polyline_dist(Point::new(12.0, 5.0), &pts);
        assert!((d - 2.0).abs() < 1e-10);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }

    #[test]
    fn test_normalized_rect() {
        let r = normalized_rect(100.0, 50.0, 10.0, 80.0);
        assert_eq!(r, Rect::new(10.0, 50.0, 100.0, 80.0));
    }

    #[test]
    fn test_inclusive_contains_far_corner() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains_inclusive(r, Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.0, 10.0)));
        assert!(!rect_contains_inclusive(r, Point::new(10.1, 10.0)));
    }
}

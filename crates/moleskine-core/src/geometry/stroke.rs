//! Variable-width stroke outlines.
//!
//! Turns a sequence of pressured input samples into the closed polygon that
//! forms the silhouette of a pen or highlighter stroke. The computation is a
//! pure function of its inputs: the same samples and options always yield
//! the same outline.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How fast simulated pressure follows the drawing speed.
const RATE_OF_PRESSURE_CHANGE: f64 = 0.275;
/// Slightly more than a half turn so rotated caps close without a seam.
const FIXED_PI: f64 = PI + 0.0001;
/// Segments used for corner and start-cap arcs.
const CAP_STEPS: usize = 13;
/// Segments used for the rounded end cap.
const END_CAP_STEPS: usize = 29;

fn default_pressure() -> f64 {
    0.5
}

/// A single input sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in `[0, 1]`; negative values mean "unknown".
    #[serde(default = "default_pressure")]
    pub pressure: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure: self.pressure + (other.pressure - self.pressure) * t,
        }
    }
}

/// Taper length at one end of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Taper {
    /// No taper.
    #[default]
    None,
    /// Taper over the whole stroke (or at least `size`).
    Full,
    /// Taper over a fixed distance.
    Length(f64),
}

impl Taper {
    fn distance(self, size: f64, total_length: f64) -> f64 {
        match self {
            Taper::None => 0.0,
            Taper::Full => size.max(total_length),
            Taper::Length(d) => d.max(0.0),
        }
    }
}

/// Start or end treatment of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaperOptions {
    pub taper: Taper,
    /// Rounded cap when true, flat cap otherwise. Ignored while tapering.
    pub cap: bool,
}

impl Default for TaperOptions {
    fn default() -> Self {
        Self {
            taper: Taper::None,
            cap: true,
        }
    }
}

/// Style parameters for [`stroke_outline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeOptions {
    /// Base diameter of the stroke.
    pub size: f64,
    /// How much pressure narrows the stroke (0 = constant width).
    pub thinning: f64,
    /// Minimum spacing between outline vertices, as a fraction of `size`.
    pub smoothing: f64,
    /// How strongly input samples are pulled towards the previous one.
    pub streamline: f64,
    /// Derive pressure from drawing speed instead of the samples.
    pub simulate_pressure: bool,
    pub start: TaperOptions,
    pub end: TaperOptions,
    /// Whether the stroke is finished (the last sample is used verbatim).
    pub last: bool,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            size: 16.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            simulate_pressure: true,
            start: TaperOptions::default(),
            end: TaperOptions::default(),
            last: true,
        }
    }
}

impl StrokeOptions {
    /// Pressure-sensitive pen.
    pub fn pen(width: f64) -> Self {
        Self {
            size: width,
            ..Self::default()
        }
    }

    /// Flat, wide marker: four times the width, no thinning, no simulated pressure.
    pub fn highlighter(width: f64) -> Self {
        Self {
            size: width * 4.0,
            thinning: 0.0,
            simulate_pressure: false,
            ..Self::default()
        }
    }
}

/// A streamlined sample with its direction and running length.
#[derive(Debug, Clone, Copy)]
struct TrackPoint {
    point: Point,
    pressure: f64,
    vector: Vec2,
    distance: f64,
    running_length: f64,
}

/// Compute the outline polygon of a stroke.
///
/// Returns the left edge, the end cap, the right edge reversed and the start
/// cap, in that order. An empty input (or a non-positive size) yields an
/// empty outline.
pub fn stroke_outline(samples: &[StrokePoint], options: &StrokeOptions) -> Vec<Point> {
    let track = track_points(samples, options);
    outline_points(&track, options)
}

fn track_points(samples: &[StrokePoint], options: &StrokeOptions) -> Vec<TrackPoint> {
    let Some(&first) = samples.first() else {
        return Vec::new();
    };

    let t = 0.15 + (1.0 - options.streamline) * 0.85;

    let mut pts: Vec<StrokePoint> = samples.to_vec();
    match pts.len() {
        1 => pts.push(StrokePoint::new(first.x + 1.0, first.y + 1.0, first.pressure)),
        2 => {
            let end = pts[1];
            pts.truncate(1);
            for i in 1..5 {
                pts.push(first.lerp(end, i as f64 / 4.0));
            }
        }
        _ => {}
    }

    let mut track = vec![TrackPoint {
        point: first.point(),
        pressure: if first.pressure >= 0.0 { first.pressure } else { 0.25 },
        vector: Vec2::new(1.0, 1.0),
        distance: 0.0,
        running_length: 0.0,
    }];

    let max = pts.len() - 1;
    let mut reached_min_length = false;
    let mut running_length = 0.0;

    for (i, sample) in pts.iter().enumerate().skip(1) {
        let prev = track[track.len() - 1].point;
        let point = if options.last && i == max {
            sample.point()
        } else {
            prev.lerp(sample.point(), t)
        };

        if point == prev {
            continue;
        }

        let distance = point.distance(prev);
        running_length += distance;

        if i < max && !reached_min_length {
            if running_length < options.size {
                continue;
            }
            reached_min_length = true;
        }

        track.push(TrackPoint {
            point,
            pressure: if sample.pressure >= 0.0 { sample.pressure } else { 0.5 },
            vector: (prev - point).normalize(),
            distance,
            running_length,
        });
    }

    track[0].vector = track.get(1).map(|p| p.vector).unwrap_or(Vec2::ZERO);
    track
}

fn outline_points(track: &[TrackPoint], options: &StrokeOptions) -> Vec<Point> {
    let size = options.size;
    if track.is_empty() || size <= 0.0 {
        return Vec::new();
    }

    let last = track.len() - 1;
    let total_length = track[last].running_length;
    let taper_start = options.start.taper.distance(size, total_length);
    let taper_end = options.end.taper.distance(size, total_length);
    let min_distance = (size * options.smoothing).powi(2);

    let mut left: Vec<Point> = Vec::new();
    let mut right: Vec<Point> = Vec::new();

    let mut prev_pressure = track.iter().take(10).fold(track[0].pressure, |acc, p| {
        let pressure = if options.simulate_pressure {
            simulated_pressure(acc, p.distance, size)
        } else {
            p.pressure
        };
        (acc + pressure) / 2.0
    });

    let mut radius = stroke_radius(size, options.thinning, track[last].pressure);
    let mut first_radius: Option<f64> = None;
    let mut prev_vector = track[0].vector;
    let mut pl = track[0].point;
    let mut pr = pl;
    let mut prev_was_sharp = false;

    for (i, tp) in track.iter().enumerate() {
        if i < last && total_length - tp.running_length < 3.0 {
            continue;
        }

        let mut pressure = tp.pressure;
        if options.thinning != 0.0 {
            if options.simulate_pressure {
                pressure = simulated_pressure(prev_pressure, tp.distance, size);
            }
            radius = stroke_radius(size, options.thinning, pressure);
        } else {
            radius = size / 2.0;
        }

        if first_radius.is_none() {
            first_radius = Some(radius);
        }

        let ts = if tp.running_length < taper_start {
            ease_start(tp.running_length / taper_start)
        } else {
            1.0
        };
        let remaining = total_length - tp.running_length;
        let te = if remaining < taper_end {
            ease_end(remaining / taper_end)
        } else {
            1.0
        };
        radius = (radius * ts.min(te)).max(0.01);

        let next_vector = if i < last { track[i + 1].vector } else { tp.vector };
        let next_dpr = if i < last { tp.vector.dot(next_vector) } else { 1.0 };
        let prev_dpr = tp.vector.dot(prev_vector);

        let is_sharp = prev_dpr < 0.0 && !prev_was_sharp;
        let next_is_sharp = next_dpr < 0.0;

        if is_sharp || next_is_sharp {
            // Sweep a half disc around the corner so the outline does not fold.
            let offset = perpendicular(prev_vector) * radius;
            for step in 0..=CAP_STEPS {
                let t = step as f64 / CAP_STEPS as f64;
                pl = rotate_around(tp.point - offset, tp.point, FIXED_PI * t);
                left.push(pl);
                pr = rotate_around(tp.point + offset, tp.point, -FIXED_PI * t);
                right.push(pr);
            }
            if next_is_sharp {
                prev_was_sharp = true;
            }
            continue;
        }

        prev_was_sharp = false;

        if i == last {
            let offset = perpendicular(tp.vector) * radius;
            left.push(tp.point - offset);
            right.push(tp.point + offset);
            continue;
        }

        let offset = perpendicular(next_vector.lerp(tp.vector, next_dpr)) * radius;

        let tl = tp.point - offset;
        if i <= 1 || pl.distance_squared(tl) > min_distance {
            left.push(tl);
            pl = tl;
        }

        let tr = tp.point + offset;
        if i <= 1 || pr.distance_squared(tr) > min_distance {
            right.push(tr);
            pr = tr;
        }

        prev_pressure = pressure;
        prev_vector = tp.vector;
    }

    let first_point = track[0].point;
    let last_point = if track.len() > 1 {
        track[last].point
    } else {
        first_point + Vec2::new(1.0, 1.0)
    };

    if track.len() == 1 {
        if (taper_start == 0.0 && taper_end == 0.0) || options.last {
            let dot_radius = first_radius.unwrap_or(radius);
            let start = first_point + perpendicular(first_point - last_point).normalize() * -dot_radius;
            return (1..=CAP_STEPS)
                .map(|s| rotate_around(start, first_point, FIXED_PI * 2.0 * s as f64 / CAP_STEPS as f64))
                .collect();
        }
        right.reverse();
        left.extend(right);
        return left;
    }

    let mut start_cap = Vec::new();
    if taper_start == 0.0 {
        if let (Some(&l0), Some(&r0)) = (left.first(), right.first()) {
            if options.start.cap {
                for s in 1..=CAP_STEPS {
                    start_cap.push(rotate_around(r0, first_point, FIXED_PI * s as f64 / CAP_STEPS as f64));
                }
            } else {
                let corners = l0 - r0;
                let a = corners * 0.5;
                let b = corners * 0.51;
                start_cap.extend([first_point - a, first_point - b, first_point + b, first_point + a]);
            }
        }
    }

    let mut end_cap = Vec::new();
    let direction = perpendicular(-track[last].vector);
    if taper_end > 0.0 {
        end_cap.push(last_point);
    } else if options.end.cap {
        let start = last_point + direction * radius;
        for s in 1..END_CAP_STEPS {
            end_cap.push(rotate_around(start, last_point, FIXED_PI * 3.0 * s as f64 / END_CAP_STEPS as f64));
        }
    } else {
        end_cap.extend([
            last_point + direction * radius,
            last_point + direction * (radius * 0.99),
            last_point - direction * (radius * 0.99),
            last_point - direction * radius,
        ]);
    }

    let mut outline = left;
    outline.extend(end_cap);
    outline.extend(right.into_iter().rev());
    outline.extend(start_cap);
    outline
}

fn stroke_radius(size: f64, thinning: f64, pressure: f64) -> f64 {
    size * (0.5 - thinning * (0.5 - pressure))
}

fn simulated_pressure(prev: f64, distance: f64, size: f64) -> f64 {
    let sp = (distance / size).min(1.0);
    let rp = (1.0 - sp).min(1.0);
    (prev + (rp - prev) * (sp * RATE_OF_PRESSURE_CHANGE)).min(1.0)
}

fn ease_start(t: f64) -> f64 {
    t * (2.0 - t)
}

fn ease_end(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}

fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

fn rotate_around(p: Point, center: Point, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    let px = p.x - center.x;
    let py = p.y - center.y;
    Point::new(px * c - py * s + center.x, px * s + py * c + center.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal(n: usize, step: f64) -> Vec<StrokePoint> {
        (0..n).map(|i| StrokePoint::new(i as f64 * step, 0.0, 0.5)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(stroke_outline(&[], &StrokeOptions::default()).is_empty());
    }

    #[test]
    fn test_zero_size() {
        let opts = StrokeOptions {
            size: 0.0,
            ..StrokeOptions::default()
        };
        assert!(stroke_outline(&horizontal(5, 10.0), &opts).is_empty());
    }

    #[test]
    fn test_single_point_is_dot() {
        let outline = stroke_outline(&[StrokePoint::new(50.0, 50.0, 0.5)], &StrokeOptions::pen(8.0));
        assert!(outline.len() > 3);
        let center = Point::new(50.0, 50.0);
        for p in &outline {
            assert!(p.distance(center) <= 8.0);
        }
    }

    #[test]
    fn test_deterministic() {
        let samples: Vec<StrokePoint> = (0..20)
            .map(|i| {
                let t = i as f64 * 0.3;
                StrokePoint::new(t.cos() * 100.0, t.sin() * 60.0, 0.4 + (i % 3) as f64 * 0.1)
            })
            .collect();
        let opts = StrokeOptions::pen(6.0);
        assert_eq!(stroke_outline(&samples, &opts), stroke_outline(&samples, &opts));
    }

    #[test]
    fn test_highlighter_constant_width() {
        let opts = StrokeOptions::highlighter(3.0);
        let outline = stroke_outline(&horizontal(30, 5.0), &opts);
        assert!(!outline.is_empty());
        let half = opts.size / 2.0 + 1e-6;
        for p in &outline {
            assert!(p.y.abs() <= half, "vertex {p:?} outside half width {half}");
        }
        // The silhouette reaches the full half width somewhere along the body.
        assert!(outline.iter().any(|p| (p.y.abs() - opts.size / 2.0).abs() < 1e-3));
    }

    #[test]
    fn test_outline_covers_stroke_extent() {
        let outline = stroke_outline(&horizontal(30, 5.0), &StrokeOptions::pen(4.0));
        let min_x = outline.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = outline.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x < 5.0);
        assert!(max_x > 140.0);
    }

    #[test]
    fn test_two_points_are_densified() {
        let samples = [StrokePoint::new(0.0, 0.0, 0.5), StrokePoint::new(40.0, 0.0, 0.5)];
        let track = track_points(&samples, &StrokeOptions::pen(2.0));
        assert!(track.len() > 2);
    }

    #[test]
    fn test_flat_caps() {
        let opts = StrokeOptions {
            start: TaperOptions { taper: Taper::None, cap: false },
            end: TaperOptions { taper: Taper::None, cap: false },
            ..StrokeOptions::highlighter(2.0)
        };
        let outline = stroke_outline(&horizontal(10, 10.0), &opts);
        // Flat caps never extend behind the first sample.
        assert!(outline.iter().all(|p| p.x >= -1e-6));
    }

    #[test]
    fn test_tapered_end_meets_last_point() {
        let opts = StrokeOptions {
            end: TaperOptions { taper: Taper::Full, cap: true },
            ..StrokeOptions::pen(8.0)
        };
        let samples = horizontal(20, 5.0);
        let outline = stroke_outline(&samples, &opts);
        let last = samples[samples.len() - 1].point();
        assert!(outline.iter().any(|p| p.distance(last) < 1e-9));
    }
}

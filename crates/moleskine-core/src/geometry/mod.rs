//! Pure geometry helpers: variable-width stroke outlines, outline paths and
//! distance queries used by hit-testing.

mod distance;
mod path;
mod stroke;

pub use distance::{normalized_rect, point_to_polyline_dist, point_to_segment_dist, rect_contains_inclusive};
pub use path::{outline_to_path, outline_to_svg};
pub use stroke::{StrokeOptions, StrokePoint, Taper, TaperOptions, stroke_outline};

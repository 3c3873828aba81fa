//! Resize handles for selected images.

use crate::elements::ImageElement;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// Compass position of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::NW,
        HandleKind::N,
        HandleKind::NE,
        HandleKind::E,
        HandleKind::SE,
        HandleKind::S,
        HandleKind::SW,
        HandleKind::W,
    ];

    pub fn is_corner(&self) -> bool {
        matches!(self, HandleKind::NE | HandleKind::NW | HandleKind::SE | HandleKind::SW)
    }

    fn moves_left(&self) -> bool {
        matches!(self, HandleKind::W | HandleKind::NW | HandleKind::SW)
    }

    fn moves_right(&self) -> bool {
        matches!(self, HandleKind::E | HandleKind::NE | HandleKind::SE)
    }

    fn moves_top(&self) -> bool {
        matches!(self, HandleKind::N | HandleKind::NE | HandleKind::NW)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, HandleKind::S | HandleKind::SE | HandleKind::SW)
    }

    /// Position of this handle on a box.
    pub fn position_on(&self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            HandleKind::N => Point::new(cx, rect.y0),
            HandleKind::S => Point::new(cx, rect.y1),
            HandleKind::E => Point::new(rect.x1, cy),
            HandleKind::W => Point::new(rect.x0, cy),
            HandleKind::NE => Point::new(rect.x1, rect.y0),
            HandleKind::NW => Point::new(rect.x0, rect.y0),
            HandleKind::SE => Point::new(rect.x1, rect.y1),
            HandleKind::SW => Point::new(rect.x0, rect.y1),
        }
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in canvas coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The eight handles of an image's box.
pub fn image_handles(image: &ImageElement) -> Vec<Handle> {
    let bounds = image.bounds();
    HandleKind::ALL
        .into_iter()
        .map(|kind| Handle::new(kind.position_on(bounds), kind))
        .collect()
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(image: &ImageElement, point: Point, tolerance: f64) -> Option<HandleKind> {
    image_handles(image)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Box of `original` after dragging `handle` by the cumulative `delta`.
///
/// Both dimensions are floored at `min_size`. With `keep_aspect` on a
/// corner handle the result keeps the original width/height ratio and the
/// opposite corner stays put.
pub fn resize_image(original: &ImageElement, handle: HandleKind, delta: Vec2, keep_aspect: bool, min_size: f64) -> Rect {
    let Rect { x0, y0, x1, y1 } = original.bounds();

    let mut width = original.width;
    let mut height = original.height;
    if handle.moves_right() {
        width += delta.x;
    } else if handle.moves_left() {
        width -= delta.x;
    }
    if handle.moves_bottom() {
        height += delta.y;
    } else if handle.moves_top() {
        height -= delta.y;
    }
    width = width.max(min_size);
    height = height.max(min_size);

    if keep_aspect && handle.is_corner() && original.width > 0.0 && original.height > 0.0 {
        let ratio = original.width / original.height;
        if width / original.width >= height / original.height {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
        if width < min_size {
            width = min_size;
            height = width / ratio;
        }
        if height < min_size {
            height = min_size;
            width = height * ratio;
        }
    }

    let left = if handle.moves_left() { x1 - width } else { x0 };
    let top = if handle.moves_top() { y1 - height } else { y0 };
    Rect::new(left, top, left + width, top + height)
}

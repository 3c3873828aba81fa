//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform of the page.
///
/// Canvas coordinates map to container-relative screen pixels as
/// `screen = canvas * scale + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub scale: f64,
    /// Minimum allowed zoom level.
    pub min_scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 3.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera with custom zoom limits.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Transform from canvas coordinates to container-relative screen pixels.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a raw client position to canvas coordinates.
    ///
    /// `container_origin` is the client position of the container's top-left.
    pub fn client_to_canvas(&self, client: Point, container_origin: Point) -> Point {
        Point::new(
            (client.x - container_origin.x - self.offset.x) / self.scale,
            (client.y - container_origin.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a container-relative screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.client_to_canvas(screen, Point::ZERO)
    }

    /// Convert a canvas point to container-relative screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.scale + self.offset.x,
            canvas.y * self.scale + self.offset.y,
        )
    }

    /// Screen-pixel distance expressed in canvas units at the current zoom.
    pub fn screen_to_canvas_distance(&self, distance: f64) -> f64 {
        distance / self.scale
    }

    /// Pan the camera by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Set the zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, new_scale: f64) {
        let new_scale = self.clamp_scale(new_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_canvas(screen_point);
        self.scale = new_scale;

        // Adjust offset so the anchor stays under the screen point.
        let moved = self.canvas_to_screen(anchor);
        self.offset += screen_point - moved;
    }

    /// Wheel zoom around the pointer. Positive `delta_y` zooms out.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) {
        let factor = (1.0 - delta_y * 0.001).max(0.01);
        self.zoom_at(screen_point, self.scale * factor);
    }

    /// Zoom in by `step`, centred on the container.
    pub fn zoom_in(&mut self, container: Size, step: f64) {
        let center = Point::new(container.width / 2.0, container.height / 2.0);
        self.zoom_at(center, self.scale + step);
    }

    /// Zoom out by `step`, centred on the container.
    pub fn zoom_out(&mut self, container: Size, step: f64) {
        let center = Point::new(container.width / 2.0, container.height / 2.0);
        self.zoom_at(center, self.scale - step);
    }

    /// Back to 100%, centred on the container.
    pub fn reset_zoom(&mut self, container: Size) {
        let center = Point::new(container.width / 2.0, container.height / 2.0);
        self.zoom_at(center, 1.0);
    }

    /// Fit the page inside the container (minus padding), never above 100%,
    /// and centre it.
    pub fn fit_to_screen(&mut self, canvas: Size, container: Size, padding: f64) {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return;
        }

        let avail_w = (container.width - padding * 2.0).max(1.0);
        let avail_h = (container.height - padding * 2.0).max(1.0);
        let fit = (avail_w / canvas.width).min(avail_h / canvas.height).min(1.0);
        self.scale = self.clamp_scale(fit);

        self.offset = Vec2::new(
            (container.width - canvas.width * self.scale) / 2.0,
            (container.height - canvas.height * self.scale) / 2.0,
        );
    }

    /// Canvas point currently shown at the centre of the container.
    pub fn viewport_center(&self, container: Size) -> Point {
        self.screen_to_canvas(Point::new(container.width / 2.0, container.height / 2.0))
    }
}

//! Editor configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants of the notebook editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical page size in canvas units.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Screen padding kept around the page by "fit to screen".
    pub fit_padding: f64,
    /// Hit-test generosity in screen pixels (divided by zoom before use).
    pub hit_threshold: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Increment used by the zoom in/out controls.
    pub zoom_step: f64,
    /// Idle time after the last edit before an auto-save starts.
    pub autosave_delay_secs: f64,
    pub paste_offset: f64,
    pub duplicate_offset: f64,
    /// Size given to freshly inserted images.
    pub default_image_width: f64,
    pub default_image_height: f64,
    /// Resize floor for both image dimensions.
    pub min_image_size: f64,
    /// Shapes whose corners differ by less than this on both axes are discarded.
    pub min_shape_extent: f64,
    /// Strokes with this many points or fewer are discarded.
    pub min_stroke_points: usize,
    pub default_font_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1600.0,
            canvas_height: 1000.0,
            fit_padding: 40.0,
            hit_threshold: 10.0,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_step: 0.1,
            autosave_delay_secs: 5.0,
            paste_offset: 20.0,
            duplicate_offset: 30.0,
            default_image_width: 300.0,
            default_image_height: 200.0,
            min_image_size: 50.0,
            min_shape_extent: 5.0,
            min_stroke_points: 2,
            default_font_size: 20.0,
        }
    }
}

impl EditorConfig {
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_secs_f64(self.autosave_delay_secs.max(0.0))
    }
}

//! Engine configuration: gesture thresholds, hit tolerances, zoom limits and
//! default paint, parsed from host-supplied JSON.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::camera::ZoomRange;
use crate::consts::{
    DEFAULT_FILL, DEFAULT_FONT_SIZE, DEFAULT_STICKY_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, GRID_SPACING,
    HANDLE_RADIUS_PX, LINE_HIT_TOLERANCE_PX, MIN_DRAW_SIZE_PX, MIN_RESIZE_EXTENT, WHEEL_ZOOM_IN, WHEEL_ZOOM_MAX,
    WHEEL_ZOOM_OUT, ZOOM_MAX, ZOOM_MIN,
};
use crate::doc::Paint;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Which held key turns a primary-button drag into a pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanModifier {
    #[default]
    Ctrl,
    Alt,
    Shift,
    Meta,
    /// Only the pan tool and the middle/secondary buttons pan.
    None,
}

/// Tunable parameters of the interaction engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drawn shapes at or below this extent (screen pixels) are discarded.
    pub min_draw_size: f64,
    /// Smallest width/height a resize may produce, in world units.
    pub min_resize_extent: f64,
    /// Click slop around lines, in screen pixels.
    pub line_hit_tolerance_px: f64,
    /// Hit slop around each resize handle center, in screen pixels. Handles
    /// are drawn as squares with this side length.
    pub handle_radius_px: f64,
    /// Limits applied by the store's `set_zoom`.
    pub zoom_limits: ZoomRange,
    /// Limits applied to wheel and zoom-tool zooming.
    pub wheel_zoom_limits: ZoomRange,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    pub pan_modifier: PanModifier,
    /// Background grid spacing in world units.
    pub grid_spacing: f64,
    pub default_fill: String,
    pub default_stroke: String,
    pub default_stroke_width: f64,
    pub sticky_fill: String,
    pub default_font_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_draw_size: MIN_DRAW_SIZE_PX,
            min_resize_extent: MIN_RESIZE_EXTENT,
            line_hit_tolerance_px: LINE_HIT_TOLERANCE_PX,
            handle_radius_px: HANDLE_RADIUS_PX,
            zoom_limits: ZoomRange::new(ZOOM_MIN, ZOOM_MAX),
            wheel_zoom_limits: ZoomRange::new(ZOOM_MIN, WHEEL_ZOOM_MAX),
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
            pan_modifier: PanModifier::default(),
            grid_spacing: GRID_SPACING,
            default_fill: DEFAULT_FILL.to_owned(),
            default_stroke: DEFAULT_STROKE.to_owned(),
            default_stroke_width: DEFAULT_STROKE_WIDTH,
            sticky_fill: DEFAULT_STICKY_FILL.to_owned(),
            default_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON object; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed JSON, `Invalid` when a value fails [`Self::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are positive and ranges are well-formed.
    ///
    /// # Errors
    ///
    /// `Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_draw_size", self.min_draw_size),
            ("min_resize_extent", self.min_resize_extent),
            ("line_hit_tolerance_px", self.line_hit_tolerance_px),
            ("handle_radius_px", self.handle_radius_px),
            ("wheel_zoom_in", self.wheel_zoom_in),
            ("wheel_zoom_out", self.wheel_zoom_out),
            ("grid_spacing", self.grid_spacing),
            ("default_font_size", self.default_font_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be a positive number, got {value}")));
            }
        }
        if !(self.default_stroke_width.is_finite() && self.default_stroke_width >= 0.0) {
            return Err(ConfigError::Invalid("default_stroke_width must not be negative".into()));
        }
        for (name, range) in [("zoom_limits", self.zoom_limits), ("wheel_zoom_limits", self.wheel_zoom_limits)] {
            if !(range.min > 0.0 && range.min < range.max && range.max.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must satisfy 0 < min < max, got {}..{}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// Paint for newly drawn shapes of every kind except sticky notes.
    #[must_use]
    pub fn default_paint(&self) -> Paint {
        Paint {
            fill: self.default_fill.clone(),
            stroke: self.default_stroke.clone(),
            stroke_width: self.default_stroke_width,
        }
    }

    /// Paint for newly drawn sticky notes.
    #[must_use]
    pub fn sticky_paint(&self) -> Paint {
        Paint { fill: self.sticky_fill.clone(), ..self.default_paint() }
    }
}

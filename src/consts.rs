//! Shared numeric constants and default colors for the whiteboard crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest zoom factor accepted by the store.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest zoom factor accepted by the store.
pub const ZOOM_MAX: f64 = 10.0;

/// Largest zoom factor reachable with the wheel or the zoom tool.
pub const WHEEL_ZOOM_MAX: f64 = 5.0;

/// Zoom multiplier for one wheel notch towards the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom multiplier for one wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

// ── Gestures ────────────────────────────────────────────────────

/// Minimum drawn extent in screen pixels; anything at or below is discarded.
pub const MIN_DRAW_SIZE_PX: f64 = 5.0;

/// Smallest width/height a resize may produce, in world units.
pub const MIN_RESIZE_EXTENT: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Perpendicular distance from a line still counted as a hit, in screen pixels.
pub const LINE_HIT_TOLERANCE_PX: f64 = 5.0;

/// Screen-space half-size of a resize handle square.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Rendering ───────────────────────────────────────────────────

/// Spacing between background grid lines in world units.
pub const GRID_SPACING: f64 = 20.0;

/// Most grid lines drawn along one axis in a single frame.
pub const MAX_GRID_LINES: u32 = 4096;

pub const GRID_COLOR: &str = "#f0f0f0";
pub const SELECTION_COLOR: &str = "#0066ff";
pub const HANDLE_FILL: &str = "#0969da";
pub const HANDLE_STROKE: &str = "#0860ca";
pub const PREVIEW_FILL: &str = "rgba(0, 102, 255, 0.1)";

/// Dash segment length of the gesture preview outline, in screen pixels.
pub const PREVIEW_DASH_PX: f64 = 5.0;

/// Line height as a multiple of font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

/// Average glyph advance as a multiple of font size, used for text bounds.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

/// Inner padding of sticky-note text, in world units.
pub const STICKY_PADDING: f64 = 8.0;

// ── Default paint ───────────────────────────────────────────────

pub const DEFAULT_FILL: &str = "#ffffff";
pub const DEFAULT_STROKE: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_STICKY_FILL: &str = "#fff59d";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_TEXT: &str = "Text";

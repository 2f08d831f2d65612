//! Rendering: draws the full whiteboard scene to a 2D surface.
//!
//! The render pass reads document state and the in-progress gesture preview
//! and produces pixels. It never mutates any application state, so drawing
//! the same state twice issues the same calls.
//!
//! Drawing goes through the [`Surface`] trait, implemented here for
//! [`web_sys::CanvasRenderingContext2d`]. All fallible calls propagate errors
//! via `Result<(), S::Error>`; the top-level caller
//! ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Bounds, Camera};
use crate::config::EngineConfig;
use crate::consts::{
    GRID_COLOR, HANDLE_FILL, HANDLE_STROKE, MAX_GRID_LINES, PREVIEW_DASH_PX, PREVIEW_FILL, SELECTION_COLOR, STICKY_PADDING,
    TEXT_ADVANCE_RATIO, TEXT_LINE_HEIGHT,
};
use crate::doc::{DocStore, Geometry, Shape};
use crate::hit::{self, ResizeAnchor};

/// Screen-space size of the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Device pixel ratio.
    pub dpr: f64,
}

/// The 2D drawing primitives the render pass needs.
pub trait Surface {
    type Error;

    fn save(&self);
    fn restore(&self);
    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), Self::Error>;
    fn translate(&self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn scale(&self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&self, radians: f64) -> Result<(), Self::Error>;
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);

    fn set_fill_style(&self, color: &str);
    fn set_stroke_style(&self, color: &str);
    fn set_line_width(&self, width: f64);
    fn set_line_dash(&self, segments: &[f64]) -> Result<(), Self::Error>;
    fn set_global_alpha(&self, alpha: f64);

    fn begin_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;
    fn fill(&self);
    fn stroke(&self);
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64);

    fn set_font(&self, font: &str);
    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f)
    }

    fn translate(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::translate(self, x, y)
    }

    fn scale(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::scale(self, x, y)
    }

    fn rotate(&self, radians: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::rotate(self, radians)
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn set_fill_style(&self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_style(&self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_dash(&self, segments: &[f64]) -> Result<(), JsValue> {
        let dash_array = js_sys::Array::new();
        for seg in segments {
            dash_array.push(&JsValue::from_f64(*seg));
        }
        CanvasRenderingContext2d::set_line_dash(self, &dash_array)
    }

    fn set_global_alpha(&self, alpha: f64) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha);
    }

    fn begin_path(&self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end)
    }

    fn fill(&self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }

    fn set_font(&self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::fill_text(self, text, x, y)
    }
}

/// Draw the full scene: grid, shapes, resize handles, then the gesture preview.
///
/// # Errors
///
/// Returns `Err` if any surface call fails (e.g. invalid context state).
pub fn draw<S: Surface>(
    surface: &S,
    doc: &DocStore,
    preview: Option<&Shape>,
    viewport: Viewport,
    config: &EngineConfig,
) -> Result<(), S::Error> {
    let camera = doc.camera();

    // Layer 1: clear and set up transforms.
    surface.set_transform(viewport.dpr, 0.0, 0.0, viewport.dpr, 0.0, 0.0)?;
    surface.clear_rect(0.0, 0.0, viewport.width, viewport.height);
    surface.translate(camera.pan_x, camera.pan_y)?;
    surface.scale(camera.zoom, camera.zoom)?;

    // Layer 2: grid over the visible world region.
    draw_grid(surface, &camera, viewport, config.grid_spacing);

    // Layer 3: shapes in insertion order (bottom first).
    for shape in doc.shapes() {
        draw_shape(surface, shape, camera.zoom)?;
    }

    // Layer 4: handles of the single selected resizable shape.
    if let Some(shape) = hit::handle_target(doc) {
        draw_handles(surface, shape.bounds(), camera.zoom, config.handle_radius_px);
    }

    // Layer 5: in-progress gesture.
    if let Some(shape) = preview {
        draw_preview(surface, shape, camera.zoom)?;
    }

    Ok(())
}

// =============================================================
// Grid
// =============================================================

fn draw_grid<S: Surface>(surface: &S, camera: &Camera, viewport: Viewport, spacing: f64) {
    if spacing <= 0.0 {
        return;
    }
    let visible = camera.visible_world(viewport.width, viewport.height);
    let start_x = (visible.x / spacing).floor() * spacing;
    let start_y = (visible.y / spacing).floor() * spacing;

    surface.set_stroke_style(GRID_COLOR);
    surface.set_line_width(1.0 / camera.zoom);
    surface.begin_path();
    for i in 0..grid_line_count(start_x, visible.right(), spacing) {
        let x = start_x + f64::from(i) * spacing;
        surface.move_to(x, visible.y);
        surface.line_to(x, visible.bottom());
    }
    for i in 0..grid_line_count(start_y, visible.bottom(), spacing) {
        let y = start_y + f64::from(i) * spacing;
        surface.move_to(visible.x, y);
        surface.line_to(visible.right(), y);
    }
    surface.stroke();
}

/// Lines at `start + i * spacing` up to and including `end`, capped at
/// [`MAX_GRID_LINES`]. Non-finite spans draw nothing.
fn grid_line_count(start: f64, end: f64, spacing: f64) -> u32 {
    let steps = ((end - start) / spacing).floor();
    if !steps.is_finite() || steps < 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps.min(f64::from(MAX_GRID_LINES - 1)) as u32;
    steps + 1
}

// =============================================================
// Shapes
// =============================================================

fn draw_shape<S: Surface>(surface: &S, shape: &Shape, zoom: f64) -> Result<(), S::Error> {
    surface.save();
    if let Some(opacity) = shape.opacity {
        surface.set_global_alpha(opacity);
    }
    rotate_about_center(surface, shape)?;

    surface.set_fill_style(&shape.paint.fill);
    if shape.selected {
        surface.set_stroke_style(SELECTION_COLOR);
        surface.set_line_width((shape.paint.stroke_width + 1.0) / zoom);
    } else {
        surface.set_stroke_style(&shape.paint.stroke);
        surface.set_line_width(shape.paint.stroke_width / zoom);
    }

    draw_geometry(surface, &shape.geometry, &shape.paint.stroke)?;
    surface.restore();
    Ok(())
}

/// Fill and stroke the outline of `geometry` with the current styles.
/// Text is filled with `text_color`.
fn draw_geometry<S: Surface>(surface: &S, geometry: &Geometry, text_color: &str) -> Result<(), S::Error> {
    match geometry {
        Geometry::Rectangle { position, width, height } => {
            surface.fill_rect(position.x, position.y, *width, *height);
            surface.stroke_rect(position.x, position.y, *width, *height);
        }
        Geometry::Circle { center, radius } => {
            surface.begin_path();
            surface.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            surface.fill();
            surface.stroke();
        }
        Geometry::Line { start, end } => {
            surface.begin_path();
            surface.move_to(start.x, start.y);
            surface.line_to(end.x, end.y);
            surface.stroke();
        }
        Geometry::Text { position, text, font_size } => {
            surface.set_fill_style(text_color);
            draw_text_lines(surface, text.lines(), position.x, position.y, *font_size)?;
        }
        Geometry::StickyNote { position, width, height, text, font_size } => {
            surface.fill_rect(position.x, position.y, *width, *height);
            surface.stroke_rect(position.x, position.y, *width, *height);
            let max_w = (width - 2.0 * STICKY_PADDING).max(0.0);
            let lines = wrap_text(text, *font_size, max_w);
            surface.set_fill_style(text_color);
            draw_text_lines(
                surface,
                lines.iter().map(String::as_str),
                position.x + STICKY_PADDING,
                position.y + STICKY_PADDING,
                *font_size,
            )?;
        }
    }
    Ok(())
}

fn draw_text_lines<'a, S: Surface>(
    surface: &S,
    lines: impl Iterator<Item = &'a str>,
    x: f64,
    y: f64,
    font_size: f64,
) -> Result<(), S::Error> {
    surface.set_font(&format!("{font_size:.0}px sans-serif"));
    let line_h = font_size * TEXT_LINE_HEIGHT;
    let mut baseline = y + font_size;
    for line in lines {
        surface.fill_text(line, x, baseline)?;
        baseline += line_h;
    }
    Ok(())
}

/// Greedy word wrap using the same glyph estimate as text bounds.
fn wrap_text(text: &str, font_size: f64, max_w: f64) -> Vec<String> {
    let advance = font_size * TEXT_ADVANCE_RATIO;
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate_len = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            #[allow(clippy::cast_precision_loss)]
            let fits = candidate_len as f64 * advance <= max_w;
            if !fits && !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    out
}

fn rotate_about_center<S: Surface>(surface: &S, shape: &Shape) -> Result<(), S::Error> {
    let Some(deg) = shape.rotation.filter(|d| *d != 0.0) else {
        return Ok(());
    };
    let c = shape.bounds().center();
    surface.translate(c.x, c.y)?;
    surface.rotate(deg.to_radians())?;
    surface.translate(-c.x, -c.y)
}

// =============================================================
// Selection UI
// =============================================================

fn draw_handles<S: Surface>(surface: &S, bounds: Bounds, zoom: f64, handle_radius_px: f64) {
    let half = handle_radius_px / 2.0 / zoom;
    surface.save();
    surface.set_fill_style(HANDLE_FILL);
    surface.set_stroke_style(HANDLE_STROKE);
    surface.set_line_width(1.0 / zoom);
    for anchor in ResizeAnchor::ALL {
        let p = anchor.position(bounds);
        surface.fill_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
        surface.stroke_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
    }
    surface.restore();
}

fn draw_preview<S: Surface>(surface: &S, shape: &Shape, zoom: f64) -> Result<(), S::Error> {
    let dash = PREVIEW_DASH_PX / zoom;
    surface.save();
    surface.set_line_dash(&[dash, dash])?;
    surface.set_stroke_style(SELECTION_COLOR);
    surface.set_fill_style(PREVIEW_FILL);
    surface.set_line_width(2.0 / zoom);
    match &shape.geometry {
        // Text previews as its outline so the placement is visible.
        Geometry::Text { .. } => {
            let b = shape.bounds();
            surface.stroke_rect(b.x, b.y, b.width, b.height);
        }
        geometry => draw_geometry(surface, geometry, SELECTION_COLOR)?,
    }
    surface.set_line_dash(&[])?;
    surface.restore();
    Ok(())
}

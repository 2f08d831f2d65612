//! Document model: shapes, their geometry and paint, and the in-memory store.
//!
//! This module defines what is on the whiteboard (`Shape`, `Geometry`,
//! `ShapeKind`, `Paint`), a sparse-update type for incremental edits
//! (`PartialShape`), and the store that owns the document (`DocStore`): the
//! ordered shape list, the selection, the active tool and the camera.
//!
//! Every mutation is a synchronous transition on `DocStore`. The reducer entry
//! point [`DocStore::dispatch`] accepts a [`StoreAction`] so hosts can route
//! UI callbacks through a single function; the named methods are the same
//! transitions called directly. Insertion order is draw order: later shapes
//! are drawn above earlier ones.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Bounds, Camera, Point, ZoomRange};
use crate::consts::{
    DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, TEXT_ADVANCE_RATIO, TEXT_LINE_HEIGHT, ZOOM_MAX, ZOOM_MIN,
};
use crate::input::Tool;

/// Unique identifier for a shape.
pub type ShapeId = Uuid;

/// Rejected store transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("shape id already exists: {0}")]
    DuplicateId(ShapeId),
    #[error("shape not found: {0}")]
    NotFound(ShapeId),
}

/// The kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Text,
    StickyNote,
}

/// Kind-specific geometry in world coordinates.
///
/// Each variant carries exactly the fields its kind needs, so a circle can
/// never hold a width and a line never holds a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Geometry {
    /// Axis-aligned box with its top-left corner at `position`.
    Rectangle { position: Point, width: f64, height: f64 },
    /// Circle around `center`.
    Circle { center: Point, radius: f64 },
    /// Straight segment between two endpoints.
    Line { start: Point, end: Point },
    /// Free-standing text anchored at its top-left corner.
    Text { position: Point, text: String, font_size: f64 },
    /// Filled box carrying wrapped text.
    StickyNote { position: Point, width: f64, height: f64, text: String, font_size: f64 },
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Line { .. } => ShapeKind::Line,
            Self::Text { .. } => ShapeKind::Text,
            Self::StickyNote { .. } => ShapeKind::StickyNote,
        }
    }

    /// The anchor point of the shape: top-left corner, circle center, or line start.
    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Rectangle { position, .. } | Self::Text { position, .. } | Self::StickyNote { position, .. } => {
                *position
            }
            Self::Circle { center, .. } => *center,
            Self::Line { start, .. } => *start,
        }
    }

    /// Axis-aligned bounding box, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Rectangle { position, width, height } | Self::StickyNote { position, width, height, .. } => {
                Bounds::new(position.x, position.y, *width, *height)
            }
            Self::Circle { center, radius } => {
                Bounds::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
            }
            Self::Line { start, end } => Bounds::from_corners(*start, *end),
            Self::Text { position, text, font_size } => {
                let (w, h) = text_extent(text, *font_size);
                Bounds::new(position.x, position.y, w, h)
            }
        }
    }

    /// Whether the shape exposes the eight resize handles.
    #[must_use]
    pub fn is_resizable(&self) -> bool {
        matches!(self, Self::Rectangle { .. } | Self::Circle { .. } | Self::StickyNote { .. })
    }

    /// Move the whole shape by a world-space delta.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Rectangle { position, .. } | Self::Text { position, .. } | Self::StickyNote { position, .. } => {
                *position = position.offset(dx, dy);
            }
            Self::Circle { center, .. } => *center = center.offset(dx, dy),
            Self::Line { start, end } => {
                *start = start.offset(dx, dy);
                *end = end.offset(dx, dy);
            }
        }
        out
    }

    /// Absolute extents, and a font size of at least one unit.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        match &mut self {
            Self::Rectangle { width, height, .. } => {
                *width = width.abs();
                *height = height.abs();
            }
            Self::StickyNote { width, height, font_size, .. } => {
                *width = width.abs();
                *height = height.abs();
                *font_size = font_size.abs().max(1.0);
            }
            Self::Circle { radius, .. } => *radius = radius.abs(),
            Self::Text { font_size, .. } => *font_size = font_size.abs().max(1.0),
            Self::Line { .. } => {}
        }
        self
    }
}

/// Estimated `(width, height)` of a block of text.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_extent(text: &str, font_size: f64) -> (f64, f64) {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let lines = text.lines().count();
    (
        longest as f64 * font_size * TEXT_ADVANCE_RATIO,
        lines as f64 * font_size * TEXT_LINE_HEIGHT,
    )
}

/// Fill and stroke attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    /// Fill color as a CSS color string.
    pub fill: String,
    /// Stroke color as a CSS color string.
    pub stroke: String,
    /// Stroke width in screen pixels.
    pub stroke_width: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL.to_owned(),
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// A shape as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique, immutable identifier.
    pub id: ShapeId,
    /// Kind-specific geometry.
    pub geometry: Geometry,
    /// Fill and stroke.
    pub paint: Paint,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Opacity in `[0, 1]`; fully opaque when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Mirrors membership in the store's selection.
    #[serde(default)]
    pub selected: bool,
    /// Locked shapes can be selected but not moved or resized.
    #[serde(default)]
    pub locked: bool,
}

impl Shape {
    /// A fresh, unselected, unlocked shape with a random id.
    #[must_use]
    pub fn new(geometry: Geometry, paint: Paint) -> Self {
        Self::with_id(Uuid::new_v4(), geometry, paint)
    }

    #[must_use]
    pub fn with_id(id: ShapeId, geometry: Geometry, paint: Paint) -> Self {
        Self {
            id,
            geometry: geometry.normalized(),
            paint,
            rotation: None,
            opacity: None,
            selected: false,
            locked: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.geometry.bounds()
    }

    /// Sparse update that moves a resizable shape onto `bounds`.
    ///
    /// Circles keep their center on the bounds center with a radius of half
    /// the shorter side. Returns `None` for kinds without resize handles.
    #[must_use]
    pub fn partial_for_bounds(&self, bounds: Bounds) -> Option<PartialShape> {
        match self.geometry {
            Geometry::Rectangle { .. } | Geometry::StickyNote { .. } => Some(PartialShape {
                position: Some(Point::new(bounds.x, bounds.y)),
                width: Some(bounds.width),
                height: Some(bounds.height),
                ..Default::default()
            }),
            Geometry::Circle { .. } => Some(PartialShape {
                position: Some(bounds.center()),
                radius: Some(bounds.width.min(bounds.height) / 2.0),
                ..Default::default()
            }),
            Geometry::Line { .. } | Geometry::Text { .. } => None,
        }
    }

    /// Merge `partial` into this shape. Fields that do not apply to the
    /// shape's kind are ignored; geometry is normalized afterwards.
    pub fn apply_partial(&mut self, partial: &PartialShape) {
        self.geometry = merge_geometry(&self.geometry, partial).normalized();

        if let Some(fill) = &partial.fill {
            self.paint.fill.clone_from(fill);
        }
        if let Some(stroke) = &partial.stroke {
            self.paint.stroke.clone_from(stroke);
        }
        if let Some(w) = partial.stroke_width {
            self.paint.stroke_width = w.abs();
        }
        if let Some(r) = partial.rotation {
            self.rotation = Some(r);
        }
        if let Some(o) = partial.opacity {
            self.opacity = Some(o.clamp(0.0, 1.0));
        }
        if let Some(locked) = partial.locked {
            self.locked = locked;
        }
    }
}

fn merge_geometry(geometry: &Geometry, p: &PartialShape) -> Geometry {
    match geometry {
        Geometry::Rectangle { position, width, height } => Geometry::Rectangle {
            position: p.position.unwrap_or(*position),
            width: p.width.unwrap_or(*width),
            height: p.height.unwrap_or(*height),
        },
        Geometry::Circle { center, radius } => Geometry::Circle {
            center: p.position.unwrap_or(*center),
            radius: p.radius.unwrap_or(*radius),
        },
        Geometry::Line { start, end } => {
            // A position moves the whole segment so that `start` lands on it.
            let (start, end) = match p.position {
                Some(pos) => (pos, end.offset(pos.x - start.x, pos.y - start.y)),
                None => (*start, *end),
            };
            Geometry::Line {
                start: p.start.unwrap_or(start),
                end: p.end.unwrap_or(end),
            }
        }
        Geometry::Text { position, text, font_size } => Geometry::Text {
            position: p.position.unwrap_or(*position),
            text: p.text.clone().unwrap_or_else(|| text.clone()),
            font_size: p.font_size.unwrap_or(*font_size),
        },
        Geometry::StickyNote { position, width, height, text, font_size } => Geometry::StickyNote {
            position: p.position.unwrap_or(*position),
            width: p.width.unwrap_or(*width),
            height: p.height.unwrap_or(*height),
            text: p.text.clone().unwrap_or_else(|| text.clone()),
            font_size: p.font_size.unwrap_or(*font_size),
        },
    }
}

/// Sparse update for a shape. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialShape {
    /// New anchor point (top-left, circle center, or line start).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// New line start, applied after `position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    /// New line end, applied after `position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

/// A store transition, for hosts that route every UI callback through one reducer.
#[derive(Debug, Clone)]
pub enum StoreAction {
    AddShape(Shape),
    UpdateShape { id: ShapeId, fields: PartialShape },
    DeleteShape(ShapeId),
    DeleteShapes(Vec<ShapeId>),
    SelectShape { id: ShapeId, additive: bool },
    ClearSelection,
    SetActiveTool(Tool),
    SetZoom(f64),
    SetPanOffset(Point),
}

/// In-memory document: shapes in draw order, selection, active tool and camera.
///
/// Invariants held after every transition:
/// - shape ids are unique;
/// - every selected id names a shape in the document;
/// - each shape's `selected` flag equals its membership in the selection;
/// - zoom lies within the store's zoom limits.
#[derive(Debug, Clone)]
pub struct DocStore {
    shapes: Vec<Shape>,
    selection: Vec<ShapeId>,
    tool: Tool,
    camera: Camera,
    zoom_limits: ZoomRange,
}

impl DocStore {
    /// Create an empty store with the default zoom limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_zoom_limits(ZoomRange::new(ZOOM_MIN, ZOOM_MAX))
    }

    #[must_use]
    pub fn with_zoom_limits(zoom_limits: ZoomRange) -> Self {
        Self {
            shapes: Vec::new(),
            selection: Vec::new(),
            tool: Tool::default(),
            camera: Camera::default(),
            zoom_limits,
        }
    }

    /// Apply one transition.
    ///
    /// # Errors
    ///
    /// `DuplicateId` when adding a shape whose id exists, `NotFound` when
    /// updating a missing shape. The store is unchanged on error.
    pub fn dispatch(&mut self, action: StoreAction) -> Result<(), StoreError> {
        match action {
            StoreAction::AddShape(shape) => self.add_shape(shape)?,
            StoreAction::UpdateShape { id, fields } => self.update_shape(&id, &fields)?,
            StoreAction::DeleteShape(id) => {
                self.delete_shape(&id);
            }
            StoreAction::DeleteShapes(ids) => {
                self.delete_shapes(&ids);
            }
            StoreAction::SelectShape { id, additive } => {
                self.select_shape(&id, additive);
            }
            StoreAction::ClearSelection => {
                self.clear_selection();
            }
            StoreAction::SetActiveTool(tool) => self.set_active_tool(tool),
            StoreAction::SetZoom(zoom) => self.set_zoom(zoom),
            StoreAction::SetPanOffset(offset) => self.set_pan_offset(offset),
        }
        Ok(())
    }

    // --- Shapes ---

    /// Append a shape on top of the draw order.
    ///
    /// A shape arriving with `selected = true` joins the selection.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if a shape with the same id already exists.
    pub fn add_shape(&mut self, mut shape: Shape) -> Result<(), StoreError> {
        if self.contains(&shape.id) {
            tracing::warn!(id = %shape.id, "rejected shape with duplicate id");
            return Err(StoreError::DuplicateId(shape.id));
        }
        shape.geometry = shape.geometry.normalized();
        if shape.selected {
            self.selection.push(shape.id);
        }
        tracing::debug!(id = %shape.id, kind = ?shape.kind(), "shape added");
        self.shapes.push(shape);
        Ok(())
    }

    /// Merge `fields` into an existing shape.
    ///
    /// # Errors
    ///
    /// `NotFound` if no shape has this id.
    pub fn update_shape(&mut self, id: &ShapeId, fields: &PartialShape) -> Result<(), StoreError> {
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == *id) else {
            return Err(StoreError::NotFound(*id));
        };
        shape.apply_partial(fields);
        Ok(())
    }

    /// Remove a shape and drop it from the selection. Missing ids are a no-op.
    pub fn delete_shape(&mut self, id: &ShapeId) -> Option<Shape> {
        let idx = self.shapes.iter().position(|s| s.id == *id)?;
        self.selection.retain(|sel| sel != id);
        tracing::debug!(%id, "shape deleted");
        Some(self.shapes.remove(idx))
    }

    /// Remove every listed shape and drop them from the selection.
    /// Returns the shapes that were actually present.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> Vec<Shape> {
        let (removed, kept): (Vec<Shape>, Vec<Shape>) =
            std::mem::take(&mut self.shapes).into_iter().partition(|s| ids.contains(&s.id));
        self.shapes = kept;
        self.selection.retain(|sel| !ids.contains(sel));
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "shapes deleted");
        }
        removed
    }

    // --- Selection ---

    /// Select `id`. Non-additive replaces the selection with `{id}`; additive
    /// toggles membership. Ids not in the document are ignored.
    /// Returns whether the selection changed.
    pub fn select_shape(&mut self, id: &ShapeId, additive: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        let before = self.selection.clone();
        if additive {
            if self.selection.contains(id) {
                self.selection.retain(|sel| sel != id);
            } else {
                self.selection.push(*id);
            }
        } else {
            self.selection = vec![*id];
        }
        self.sync_selected_flags();
        before != self.selection
    }

    /// Empty the selection. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        self.sync_selected_flags();
        true
    }

    fn sync_selected_flags(&mut self) {
        for shape in &mut self.shapes {
            shape.selected = self.selection.contains(&shape.id);
        }
    }

    // --- Tool / camera ---

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Set the zoom factor, clamped to the store's limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.zoom = self.zoom_limits.clamp(zoom);
    }

    pub fn set_pan_offset(&mut self, offset: Point) {
        self.camera.pan_x = offset.x;
        self.camera.pan_y = offset.y;
    }

    /// Replace the whole camera; zoom is clamped to the store's limits.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Camera { zoom: self.zoom_limits.clamp(camera.zoom), ..camera };
    }

    // --- Queries ---

    /// All shapes in draw order (bottom first).
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn selected_shape_ids(&self) -> &[ShapeId] {
        &self.selection
    }

    /// Selected shapes in selection order.
    pub fn selected_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.selection.iter().filter_map(|id| self.get(id))
    }

    #[must_use]
    pub fn is_selected(&self, id: &ShapeId) -> bool {
        self.selection.contains(id)
    }

    #[must_use]
    pub fn active_tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    #[must_use]
    pub fn pan_offset(&self) -> Point {
        self.camera.pan_offset()
    }

    #[must_use]
    pub fn zoom_limits(&self) -> ZoomRange {
        self.zoom_limits
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.iter().any(|s| s.id == *id)
    }

    /// Number of shapes in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the document holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}

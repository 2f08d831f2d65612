//! Property editors: a read-only projection of the selection's attributes and
//! the edits that write back into the document.
//!
//! The projection shows the first selected shape; edits apply to every
//! selected shape, skipping fields that do not fit a shape's kind.

#[cfg(test)]
#[path = "props_test.rs"]
mod props_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{DocStore, Geometry, PartialShape, ShapeId, ShapeKind};

/// Attributes of the first selected shape, plus how many shapes are selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionProps {
    pub count: usize,
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub position: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub locked: bool,
}

/// One edit from a property form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PropertyEdit {
    Position(Point),
    Width(f64),
    Height(f64),
    Radius(f64),
    Fill(String),
    Stroke(String),
    StrokeWidth(f64),
    Text(String),
    FontSize(f64),
    Rotation(f64),
    Opacity(f64),
    Locked(bool),
}

impl PropertyEdit {
    /// Whether this edit means anything for a shape of `kind`.
    #[must_use]
    pub fn applies_to(&self, kind: ShapeKind) -> bool {
        match self {
            Self::Width(_) | Self::Height(_) => matches!(kind, ShapeKind::Rectangle | ShapeKind::StickyNote),
            Self::Radius(_) => kind == ShapeKind::Circle,
            Self::Text(_) | Self::FontSize(_) => matches!(kind, ShapeKind::Text | ShapeKind::StickyNote),
            Self::Position(_)
            | Self::Fill(_)
            | Self::Stroke(_)
            | Self::StrokeWidth(_)
            | Self::Rotation(_)
            | Self::Opacity(_)
            | Self::Locked(_) => true,
        }
    }

    /// The sparse update this edit writes.
    #[must_use]
    pub fn to_partial(&self) -> PartialShape {
        let mut p = PartialShape::default();
        match self {
            Self::Position(v) => p.position = Some(*v),
            Self::Width(v) => p.width = Some(*v),
            Self::Height(v) => p.height = Some(*v),
            Self::Radius(v) => p.radius = Some(*v),
            Self::Fill(v) => p.fill = Some(v.clone()),
            Self::Stroke(v) => p.stroke = Some(v.clone()),
            Self::StrokeWidth(v) => p.stroke_width = Some(*v),
            Self::Text(v) => p.text = Some(v.clone()),
            Self::FontSize(v) => p.font_size = Some(*v),
            Self::Rotation(v) => p.rotation = Some(*v),
            Self::Opacity(v) => p.opacity = Some(*v),
            Self::Locked(v) => p.locked = Some(*v),
        }
        p
    }
}

/// Project the selection for the property panel. `None` when nothing is selected.
#[must_use]
pub fn selection_props(doc: &DocStore) -> Option<SelectionProps> {
    let count = doc.selected_shape_ids().len();
    let shape = doc.selected_shapes().next()?;

    let (width, height, radius, text, font_size) = match &shape.geometry {
        Geometry::Rectangle { width, height, .. } => (Some(*width), Some(*height), None, None, None),
        Geometry::StickyNote { width, height, text, font_size, .. } => {
            (Some(*width), Some(*height), None, Some(text.clone()), Some(*font_size))
        }
        Geometry::Circle { radius, .. } => (None, None, Some(*radius), None, None),
        Geometry::Text { text, font_size, .. } => (None, None, None, Some(text.clone()), Some(*font_size)),
        Geometry::Line { .. } => (None, None, None, None, None),
    };

    Some(SelectionProps {
        count,
        id: shape.id,
        kind: shape.kind(),
        position: shape.geometry.position(),
        width,
        height,
        radius,
        text,
        font_size,
        fill: shape.paint.fill.clone(),
        stroke: shape.paint.stroke.clone(),
        stroke_width: shape.paint.stroke_width,
        rotation: shape.rotation.unwrap_or(0.0),
        opacity: shape.opacity.unwrap_or(1.0),
        locked: shape.locked,
    })
}

/// Apply `edit` to every selected shape it applies to. Returns the ids written.
pub fn apply_edit(doc: &mut DocStore, edit: &PropertyEdit) -> Vec<ShapeId> {
    let targets: Vec<ShapeId> = doc
        .selected_shapes()
        .filter(|s| edit.applies_to(s.kind()))
        .map(|s| s.id)
        .collect();
    let partial = edit.to_partial();

    let mut updated = Vec::with_capacity(targets.len());
    for id in targets {
        match doc.update_shape(&id, &partial) {
            Ok(()) => updated.push(id),
            Err(e) => tracing::warn!(error = %e, "property edit skipped"),
        }
    }
    if !updated.is_empty() {
        tracing::debug!(count = updated.len(), ?edit, "property edit applied");
    }
    updated
}

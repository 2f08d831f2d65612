#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Bounds, Point};
use crate::config::EngineConfig;
use crate::doc::{DocStore, Geometry, Shape, ShapeId};

/// Which part of a shape was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All eight handles, clockwise from the top edge.
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Nw | Self::Ne)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Sw | Self::Se)
    }

    /// CSS resize cursor for this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Nw | Self::Se => "nwse-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
        }
    }

    /// World-space center of this handle on `bounds`.
    #[must_use]
    pub fn position(self, bounds: Bounds) -> Point {
        let x = if self.moves_left() {
            bounds.x
        } else if self.moves_right() {
            bounds.right()
        } else {
            bounds.x + bounds.width / 2.0
        };
        let y = if self.moves_top() {
            bounds.y
        } else if self.moves_bottom() {
            bounds.bottom()
        } else {
            bounds.y + bounds.height / 2.0
        };
        Point::new(x, y)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Test which shape (if any) is under `world_pt`.
///
/// Handles of the single selected, resizable, unlocked shape are checked
/// first. Bodies are then tested topmost first, so the most recently added
/// shape wins where shapes overlap.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &DocStore, config: &EngineConfig) -> Option<Hit> {
    let zoom = doc.zoom();

    if let Some(shape) = handle_target(doc) {
        if let Some(anchor) = hit_handle(world_pt, shape.bounds(), zoom, config.handle_radius_px) {
            return Some(Hit { shape_id: shape.id, part: HitPart::ResizeHandle(anchor) });
        }
    }

    doc.shapes()
        .iter()
        .rev()
        .find(|s| shape_contains(s, world_pt, zoom, config.line_hit_tolerance_px))
        .map(|s| Hit { shape_id: s.id, part: HitPart::Body })
}

/// The shape whose resize handles are live: exactly one selected shape that
/// is resizable and not locked.
#[must_use]
pub fn handle_target(doc: &DocStore) -> Option<&Shape> {
    let [id] = doc.selected_shape_ids() else {
        return None;
    };
    doc.get(id)
        .filter(|s| !s.locked && s.geometry.is_resizable())
}

/// Which handle of `bounds` (if any) lies under `world_pt`.
///
/// A handle is hit within `handle_radius_px` screen pixels of its center on
/// either axis.
#[must_use]
pub fn hit_handle(world_pt: Point, bounds: Bounds, zoom: f64, handle_radius_px: f64) -> Option<ResizeAnchor> {
    let r = handle_radius_px / zoom;
    ResizeAnchor::ALL.into_iter().find(|anchor| {
        let h = anchor.position(bounds);
        (world_pt.x - h.x).abs() <= r && (world_pt.y - h.y).abs() <= r
    })
}

/// Whether `world_pt` falls on `shape`.
///
/// Boxed kinds test their bounds, circles their radius, and lines the
/// distance to the segment within `line_tolerance_px` screen pixels.
/// Rotated shapes are tested in their own unrotated frame.
#[must_use]
pub fn shape_contains(shape: &Shape, world_pt: Point, zoom: f64, line_tolerance_px: f64) -> bool {
    let p = match shape.rotation {
        Some(deg) if deg != 0.0 => rotate_about(world_pt, shape.bounds().center(), -deg),
        _ => world_pt,
    };
    match &shape.geometry {
        Geometry::Rectangle { .. } | Geometry::StickyNote { .. } | Geometry::Text { .. } => {
            shape.bounds().contains(p)
        }
        Geometry::Circle { center, radius } => p.distance_to(*center) <= *radius,
        Geometry::Line { start, end } => point_segment_distance(p, *start, *end) <= line_tolerance_px / zoom,
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Rotate `p` by `degrees` clockwise (screen orientation) around `pivot`.
#[must_use]
pub fn rotate_about(p: Point, pivot: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - pivot.x;
    let dy = p.y - pivot.y;
    Point::new(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
}

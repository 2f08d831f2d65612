//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to compute cumulative deltas and
//! commit (or discard) the result on release.
//!
//! ```text
//! Idle -> Panning     (pan tool, middle/secondary button, or pan modifier)
//! Idle -> Resizing    (select tool, on a handle of the selected shape)
//! Idle -> Selecting   (select tool, on a shape body)
//! Idle -> Drawing     (any shape tool)
//! Selecting -> Dragging (pointer moves after the hit)
//!
//! Any -> Idle         (pointer up, or Escape)
//! ```

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Bounds, Point};
use crate::doc::{ShapeId, ShapeKind};
use crate::hit::ResizeAnchor;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Draw a rectangle.
    Rectangle,
    /// Draw a circle from its center outwards.
    Circle,
    /// Draw a straight line segment.
    Line,
    /// Place a text block.
    Text,
    /// Draw a sticky note.
    StickyNote,
    /// Drag to pan the camera.
    Pan,
    /// Click to zoom in (Shift/Alt-click to zoom out).
    Zoom,
}

impl Tool {
    /// The kind of shape this tool draws, if it is a drawing tool.
    #[must_use]
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Line => Some(ShapeKind::Line),
            Self::Text => Some(ShapeKind::Text),
            Self::StickyNote => Some(ShapeKind::StickyNote),
            Self::Select | Self::Pan | Self::Zoom => None,
        }
    }

    /// Whether this tool draws a new shape.
    #[must_use]
    pub fn is_shape(self) -> bool {
        self.shape_kind().is_some()
    }

    /// CSS cursor shown while this tool is idle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Pan => "grab",
            Self::Zoom => "zoom-in",
            Self::Rectangle | Self::Circle | Self::Line | Self::Text | Self::StickyNote => "crosshair",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Delete or Backspace.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Where a dragged shape started, so the drag can be computed from the
/// cumulative delta and reverted on cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub id: ShapeId,
    pub position: Point,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// commit the result on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The camera follows the pointer.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// A new shape is being sized. Nothing is in the store until release.
    Drawing {
        /// Kind of shape being drawn.
        kind: ShapeKind,
        /// The world-space point where the drag started.
        anchor_world: Point,
        /// The latest world-space pointer position.
        current_world: Point,
    },
    /// A shape is being resized by one of its eight handles, written live.
    Resizing {
        /// Id of the shape being resized.
        id: ShapeId,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// World-space pointer position at the start of the resize.
        start_world: Point,
        /// Bounds of the shape before the gesture.
        orig: Bounds,
    },
    /// A shape was hit and selected on pointer-down; the pointer has not moved yet.
    Selecting {
        /// World-space pointer position at pointer-down.
        start_world: Point,
        /// Movable selected shapes and their positions at pointer-down.
        origins: Vec<DragOrigin>,
    },
    /// The selection is being moved by the cumulative pointer delta, written live.
    Dragging {
        /// World-space pointer position at pointer-down.
        start_world: Point,
        /// Movable selected shapes and their positions at pointer-down.
        origins: Vec<DragOrigin>,
    },
}

impl InputState {
    /// Whether a pointer sequence is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Bounds of a shape after dragging `anchor` by `(dx, dy)` from `orig`.
///
/// Each handle moves only its own edges. A side that would shrink below
/// `min_extent` is clamped to it with the opposite edge held in place, so the
/// shape never inverts.
#[must_use]
pub fn resize_bounds(anchor: ResizeAnchor, orig: Bounds, dx: f64, dy: f64, min_extent: f64) -> Bounds {
    let mut b = orig;

    if anchor.moves_left() {
        b.x = orig.x + dx;
        b.width = orig.width - dx;
    } else if anchor.moves_right() {
        b.width = orig.width + dx;
    }
    if anchor.moves_top() {
        b.y = orig.y + dy;
        b.height = orig.height - dy;
    } else if anchor.moves_bottom() {
        b.height = orig.height + dy;
    }

    if b.width < min_extent {
        if anchor.moves_left() {
            b.x = orig.right() - min_extent;
        }
        b.width = min_extent;
    }
    if b.height < min_extent {
        if anchor.moves_top() {
            b.y = orig.bottom() - min_extent;
        }
        b.height = min_extent;
    }
    b
}

use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Bounds, Camera, Point, ZoomRange};
use crate::config::{ConfigError, EngineConfig, PanModifier};
use crate::doc::{DocStore, Geometry, PartialShape, Shape, ShapeId, ShapeKind, StoreAction, StoreError};
use crate::hit::{self, Hit, HitPart};
use crate::input::{Button, DragOrigin, InputState, Key, Modifiers, Tool, WheelDelta, resize_bounds};
use crate::props::{self, PropertyEdit, SelectionProps};
use crate::render::{self, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A drawn shape was committed to the document.
    ShapeCreated(Shape),
    /// A shape's attributes changed (live resize, drag, property edit).
    ShapeUpdated(ShapeId),
    /// Shapes were removed from the document.
    ShapesDeleted(Vec<ShapeId>),
    /// The selection changed; carries the new selection in order.
    SelectionChanged(Vec<ShapeId>),
    /// The host should switch the canvas cursor.
    SetCursor(&'static str),
    /// The scene must be redrawn.
    RenderNeeded,
}

/// Core engine state: all logic that does not depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// One event is processed to completion before the next; the store is only
/// written at the commit points of each gesture.
pub struct EngineCore {
    pub doc: DocStore,
    pub input: InputState,
    pub config: EngineConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a core with host-tuned thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `config` fails [`EngineConfig::validate`].
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            doc: DocStore::with_zoom_limits(config.zoom_limits),
            input: InputState::default(),
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    // --- Store passthrough ---

    /// Apply a store transition from a UI collaborator (toolbar, property panel).
    ///
    /// Tool changes go through [`Self::set_tool`] so an active gesture is cancelled.
    ///
    /// # Errors
    ///
    /// Propagates the store's `DuplicateId` / `NotFound` rejections.
    pub fn dispatch(&mut self, action: StoreAction) -> Result<Vec<Action>, StoreError> {
        if let StoreAction::SetActiveTool(tool) = action {
            let mut actions = self.set_tool(tool);
            actions.push(Action::RenderNeeded);
            return Ok(actions);
        }
        let selection_before = self.doc.selected_shape_ids().to_vec();
        self.doc.dispatch(action)?;
        let mut actions = Vec::new();
        if self.doc.selected_shape_ids() != selection_before.as_slice() {
            actions.push(Action::SelectionChanged(self.doc.selected_shape_ids().to_vec()));
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Set the active tool, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.doc.set_active_tool(tool);
        actions.push(Action::SetCursor(tool.cursor()));
        actions
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    // --- Queries ---

    /// The currently selected shape ids, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ShapeId] {
        self.doc.selected_shape_ids()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.doc.camera()
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.doc.get(id)
    }

    /// The provisional shape of an in-progress draw gesture, if any.
    #[must_use]
    pub fn preview(&self) -> Option<Shape> {
        let InputState::Drawing { kind, anchor_world, current_world } = self.input else {
            return None;
        };
        Some(self.draft_shape(Uuid::nil(), kind, anchor_world, current_world))
    }

    /// Attribute projection for the property editors.
    #[must_use]
    pub fn selection_props(&self) -> Option<SelectionProps> {
        props::selection_props(&self.doc)
    }

    /// Write a property-editor change to every selected shape.
    pub fn apply_property_edit(&mut self, edit: &PropertyEdit) -> Vec<Action> {
        let updated = props::apply_edit(&mut self.doc, edit);
        if updated.is_empty() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = updated.into_iter().map(Action::ShapeUpdated).collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let tool = self.doc.active_tool();

        if self.is_pan_trigger(tool, button, modifiers) {
            tracing::trace!("gesture: idle -> panning");
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor("grabbing")];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let world = self.doc.camera().screen_to_world(screen_pt);
        match (tool, tool.shape_kind()) {
            (Tool::Select, _) => self.begin_select(world, modifiers),
            (Tool::Zoom, _) => {
                let factor = if modifiers.shift || modifiers.alt {
                    self.config.wheel_zoom_out
                } else {
                    self.config.wheel_zoom_in
                };
                self.zoom_at(screen_pt, factor)
            }
            (_, Some(kind)) => {
                tracing::trace!(?kind, "gesture: idle -> drawing");
                self.input = InputState::Drawing { kind, anchor_world: world, current_world: world };
                vec![Action::RenderNeeded]
            }
            (_, None) => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.doc.camera().screen_to_world(screen_pt);
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                // Screen delta applies directly; panning is not scaled by zoom.
                let pan = self.doc.pan_offset();
                self.doc
                    .set_pan_offset(pan.offset(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y));
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { kind, anchor_world, .. } => {
                self.input = InputState::Drawing { kind, anchor_world, current_world: world };
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { id, anchor, start_world, orig } => {
                let bounds = resize_bounds(
                    anchor,
                    orig,
                    world.x - start_world.x,
                    world.y - start_world.y,
                    self.config.min_resize_extent,
                );
                self.input = InputState::Resizing { id, anchor, start_world, orig };
                self.write_bounds(id, bounds)
            }
            InputState::Selecting { start_world, origins } => {
                if world == start_world {
                    self.input = InputState::Selecting { start_world, origins };
                    return Vec::new();
                }
                tracing::trace!(count = origins.len(), "gesture: selecting -> dragging");
                let actions = self.move_origins(&origins, world.x - start_world.x, world.y - start_world.y);
                self.input = InputState::Dragging { start_world, origins };
                actions
            }
            InputState::Dragging { start_world, origins } => {
                let actions = self.move_origins(&origins, world.x - start_world.x, world.y - start_world.y);
                self.input = InputState::Dragging { start_world, origins };
                actions
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let cursor = self.doc.active_tool().cursor();
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Selecting { .. } | InputState::Dragging { .. } => Vec::new(),
            InputState::Panning { .. } | InputState::Resizing { .. } => vec![Action::SetCursor(cursor)],
            InputState::Drawing { kind, anchor_world, .. } => {
                let end = self.doc.camera().screen_to_world(screen_pt);
                self.commit_draw(kind, anchor_world, end)
            }
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy > 0.0 {
            self.config.wheel_zoom_out
        } else {
            self.config.wheel_zoom_in
        };
        self.zoom_at(screen_pt, factor)
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_escape() {
            if self.input.is_active() {
                return self.cancel_gesture();
            }
            if self.doc.clear_selection() {
                return vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded];
            }
            return Vec::new();
        }
        if key.is_delete() && !self.input.is_active() {
            let ids = self.doc.selected_shape_ids().to_vec();
            if ids.is_empty() {
                return Vec::new();
            }
            let removed: Vec<ShapeId> = self.doc.delete_shapes(&ids).into_iter().map(|s| s.id).collect();
            self.doc.clear_selection();
            return vec![
                Action::ShapesDeleted(removed),
                Action::SelectionChanged(Vec::new()),
                Action::RenderNeeded,
            ];
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, _key: Key, _modifiers: Modifiers) -> Vec<Action> {
        Vec::new()
    }

    /// Abort the current gesture without committing it.
    ///
    /// A draw leaves the document untouched, a drag is reverted, and a resize
    /// keeps the bounds it last wrote.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let cursor = self.doc.active_tool().cursor();
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Selecting { .. } => Vec::new(),
            InputState::Drawing { kind, .. } => {
                tracing::debug!(?kind, "draw cancelled");
                vec![Action::RenderNeeded]
            }
            InputState::Panning { .. } | InputState::Resizing { .. } => vec![Action::SetCursor(cursor)],
            InputState::Dragging { origins, .. } => {
                tracing::debug!(count = origins.len(), "drag cancelled");
                self.move_origins(&origins, 0.0, 0.0)
            }
        }
    }

    // --- Gesture helpers ---

    fn is_pan_trigger(&self, tool: Tool, button: Button, modifiers: Modifiers) -> bool {
        if tool == Tool::Pan || matches!(button, Button::Middle | Button::Secondary) {
            return true;
        }
        match self.config.pan_modifier {
            PanModifier::Ctrl => modifiers.ctrl,
            PanModifier::Alt => modifiers.alt,
            PanModifier::Shift => modifiers.shift,
            PanModifier::Meta => modifiers.meta,
            PanModifier::None => false,
        }
    }

    fn begin_select(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let Some(Hit { shape_id, part }) = hit::hit_test(world, &self.doc, &self.config) else {
            if self.doc.clear_selection() {
                return vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded];
            }
            return Vec::new();
        };

        if let HitPart::ResizeHandle(anchor) = part {
            let Some(shape) = self.doc.get(&shape_id) else {
                return Vec::new();
            };
            tracing::trace!(id = %shape_id, ?anchor, "gesture: idle -> resizing");
            self.input = InputState::Resizing { id: shape_id, anchor, start_world: world, orig: shape.bounds() };
            return vec![Action::SetCursor(anchor.cursor())];
        }

        let additive = modifiers.shift || modifiers.meta;
        // Clicking an already selected shape keeps a multi-selection intact for dragging.
        let changed = if additive || !self.doc.is_selected(&shape_id) {
            self.doc.select_shape(&shape_id, additive)
        } else {
            false
        };

        let origins = self
            .doc
            .selected_shapes()
            .filter(|s| !s.locked)
            .map(|s| DragOrigin { id: s.id, position: s.geometry.position() })
            .collect();
        tracing::trace!(id = %shape_id, "gesture: idle -> selecting");
        self.input = InputState::Selecting { start_world: world, origins };

        if changed {
            vec![Action::SelectionChanged(self.doc.selected_shape_ids().to_vec()), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    fn write_bounds(&mut self, id: ShapeId, bounds: Bounds) -> Vec<Action> {
        let Some(partial) = self.doc.get(&id).and_then(|s| s.partial_for_bounds(bounds)) else {
            return Vec::new();
        };
        match self.doc.update_shape(&id, &partial) {
            Ok(()) => vec![Action::ShapeUpdated(id), Action::RenderNeeded],
            Err(e) => {
                tracing::debug!(error = %e, "resize target vanished");
                Vec::new()
            }
        }
    }

    fn move_origins(&mut self, origins: &[DragOrigin], dx: f64, dy: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        for origin in origins {
            let partial = PartialShape { position: Some(origin.position.offset(dx, dy)), ..Default::default() };
            if self.doc.update_shape(&origin.id, &partial).is_ok() {
                actions.push(Action::ShapeUpdated(origin.id));
            }
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn zoom_at(&mut self, screen_pt: Point, factor: f64) -> Vec<Action> {
        let camera = self.doc.camera().zoom_at(screen_pt, factor, self.interactive_zoom_limits());
        self.doc.set_camera(camera);
        vec![Action::RenderNeeded]
    }

    /// Wheel limits narrowed to what the store accepts, so the anchor is never
    /// disturbed by a second clamp.
    fn interactive_zoom_limits(&self) -> ZoomRange {
        let wheel = self.config.wheel_zoom_limits;
        let store = self.doc.zoom_limits();
        let min = wheel.min.max(store.min);
        ZoomRange::new(min, wheel.max.min(store.max).max(min))
    }

    fn commit_draw(&mut self, kind: ShapeKind, anchor: Point, end: Point) -> Vec<Action> {
        let min = self.doc.camera().screen_dist_to_world(self.config.min_draw_size);
        let dx = (end.x - anchor.x).abs();
        let dy = (end.y - anchor.y).abs();
        let big_enough = match kind {
            ShapeKind::Rectangle | ShapeKind::StickyNote => dx > min && dy > min,
            ShapeKind::Circle | ShapeKind::Line | ShapeKind::Text => anchor.distance_to(end) > min,
        };
        if !big_enough {
            tracing::debug!(?kind, "draw below minimum size discarded");
            return vec![Action::RenderNeeded];
        }

        let shape = self.draft_shape(Uuid::new_v4(), kind, anchor, end);
        match self.doc.add_shape(shape.clone()) {
            Ok(()) => {
                tracing::debug!(id = %shape.id, ?kind, "shape committed");
                vec![Action::ShapeCreated(shape), Action::RenderNeeded]
            }
            Err(e) => {
                tracing::warn!(error = %e, "draw commit rejected");
                vec![Action::RenderNeeded]
            }
        }
    }

    /// The shape a draw gesture from `anchor` to `current` would produce.
    fn draft_shape(&self, id: ShapeId, kind: ShapeKind, anchor: Point, current: Point) -> Shape {
        let corners = Bounds::from_corners(anchor, current);
        let top_left = Point::new(corners.x, corners.y);
        let font_size = self.config.default_font_size;
        let geometry = match kind {
            ShapeKind::Rectangle => {
                Geometry::Rectangle { position: top_left, width: corners.width, height: corners.height }
            }
            ShapeKind::Circle => Geometry::Circle { center: anchor, radius: anchor.distance_to(current) },
            ShapeKind::Line => Geometry::Line { start: anchor, end: current },
            ShapeKind::Text => Geometry::Text {
                position: top_left,
                text: crate::consts::DEFAULT_TEXT.to_owned(),
                font_size,
            },
            ShapeKind::StickyNote => Geometry::StickyNote {
                position: top_left,
                width: corners.width,
                height: corners.height,
                text: String::new(),
                font_size,
            },
        };
        let paint = if kind == ShapeKind::StickyNote {
            self.config.sticky_paint()
        } else {
            self.config.default_paint()
        };
        Shape::with_id(id, geometry, paint)
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `config` fails [`EngineConfig::validate`].
    pub fn with_config(canvas: HtmlCanvasElement, config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self { canvas, core: EngineCore::with_config(config)? })
    }

    // --- Delegated store / tool ---

    /// # Errors
    ///
    /// See [`EngineCore::dispatch`].
    pub fn dispatch(&mut self, action: StoreAction) -> Result<Vec<Action>, StoreError> {
        self.core.dispatch(action)
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn apply_property_edit(&mut self, edit: &PropertyEdit) -> Vec<Action> {
        self.core.apply_property_edit(edit)
    }

    // --- Viewport ---

    /// Update viewport dimensions and size the backing store for the device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas
            .set_width((self.core.viewport_width * self.core.dpr).round() as u32);
        self.canvas
            .set_height((self.core.viewport_height * self.core.dpr).round() as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_key_up(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(key, modifiers)
    }

    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        self.core.cancel_gesture()
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let viewport = Viewport {
            width: self.core.viewport_width,
            height: self.core.viewport_height,
            dpr: self.core.dpr,
        };
        render::draw(&ctx, &self.core.doc, self.core.preview().as_ref(), viewport, &self.core.config)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &[ShapeId] {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.core.shape(id)
    }

    #[must_use]
    pub fn selection_props(&self) -> Option<SelectionProps> {
        self.core.selection_props()
    }
}

#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Helpers
// =============================================================

fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::new(Geometry::Rectangle { position: Point::new(x, y), width: w, height: h }, Paint::default())
}

fn circle_at(x: f64, y: f64, r: f64) -> Shape {
    Shape::new(Geometry::Circle { center: Point::new(x, y), radius: r }, Paint::default())
}

fn line(ax: f64, ay: f64, bx: f64, by: f64) -> Shape {
    Shape::new(Geometry::Line { start: Point::new(ax, ay), end: Point::new(bx, by) }, Paint::default())
}

fn store_with(shapes: Vec<Shape>) -> DocStore {
    let mut doc = DocStore::new();
    for s in shapes {
        assert!(doc.add_shape(s).is_ok());
    }
    doc
}

/// Every selected id exists and every `selected` flag matches membership.
fn assert_selection_consistent(doc: &DocStore) {
    for id in doc.selected_shape_ids() {
        assert!(doc.contains(id), "selection holds missing id {id}");
    }
    for s in doc.shapes() {
        assert_eq!(s.selected, doc.is_selected(&s.id), "flag out of sync for {}", s.id);
    }
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn geometry_kind_matches_variant() {
    assert_eq!(rect_at(0.0, 0.0, 1.0, 1.0).kind(), ShapeKind::Rectangle);
    assert_eq!(circle_at(0.0, 0.0, 1.0).kind(), ShapeKind::Circle);
    assert_eq!(line(0.0, 0.0, 1.0, 1.0).kind(), ShapeKind::Line);
}

#[test]
fn circle_bounds_surround_center() {
    let b = circle_at(10.0, 20.0, 5.0).bounds();
    assert_eq!(b, Bounds::new(5.0, 15.0, 10.0, 10.0));
}

#[test]
fn line_bounds_normalize_endpoints() {
    let b = line(10.0, 10.0, 0.0, 4.0).bounds();
    assert_eq!(b, Bounds::new(0.0, 4.0, 10.0, 6.0));
}

#[test]
fn text_bounds_grow_with_lines() {
    let one = Geometry::Text { position: Point::new(0.0, 0.0), text: "ab".into(), font_size: 10.0 }.bounds();
    let two = Geometry::Text { position: Point::new(0.0, 0.0), text: "ab\ncd".into(), font_size: 10.0 }.bounds();
    assert!(two.height > one.height);
    assert_eq!(two.width, one.width);
}

#[test]
fn new_shape_normalizes_negative_extents() {
    let s = rect_at(0.0, 0.0, -30.0, -40.0);
    assert_eq!(s.geometry, Geometry::Rectangle { position: Point::new(0.0, 0.0), width: 30.0, height: 40.0 });
}

#[test]
fn only_boxed_kinds_are_resizable() {
    assert!(rect_at(0.0, 0.0, 1.0, 1.0).geometry.is_resizable());
    assert!(circle_at(0.0, 0.0, 1.0).geometry.is_resizable());
    assert!(!line(0.0, 0.0, 1.0, 1.0).geometry.is_resizable());
    let text = Geometry::Text { position: Point::default(), text: "t".into(), font_size: 12.0 };
    assert!(!text.is_resizable());
}

#[test]
fn translated_moves_both_line_endpoints() {
    let g = line(0.0, 0.0, 10.0, 5.0).geometry.translated(3.0, -1.0);
    assert_eq!(g, Geometry::Line { start: Point::new(3.0, -1.0), end: Point::new(13.0, 4.0) });
}

#[test]
fn geometry_serializes_with_kind_tag() {
    let json = serde_json::to_value(&circle_at(1.0, 2.0, 3.0).geometry);
    let Ok(json) = json else {
        panic!("serialize failed");
    };
    assert_eq!(json["type"], "circle");
    assert_eq!(json["radius"], 3.0);
    assert!(json.get("width").is_none());
}

#[test]
fn sticky_note_kind_is_kebab_case() {
    let json = serde_json::to_value(ShapeKind::StickyNote);
    assert!(matches!(json, Ok(ref v) if v == "sticky-note"));
}

// =============================================================
// Shape::apply_partial
// =============================================================

#[test]
fn apply_partial_sets_only_present_fields() {
    let mut s = rect_at(0.0, 0.0, 10.0, 10.0);
    s.apply_partial(&PartialShape { width: Some(50.0), fill: Some("#ff0000".into()), ..Default::default() });
    assert_eq!(s.geometry, Geometry::Rectangle { position: Point::new(0.0, 0.0), width: 50.0, height: 10.0 });
    assert_eq!(s.paint.fill, "#ff0000");
    assert_eq!(s.paint.stroke, "#000000");
}

#[test]
fn apply_partial_ignores_fields_of_other_kinds() {
    let mut s = circle_at(0.0, 0.0, 10.0);
    s.apply_partial(&PartialShape { width: Some(50.0), text: Some("x".into()), ..Default::default() });
    assert_eq!(s.geometry, Geometry::Circle { center: Point::new(0.0, 0.0), radius: 10.0 });
}

#[test]
fn apply_partial_position_moves_circle_center() {
    let mut s = circle_at(0.0, 0.0, 10.0);
    s.apply_partial(&PartialShape { position: Some(Point::new(5.0, 6.0)), ..Default::default() });
    assert_eq!(s.geometry.position(), Point::new(5.0, 6.0));
}

#[test]
fn apply_partial_position_moves_whole_line() {
    let mut s = line(0.0, 0.0, 10.0, 0.0);
    s.apply_partial(&PartialShape { position: Some(Point::new(5.0, 5.0)), ..Default::default() });
    assert_eq!(s.geometry, Geometry::Line { start: Point::new(5.0, 5.0), end: Point::new(15.0, 5.0) });
}

#[test]
fn apply_partial_line_end_only() {
    let mut s = line(0.0, 0.0, 10.0, 0.0);
    s.apply_partial(&PartialShape { end: Some(Point::new(0.0, 10.0)), ..Default::default() });
    assert_eq!(s.geometry, Geometry::Line { start: Point::new(0.0, 0.0), end: Point::new(0.0, 10.0) });
}

#[test]
fn apply_partial_clamps_opacity_and_normalizes_radius() {
    let mut s = circle_at(0.0, 0.0, 10.0);
    s.apply_partial(&PartialShape { opacity: Some(3.0), radius: Some(-4.0), ..Default::default() });
    assert_eq!(s.opacity, Some(1.0));
    assert_eq!(s.geometry, Geometry::Circle { center: Point::new(0.0, 0.0), radius: 4.0 });
}

#[test]
fn apply_partial_sets_lock_and_rotation() {
    let mut s = rect_at(0.0, 0.0, 10.0, 10.0);
    s.apply_partial(&PartialShape { locked: Some(true), rotation: Some(45.0), ..Default::default() });
    assert!(s.locked);
    assert_eq!(s.rotation, Some(45.0));
}

#[test]
fn partial_for_bounds_circle_uses_shorter_side() {
    let s = circle_at(0.0, 0.0, 10.0);
    let Some(p) = s.partial_for_bounds(Bounds::new(0.0, 0.0, 40.0, 20.0)) else {
        panic!("circle should be resizable");
    };
    assert_eq!(p.position, Some(Point::new(20.0, 10.0)));
    assert_eq!(p.radius, Some(10.0));
}

#[test]
fn partial_for_bounds_none_for_line() {
    assert!(line(0.0, 0.0, 1.0, 1.0).partial_for_bounds(Bounds::new(0.0, 0.0, 5.0, 5.0)).is_none());
}

#[test]
fn partial_default_skips_all_fields_when_serialized() {
    let json = serde_json::to_string(&PartialShape::default());
    assert!(matches!(json, Ok(ref s) if s == "{}"));
}

// =============================================================
// DocStore: shapes
// =============================================================

#[test]
fn store_new_is_empty() {
    let doc = DocStore::new();
    assert!(doc.is_empty());
    assert!(doc.selected_shape_ids().is_empty());
    assert_eq!(doc.active_tool(), Tool::Select);
    assert_eq!(doc.zoom(), 1.0);
}

#[test]
fn add_preserves_insertion_order() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(5.0, 5.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    let doc = store_with(vec![a, b]);
    let ids: Vec<ShapeId> = doc.shapes().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![ia, ib]);
}

#[test]
fn add_duplicate_id_is_rejected() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let dup = Shape::with_id(a.id, Geometry::Circle { center: Point::default(), radius: 1.0 }, Paint::default());
    let id = a.id;
    let mut doc = store_with(vec![a]);
    assert_eq!(doc.add_shape(dup), Err(StoreError::DuplicateId(id)));
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get(&id).map(Shape::kind), Some(ShapeKind::Rectangle));
}

#[test]
fn add_preselected_shape_joins_selection() {
    let mut a = rect_at(0.0, 0.0, 1.0, 1.0);
    a.selected = true;
    let id = a.id;
    let doc = store_with(vec![a]);
    assert_eq!(doc.selected_shape_ids(), &[id]);
    assert_selection_consistent(&doc);
}

#[test]
fn update_merges_fields() {
    let a = rect_at(0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut doc = store_with(vec![a]);
    let res = doc.update_shape(&id, &PartialShape { height: Some(99.0), ..Default::default() });
    assert!(res.is_ok());
    assert_eq!(doc.get(&id).map(Shape::bounds), Some(Bounds::new(0.0, 0.0, 10.0, 99.0)));
}

#[test]
fn update_missing_is_not_found_and_leaves_store() {
    let a = rect_at(0.0, 0.0, 10.0, 10.0);
    let mut doc = store_with(vec![a.clone()]);
    let missing = Uuid::new_v4();
    let res = doc.update_shape(&missing, &PartialShape { width: Some(1.0), ..Default::default() });
    assert_eq!(res, Err(StoreError::NotFound(missing)));
    assert_eq!(doc.shapes(), &[a]);
}

#[test]
fn delete_removes_from_selection() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let id = a.id;
    let mut doc = store_with(vec![a]);
    doc.select_shape(&id, false);
    assert!(doc.delete_shape(&id).is_some());
    assert!(doc.is_empty());
    assert!(doc.selected_shape_ids().is_empty());
}

#[test]
fn delete_missing_is_noop() {
    let mut doc = store_with(vec![rect_at(0.0, 0.0, 1.0, 1.0)]);
    assert!(doc.delete_shape(&Uuid::new_v4()).is_none());
    assert_eq!(doc.len(), 1);
}

#[test]
fn delete_shapes_returns_present_only() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(1.0, 1.0, 1.0, 1.0);
    let c = rect_at(2.0, 2.0, 1.0, 1.0);
    let (ia, ic) = (a.id, c.id);
    let mut doc = store_with(vec![a, b, c]);
    doc.select_shape(&ia, false);
    let removed = doc.delete_shapes(&[ia, ic, Uuid::new_v4()]);
    assert_eq!(removed.len(), 2);
    assert_eq!(doc.len(), 1);
    assert_selection_consistent(&doc);
}

// =============================================================
// DocStore: selection
// =============================================================

#[test]
fn select_replaces_selection() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(1.0, 1.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    let mut doc = store_with(vec![a, b]);
    assert!(doc.select_shape(&ia, false));
    assert!(doc.select_shape(&ib, false));
    assert_eq!(doc.selected_shape_ids(), &[ib]);
    assert_selection_consistent(&doc);
}

#[test]
fn additive_select_toggles() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(1.0, 1.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    let mut doc = store_with(vec![a, b]);
    doc.select_shape(&ia, false);
    doc.select_shape(&ib, true);
    assert_eq!(doc.selected_shape_ids(), &[ia, ib]);
    doc.select_shape(&ia, true);
    assert_eq!(doc.selected_shape_ids(), &[ib]);
    assert_selection_consistent(&doc);
}

#[test]
fn select_missing_id_is_noop() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let ia = a.id;
    let mut doc = store_with(vec![a]);
    doc.select_shape(&ia, false);
    assert!(!doc.select_shape(&Uuid::new_v4(), false));
    assert_eq!(doc.selected_shape_ids(), &[ia]);
}

#[test]
fn reselecting_same_shape_reports_no_change() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let ia = a.id;
    let mut doc = store_with(vec![a]);
    assert!(doc.select_shape(&ia, false));
    assert!(!doc.select_shape(&ia, false));
}

#[test]
fn clear_selection_resets_flags() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let ia = a.id;
    let mut doc = store_with(vec![a]);
    doc.select_shape(&ia, false);
    assert!(doc.clear_selection());
    assert!(!doc.clear_selection());
    assert!(doc.shapes().iter().all(|s| !s.selected));
}

#[test]
fn selected_shapes_follow_selection_order() {
    let a = rect_at(0.0, 0.0, 1.0, 1.0);
    let b = rect_at(1.0, 1.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    let mut doc = store_with(vec![a, b]);
    doc.select_shape(&ib, true);
    doc.select_shape(&ia, true);
    let order: Vec<ShapeId> = doc.selected_shapes().map(|s| s.id).collect();
    assert_eq!(order, vec![ib, ia]);
}

// =============================================================
// DocStore: tool / camera
// =============================================================

#[test]
fn set_zoom_clamps_to_limits() {
    let mut doc = DocStore::new();
    doc.set_zoom(50.0);
    assert_eq!(doc.zoom(), 10.0);
    doc.set_zoom(0.0);
    assert_eq!(doc.zoom(), 0.1);
    doc.set_zoom(2.5);
    assert_eq!(doc.zoom(), 2.5);
}

#[test]
fn set_pan_offset_is_unclamped() {
    let mut doc = DocStore::new();
    doc.set_pan_offset(Point::new(-5000.0, 12.5));
    assert_eq!(doc.pan_offset(), Point::new(-5000.0, 12.5));
}

#[test]
fn set_camera_clamps_zoom_only() {
    let mut doc = DocStore::with_zoom_limits(ZoomRange::new(0.5, 2.0));
    doc.set_camera(Camera { pan_x: 3.0, pan_y: 4.0, zoom: 9.0 });
    assert_eq!(doc.camera(), Camera { pan_x: 3.0, pan_y: 4.0, zoom: 2.0 });
}

// =============================================================
// DocStore: dispatch
// =============================================================

#[test]
fn dispatch_routes_every_action() {
    let a = rect_at(0.0, 0.0, 10.0, 10.0);
    let ia = a.id;
    let mut doc = DocStore::new();
    assert!(doc.dispatch(StoreAction::AddShape(a)).is_ok());
    assert!(doc.dispatch(StoreAction::SelectShape { id: ia, additive: false }).is_ok());
    assert!(doc
        .dispatch(StoreAction::UpdateShape { id: ia, fields: PartialShape { width: Some(5.0), ..Default::default() } })
        .is_ok());
    assert!(doc.dispatch(StoreAction::SetActiveTool(Tool::Circle)).is_ok());
    assert!(doc.dispatch(StoreAction::SetZoom(2.0)).is_ok());
    assert!(doc.dispatch(StoreAction::SetPanOffset(Point::new(1.0, 2.0))).is_ok());

    assert_eq!(doc.selected_shape_ids(), &[ia]);
    assert_eq!(doc.get(&ia).map(|s| s.bounds().width), Some(5.0));
    assert_eq!(doc.active_tool(), Tool::Circle);
    assert_eq!(doc.camera(), Camera { pan_x: 1.0, pan_y: 2.0, zoom: 2.0 });

    assert!(doc.dispatch(StoreAction::ClearSelection).is_ok());
    assert!(doc.dispatch(StoreAction::DeleteShapes(vec![ia])).is_ok());
    assert!(doc.is_empty());
}

#[test]
fn dispatch_propagates_not_found() {
    let mut doc = DocStore::new();
    let id = Uuid::new_v4();
    let res = doc.dispatch(StoreAction::UpdateShape { id, fields: PartialShape::default() });
    assert_eq!(res, Err(StoreError::NotFound(id)));
}

#[test]
fn dispatch_delete_missing_is_ok() {
    let mut doc = DocStore::new();
    assert!(doc.dispatch(StoreAction::DeleteShape(Uuid::new_v4())).is_ok());
}

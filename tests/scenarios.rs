use std::cell::RefCell;

use inkboard::canvas::{CanvasTransform, WheelInput};
use inkboard::color::{Channel, ColorControl, Rgb};
use inkboard::drawing::{ElementKind, FontDescriptor, ShapeKind, Tool};
use inkboard::math::Vec2;
use inkboard::render::{self, Painter, SketchRenderer, SketchStyle, TextBaseline};
use inkboard::scene::{ElementDefaults, Scene};
use inkboard::stroke::{StrokeOutliner, StrokePath};

fn new_scene() -> Scene {
    Scene::new(
        CanvasTransform::new(Vec2::new(1024.0, 768.0), 1.0),
        ElementDefaults::default(),
        ColorControl::default(),
    )
}

fn shape_bounds(scene: &Scene, index: usize) -> (ShapeKind, Vec2, Vec2) {
    match &scene.elements()[index].kind {
        ElementKind::Shape { kind, bounds } => (*kind, bounds.anchor, bounds.extent),
        other => panic!("expected a shape, got {other:?}"),
    }
}

// Scenario A: rectangle drag
#[test]
fn rectangle_drag_stores_anchor_and_signed_extent() {
    let mut scene = new_scene();
    scene.set_tool(Tool::Rectangle);
    scene.pointer_down(Vec2::new(10.0, 10.0));
    scene.pointer_move(Vec2::new(50.0, 30.0));
    scene.pointer_up();

    assert_eq!(scene.elements().len(), 1);
    let (kind, anchor, extent) = shape_bounds(&scene, 0);
    assert_eq!(kind, ShapeKind::Rectangle);
    assert_eq!(anchor, Vec2::new(10.0, 10.0));
    assert_eq!(extent, Vec2::new(40.0, 20.0));
    assert!(!scene.session.is_drawing());
}

#[test]
fn rectangle_dragged_up_left_has_negative_extent() {
    let mut scene = new_scene();
    scene.set_tool(Tool::Rectangle);
    scene.pointer_down(Vec2::new(100.0, 100.0));
    scene.pointer_move(Vec2::new(60.0, 70.0));
    let (_, _, extent) = shape_bounds(&scene, 0);
    assert_eq!(extent, Vec2::new(-40.0, -30.0));
}

#[test]
fn ellipse_extent_is_twice_the_drag() {
    let mut scene = new_scene();
    scene.set_tool(Tool::Ellipse);
    scene.pointer_down(Vec2::new(20.0, 20.0));
    for p in [Vec2::new(25.0, 22.0), Vec2::new(31.5, 10.0), Vec2::new(40.0, 47.0)] {
        scene.pointer_move(p);
        let (_, anchor, extent) = shape_bounds(&scene, 0);
        assert_eq!(extent, (p - anchor) * 2.0);
    }
}

#[test]
fn line_extent_is_the_raw_pointer_position() {
    let mut scene = new_scene();
    scene.set_tool(Tool::Line);
    scene.pointer_down(Vec2::new(5.0, 5.0));
    let (_, anchor, extent) = shape_bounds(&scene, 0);
    assert_eq!(extent, anchor);
    scene.pointer_move(Vec2::new(300.0, -12.0));
    let (_, _, extent) = shape_bounds(&scene, 0);
    assert_eq!(extent, Vec2::new(300.0, -12.0));
}

/// Records outline requests and returns nothing, so no fill is attempted.
#[derive(Default)]
struct SpyOutliner {
    calls: RefCell<Vec<(Vec<Vec2>, f32)>>,
}

impl StrokeOutliner for SpyOutliner {
    fn outline(&self, points: &[Vec2], size: f32) -> Vec<Vec2> {
        self.calls.borrow_mut().push((points.to_vec(), size));
        Vec::new()
    }
}

#[derive(Default)]
struct NullSurface {
    fills: usize,
}

impl Painter for NullSurface {
    fn reset_transform(&mut self) {}
    fn clear(&mut self, _color: Rgb) {}
    fn translate(&mut self, _offset: Vec2) {}
    fn scale(&mut self, _factor: f32) {}
    fn fill_path(&mut self, _path: &StrokePath, _color: Rgb) {
        self.fills += 1;
    }
    fn fill_text(&mut self, _: &str, _: Vec2, _: &FontDescriptor, _: TextBaseline, _: Rgb) {}
}

impl SketchRenderer for NullSurface {
    fn rectangle(&mut self, _: f32, _: f32, _: f32, _: f32, _: &SketchStyle) {}
    fn ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: &SketchStyle) {}
    fn line(&mut self, _: f32, _: f32, _: f32, _: f32, _: &SketchStyle) {}
}

// Scenario B: freehand stroke
#[test]
fn freehand_points_reach_the_outliner_with_line_width() {
    let mut scene = new_scene();
    scene.set_tool(Tool::Freehand);
    scene.pointer_down(Vec2::new(0.0, 0.0));
    for p in [Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0)] {
        scene.pointer_move(p);
    }
    scene.pointer_up();

    let expected: Vec<Vec2> = [(0.0f32, 0.0f32), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]
        .into_iter()
        .map(Vec2::from)
        .collect();
    match &scene.elements()[0].kind {
        ElementKind::Freehand { points } => assert_eq!(points.as_slice(), expected.as_slice()),
        other => panic!("expected freehand, got {other:?}"),
    }

    let outliner = SpyOutliner::default();
    let mut surface = NullSurface::default();
    render::redraw(&scene, &outliner, Rgb::BLACK, &mut surface);

    let calls = outliner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, expected);
    assert_eq!(calls[0].1, 3.0);
    assert_eq!(surface.fills, 0, "empty outline must not be filled");
}

// Scenario C: colour clamping
#[test]
fn colour_control_clamps_and_defaults() {
    let mut control = ColorControl::new(Rgb::new(10, 10, 10));
    control.set_channel(Channel::Red, 999);
    assert_eq!(control.color().r, 255);
    control.set_channel_text(Channel::Red, "abc");
    assert_eq!(control.color().r, 0);
    control.set_channel(Channel::Blue, -4);
    assert_eq!(control.color(), Rgb::new(0, 10, 0));
}

#[test]
fn new_elements_use_the_selected_colour() {
    let mut scene = new_scene();
    scene.session.color.set_channel(Channel::Green, 128);
    scene.set_tool(Tool::Line);
    scene.pointer_down(Vec2::ZERO);
    assert_eq!(scene.elements()[0].style.stroke_color, Rgb::new(255, 128, 255));
}

// Scenario D: zoom
#[test]
fn ctrl_wheel_zooms_and_clamps() {
    let mut scene = new_scene();
    let zoom_in = WheelInput {
        delta_y: -10.0,
        ctrl: true,
        shift: false,
    };
    scene.wheel(zoom_in);
    assert!((scene.viewport.scale() - 1.1).abs() < 1e-6);

    for _ in 0..50 {
        scene.wheel(zoom_in);
    }
    assert_eq!(scene.viewport.scale(), 4.0);
}

#[test]
fn zoom_keeps_the_centre_of_the_view_fixed() {
    let mut scene = new_scene();
    scene.viewport.offset = Vec2::new(-250.0, 40.0);
    let center = scene.viewport.center();
    let before = scene.viewport.screen_to_canvas(center);
    for delta in [-1.0, -1.0, 3.0, -2.0] {
        scene.wheel(WheelInput {
            delta_y: delta,
            ctrl: true,
            shift: false,
        });
        let after = scene.viewport.screen_to_canvas(center);
        assert!(before.distance(after) < 1e-3);
    }
}

#[test]
fn drawing_after_zoom_stores_logical_coordinates() {
    let mut scene = new_scene();
    scene.zoom_in();
    scene.set_tool(Tool::Rectangle);
    let screen = Vec2::new(600.0, 400.0);
    scene.pointer_down(screen);
    let (_, anchor, _) = shape_bounds(&scene, 0);
    let back = scene.viewport.canvas_to_screen(anchor);
    assert!(back.distance(screen) < 1e-3);
}

mod common;

use cgmath::{Deg, InnerSpace, Point2, Quaternion, Rotation, Rotation3, Vector3};
use common::test_utils::*;
use puzzle_cube::{
    InputOutcome, PuzzleConfig,
    data_structures::{
        instance::Instance,
        scene_graph::{NodeKind, SceneGraph},
    },
    input::{InputBindings, InputEvent},
    puzzle::drag::{DragController, drag_rotation},
};

fn assert_same_rotation(actual: Quaternion<f32>, expected: Quaternion<f32>) {
    // q and -q are the same rotation
    let dot = actual.dot(expected).abs();
    assert!(
        (dot - 1.0).abs() < 1e-5,
        "{:?} differs from {:?}",
        actual,
        expected
    );
}

fn pointer_at(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove(Point2::new(x, y))
}

#[test]
fn should_turn_about_x_for_vertical_and_y_for_horizontal_motion() {
    let vertical = drag_rotation(0.0, 90.0);
    assert!((vertical.rotate_vector(Vector3::unit_y()) - Vector3::unit_z()).magnitude() < 1e-5);

    let horizontal = drag_rotation(90.0, 0.0);
    assert!((horizontal.rotate_vector(Vector3::unit_z()) - Vector3::unit_x()).magnitude() < 1e-5);
}

#[test]
fn should_only_track_the_pointer_until_pressed() {
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let bindings = InputBindings::puzzle_defaults();
    let outer = puzzle.scene.handles.outer;
    let before = puzzle.scene.graph.node(outer).unwrap().rotation();

    let outcome = puzzle.handle_input(pointer_at(5.0, 5.0), &bindings);

    assert_eq!(outcome, InputOutcome::PointerTracked);
    assert_eq!(puzzle.drag.state().previous, Point2::new(5.0, 5.0));
    assert!(!puzzle.drag.state().is_dragging);
    assert_eq!(puzzle.scene.graph.node(outer).unwrap().rotation(), before);
}

#[test]
fn should_rotate_by_the_delta_since_the_last_position() {
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let bindings = InputBindings::puzzle_defaults();

    puzzle.handle_input(pointer_at(5.0, 5.0), &bindings);
    assert_eq!(puzzle.handle_input(InputEvent::PointerDown, &bindings), InputOutcome::DragStarted);
    let outcome = puzzle.handle_input(pointer_at(15.0, 8.0), &bindings);

    let InputOutcome::Rotated(delta) = outcome else {
        panic!("expected a rotation, got {:?}", outcome);
    };
    assert_same_rotation(delta, drag_rotation(10.0, 3.0));
    let outer = puzzle.scene.graph.node(puzzle.scene.handles.outer).unwrap();
    assert_same_rotation(outer.rotation(), drag_rotation(10.0, 3.0));
}

#[test]
fn should_apply_drags_in_world_space() {
    let mut graph = SceneGraph::new();
    let target = graph.add_root(NodeKind::OuterWrapper, Instance::new());
    let start = Quaternion::from_angle_z(Deg(90.0));
    graph.node_mut(target).unwrap().set_rotation(start);

    let mut drag = DragController::new(target, 1.0);
    drag.pointer_down();
    drag.pointer_move(Point2::new(0.0, 0.0), &mut graph);
    let delta = drag.pointer_move(Point2::new(20.0, 0.0), &mut graph).unwrap();

    let rotation = graph.node(target).unwrap().rotation();
    assert_same_rotation(rotation, delta * start);
    // post-multiplying would have turned about the node's own Y instead
    assert!((rotation.dot(start * delta).abs() - 1.0).abs() > 1e-3);
}

#[test]
fn should_stop_rotating_once_released() {
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let bindings = InputBindings::puzzle_defaults();
    let outer = puzzle.scene.handles.outer;

    puzzle.handle_input(InputEvent::PointerDown, &bindings);
    puzzle.handle_input(pointer_at(30.0, 0.0), &bindings);
    assert_eq!(puzzle.handle_input(InputEvent::PointerUp, &bindings), InputOutcome::DragEnded);
    let released = puzzle.scene.graph.node(outer).unwrap().rotation();

    let outcome = puzzle.handle_input(pointer_at(200.0, 90.0), &bindings);
    assert_eq!(outcome, InputOutcome::PointerTracked);
    assert_eq!(puzzle.scene.graph.node(outer).unwrap().rotation(), released);

    // the next drag starts from where the pointer was left
    puzzle.handle_input(InputEvent::PointerDown, &bindings);
    let InputOutcome::Rotated(delta) = puzzle.handle_input(pointer_at(201.0, 90.0), &bindings)
    else {
        panic!("expected a rotation");
    };
    assert_same_rotation(delta, drag_rotation(1.0, 0.0));
}

#[test]
fn should_scale_pixels_by_the_configured_sensitivity() {
    let config = PuzzleConfig {
        drag_degrees_per_pixel: 0.25,
        ..quick_config()
    };
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&config, &script);
    let bindings = InputBindings::puzzle_defaults();

    puzzle.handle_input(pointer_at(0.0, 0.0), &bindings);
    puzzle.handle_input(InputEvent::PointerDown, &bindings);
    let InputOutcome::Rotated(delta) = puzzle.handle_input(pointer_at(40.0, -20.0), &bindings)
    else {
        panic!("expected a rotation");
    };
    assert_same_rotation(delta, drag_rotation(10.0, -5.0));
}

#[test]
fn should_leave_the_inner_layers_alone() {
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let bindings = InputBindings::puzzle_defaults();
    let inner = puzzle.scene.handles.inner;
    let root = puzzle.scene.handles.cube_root;
    let inner_before = puzzle.scene.graph.node(inner).unwrap().rotation();
    let root_before = puzzle.scene.graph.node(root).unwrap().rotation();

    puzzle.handle_input(InputEvent::PointerDown, &bindings);
    puzzle.handle_input(pointer_at(50.0, 50.0), &bindings);

    assert_eq!(puzzle.scene.graph.node(inner).unwrap().rotation(), inner_before);
    assert_eq!(puzzle.scene.graph.node(root).unwrap().rotation(), root_before);
}

mod common;

use std::f32::consts::PI;

use cgmath::{InnerSpace, Rotation, Vector3};
use common::test_utils::*;
use instant::Duration;
use puzzle_cube::{
    PuzzleConfig, PuzzleError,
    data_structures::scene_graph::Axis,
    puzzle::{
        PuzzleContext,
        random::SplitMix64,
        scheduler::{ChainState, LayerRotationScheduler, MoveTiming},
    },
};

fn layer_angle(puzzle: &PuzzleContext, layer: usize) -> f32 {
    let id = puzzle.scene.handles.layers[layer];
    puzzle.scene.graph.node(id).unwrap().euler_component(Axis::X).0
}

fn advance(puzzle: &mut PuzzleContext, millis: u64) -> usize {
    let completed = puzzle
        .tweens
        .update(Duration::from_millis(millis), &mut puzzle.scene.graph);
    puzzle
        .scheduler
        .handle_completions(&completed, &mut puzzle.scene.graph, &mut puzzle.tweens)
}

#[test]
fn should_start_with_exactly_one_move_in_flight() {
    let script = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.0));
    let puzzle = scripted_puzzle(&quick_config(), &script);

    assert_eq!(puzzle.chains.len(), 1);
    let chain = puzzle.scheduler.chain(puzzle.chains[0]).unwrap();
    assert_eq!(chain.node, puzzle.scene.handles.cube_root);
    assert!(matches!(chain.state, ChainState::Animating(_)));
    assert_eq!(puzzle.tweens.in_flight(), 1);
    assert_eq!(puzzle.tweens.in_flight_for(puzzle.chains[0]), 1);
    // axis, layer, direction and pause
    assert_eq!(script.drawn(), 4);
}

#[test]
fn should_reorient_the_cube_root_by_a_quarter_turn() {
    let about_z = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.0));
    let puzzle = scripted_puzzle(&quick_config(), &about_z);
    let root = puzzle.scene.graph.node(puzzle.scene.handles.cube_root).unwrap();
    let turned = root.rotation().rotate_vector(Vector3::unit_x());
    assert!((turned - Vector3::unit_y()).magnitude() < 1e-5);

    let about_y = ScriptedRandom::new(&move_script(0.8, 0.0, 0.1, 0.0));
    let puzzle = scripted_puzzle(&quick_config(), &about_y);
    let root = puzzle.scene.graph.node(puzzle.scene.handles.cube_root).unwrap();
    let turned = root.rotation().rotate_vector(Vector3::unit_x());
    assert!((turned + Vector3::unit_z()).magnitude() < 1e-5);
}

#[test]
fn should_turn_the_chosen_layer_by_half_a_turn() {
    // layer 1 of 3, clockwise
    let script = ScriptedRandom::new(&move_script(0.2, 0.5, 0.9, 0.0));
    let mut puzzle = scripted_puzzle(&quick_config(), &script);

    advance(&mut puzzle, 50);
    assert_close(layer_angle(&puzzle, 1), -PI / 2.0);
    assert_close(layer_angle(&puzzle, 0), 0.0);
    assert_close(layer_angle(&puzzle, 2), 0.0);

    let rescheduled = advance(&mut puzzle, 50);
    assert_eq!(rescheduled, 1);
    assert_eq!(layer_angle(&puzzle, 1), -PI);
    assert_close(layer_angle(&puzzle, 0), 0.0);
    assert_close(layer_angle(&puzzle, 2), 0.0);
}

#[test]
fn should_ease_in_and_out_over_the_move_duration() {
    let script = ScriptedRandom::new(&move_script(0.2, 0.9, 0.1, 0.0));
    let mut puzzle = scripted_puzzle(&quick_config(), &script);

    advance(&mut puzzle, 25);
    // quadratic in-out at a quarter of the way is 1/8 of the distance
    assert_close(layer_angle(&puzzle, 2), PI / 8.0);
    advance(&mut puzzle, 50);
    assert_close(layer_angle(&puzzle, 2), PI * 7.0 / 8.0);
}

#[test]
fn should_schedule_exactly_one_follow_up_per_completed_move() {
    let mut puzzle =
        PuzzleContext::with_random(&quick_config(), Box::new(SplitMix64::new(42))).unwrap();
    let chain = puzzle.chains[0];

    let mut rescheduled = 0;
    for _ in 0..200 {
        rescheduled += advance(&mut puzzle, 30);
        assert_eq!(puzzle.tweens.in_flight_for(chain), 1);
        assert_eq!(puzzle.tweens.in_flight(), 1);
    }

    let completed = puzzle.scheduler.chain(chain).unwrap().moves_completed;
    assert_eq!(completed as usize, rescheduled);
    // each move spans four 30 ms updates
    assert!(completed >= 49, "only {} moves in six seconds", completed);
}

#[test]
fn should_land_every_layer_on_a_multiple_of_half_a_turn() {
    let mut puzzle =
        PuzzleContext::with_random(&quick_config(), Box::new(SplitMix64::new(7))).unwrap();

    for _ in 0..60 {
        let completed = puzzle
            .tweens
            .update(Duration::from_millis(40), &mut puzzle.scene.graph);
        for done in &completed {
            assert_eq!(done.axis, Axis::X);
            let turns = done.to.0 / PI;
            assert!((turns - turns.round()).abs() < 1e-4);
            assert_close((done.to.0 - done.from.0).abs(), PI);
        }
        puzzle
            .scheduler
            .handle_completions(&completed, &mut puzzle.scene.graph, &mut puzzle.tweens);
    }
}

#[test]
fn should_carry_the_last_pause_into_the_next_delay() {
    let config = PuzzleConfig {
        move_duration: Duration::from_millis(100),
        pause_min: Duration::ZERO,
        pause_max: Duration::from_secs(2),
        ..PuzzleConfig::default()
    };
    let script = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.5));
    script.push(&move_script(0.2, 0.0, 0.1, 0.25));
    let mut puzzle = scripted_puzzle(&config, &script);

    assert_eq!(puzzle.tweens.next_start(), Some(Duration::from_secs(1)));

    advance(&mut puzzle, 1000);
    assert_close(layer_angle(&puzzle, 0), 0.0);
    assert_eq!(advance(&mut puzzle, 100), 1);

    // one second of rest plus half a second of new pause
    assert_eq!(puzzle.tweens.next_start(), Some(Duration::from_millis(2600)));
}

#[test]
fn should_ignore_a_completion_it_already_handled() {
    let script = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.0));
    let mut puzzle = scripted_puzzle(&quick_config(), &script);

    let completed = puzzle
        .tweens
        .update(Duration::from_millis(100), &mut puzzle.scene.graph);
    assert_eq!(completed.len(), 1);
    let first =
        puzzle
            .scheduler
            .handle_completions(&completed, &mut puzzle.scene.graph, &mut puzzle.tweens);
    let again =
        puzzle
            .scheduler
            .handle_completions(&completed, &mut puzzle.scene.graph, &mut puzzle.tweens);

    assert_eq!((first, again), (1, 0));
    assert_eq!(puzzle.tweens.in_flight(), 1);
    assert_eq!(puzzle.scheduler.chain(puzzle.chains[0]).unwrap().moves_completed, 1);
}

#[test]
fn should_stop_a_cancelled_chain_where_it_is() {
    let script = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.0));
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let chain = puzzle.chains[0];

    advance(&mut puzzle, 50);
    let graph = &mut puzzle.scene.graph;
    assert!(puzzle.scheduler.cancel_chain(chain, graph, &mut puzzle.tweens));
    assert!(!puzzle.scheduler.cancel_chain(chain, graph, &mut puzzle.tweens));

    assert_eq!(puzzle.tweens.in_flight(), 0);
    assert_eq!(puzzle.scheduler.chain(chain).unwrap().state, ChainState::Stopped);
    assert_eq!(advance(&mut puzzle, 500), 0);
    assert_close(layer_angle(&puzzle, 0), PI / 2.0);
}

#[test]
fn should_let_chains_on_one_node_take_turns() {
    let config = PuzzleConfig {
        chains: 2,
        ..quick_config()
    };
    let mut puzzle =
        PuzzleContext::with_random(&config, Box::new(SplitMix64::new(3))).unwrap();
    let [first, second] = [puzzle.chains[0], puzzle.chains[1]];

    assert!(matches!(
        puzzle.scheduler.chain(first).unwrap().state,
        ChainState::Animating(_)
    ));
    assert_eq!(puzzle.scheduler.chain(second).unwrap().state, ChainState::Waiting);

    for _ in 0..20 {
        advance(&mut puzzle, 35);
        assert_eq!(puzzle.tweens.in_flight(), 1);
    }
    for chain in [first, second] {
        assert!(puzzle.scheduler.chain(chain).unwrap().moves_completed >= 2);
    }
}

#[test]
fn should_keep_half_turns_with_several_chains_and_uneven_pauses() {
    let config = PuzzleConfig {
        chains: 2,
        move_duration: Duration::from_millis(100),
        pause_min: Duration::ZERO,
        pause_max: Duration::from_millis(200),
        ..PuzzleConfig::default()
    };

    for seed in 0..20 {
        let mut puzzle =
            PuzzleContext::with_random(&config, Box::new(SplitMix64::new(seed))).unwrap();
        for _ in 0..100 {
            let completed = puzzle
                .tweens
                .update(Duration::from_millis(30), &mut puzzle.scene.graph);
            for done in &completed {
                let turns = done.to.0 / PI;
                assert!(
                    (turns - turns.round()).abs() < 1e-4,
                    "seed {} landed at {} turns",
                    seed,
                    turns
                );
                assert_close((done.to.0 - done.from.0).abs(), PI);
            }
            puzzle
                .scheduler
                .handle_completions(&completed, &mut puzzle.scene.graph, &mut puzzle.tweens);
            assert!(puzzle.tweens.in_flight() <= 1);
        }
    }
}

#[test]
fn should_hand_over_to_a_waiting_chain_on_cancel() {
    let config = PuzzleConfig {
        chains: 2,
        ..quick_config()
    };
    let script = ScriptedRandom::new(&move_script(0.2, 0.0, 0.1, 0.0));
    let mut puzzle = scripted_puzzle(&config, &script);
    let [first, second] = [puzzle.chains[0], puzzle.chains[1]];

    advance(&mut puzzle, 50);
    assert!(
        puzzle
            .scheduler
            .cancel_chain(first, &mut puzzle.scene.graph, &mut puzzle.tweens)
    );

    assert!(matches!(
        puzzle.scheduler.chain(second).unwrap().state,
        ChainState::Animating(_)
    ));
    assert_eq!(puzzle.tweens.in_flight_for(second), 1);
    assert_eq!(puzzle.tweens.in_flight(), 1);
}

#[test]
fn should_refuse_a_chain_on_a_node_without_layers() {
    let script = ScriptedRandom::new(&[0.0]);
    let mut puzzle = scripted_puzzle(&quick_config(), &script);
    let cell = puzzle.scene.graph.children(puzzle.scene.handles.layers[0])[0];

    let mut scheduler =
        LayerRotationScheduler::new(MoveTiming::from(&quick_config()), Box::new(script.clone()));
    let result = scheduler.start_chain(cell, &mut puzzle.scene.graph, &mut puzzle.tweens);

    assert_eq!(result, Err(PuzzleError::NoLayers(cell)));
    assert_eq!(scheduler.chains()[0].state, ChainState::Stopped);
    assert_eq!(puzzle.tweens.in_flight(), 1);
}

#[test]
fn should_plan_moves_within_the_configured_ranges() {
    let timing = MoveTiming::from(&PuzzleConfig::default());
    let (pause_min, pause_max) = (timing.pause_min, timing.pause_max);
    let mut first = LayerRotationScheduler::new(timing.clone(), Box::new(SplitMix64::new(11)));
    let mut second = LayerRotationScheduler::new(timing, Box::new(SplitMix64::new(11)));

    let mut layers_seen = [false; 5];
    let mut axes_seen = (false, false);
    for _ in 0..500 {
        let planned = first.plan_move(5);
        assert_eq!(planned, second.plan_move(5));

        assert!(planned.layer < 5);
        assert!(planned.direction == 1.0 || planned.direction == -1.0);
        assert!(planned.pause >= pause_min && planned.pause <= pause_max);
        layers_seen[planned.layer] = true;
        match planned.reorient_axis {
            Axis::Y => axes_seen.0 = true,
            Axis::Z => axes_seen.1 = true,
            Axis::X => panic!("layers are never reoriented about X"),
        }
    }
    assert!(layers_seen.iter().all(|seen| *seen));
    assert_eq!(axes_seen, (true, true));
}

#[test]
fn should_seed_from_the_wall_clock() {
    let mut first = SplitMix64::from_clock();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let mut second = SplitMix64::from_clock();

    assert_ne!(first.next_u64(), second.next_u64());
}

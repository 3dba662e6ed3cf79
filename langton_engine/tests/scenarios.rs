use langton_engine::config::parse_agent_configs;
use langton_engine::rules::{generate_random, to_processed, validate};
use langton_engine::{
    Heading, Point, Rule, RuleGraphEditor, RuleSpec, SimulationConfig, SimulationSession, Turn,
    Viewport, Workbench,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn session(grid_size: usize) -> SimulationSession {
    SimulationSession::new(&SimulationConfig {
        grid_size,
        ..SimulationConfig::default()
    })
}

#[test]
fn when_the_default_ant_runs_two_ticks_on_the_default_grid_it_ends_below_and_right_of_the_center() {
    let mut session = session(500);
    session.step();
    session.step();

    let ant = &session.ants()[0];
    assert_eq!(ant.position(), (251, 251));
    assert_eq!(ant.heading(), Heading::Down);
    assert_eq!(session.grid().get(250, 250), 1);
    assert_eq!(session.grid().get(251, 250), 1);
}

#[test]
fn when_the_default_ant_runs_it_keeps_flipping_cells_between_two_states() {
    let mut session = session(64);
    for _ in 0..2000 {
        session.step();
    }

    assert!(session.grid().max_state() <= 1);
    assert!(!session.grid().painted().is_empty());
    let (x, y) = session.ants()[0].position();
    assert!(x < 64 && y < 64);
}

#[test]
fn when_the_ant_walks_off_an_edge_it_reappears_on_the_opposite_side() {
    let mut session = session(4);
    let configs = parse_agent_configs(
        r#"[{"x": 0, "y": 0, "dir": 3, "rules": [{"currentState": 0, "turn": 0, "nextCellState": 2}]}]"#,
    )
    .unwrap();
    session.initialize(&configs).unwrap();

    session.step();

    assert_eq!(session.ants()[0].position(), (3, 0));
    assert_eq!(session.grid().get(0, 0), 2);
    assert_eq!(session.grid().get(4, 4), 2);
}

#[test]
fn when_descriptors_are_serialized_absent_fields_stay_absent() {
    let text = r#"[{"id": "only_id"}, {"x": 3, "rules": []}]"#;
    let configs = parse_agent_configs(text).unwrap();
    let json = serde_json::to_string(&configs).unwrap();

    assert_eq!(json, r#"[{"id":"only_id"},{"x":3,"rules":[]}]"#);
    assert_eq!(parse_agent_configs(&json).unwrap(), configs);
}

#[test]
fn when_validating_the_boundary_cases_empty_is_ok_and_negative_fails() {
    assert!(validate(&[]).is_ok());
    assert!(validate(&[RuleSpec {
        current_state: -1,
        turn: 0,
        next_cell_state: 0
    }])
    .is_err());
}

#[test]
fn when_building_rules_in_the_editor_the_workbench_runs_them() {
    let mut workbench = Workbench::new(SimulationConfig {
        grid_size: 20,
        seed: Some(1),
        ..SimulationConfig::default()
    })
    .unwrap();
    workbench
        .apply_json_to_editor(r#"[{"currentState": 0, "turn": 0, "nextCellState": 0}]"#)
        .unwrap();
    assert_eq!(workbench.add_state(), Ok(1));

    // Draw a transition from state 1 back to state 0
    let from = workbench.editor().node(1).unwrap().position;
    let to = workbench.editor().node(0).unwrap().position;
    let editor = workbench.editor_mut();
    editor.pointer_down(from, true);
    editor.pointer_move(to);
    editor.pointer_up(to);
    editor.confirm_pending_edge(Turn::UTurn, 0).unwrap();

    workbench.apply_editor_to_simulation().unwrap();

    let ant = &workbench.session().ants()[0];
    assert_eq!(ant.rules().lookup(1), Some(&Rule::new(1, Turn::UTurn, 0)));
    assert_eq!(ant.rules().lookup(0), Some(&Rule::new(0, Turn::Straight, 0)));
}

#[test]
fn when_a_node_is_added_past_the_canvas_the_graph_is_unchanged() {
    let mut editor = RuleGraphEditor::new();
    let canvas = Viewport::new(100.0, 100.0);
    editor.add_node(canvas).unwrap();

    assert!(editor.add_node(canvas).is_err());
    assert_eq!(editor.nodes().len(), 1);
    assert!(editor.node_at(Point::new(50.0, 50.0)).is_some());
}

proptest! {
    #[test]
    fn grid_reads_are_periodic_in_both_axes(
        x in -50i64..50,
        y in -50i64..50,
        k in -3i64..3,
        m in -3i64..3,
    ) {
        let mut session = session(7);
        session.step();
        session.step();
        session.step();
        let grid = session.grid();

        prop_assert_eq!(grid.get(x + k * 7, y + m * 7), grid.get(x, y));
    }

    #[test]
    fn random_rules_survive_a_round_trip_through_the_editor(num_states in 1usize..12, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let rules = generate_random(num_states, &mut rng);
        let mut editor = RuleGraphEditor::new();
        editor.load_rules(&rules, Viewport::new(600.0, 400.0));

        prop_assert_eq!(to_processed(&editor.rules()), to_processed(&rules));
    }

    #[test]
    fn stopping_twice_is_the_same_as_stopping_once(steps in 0usize..20) {
        let mut once = session(9);
        let mut twice = session(9);
        for _ in 0..steps {
            once.step();
            twice.step();
        }
        once.start();
        twice.start();

        once.stop();
        twice.stop();
        twice.stop();

        prop_assert_eq!(once.is_running(), twice.is_running());
        prop_assert_eq!(once.agent_states(), twice.agent_states());
        prop_assert_eq!(once.grid(), twice.grid());
    }
}

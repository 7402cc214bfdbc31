use glam::DVec2;
use sumo_sensors::SimConfig;
use sumo_sensors::sim::{
    AiState, CpuStrategy, HitSource, Key, MatchMode, MatchState, Outcome, Role, TickInput, tick,
};

#[test]
fn pushing_a_passive_opponent_wins_by_ring_out() {
    let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 11);
    let input = TickInput::pressed(&[Key::Right]);

    let mut ticks = 0;
    while !state.is_over() && ticks < 5_000 {
        tick(&mut state, &input, 8.0);
        ticks += 1;
    }

    assert_eq!(state.outcome(), Some(Outcome::Winner(Role::Player)));
    assert!(state.robot(Role::Opponent).is_out(&state.config));
    assert!(!state.robot(Role::Player).is_out(&state.config));
    // Pushed straight along the spawn axis
    assert!((state.robot(Role::Opponent).pos.y - state.config.arena_center.y).abs() < 1e-9);
}

#[test]
fn wall_echo_returns_after_round_trip() {
    let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 1);
    let center = state.config.arena_center;
    // Ring wall 82 px ahead, opponent behind
    state.robot_mut(Role::Player).pos = center + DVec2::new(78.0, 0.0);
    state.robot_mut(Role::Opponent).pos = center - DVec2::new(100.0, 0.0);

    let idle = TickInput::default();
    tick(&mut state, &idle, 4.0);
    let ping = state
        .robot(Role::Player)
        .ping
        .as_ref()
        .expect("ping emitted on first tick");
    assert_eq!(ping.hit_source, HitSource::Ring);
    assert!((ping.target_distance - 82.0).abs() < 1e-9);

    let mut ticks = 1;
    while state.robot(Role::Player).ping.is_some() {
        tick(&mut state, &idle, 4.0);
        ticks += 1;
        assert!(ticks < 100, "echo never returned");
    }
    let expected = 2.0 * 82.0 / state.config.wave_speed();
    let elapsed = ticks as f64 * 4.0;
    assert!((elapsed - expected).abs() <= 4.0, "{elapsed} vs {expected}");

    // Still cooling down
    tick(&mut state, &idle, 4.0);
    assert!(state.robot(Role::Player).ping.is_none());
}

#[test]
fn recorder_keeps_only_latest_frames() {
    let config = SimConfig {
        recorder_capacity: 50,
        ..Default::default()
    };
    let mut state = MatchState::new(config, MatchMode::VersusCpu, 3);
    for _ in 0..100 {
        tick(&mut state, &TickInput::default(), 10.0);
    }
    assert_eq!(state.recorder.len(), 50);
    let first = state.recorder.get(0).expect("frame");
    assert!((first.t - 510.0).abs() < 1e-9);

    let mut csv = Vec::new();
    let rows = state.recorder.export_csv(&mut csv).expect("export");
    assert_eq!(rows, 50);
    assert_eq!(String::from_utf8(csv).expect("utf8").lines().count(), 51);
}

#[test]
fn cpu_strategies_are_deterministic() {
    for strategy in [CpuStrategy::StateMachine, CpuStrategy::Sweep] {
        let run = || {
            let mut state =
                MatchState::with_strategy(SimConfig::default(), MatchMode::VersusCpu, strategy, 99);
            for _ in 0..400 {
                tick(&mut state, &TickInput::pressed(&[Key::Up]), 8.333);
            }
            (state.robots[1].pos, state.robots[1].heading, state.phase)
        };
        assert_eq!(run(), run());
    }
}

#[test]
fn cpu_locks_on_to_opponent_in_view() {
    let mut state = MatchState::new(SimConfig::default(), MatchMode::VersusCpu, 5);
    let center = state.config.arena_center;
    // Opponent seat faces 180 degrees; put the player 100 px in front of it
    state.robot_mut(Role::Opponent).pos = center;
    state.robot_mut(Role::Player).pos = center - DVec2::new(100.0, 0.0);
    tick(&mut state, &TickInput::default(), 8.0);
    assert_eq!(state.controllers[1].ai_state(), Some(AiState::Pursue));
}

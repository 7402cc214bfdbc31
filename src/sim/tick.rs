//! Fixed timestep match tick
//!
//! Advances a match deterministically: same seed, config and inputs give the
//! same trajectory.

use super::control::{ControlContext, Key};
use super::robot::Role;
use super::state::{MatchPhase, MatchState, Outcome};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keys held this tick, for both seats
    pub pressed: Vec<Key>,
    /// External heading disturbances (degrees) applied before control
    pub disturbances: Vec<(Role, f64)>,
}

impl TickInput {
    pub fn pressed(keys: &[Key]) -> Self {
        Self {
            pressed: keys.to_vec(),
            ..Default::default()
        }
    }
}

/// Advance the match by `dt_ms` (already time-scaled)
pub fn tick(state: &mut MatchState, input: &TickInput, dt_ms: f64) {
    if state.is_over() {
        return;
    }
    let dt_ms = dt_ms.max(0.0);
    state.time_ms += dt_ms;
    state.ticks += 1;

    for &(role, delta) in &input.disturbances {
        state.robot_mut(role).knock(delta);
    }

    // Controllers, player seat first
    for role in [Role::Player, Role::Opponent] {
        let i = role.index();
        let opponent = state.robots[role.other().index()].body();
        let ctx = ControlContext {
            config: &state.config,
            pressed: &input.pressed,
            opponent: Some(opponent),
        };
        state.controllers[i].update(&mut state.robots[i], &ctx, &mut state.rng, dt_ms);
    }

    let [player, opponent] = &mut state.robots;
    player.separate_from(opponent);

    // Sonar
    for role in [Role::Player, Role::Opponent] {
        let i = role.index();
        let other = state.robots[role.other().index()].body();
        let robot = &mut state.robots[i];
        robot.try_emit_ping(state.time_ms, Some(other), &state.config);
        robot.update_ping(dt_ms, &state.config);
    }

    for robot in state.robots.iter_mut() {
        robot.refresh_floor_sensors(&state.config);
    }
    state.sense_ranges();

    check_ring_out(state);

    let [player, opponent] = &state.robots;
    state.recorder.record(state.time_ms, player, opponent);
}

fn check_ring_out(state: &mut MatchState) {
    let player_out = state.robot(Role::Player).is_out(&state.config);
    let opponent_out = state.robot(Role::Opponent).is_out(&state.config);
    let outcome = match (player_out, opponent_out) {
        (false, false) => return,
        (true, true) => Outcome::Draw,
        (true, false) => Outcome::Winner(Role::Opponent),
        (false, true) => Outcome::Winner(Role::Player),
    };
    state.phase = MatchPhase::Over(outcome);
    log::info!(
        "Match over at {:.0} ms after {} ticks: {:?}",
        state.time_ms,
        state.ticks,
        outcome
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::heading_delta;
    use crate::sim::control::{AiState, AutonomousControl, Controller};
    use crate::sim::state::MatchMode;
    use glam::DVec2;

    fn run(seed: u64, ticks: usize) -> MatchState {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::VersusCpu, seed);
        let input = TickInput::pressed(&[Key::Right]);
        for _ in 0..ticks {
            tick(&mut state, &input, 8.0);
        }
        state
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let a = run(42, 300);
        let b = run(42, 300);
        assert_eq!(a.time_ms, b.time_ms);
        assert_eq!(a.phase, b.phase);
        for (ra, rb) in a.robots.iter().zip(&b.robots) {
            assert_eq!(ra.pos, rb.pos);
            assert_eq!(ra.heading, rb.heading);
        }
        let fa: Vec<_> = a.recorder.frames().copied().collect();
        let fb: Vec<_> = b.recorder.frames().copied().collect();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_first_tick_emits_pings() {
        let state = run(1, 1);
        assert!(state.robot(Role::Player).ping.is_some());
        assert!(state.robot(Role::Opponent).ping.is_some());
        assert_eq!(state.robot(Role::Player).last_ping_ms, Some(8.0));
        assert_eq!(state.recorder.len(), 1);
    }

    #[test]
    fn test_ring_out_declares_winner() {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 1);
        let center = state.config.arena_center;
        state.robot_mut(Role::Opponent).pos = center + DVec2::new(200.0, 0.0);
        tick(&mut state, &TickInput::default(), 8.0);
        assert_eq!(state.outcome(), Some(Outcome::Winner(Role::Player)));

        // Finished matches are frozen
        let frames = state.recorder.len();
        let time = state.time_ms;
        tick(&mut state, &TickInput::default(), 8.0);
        assert_eq!(state.time_ms, time);
        assert_eq!(state.recorder.len(), frames);
    }

    #[test]
    fn test_disturbance_triggers_cpu_reorientation() {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::VersusCpu, 4);
        state.controllers[1] = Controller::Autonomous(AutonomousControl {
            state: AiState::Move { elapsed_ms: 0.0 },
        });
        tick(&mut state, &TickInput::default(), 16.0);
        let before = state.robot(Role::Opponent).heading;

        let knocked = TickInput {
            disturbances: vec![(Role::Opponent, 10.0)],
            ..Default::default()
        };
        tick(&mut state, &knocked, 16.0);
        let mut turned = heading_delta(before, state.robot(Role::Opponent).heading);
        for _ in 0..3 {
            if (turned - 100.0).abs() < 1e-9 {
                break;
            }
            tick(&mut state, &TickInput::default(), 16.0);
            turned = heading_delta(before, state.robot(Role::Opponent).heading);
        }
        assert!((turned - 100.0).abs() < 1e-9, "turned {turned}");
    }

    #[test]
    fn test_readout_polling_is_side_effect_free() {
        let run = |poll: bool| {
            let config = SimConfig::default().with_noise(5.0);
            let mut state = MatchState::new(config, MatchMode::VersusCpu, 42);
            for _ in 0..1500 {
                tick(&mut state, &TickInput::default(), 8.0);
                if poll {
                    state.readout(Role::Player);
                    state.readout(Role::Opponent);
                }
            }
            (state.robots[1].pos, state.robots[1].heading, state.phase)
        };
        assert_eq!(run(false), run(true));
    }

    #[test]
    fn test_player_ring_out_loses() {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 1);
        let center = state.config.arena_center;
        state.robot_mut(Role::Player).pos = center + DVec2::new(0.0, 180.0);
        tick(&mut state, &TickInput::default(), 8.0);
        assert_eq!(state.outcome(), Some(Outcome::Winner(Role::Opponent)));
    }

    #[test]
    fn test_double_ring_out_is_draw() {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 1);
        let center = state.config.arena_center;
        state.robot_mut(Role::Player).pos = center - DVec2::new(200.0, 0.0);
        state.robot_mut(Role::Opponent).pos = center + DVec2::new(200.0, 0.0);
        tick(&mut state, &TickInput::default(), 8.0);
        assert_eq!(state.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_overlap_resolved_each_tick() {
        let mut state = MatchState::new(SimConfig::default(), MatchMode::TwoPlayer, 1);
        let center = state.config.arena_center;
        state.robot_mut(Role::Player).pos = center - DVec2::new(5.0, 0.0);
        state.robot_mut(Role::Opponent).pos = center + DVec2::new(5.0, 0.0);
        tick(&mut state, &TickInput::default(), 8.0);
        let gap = (state.robot(Role::Opponent).pos - state.robot(Role::Player).pos).length();
        assert!(gap >= 2.0 * state.config.robot_radius - 1e-9);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut state = run(9, 200);
        state.reset();
        let fresh = MatchState::new(SimConfig::default(), MatchMode::VersusCpu, 9);
        assert_eq!(state.time_ms, 0.0);
        assert!(state.recorder.is_empty());
        assert_eq!(state.robots[0].pos, fresh.robots[0].pos);
        assert_eq!(state.robots[1].heading, fresh.robots[1].heading);
        assert_eq!(state.controllers[1].ai_state(), fresh.controllers[1].ai_state());
    }
}

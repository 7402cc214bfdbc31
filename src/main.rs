//! Sumo Sensors entry point
//!
//! Runs a headless match of a scripted player against the CPU and writes the
//! recorded frames to stdout as CSV.
//!
//! Usage: `sumo-sensors [config.json] [seed] [--sweep]`

use std::io;
use std::process::ExitCode;

use sumo_sensors::SimConfig;
use sumo_sensors::consts::{REFERENCE_FRAME_MS, TIME_SCALE};
use sumo_sensors::sim::{CpuStrategy, Key, MatchMode, MatchState, Role, TickInput, tick};

/// Upper bound on simulated match length (scaled ms)
const MATCH_LIMIT_MS: f64 = 60_000.0;

struct Args {
    config_path: Option<String>,
    seed: u64,
    strategy: CpuStrategy,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: None,
        seed: 7,
        strategy: CpuStrategy::StateMachine,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--sweep" {
            args.strategy = CpuStrategy::Sweep;
        } else if let Ok(seed) = arg.parse::<u64>() {
            args.seed = seed;
        } else {
            args.config_path = Some(arg);
        }
    }
    args
}

/// Arrow keys steering the player toward the opponent
fn chase_keys(state: &MatchState) -> Vec<Key> {
    let delta = state.robot(Role::Opponent).pos - state.robot(Role::Player).pos;
    let mut keys = Vec::with_capacity(2);
    if delta.x.abs() > 4.0 {
        keys.push(if delta.x > 0.0 { Key::Right } else { Key::Left });
    }
    if delta.y.abs() > 4.0 {
        keys.push(if delta.y > 0.0 { Key::Down } else { Key::Up });
    }
    keys
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Sumo Sensors (headless) starting...");

    let args = parse_args();
    let config = match &args.config_path {
        Some(path) => SimConfig::load(path),
        None => SimConfig::default(),
    };
    let dt_ms = REFERENCE_FRAME_MS * TIME_SCALE;

    let mut state =
        MatchState::with_strategy(config, MatchMode::VersusCpu, args.strategy, args.seed);
    while !state.is_over() && state.time_ms < MATCH_LIMIT_MS {
        let input = TickInput::pressed(&chase_keys(&state));
        tick(&mut state, &input, dt_ms);
    }

    match state.outcome() {
        Some(outcome) => log::info!("Result: {outcome:?} at {:.0} ms", state.time_ms),
        None => log::info!("Time limit reached without a ring-out"),
    }
    let readout = state.readout(Role::Player);
    log::info!(
        "Player sensors: edge {:.1} px, range {:.1} cm, |a| {:.2} g, gyro {:.1} deg/s, {:?}",
        readout.edge_distance,
        readout.range_cm,
        readout.accel_g,
        readout.gyro_rate,
        readout.surface
    );

    match state.recorder.export_csv(io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("CSV export failed: {e}");
            ExitCode::FAILURE
        }
    }
}

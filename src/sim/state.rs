//! Match state
//!
//! Everything that belongs to one match lives here and is discarded together
//! on reset: both robots, their controllers and pings, the clock and the
//! recording buffer.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::control::{AutonomousControl, Controller, DirectControl, KeyBindings, SweepControl};
use super::robot::{Robot, Role};
use super::sensors::Surface;
use crate::config::SimConfig;
use crate::consts::G_MSS;
use crate::recorder::Recorder;

/// PCG stream for ultrasonic noise, separate from the controllers' stream
const NOISE_STREAM: u64 = 0x5eed_50a7;

/// Who controls the opponent seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    VersusCpu,
    TwoPlayer,
}

/// Which autonomous strategy the CPU uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CpuStrategy {
    #[default]
    StateMachine,
    Sweep,
}

/// Result of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Role),
    /// Both robots left the ring on the same tick
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Running,
    Over(Outcome),
}

/// Numeric sensor panel for one robot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadout {
    /// Distance to the ring edge (px)
    pub edge_distance: f64,
    /// Measured ultrasonic range (cm)
    pub range_cm: f64,
    /// Round-trip time for that range (ms)
    pub time_of_flight_ms: f64,
    pub ax: f64,
    pub ay: f64,
    /// |a| (m/s²)
    pub accel_magnitude: f64,
    /// |a| in g
    pub accel_g: f64,
    pub gyro_rate: f64,
    pub gyro_orientation: f64,
    pub surface: Surface,
    pub ir_intensity: f64,
    pub edge_alert: bool,
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    pub config: SimConfig,
    pub seed: u64,
    pub mode: MatchMode,
    pub cpu_strategy: CpuStrategy,
    /// Controller randomness
    pub rng: Pcg32,
    /// Sensor noise only
    pub noise_rng: Pcg32,
    /// Match clock (scaled ms)
    pub time_ms: f64,
    pub ticks: u64,
    pub phase: MatchPhase,
    /// Indexed by `Role::index`
    pub robots: [Robot; 2],
    pub controllers: [Controller; 2],
    pub recorder: Recorder,
}

impl MatchState {
    pub fn new(config: SimConfig, mode: MatchMode, seed: u64) -> Self {
        Self::with_strategy(config, mode, CpuStrategy::default(), seed)
    }

    pub fn with_strategy(
        config: SimConfig,
        mode: MatchMode,
        cpu_strategy: CpuStrategy,
        seed: u64,
    ) -> Self {
        let recorder = Recorder::new(config.recorder_capacity);
        let mut state = Self {
            robots: [
                Robot::spawn(Role::Player, &config),
                Robot::spawn(Role::Opponent, &config),
            ],
            controllers: Self::controllers_for(mode, cpu_strategy),
            config,
            seed,
            mode,
            cpu_strategy,
            rng: Pcg32::seed_from_u64(seed),
            noise_rng: Pcg32::new(seed, NOISE_STREAM),
            time_ms: 0.0,
            ticks: 0,
            phase: MatchPhase::Running,
            recorder,
        };
        state.reset();
        state
    }

    fn controllers_for(mode: MatchMode, cpu: CpuStrategy) -> [Controller; 2] {
        let opponent = match (mode, cpu) {
            (MatchMode::TwoPlayer, _) => Controller::Direct(DirectControl::new(KeyBindings::ijkl())),
            (MatchMode::VersusCpu, CpuStrategy::StateMachine) => {
                Controller::Autonomous(AutonomousControl::new())
            }
            (MatchMode::VersusCpu, CpuStrategy::Sweep) => Controller::Sweep(SweepControl),
        };
        [
            Controller::Direct(DirectControl::new(KeyBindings::arrows())),
            opponent,
        ]
    }

    /// Discard all per-match state and respawn both robots
    pub fn reset(&mut self) {
        self.robots = [
            Robot::spawn(Role::Player, &self.config),
            Robot::spawn(Role::Opponent, &self.config),
        ];
        self.controllers = Self::controllers_for(self.mode, self.cpu_strategy);
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.noise_rng = Pcg32::new(self.seed, NOISE_STREAM);
        self.time_ms = 0.0;
        self.ticks = 0;
        self.phase = MatchPhase::Running;
        self.recorder = Recorder::new(self.config.recorder_capacity);
        self.sense_ranges();
        log::info!("Match reset (seed {}, {:?})", self.seed, self.mode);
    }

    /// Switch between CPU and two-player opponents; resets the match
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            MatchMode::VersusCpu => MatchMode::TwoPlayer,
            MatchMode::TwoPlayer => MatchMode::VersusCpu,
        };
        self.reset();
    }

    #[inline]
    pub fn robot(&self, role: Role) -> &Robot {
        &self.robots[role.index()]
    }

    #[inline]
    pub fn robot_mut(&mut self, role: Role) -> &mut Robot {
        &mut self.robots[role.index()]
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Over(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            MatchPhase::Over(outcome) => Some(outcome),
            MatchPhase::Running => None,
        }
    }

    /// Refresh both ultrasonic readings against the other robot
    pub fn sense_ranges(&mut self) {
        for role in [Role::Player, Role::Opponent] {
            let opponent = self.robots[role.other().index()].body();
            self.robots[role.index()].sense_range(
                Some(opponent),
                &self.config,
                &mut self.noise_rng,
            );
        }
    }

    /// Sensor panel for `role` from its latest readings
    pub fn readout(&self, role: Role) -> SensorReadout {
        let robot = &self.robots[role.index()];
        let measured = robot
            .ultrasonic
            .map_or(self.config.max_range, |reading| reading.measured);

        let range_cm = measured / self.config.px_per_cm;
        let a = robot.acceleration();
        let magnitude = a.length();
        SensorReadout {
            edge_distance: robot.edge_distance(&self.config),
            range_cm,
            time_of_flight_ms: 2.0 * range_cm / self.config.sound_speed_cm_ms,
            ax: a.x,
            ay: a.y,
            accel_magnitude: magnitude,
            accel_g: magnitude / G_MSS,
            gyro_rate: robot.gyroscope.angular_velocity(),
            gyro_orientation: robot.gyroscope.orientation(),
            surface: robot.infrared.surface,
            ir_intensity: robot.infrared.intensity,
            edge_alert: robot.edge_alert,
        }
    }
}

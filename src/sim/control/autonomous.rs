//! Finite-state autonomous controller
//!
//! SCAN rotates in place until the opponent falls inside the sonar cone
//! (PURSUE) or a full turn completes with nothing seen (MOVE to a random
//! heading). Transitions are computed by [`transition`] from a perception
//! snapshot so the state machine can be exercised without a robot.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::sim::robot::Robot;
use crate::{bearing_degrees, heading_delta, unit_vector};

/// Rotation slack when testing for a completed revolution
const REVOLUTION_EPSILON: f64 = 1e-9;

/// Controller state with its per-state payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    /// Rotating in place; `rotated` is the total turn so far (degrees)
    Scan { rotated: f64 },
    /// Cruising forward on a random heading
    Move { elapsed_ms: f64 },
    /// Cruising forward toward the last locked bearing
    Pursue,
}

impl Default for AiState {
    fn default() -> Self {
        AiState::Scan { rotated: 0.0 }
    }
}

impl AiState {
    pub fn name(&self) -> &'static str {
        match self {
            AiState::Scan { .. } => "scan",
            AiState::Move { .. } => "move",
            AiState::Pursue => "pursue",
        }
    }
}

/// Where the opponent is relative to us
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetFix {
    pub distance: f64,
    /// Absolute bearing (degrees)
    pub bearing: f64,
}

/// Everything a transition reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub heading: f64,
    pub target: Option<TargetFix>,
}

impl Perception {
    pub fn observe(robot: &Robot, opponent: Option<DVec2>) -> Self {
        Self {
            heading: robot.heading,
            target: opponent.map(|pos| TargetFix {
                distance: (pos - robot.pos).length(),
                bearing: bearing_degrees(robot.pos, pos),
            }),
        }
    }

    /// Target within range and inside the half field of view
    pub fn target_detectable(&self, config: &SimConfig) -> Option<TargetFix> {
        self.target.filter(|t| {
            t.distance <= config.max_range
                && heading_delta(self.heading, t.bearing).abs() <= config.half_fov()
        })
    }
}

/// What the controller wants this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Heading change (degrees)
    pub turn: f64,
    /// Forward speed along the resulting heading (px/s)
    pub forward_speed: f64,
}

/// Advance the state machine by `dt_ms`
pub fn transition<R: Rng + ?Sized>(
    state: AiState,
    perception: &Perception,
    dt_ms: f64,
    config: &SimConfig,
    rng: &mut R,
) -> (AiState, Intent) {
    match state {
        AiState::Scan { rotated } => {
            if let Some(fix) = perception.target_detectable(config) {
                let lock = Intent {
                    turn: heading_delta(perception.heading, fix.bearing),
                    forward_speed: config.cruise_speed,
                };
                return (AiState::Pursue, lock);
            }

            let step = config.scan_turn_rate * dt_ms / 1000.0;
            let rotated = rotated + step.abs();
            if rotated >= 360.0 - REVOLUTION_EPSILON {
                let heading: f64 = rng.random_range(0.0..360.0);
                let turn = Intent {
                    turn: heading_delta(perception.heading, heading),
                    forward_speed: 0.0,
                };
                return (AiState::Move { elapsed_ms: 0.0 }, turn);
            }

            let spin = Intent {
                turn: step,
                forward_speed: 0.0,
            };
            (AiState::Scan { rotated }, spin)
        }
        AiState::Move { elapsed_ms } => {
            let elapsed_ms = elapsed_ms + dt_ms.max(0.0);
            if elapsed_ms >= config.move_duration_ms {
                return (AiState::Scan { rotated: 0.0 }, Intent::default());
            }
            let cruise = Intent {
                turn: 0.0,
                forward_speed: config.cruise_speed,
            };
            (AiState::Move { elapsed_ms }, cruise)
        }
        AiState::Pursue => {
            if perception.target_detectable(config).is_none() {
                return (AiState::Scan { rotated: 0.0 }, Intent::default());
            }
            let cruise = Intent {
                turn: 0.0,
                forward_speed: config.cruise_speed,
            };
            (AiState::Pursue, cruise)
        }
    }
}

/// Scan / move / pursue strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomousControl {
    pub state: AiState,
}

impl AutonomousControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        robot: &mut Robot,
        opponent: Option<DVec2>,
        config: &SimConfig,
        rng: &mut R,
        dt_ms: f64,
    ) {
        robot.begin_control();
        let perception = Perception::observe(robot, opponent);
        let (next, intent) = transition(self.state, &perception, dt_ms, config, rng);
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            log::debug!(
                "{:?} AI {} -> {} (heading {:.1})",
                robot.role,
                self.state.name(),
                next.name(),
                robot.heading
            );
        }
        self.state = next;

        robot.turn(intent.turn, dt_ms);
        if robot.push_detected(config.push_threshold) {
            log::debug!(
                "{:?} push detected ({:.1} deg/s), reorienting",
                robot.role,
                robot.gyroscope.angular_velocity()
            );
            robot.turn(90.0, dt_ms);
        }
        robot.vel = unit_vector(robot.heading) * intent.forward_speed;

        robot.finish_motion(dt_ms, config);
    }
}

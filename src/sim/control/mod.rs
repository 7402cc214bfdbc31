//! Control strategies
//!
//! Each robot is driven by exactly one [`Controller`]. The strategies only
//! write intent into the robot; kinematics and sensors stay in `Robot`.

pub mod autonomous;
pub mod direct;
pub mod sweep;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use autonomous::{AiState, AutonomousControl, Intent, Perception, TargetFix, transition};
pub use direct::{DirectControl, DirectionalInput, Key, KeyBindings};
pub use sweep::{SweepControl, sweep_bearing};

use super::robot::Robot;
use crate::config::SimConfig;

/// Per-tick inputs shared by every strategy
#[derive(Debug, Clone, Copy)]
pub struct ControlContext<'a> {
    pub config: &'a SimConfig,
    /// Keys held this tick
    pub pressed: &'a [Key],
    /// Opponent body (center, radius)
    pub opponent: Option<(DVec2, f64)>,
}

/// Strategy driving one robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Controller {
    Direct(DirectControl),
    Autonomous(AutonomousControl),
    Sweep(SweepControl),
}

impl Controller {
    pub fn name(&self) -> &'static str {
        match self {
            Controller::Direct(_) => "direct",
            Controller::Autonomous(_) => "autonomous",
            Controller::Sweep(_) => "sweep",
        }
    }

    /// Current AI state, for autonomous controllers
    pub fn ai_state(&self) -> Option<AiState> {
        match self {
            Controller::Autonomous(ai) => Some(ai.state),
            _ => None,
        }
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        robot: &mut Robot,
        ctx: &ControlContext<'_>,
        rng: &mut R,
        dt_ms: f64,
    ) {
        match self {
            Controller::Direct(direct) => direct.update(robot, ctx.pressed, ctx.config, dt_ms),
            Controller::Autonomous(ai) => {
                ai.update(robot, ctx.opponent.map(|(pos, _)| pos), ctx.config, rng, dt_ms)
            }
            Controller::Sweep(sweep) => sweep.update(robot, ctx.opponent, ctx.config, dt_ms),
        }
    }
}

//! Keyboard-driven control
//!
//! Four directional impulses map to acceleration along screen x/y (+y down).
//! Heading follows the velocity direction and is left alone at rest.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::sim::robot::Robot;

/// Keys the simulation understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    I,
    J,
    K,
    L,
}

/// Which directions are held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirectionalInput {
    /// Acceleration vector (px/s²) for the held directions
    pub fn acceleration(&self, magnitude: f64) -> DVec2 {
        let mut a = DVec2::ZERO;
        if self.left {
            a.x -= magnitude;
        }
        if self.right {
            a.x += magnitude;
        }
        if self.up {
            a.y -= magnitude;
        }
        if self.down {
            a.y += magnitude;
        }
        a
    }
}

/// Key to direction mapping for one seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
}

impl KeyBindings {
    /// Player one: cursor keys
    pub fn arrows() -> Self {
        Self {
            left: Key::Left,
            right: Key::Right,
            up: Key::Up,
            down: Key::Down,
        }
    }

    /// Player two: I/J/K/L
    pub fn ijkl() -> Self {
        Self {
            left: Key::J,
            right: Key::L,
            up: Key::I,
            down: Key::K,
        }
    }

    pub fn resolve(&self, pressed: &[Key]) -> DirectionalInput {
        DirectionalInput {
            left: pressed.contains(&self.left),
            right: pressed.contains(&self.right),
            up: pressed.contains(&self.up),
            down: pressed.contains(&self.down),
        }
    }
}

/// Human-controlled strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectControl {
    pub bindings: KeyBindings,
}

impl DirectControl {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn update(&self, robot: &mut Robot, pressed: &[Key], config: &SimConfig, dt_ms: f64) {
        robot.begin_control();
        let input = self.bindings.resolve(pressed);
        robot.vel += input.acceleration(config.move_acceleration) * (dt_ms / 1000.0);

        if robot.vel.length_squared() > 0.0 {
            let heading = robot.vel.y.atan2(robot.vel.x).to_degrees();
            robot.face(heading, dt_ms);
        }

        robot.finish_motion(dt_ms, config);
    }
}

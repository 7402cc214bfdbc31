//! Sumo Sensors - a two-robot sumo arena simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, pings, sensors, robots, control, match loop)
//! - `config`: Injectable simulation constants
//! - `recorder`: Bounded per-tick history with CSV/JSON export and replay

pub mod config;
pub mod recorder;
pub mod sim;

pub use config::{ConfigError, ReflectivityTable, SimConfig};
pub use recorder::{Frame, Recorder, RecorderError, ReplayCursor};

use glam::DVec2;

/// Default simulation constants (pixels, milliseconds, degrees)
pub mod consts {
    /// Screen scale: 1 cm maps to 4 px
    pub const PX_PER_CM: f64 = 4.0;

    /// Arena geometry (80 cm dojo, 5 cm white edge, 5 cm blue center mark)
    pub const ARENA_CENTER: (f64, f64) = (450.0, 350.0);
    pub const ARENA_RADIUS: f64 = 40.0 * PX_PER_CM;
    pub const RING_EDGE: f64 = 5.0 * PX_PER_CM;
    pub const CENTER_MARK_RADIUS: f64 = 5.0 * PX_PER_CM;
    pub const ROBOT_RADIUS: f64 = 18.0;
    /// Spawn distance from the arena center along x
    pub const SPAWN_OFFSET: f64 = 120.0;

    /// Speed of sound in cm per millisecond
    pub const SOUND_SPEED_CM_MS: f64 = 34.3;

    /// Reference frame for per-frame constants (60 Hz)
    pub const REFERENCE_FRAME_MS: f64 = 16.6667;
    /// Velocity kept per reference frame (~7% loss at 60 FPS)
    pub const DAMPING_PER_FRAME: f64 = 0.93;
    /// Global time scale applied to wall-clock frame deltas
    pub const TIME_SCALE: f64 = 0.5;

    /// Player acceleration (px/s²)
    pub const MOVE_ACCELERATION: f64 = 950.0;
    pub const MAX_SPEED: f64 = 260.0;
    /// CPU cruise speed (px/s)
    pub const CRUISE_SPEED: f64 = 150.0;
    /// CPU turn cap, 4° per frame at 60 Hz
    pub const TURN_RATE: f64 = 240.0;

    /// Ultrasonic sensor
    pub const FOV_DEG: f64 = 24.0;
    pub const PING_PERIOD_MS: f64 = 700.0;
    pub const MAX_RANGE: f64 = ARENA_RADIUS + 40.0;
    pub const PING_NOISE: f64 = 0.0;

    /// Autonomous controller
    pub const MOVE_DURATION_MS: f64 = 1000.0;
    pub const PUSH_THRESHOLD: f64 = 40.0;
    pub const SWEEP_SAMPLES: usize = 7;
    pub const SWEEP_BLEND: f64 = 0.25;

    /// Infrared sensor
    pub const IR_POWER: f64 = 1000.0;
    pub const IR_RHO_WHITE: f64 = 0.9;
    pub const IR_RHO_BLACK: f64 = 0.2;
    pub const IR_RHO_BLUE: f64 = 0.5;
    pub const IR_SENSOR_HEIGHT_CM: f64 = 2.0;

    /// Standard gravity (m/s²)
    pub const G_MSS: f64 = 9.81;

    /// Recording window (20 s at 60 fps)
    pub const RECORDER_CAPACITY: usize = 20 * 60;
}

/// Normalize a heading in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Shortest signed turn from `from` to `to`, in [-180, 180)
#[inline]
pub fn heading_delta(from: f64, to: f64) -> f64 {
    (to - from + 540.0).rem_euclid(360.0) - 180.0
}

/// Unit direction vector for a heading in degrees
#[inline]
pub fn unit_vector(deg: f64) -> DVec2 {
    let rad = deg.to_radians();
    DVec2::new(rad.cos(), rad.sin())
}

/// Bearing in degrees [0, 360) from one point toward another
#[inline]
pub fn bearing_degrees(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

//! Deterministic simulation module
//!
//! All match logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable update order (player seat first)
//! - No rendering or platform dependencies

pub mod control;
pub mod geometry;
pub mod ping;
pub mod robot;
pub mod sensors;
pub mod state;
pub mod tick;

pub use control::{
    AiState, AutonomousControl, ControlContext, Controller, DirectControl, DirectionalInput, Key,
    KeyBindings, SweepControl,
};
pub use geometry::{damping_factor, distance_to_center, ray_circle_distance, ray_disc_distance};
pub use ping::{Echo, HitSource, Ping, PingPhase, PingTarget, cast_target};
pub use robot::{Robot, Role};
pub use sensors::{
    Accelerometer, Gyroscope, InfraredState, Surface, UltrasonicReading, classify_surface,
    detect_push, edge_alert, edge_distance, measure_ultrasonic, read_infrared,
};
pub use state::{CpuStrategy, MatchMode, MatchPhase, MatchState, Outcome, SensorReadout};
pub use tick::{TickInput, tick};

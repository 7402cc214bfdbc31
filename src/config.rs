//! Simulation configuration
//!
//! Every constant the core depends on lives in one `SimConfig` value that is
//! handed to the match at construction. Defaults come from `crate::consts`.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from parsing or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Infrared reflectivity per floor surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectivityTable {
    pub white: f64,
    pub black: f64,
    pub blue: f64,
}

impl Default for ReflectivityTable {
    fn default() -> Self {
        Self {
            white: IR_RHO_WHITE,
            black: IR_RHO_BLACK,
            blue: IR_RHO_BLUE,
        }
    }
}

/// Simulation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    pub arena_center: DVec2,
    pub arena_radius: f64,
    /// Thickness of the white boundary ring
    pub ring_edge: f64,
    /// Radius of the blue center mark
    pub center_mark_radius: f64,
    pub robot_radius: f64,
    /// Start distance of each robot from the center
    pub spawn_offset: f64,

    // === Motion ===
    pub damping_per_frame: f64,
    pub reference_frame_ms: f64,
    pub time_scale: f64,
    /// Direct-input acceleration (px/s²)
    pub move_acceleration: f64,
    pub max_speed: f64,
    /// Autonomous cruise speed (px/s)
    pub cruise_speed: f64,
    /// Sweep controller cruise speed (px/s)
    pub sweep_speed: f64,
    /// In-place scan rotation (°/s)
    pub scan_turn_rate: f64,
    /// Sweep controller turn cap (°/s)
    pub sweep_turn_rate: f64,
    pub sweep_samples: usize,
    /// Per-tick lerp factor toward the sweep cruise vector
    pub sweep_blend: f64,
    pub move_duration_ms: f64,
    /// Gyroscope rate above which an uncommanded spin counts as a push (°/s)
    pub push_threshold: f64,

    // === Ultrasonic ===
    pub max_range: f64,
    pub fov_deg: f64,
    pub ping_period_ms: f64,
    /// Speed of sound (cm/ms); wave speed in px/ms derives from this
    pub sound_speed_cm_ms: f64,
    /// Uniform measurement noise amplitude (px), 0 disables
    pub noise_amplitude: f64,

    // === Infrared ===
    pub reflectivity: ReflectivityTable,
    pub ir_power: f64,
    pub ir_sensor_height_cm: f64,

    // === Units / recording ===
    pub px_per_cm: f64,
    pub recorder_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_center: DVec2::new(ARENA_CENTER.0, ARENA_CENTER.1),
            arena_radius: ARENA_RADIUS,
            ring_edge: RING_EDGE,
            center_mark_radius: CENTER_MARK_RADIUS,
            robot_radius: ROBOT_RADIUS,
            spawn_offset: SPAWN_OFFSET,

            damping_per_frame: DAMPING_PER_FRAME,
            reference_frame_ms: REFERENCE_FRAME_MS,
            time_scale: TIME_SCALE,
            move_acceleration: MOVE_ACCELERATION,
            max_speed: MAX_SPEED,
            cruise_speed: CRUISE_SPEED,
            sweep_speed: CRUISE_SPEED,
            scan_turn_rate: TURN_RATE,
            sweep_turn_rate: TURN_RATE,
            sweep_samples: SWEEP_SAMPLES,
            sweep_blend: SWEEP_BLEND,
            move_duration_ms: MOVE_DURATION_MS,
            push_threshold: PUSH_THRESHOLD,

            max_range: MAX_RANGE,
            fov_deg: FOV_DEG,
            ping_period_ms: PING_PERIOD_MS,
            sound_speed_cm_ms: SOUND_SPEED_CM_MS,
            noise_amplitude: PING_NOISE,

            reflectivity: ReflectivityTable::default(),
            ir_power: IR_POWER,
            ir_sensor_height_cm: IR_SENSOR_HEIGHT_CM,

            px_per_cm: PX_PER_CM,
            recorder_capacity: RECORDER_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Wave propagation speed in px/ms (≈1.37 with defaults)
    #[inline]
    pub fn wave_speed(&self) -> f64 {
        self.sound_speed_cm_ms / 100.0 * self.px_per_cm
    }

    /// Pixel to meter conversion for accelerometer readings
    #[inline]
    pub fn meters_per_px(&self) -> f64 {
        1.0 / (self.px_per_cm * 100.0)
    }

    /// Half of the ultrasonic field of view (degrees)
    #[inline]
    pub fn half_fov(&self) -> f64 {
        self.fov_deg / 2.0
    }

    /// Builder-style noise override
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude.max(0.0);
        self
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_radius <= 0.0 || self.robot_radius <= 0.0 {
            return Err(ConfigError::Invalid("radii must be positive"));
        }
        if self.max_range <= 0.0 {
            return Err(ConfigError::Invalid("max_range must be positive"));
        }
        if self.ping_period_ms <= 0.0 {
            return Err(ConfigError::Invalid("ping_period_ms must be positive"));
        }
        if self.wave_speed() <= 0.0 {
            return Err(ConfigError::Invalid("wave speed must be positive"));
        }
        if self.reference_frame_ms <= 0.0 {
            return Err(ConfigError::Invalid("reference_frame_ms must be positive"));
        }
        if self.max_speed <= 0.0 {
            return Err(ConfigError::Invalid("max_speed must be positive"));
        }
        if !(self.damping_per_frame > 0.0 && self.damping_per_frame <= 1.0) {
            return Err(ConfigError::Invalid("damping_per_frame must be in (0, 1]"));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg <= 360.0) {
            return Err(ConfigError::Invalid("fov_deg must be in (0, 360]"));
        }
        if self.ir_sensor_height_cm <= 0.0 {
            return Err(ConfigError::Invalid("ir_sensor_height_cm must be positive"));
        }
        if self.sweep_samples < 2 {
            return Err(ConfigError::Invalid("sweep_samples must be at least 2"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from a file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.wave_speed() - 1.372).abs() < 1e-9);
        assert!((config.meters_per_px() - 0.0025).abs() < 1e-12);
        assert_eq!(config.max_range, 200.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SimConfig::from_json(r#"{"max_range": 280.0, "noise_amplitude": 5.0}"#)
            .expect("valid json");
        assert_eq!(config.max_range, 280.0);
        assert_eq!(config.noise_amplitude, 5.0);
        assert_eq!(config.robot_radius, ROBOT_RADIUS);
        assert_eq!(config.reflectivity, ReflectivityTable::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimConfig::from_json(r#"{"damping_per_frame": 1.5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        for height in ["0.0", "-2.0"] {
            let json = format!(r#"{{"ir_sensor_height_cm": {height}}}"#);
            let err = SimConfig::from_json(&json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
        }

        let err = SimConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = SimConfig::load("/nonexistent/sumo-config.json");
        assert_eq!(config.arena_radius, ARENA_RADIUS);
    }

    #[test]
    fn test_with_noise_clamps_negative() {
        let config = SimConfig::default().with_noise(-3.0);
        assert_eq!(config.noise_amplitude, 0.0);
    }
}

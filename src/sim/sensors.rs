//! Simulated sensor channels
//!
//! Ultrasonic range with optional noise, infrared floor reflectance, a rate
//! integrating gyroscope, a finite-difference accelerometer and the push
//! detector built on top of the gyroscope.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::distance_to_center;
use super::ping::{HitSource, PingTarget};
use crate::config::SimConfig;

/// Ultrasonic range reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UltrasonicReading {
    /// Reported distance, noise applied (px)
    pub measured: f64,
    /// Exact geometric distance (px)
    pub true_distance: f64,
    pub hit_point: DVec2,
    pub hit_source: HitSource,
}

/// Turn an exact target into a reading. Noise is uniform in
/// `[-amplitude, amplitude]` and never pushes the reading below zero.
pub fn measure_ultrasonic<R: Rng + ?Sized>(
    target: PingTarget,
    noise_amplitude: f64,
    rng: &mut R,
) -> UltrasonicReading {
    let measured = if noise_amplitude > 0.0 {
        (target.distance + rng.random_range(-noise_amplitude..=noise_amplitude)).max(0.0)
    } else {
        target.distance
    };
    UltrasonicReading {
        measured,
        true_distance: target.distance,
        hit_point: target.hit_point,
        hit_source: target.source,
    }
}

/// Floor surface under the infrared sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Surface {
    #[default]
    Black,
    /// Boundary ring
    White,
    /// Center mark
    Blue,
}

/// Infrared reflectance reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfraredState {
    pub surface: Surface,
    pub reflectivity: f64,
    pub intensity: f64,
}

impl Default for InfraredState {
    fn default() -> Self {
        Self {
            surface: Surface::Black,
            reflectivity: 0.0,
            intensity: 0.0,
        }
    }
}

/// Classify the floor at `pos`
pub fn classify_surface(pos: DVec2, config: &SimConfig) -> Surface {
    let r = distance_to_center(pos, config.arena_center);
    if (r - config.arena_radius).abs() <= config.ring_edge / 2.0 {
        Surface::White
    } else if r <= config.center_mark_radius {
        Surface::Blue
    } else {
        Surface::Black
    }
}

/// Infrared reading at `pos` using an inverse-square falloff over sensor height
pub fn read_infrared(pos: DVec2, config: &SimConfig) -> InfraredState {
    let surface = classify_surface(pos, config);
    let reflectivity = match surface {
        Surface::White => config.reflectivity.white,
        Surface::Black => config.reflectivity.black,
        Surface::Blue => config.reflectivity.blue,
    };
    let h = config.ir_sensor_height_cm;
    InfraredState {
        surface,
        reflectivity,
        intensity: config.ir_power * reflectivity / (h * h),
    }
}

/// Rate gyroscope: integrates whatever angular velocity it is fed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Gyroscope {
    angular_velocity: f64,
    orientation: f64,
}

impl Gyroscope {
    /// Feed one rate sample (°/s) covering `dt_ms`
    pub fn update(&mut self, angular_velocity: f64, dt_ms: f64) {
        self.angular_velocity = angular_velocity;
        self.orientation += angular_velocity * (dt_ms / 1000.0);
    }

    /// Last sampled rate (°/s)
    #[inline]
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Integrated orientation (degrees, unwrapped)
    #[inline]
    pub fn orientation(&self) -> f64 {
        self.orientation
    }
}

/// Finite-difference accelerometer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Accelerometer {
    /// Last estimate (m/s²)
    pub acceleration: DVec2,
    previous_velocity: DVec2,
}

impl Accelerometer {
    pub fn new(initial_velocity: DVec2) -> Self {
        Self {
            acceleration: DVec2::ZERO,
            previous_velocity: initial_velocity,
        }
    }

    /// Sample `velocity` (px/s). A non-positive `dt_ms` keeps the previous
    /// estimate and only rebases the velocity baseline.
    pub fn record(&mut self, velocity: DVec2, dt_ms: f64, meters_per_px: f64) -> DVec2 {
        if dt_ms > 0.0 {
            let dv = velocity - self.previous_velocity;
            self.acceleration = dv / (dt_ms / 1000.0) * meters_per_px;
        }
        self.previous_velocity = velocity;
        self.acceleration
    }

    #[inline]
    pub fn previous_velocity(&self) -> DVec2 {
        self.previous_velocity
    }
}

/// Distance from `pos` to the arena boundary (negative outside)
#[inline]
pub fn edge_distance(pos: DVec2, config: &SimConfig) -> f64 {
    config.arena_radius - distance_to_center(pos, config.arena_center)
}

/// Boundary alert: within two robot radii of the edge
#[inline]
pub fn edge_alert(pos: DVec2, config: &SimConfig) -> bool {
    edge_distance(pos, config) < config.robot_radius * 2.0
}

/// An external spin: the gyroscope reports a rate above `threshold` while the
/// controller commanded no turn
#[inline]
pub fn detect_push(gyro_rate: f64, commanded_rate: f64, threshold: f64) -> bool {
    commanded_rate.abs() < f64::EPSILON && gyro_rate.abs() > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn centered() -> SimConfig {
        SimConfig {
            arena_center: DVec2::ZERO,
            ..Default::default()
        }
    }

    fn target(distance: f64) -> PingTarget {
        PingTarget {
            distance,
            hit_point: DVec2::new(distance, 0.0),
            source: HitSource::Ring,
        }
    }

    #[test]
    fn test_ultrasonic_without_noise_is_exact() {
        let mut rng = Pcg32::seed_from_u64(1);
        let reading = measure_ultrasonic(target(123.0), 0.0, &mut rng);
        assert_eq!(reading.measured, reading.true_distance);
    }

    #[test]
    fn test_ultrasonic_noise_bounded_and_non_negative() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let reading = measure_ultrasonic(target(10.0), 40.0, &mut rng);
            assert!(reading.measured >= 0.0);
            assert!(reading.measured <= 50.0);
            assert_eq!(reading.true_distance, 10.0);
        }
    }

    #[test]
    fn test_infrared_surfaces() {
        let config = centered();
        assert_eq!(classify_surface(DVec2::ZERO, &config), Surface::Blue);
        assert_eq!(classify_surface(DVec2::new(80.0, 0.0), &config), Surface::Black);
        assert_eq!(classify_surface(DVec2::new(0.0, 155.0), &config), Surface::White);
        assert_eq!(classify_surface(DVec2::new(165.0, 0.0), &config), Surface::White);
        assert_eq!(classify_surface(DVec2::new(175.0, 0.0), &config), Surface::Black);
    }

    #[test]
    fn test_infrared_intensity_inverse_square() {
        let config = centered();
        let ir = read_infrared(DVec2::new(0.0, 160.0), &config);
        assert_eq!(ir.surface, Surface::White);
        assert!((ir.intensity - 1000.0 * 0.9 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_gyroscope_integrates_fed_rate() {
        let mut gyro = Gyroscope::default();
        gyro.update(90.0, 500.0);
        gyro.update(90.0, 500.0);
        assert_eq!(gyro.angular_velocity(), 90.0);
        assert!((gyro.orientation() - 90.0).abs() < 1e-12);

        // Drift: a constant bias keeps accumulating
        gyro.update(1.0, 10_000.0);
        assert!((gyro.orientation() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_accelerometer_finite_difference() {
        let mut acc = Accelerometer::new(DVec2::ZERO);
        let a = acc.record(DVec2::new(100.0, 0.0), 100.0, 0.0025);
        // 100 px/s over 0.1 s = 1000 px/s² = 2.5 m/s²
        assert!((a.x - 2.5).abs() < 1e-12);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn test_accelerometer_zero_dt_rebases_only() {
        let mut acc = Accelerometer::new(DVec2::ZERO);
        let a1 = acc.record(DVec2::new(100.0, 0.0), 100.0, 0.0025);
        let a2 = acc.record(DVec2::new(300.0, 0.0), 0.0, 0.0025);
        assert_eq!(a1, a2);
        assert_eq!(acc.previous_velocity(), DVec2::new(300.0, 0.0));
        let a3 = acc.record(DVec2::new(300.0, 0.0), -5.0, 0.0025);
        assert_eq!(a3, a1);
    }

    #[test]
    fn test_edge_alert() {
        let config = centered();
        assert!(!edge_alert(DVec2::ZERO, &config));
        assert!(edge_alert(DVec2::new(130.0, 0.0), &config));
        assert!((edge_distance(DVec2::new(100.0, 0.0), &config) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_push_detection_threshold() {
        assert!(detect_push(55.0, 0.0, 40.0));
        assert!(detect_push(-55.0, 0.0, 40.0));
        assert!(!detect_push(30.0, 0.0, 40.0));
        // Self-initiated turning is never a push
        assert!(!detect_push(240.0, 240.0, 40.0));
    }

    #[test]
    fn test_push_detection_from_gyroscope_sample() {
        let mut gyro = Gyroscope::default();
        gyro.update(55.0, 16.0);
        assert!(detect_push(gyro.angular_velocity(), 0.0, 40.0));
        gyro.update(30.0, 16.0);
        assert!(!detect_push(gyro.angular_velocity(), 0.0, 40.0));
    }
}

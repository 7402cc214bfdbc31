//! Robot kinematic core
//!
//! Owns position, velocity and heading, the active ping and every derived
//! sensor channel. Control strategies write intent into a `Robot`; the motion
//! finish (`clamp -> damp -> integrate -> record`) is shared by all of them.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{damping_factor, distance_to_center};
use super::ping::{Ping, PingPhase, cast_target};
use super::sensors::{
    Accelerometer, Gyroscope, InfraredState, UltrasonicReading, detect_push, edge_alert,
    edge_distance, measure_ultrasonic, read_infrared,
};
use crate::config::SimConfig;
use crate::{heading_delta, normalize_degrees};

/// Which seat a robot occupies in the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Player,
    Opponent,
}

impl Role {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Role::Player => 0,
            Role::Opponent => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Role {
        match self {
            Role::Player => Role::Opponent,
            Role::Opponent => Role::Player,
        }
    }
}

/// A sumo robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub role: Role,
    pub pos: DVec2,
    /// Velocity (px/s)
    pub vel: DVec2,
    /// Heading (degrees, [0, 360))
    pub heading: f64,
    pub previous_heading: f64,
    pub radius: f64,

    /// In-flight pulse, at most one
    pub ping: Option<Ping>,
    /// Match time of the last emission (ms)
    pub last_ping_ms: Option<f64>,
    /// Latest ultrasonic reading, refreshed once per tick
    pub ultrasonic: Option<UltrasonicReading>,

    accelerometer: Accelerometer,
    /// Heading rate over the last tick (°/s)
    pub angular_velocity: f64,
    pub gyroscope: Gyroscope,
    pub infrared: InfraredState,
    pub edge_alert: bool,

    /// Turn the controller itself made this tick (°/s)
    pub commanded_turn_rate: f64,
    /// Command matching `angular_velocity`
    estimate_command: f64,
    /// Command matching the gyroscope's last sample
    gyro_command: f64,
}

impl Robot {
    pub fn new(role: Role, pos: DVec2, heading: f64, radius: f64) -> Self {
        let heading = normalize_degrees(heading);
        Self {
            role,
            pos,
            vel: DVec2::ZERO,
            heading,
            previous_heading: heading,
            radius,
            ping: None,
            last_ping_ms: None,
            ultrasonic: None,
            accelerometer: Accelerometer::default(),
            angular_velocity: 0.0,
            gyroscope: Gyroscope::default(),
            infrared: InfraredState::default(),
            edge_alert: false,
            commanded_turn_rate: 0.0,
            estimate_command: 0.0,
            gyro_command: 0.0,
        }
    }

    /// Spawn at the fixed start pose for `role`
    pub fn spawn(role: Role, config: &SimConfig) -> Self {
        let (dx, heading) = match role {
            Role::Player => (-config.spawn_offset, 0.0),
            Role::Opponent => (config.spawn_offset, 180.0),
        };
        let mut robot = Self::new(
            role,
            config.arena_center + DVec2::new(dx, 0.0),
            heading,
            config.robot_radius,
        );
        robot.refresh_floor_sensors(config);
        robot
    }

    /// Acceleration estimate (m/s²)
    #[inline]
    pub fn acceleration(&self) -> DVec2 {
        self.accelerometer.acceleration
    }

    #[inline]
    pub fn previous_velocity(&self) -> DVec2 {
        self.accelerometer.previous_velocity()
    }

    /// Start of a control update: no turn commanded yet
    #[inline]
    pub fn begin_control(&mut self) {
        self.commanded_turn_rate = 0.0;
    }

    /// Heading disturbance from outside the controller. Matches route
    /// `TickInput::disturbances` here; the gyroscope reports it as a push.
    pub fn knock(&mut self, delta_deg: f64) {
        self.heading = normalize_degrees(self.heading + delta_deg);
    }

    /// Turn by `delta_deg` as a self-initiated command over `dt_ms`
    pub fn turn(&mut self, delta_deg: f64, dt_ms: f64) {
        self.heading = normalize_degrees(self.heading + delta_deg);
        if dt_ms > 0.0 {
            self.commanded_turn_rate += delta_deg / (dt_ms / 1000.0);
        }
    }

    /// Set an absolute heading as a self-initiated command
    pub fn face(&mut self, heading_deg: f64, dt_ms: f64) {
        let delta = heading_delta(self.heading, normalize_degrees(heading_deg));
        self.turn(delta, dt_ms);
    }

    /// Scale velocity down to `max_speed`, keeping direction
    pub fn clamp_speed(&mut self, max_speed: f64) {
        if self.vel.length() > max_speed {
            self.vel = self.vel.normalize_or_zero() * max_speed;
        }
    }

    pub fn apply_damping(&mut self, dt_ms: f64, config: &SimConfig) {
        self.vel *= damping_factor(dt_ms, config.damping_per_frame, config.reference_frame_ms);
    }

    /// Advance position and feed the gyroscope the current rate estimate
    pub fn integrate(&mut self, dt_ms: f64) {
        self.pos += self.vel * (dt_ms / 1000.0);
        self.gyroscope.update(self.angular_velocity, dt_ms);
        self.gyro_command = self.estimate_command;
    }

    pub fn record_acceleration(&mut self, dt_ms: f64, config: &SimConfig) {
        self.accelerometer
            .record(self.vel, dt_ms, config.meters_per_px());
    }

    /// Heading rate since the previous record; `dt_ms <= 0` only rebases
    pub fn record_angular_velocity(&mut self, dt_ms: f64) {
        if dt_ms > 0.0 {
            self.angular_velocity =
                heading_delta(self.previous_heading, self.heading) / (dt_ms / 1000.0);
            self.estimate_command = self.commanded_turn_rate;
        }
        self.previous_heading = self.heading;
    }

    /// Shared end of every control update
    pub fn finish_motion(&mut self, dt_ms: f64, config: &SimConfig) {
        self.clamp_speed(config.max_speed);
        self.apply_damping(dt_ms, config);
        self.integrate(dt_ms);
        self.record_acceleration(dt_ms, config);
        self.record_angular_velocity(dt_ms);
    }

    /// Resolve overlap by pushing both robots apart equally along the normal
    pub fn separate_from(&mut self, other: &mut Robot) {
        let min_dist = self.radius + other.radius;
        let delta = other.pos - self.pos;
        let d = delta.length();
        // Coincident centers have no normal
        if d <= f64::EPSILON || d >= min_dist {
            return;
        }
        let n = delta / d;
        let half = (min_dist - d) / 2.0;
        self.pos -= n * half;
        other.pos += n * half;
    }

    /// Gyroscope rate is above threshold while no turn was commanded
    pub fn push_detected(&self, threshold: f64) -> bool {
        detect_push(self.gyroscope.angular_velocity(), self.gyro_command, threshold)
    }

    /// Emit a ping toward the current heading if idle and off cooldown
    pub fn try_emit_ping(
        &mut self,
        now_ms: f64,
        opponent: Option<(DVec2, f64)>,
        config: &SimConfig,
    ) -> bool {
        if self.ping.is_some() {
            return false;
        }
        if let Some(last) = self.last_ping_ms {
            if now_ms - last < config.ping_period_ms {
                return false;
            }
        }
        let target = cast_target(self.pos, self.heading, opponent, config);
        log::trace!(
            "{:?} ping at {:.0} ms: {:.1} px to {:?}",
            self.role,
            now_ms,
            target.distance,
            target.source
        );
        self.ping = Some(Ping::new(self.pos, self.heading, target));
        self.last_ping_ms = Some(now_ms);
        true
    }

    /// Advance the active ping, dropping it once its echo returns
    pub fn update_ping(&mut self, dt_ms: f64, config: &SimConfig) {
        if let Some(ping) = self.ping.as_mut() {
            if ping.advance(dt_ms, config.wave_speed(), config.max_range) == PingPhase::Done {
                self.ping = None;
            }
        }
    }

    /// Ultrasonic reading toward the current heading
    pub fn measure_range<R: Rng + ?Sized>(
        &self,
        opponent: Option<(DVec2, f64)>,
        config: &SimConfig,
        rng: &mut R,
    ) -> UltrasonicReading {
        let target = cast_target(self.pos, self.heading, opponent, config);
        measure_ultrasonic(target, config.noise_amplitude, rng)
    }

    /// Take a reading and keep it for the sensor panel
    pub fn sense_range<R: Rng + ?Sized>(
        &mut self,
        opponent: Option<(DVec2, f64)>,
        config: &SimConfig,
        rng: &mut R,
    ) {
        self.ultrasonic = Some(self.measure_range(opponent, config, rng));
    }

    /// Refresh edge alert and infrared from the current position
    pub fn refresh_floor_sensors(&mut self, config: &SimConfig) {
        self.edge_alert = edge_alert(self.pos, config);
        self.infrared = read_infrared(self.pos, config);
    }

    #[inline]
    pub fn edge_distance(&self, config: &SimConfig) -> f64 {
        edge_distance(self.pos, config)
    }

    /// Fully outside the ring
    pub fn is_out(&self, config: &SimConfig) -> bool {
        distance_to_center(self.pos, config.arena_center) - self.radius > config.arena_radius
    }

    /// Disc used by the opponent's ray casts
    #[inline]
    pub fn body(&self) -> (DVec2, f64) {
        (self.pos, self.radius)
    }
}

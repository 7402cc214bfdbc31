//! Ultrasonic pulse and echo propagation
//!
//! A ping travels outward from its origin until it reaches the obstacle found
//! at emission time, then an echo travels back the same distance. Progress is
//! expressed in pixels and advanced by `wave_speed * dt_ms`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{ray_circle_distance, ray_disc_distance};
use crate::config::SimConfig;
use crate::unit_vector;

/// What the pulse reflected off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    /// Arena wall, or the range limit when the wall is farther
    Ring,
    /// Opponent robot body
    Bot,
}

/// Nearest obstacle along a heading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingTarget {
    pub distance: f64,
    pub hit_point: DVec2,
    pub source: HitSource,
}

/// Cast from `origin` along `heading_deg` against the opponent disc and the
/// arena wall. The opponent wins only when it is present, nearer than the wall
/// and within range; otherwise the wall distance is clamped to max range.
pub fn cast_target(
    origin: DVec2,
    heading_deg: f64,
    opponent: Option<(DVec2, f64)>,
    config: &SimConfig,
) -> PingTarget {
    let dir = unit_vector(heading_deg);
    let d_ring = ray_circle_distance(
        origin,
        dir,
        config.arena_center,
        config.arena_radius,
        config.max_range,
    );
    let d_bot = opponent.and_then(|(center, radius)| ray_disc_distance(origin, dir, center, radius));

    if let Some(d) = d_bot {
        if d < d_ring && d <= config.max_range {
            return PingTarget {
                distance: d,
                hit_point: origin + dir * d,
                source: HitSource::Bot,
            };
        }
    }

    let distance = d_ring.min(config.max_range);
    PingTarget {
        distance,
        hit_point: origin + dir * distance,
        source: HitSource::Ring,
    }
}

/// Lifecycle stage of a ping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PingPhase {
    Outbound,
    Echoing,
    Done,
}

/// Return leg of a ping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    /// Direction from the hit point back toward the origin (radians)
    pub angle: f64,
    /// Distance traveled by the echo front (px)
    pub progress: f64,
}

/// One ultrasonic pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub origin: DVec2,
    /// Emission direction (radians)
    pub emission_angle: f64,
    /// Exact distance to the obstacle at emission time (px)
    pub target_distance: f64,
    pub hit_point: DVec2,
    pub hit_source: HitSource,
    /// Distance traveled by the outbound front (px)
    pub outbound_progress: f64,
    /// Set once the outbound front reaches the target
    pub echo: Option<Echo>,
}

impl Ping {
    pub fn new(origin: DVec2, heading_deg: f64, target: PingTarget) -> Self {
        Self {
            origin,
            emission_angle: heading_deg.to_radians(),
            target_distance: target.distance,
            hit_point: target.hit_point,
            hit_source: target.source,
            outbound_progress: 0.0,
            echo: None,
        }
    }

    /// Echo direction, `None` while outbound
    #[inline]
    pub fn echo_angle(&self) -> Option<f64> {
        self.echo.map(|e| e.angle)
    }

    /// Echo progress, zero while outbound
    #[inline]
    pub fn echo_progress(&self) -> f64 {
        self.echo.map_or(0.0, |e| e.progress)
    }

    pub fn phase(&self) -> PingPhase {
        match self.echo {
            None => PingPhase::Outbound,
            Some(e) if e.progress >= self.target_distance => PingPhase::Done,
            Some(_) => PingPhase::Echoing,
        }
    }

    /// Propagate the wave front by `dt_ms` and return the resulting phase.
    ///
    /// The echo starts in the same step the outbound front reaches the target
    /// and advances by that step immediately.
    pub fn advance(&mut self, dt_ms: f64, wave_speed: f64, max_range: f64) -> PingPhase {
        let step = wave_speed * dt_ms;
        self.outbound_progress += step;

        if self.echo.is_none() && self.outbound_progress >= self.target_distance {
            let back = self.origin - self.hit_point;
            self.echo = Some(Echo {
                angle: back.y.atan2(back.x),
                progress: 0.0,
            });
        }

        match self.echo.as_mut() {
            Some(echo) => {
                echo.progress += step;
                if echo.progress >= self.target_distance {
                    return PingPhase::Done;
                }
                PingPhase::Echoing
            }
            // Signal lost past the sensor range without reaching a target
            None if self.outbound_progress > max_range => PingPhase::Done,
            None => PingPhase::Outbound,
        }
    }
}

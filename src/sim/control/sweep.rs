//! Sonar-sweep pursuit
//!
//! Each tick casts a fan of rays across the field of view, steers toward the
//! closest echo at a capped turn rate and blends velocity toward a cruise
//! vector along the new heading.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::sim::geometry::ray_disc_distance;
use crate::sim::robot::Robot;
use crate::{bearing_degrees, heading_delta, normalize_degrees, unit_vector};

/// Heading of the closest ray in the fan that hits the target disc within range
pub fn sweep_bearing(
    origin: DVec2,
    heading: f64,
    target: (DVec2, f64),
    config: &SimConfig,
) -> Option<f64> {
    let samples = config.sweep_samples.max(2);
    let half = config.half_fov();
    let spacing = config.fov_deg / (samples - 1) as f64;

    let mut best: Option<(f64, f64)> = None;
    for i in 0..samples {
        let deg = normalize_degrees(heading - half + i as f64 * spacing);
        let Some(d) = ray_disc_distance(origin, unit_vector(deg), target.0, target.1) else {
            continue;
        };
        if d <= config.max_range && best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, deg));
        }
    }
    best.map(|(_, deg)| deg)
}

/// Continuous re-aiming strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepControl;

impl SweepControl {
    pub fn update(
        &self,
        robot: &mut Robot,
        opponent: Option<(DVec2, f64)>,
        config: &SimConfig,
        dt_ms: f64,
    ) {
        robot.begin_control();

        if let Some(body) = opponent {
            let target = sweep_bearing(robot.pos, robot.heading, body, config)
                .unwrap_or_else(|| bearing_degrees(robot.pos, body.0));

            let diff = heading_delta(robot.heading, target);
            let cap = config.sweep_turn_rate * dt_ms.max(0.0) / 1000.0;
            robot.turn(diff.clamp(-cap, cap), dt_ms);
        }

        let desired = unit_vector(robot.heading) * config.sweep_speed;
        robot.vel = robot.vel.lerp(desired, config.sweep_blend);

        robot.finish_motion(dt_ms, config);
    }
}

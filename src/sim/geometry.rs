//! Ray casting and damping helpers
//!
//! Pure functions over `DVec2`; no simulation state.

use glam::DVec2;

/// Roots of `a t² + b t + c = 0`, smallest first, or `None` when the
/// discriminant is negative or the equation is degenerate
#[inline]
fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a.abs() < f64::EPSILON {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
}

/// Smallest strictly positive `t` where `origin + t * dir` meets the circle
fn first_positive_hit(origin: DVec2, dir: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    let f = origin - center;
    let a = dir.length_squared();
    let b = 2.0 * dir.dot(f);
    let c = f.length_squared() - radius * radius;

    let (t1, t2) = solve_quadratic(a, b, c)?;
    [t1, t2]
        .into_iter()
        .filter(|t| *t > 0.0)
        .min_by(|a, b| a.total_cmp(b))
}

/// Distance along a ray to a circle boundary, or `default` on a miss
///
/// Used for the arena wall, where a miss falls back to the sensor range.
#[inline]
pub fn ray_circle_distance(
    origin: DVec2,
    dir: DVec2,
    center: DVec2,
    radius: f64,
    default: f64,
) -> f64 {
    first_positive_hit(origin, dir, center, radius).unwrap_or(default)
}

/// Distance along a ray to a disc, `None` when nothing lies ahead
#[inline]
pub fn ray_disc_distance(origin: DVec2, dir: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    first_positive_hit(origin, dir, center, radius)
}

/// Velocity multiplier for an elapsed `dt_ms`, independent of frame rate
///
/// `damping_per_frame` is the factor kept over one `reference_frame_ms`.
#[inline]
pub fn damping_factor(dt_ms: f64, damping_per_frame: f64, reference_frame_ms: f64) -> f64 {
    damping_per_frame.powf(dt_ms / reference_frame_ms)
}

/// Distance from a point to the arena center
#[inline]
pub fn distance_to_center(p: DVec2, center: DVec2) -> f64 {
    (p - center).length()
}

//! Small numeric helpers shared by the animated entities.

use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};

/// Linear interpolation between `start` and `end`.
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

/// Exponential approach of `current` towards `target`.
///
/// The step factor is `rate * dt` clamped to `[0, 1]`, so the result always
/// lies between `current` and `target` and a saturated step lands exactly on
/// the target.
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let factor = (rate * dt).clamp(0.0, 1.0);
    if !factor.is_finite() {
        return current;
    }
    if factor >= 1.0 {
        return target;
    }
    current + (target - current) * factor
}

/// Normalize an angle into `[0, 2π)`. Non-finite input maps to zero.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed difference `b - a` between two angles, in `(-π, π]`.
pub fn angle_delta(a: f32, b: f32) -> f32 {
    let d = (b - a).rem_euclid(TAU);
    if d > std::f32::consts::PI { d - TAU } else { d }
}

/// Rotation for an `(x, y, z)` Euler tilt applied in XYZ order.
pub fn tilt_quat(tilt: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, tilt.x, tilt.y, tilt.z)
}

//! Static point clouds that only rotate as a whole.

use std::f32::consts::TAU;

use galaxy_core::{Rgb, tilt_quat};
use glam::{Quat, Vec3};
use rand::Rng;

/// How a field's rotation advances each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spin {
    /// Radians per second around each axis.
    PerSecond(Vec3),
    /// Radians per frame around each axis.
    PerFrame(Vec3),
}

/// Uniform random direction on the unit sphere.
fn unit_direction(rng: &mut impl Rng) -> Vec3 {
    let theta = TAU * rng.r#gen::<f32>();
    let phi = (2.0 * rng.r#gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// `count` points uniformly distributed through the volume of a ball.
pub fn uniform_ball(count: usize, radius: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    let radius = radius.max(0.0);
    (0..count)
        .map(|_| {
            let direction = unit_direction(rng);
            direction * (radius * rng.r#gen::<f32>().cbrt())
        })
        .collect()
}

/// `count` points in a spherical shell, radius uniform in `[inner, outer)`.
pub fn shell(count: usize, inner: f32, outer: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    let span = (outer - inner).max(0.0);
    (0..count)
        .map(|_| {
            let direction = unit_direction(rng);
            direction * (inner + rng.r#gen::<f32>() * span)
        })
        .collect()
}

/// `count` points in an axis-aligned cube of edge `size` centred on the origin.
pub fn cube(count: usize, size: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.r#gen::<f32>() - 0.5,
                rng.r#gen::<f32>() - 0.5,
                rng.r#gen::<f32>() - 0.5,
            ) * size
        })
        .collect()
}

/// A point cloud generated once and rotated as a group.
#[derive(Debug, Clone)]
pub struct ParticleField {
    points: Vec<Vec3>,
    colors: Option<Vec<Rgb>>,
    tint: Rgb,
    base_tilt: Quat,
    rotation: Vec3,
    spin: Spin,
}

impl ParticleField {
    pub fn new(points: Vec<Vec3>, tint: Rgb, spin: Spin) -> Self {
        Self {
            points,
            colors: None,
            tint,
            base_tilt: Quat::IDENTITY,
            rotation: Vec3::ZERO,
            spin,
        }
    }

    /// Per-point colours. Ignored unless there is one per point.
    pub fn with_colors(mut self, colors: Vec<Rgb>) -> Self {
        if colors.len() == self.points.len() {
            self.colors = Some(colors);
        }
        self
    }

    /// Static tilt of the group the field sits in.
    pub fn with_tilt(mut self, tilt: Vec3) -> Self {
        self.base_tilt = tilt_quat(tilt);
        self
    }

    /// Rotate the whole field. Cost does not depend on the point count.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let step = match self.spin {
            Spin::PerSecond(rate) => rate * dt,
            Spin::PerFrame(rate) => rate,
        };
        self.rotation = (self.rotation + step).map(|a| a.rem_euclid(TAU));
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Points as generated, before any rotation.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in scene space with their colours.
    pub fn world_points(&self) -> impl Iterator<Item = (Vec3, Rgb)> + '_ {
        let rotation = self.base_tilt * tilt_quat(self.rotation);
        self.points.iter().enumerate().map(move |(i, p)| {
            let color = self
                .colors
                .as_ref()
                .map_or(self.tint, |colors| colors[i]);
            (rotation * *p, color)
        })
    }
}

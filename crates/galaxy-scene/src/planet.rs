//! The central planet: spinning surface, pulsing glow, drifting halo.

use galaxy_core::{FrameTime, Rgb, hsl_to_rgb};
use glam::Vec3;
use rand::Rng;

use crate::field::{ParticleField, Spin, cube, shell};

/// Radius of the planet surface.
pub const SURFACE_RADIUS: f32 = 1.3;
/// Radius of the inner glow shell.
pub const GLOW_RADIUS: f32 = 1.4;
/// Radius of the outer atmosphere.
pub const ATMOSPHERE_RADIUS: f32 = 1.8;

pub const SURFACE_COLOR: Rgb = Rgb(0xff, 0x6b, 0xcb);
pub const SURFACE_EMISSIVE: Rgb = Rgb(0xcc, 0x10, 0x76);
pub const GLOW_COLOR: Rgb = Rgb(0xf7, 0x91, 0xc4);
pub const ATMOSPHERE_COLOR: Rgb = Rgb(0xf0, 0x92, 0xc4);
pub const SPARKLE_COLOR: Rgb = Rgb(0xff, 0xd7, 0x00);

/// Edge of the cube the surface sparkles are scattered in.
const SPARKLE_EDGE: f32 = 1.5;

const SURFACE_SPIN_PER_FRAME: f32 = 0.002;
const ATMOSPHERE_SPIN_PER_FRAME: f32 = -0.001;
const FLOAT_SPEED: f32 = 2.0;
const FLOAT_RANGE: f32 = 0.1;

/// Animated planet state.
#[derive(Debug, Clone)]
pub struct Planet {
    surface_spin: f32,
    atmosphere_spin: f32,
    elapsed: f32,
    halo: ParticleField,
    sparkles: ParticleField,
}

impl Planet {
    pub fn new(rng: &mut impl Rng) -> Self {
        let halo_points = shell(500, 2.0, 3.5, rng);
        let halo_colors = (0..halo_points.len())
            .map(|_| {
                let h = 0.8 + rng.r#gen::<f32>() * 0.2;
                let s = 0.6 + rng.r#gen::<f32>() * 0.4;
                let l = 0.6 + rng.r#gen::<f32>() * 0.4;
                hsl_to_rgb(h * 360.0, s, l)
            })
            .collect();

        Self {
            surface_spin: 0.0,
            atmosphere_spin: 0.0,
            elapsed: 0.0,
            halo: ParticleField::new(halo_points, Rgb::WHITE, Spin::PerFrame(Vec3::Y * 0.001))
                .with_colors(halo_colors),
            sparkles: ParticleField::new(
                cube(50, SPARKLE_EDGE, rng),
                SPARKLE_COLOR,
                Spin::PerFrame(Vec3::ZERO),
            ),
        }
    }

    pub fn advance(&mut self, time: FrameTime) {
        self.elapsed = time.elapsed;
        self.surface_spin += SURFACE_SPIN_PER_FRAME;
        self.atmosphere_spin += ATMOSPHERE_SPIN_PER_FRAME;
        self.halo.advance(time.delta);
    }

    /// Breathing scale of the surface.
    pub fn pulse_scale(&self) -> f32 {
        1.0 + self.elapsed.sin() * 0.02
    }

    /// Opacity of the inner glow shell.
    pub fn glow_opacity(&self) -> f32 {
        0.2 * (0.9 + (self.elapsed * 2.0).sin() * 0.1)
    }

    /// Vertical bob of the whole planet group.
    pub fn float_offset(&self) -> Vec3 {
        Vec3::Y * (self.elapsed * FLOAT_SPEED / 4.0).sin() * FLOAT_RANGE * 0.5
    }

    pub fn surface_spin(&self) -> f32 {
        self.surface_spin
    }

    pub fn atmosphere_spin(&self) -> f32 {
        self.atmosphere_spin
    }

    pub fn halo(&self) -> &ParticleField {
        &self.halo
    }

    pub fn sparkles(&self) -> &ParticleField {
        &self.sparkles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_pulse_and_glow_stay_in_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(40);
        let mut planet = Planet::new(&mut rng);
        for i in 0..500 {
            planet.advance(FrameTime::new(i as f32 * 0.05, 0.05));
            assert!((0.979..=1.021).contains(&planet.pulse_scale()));
            assert!((0.159..=0.201).contains(&planet.glow_opacity()));
            assert!(planet.float_offset().y.abs() <= FLOAT_RANGE);
        }
    }

    #[test]
    fn test_surface_and_atmosphere_counter_rotate() {
        let mut rng = Pcg64Mcg::seed_from_u64(41);
        let mut planet = Planet::new(&mut rng);
        for _ in 0..10 {
            planet.advance(FrameTime::new(0.0, 0.016));
        }
        assert!(planet.surface_spin() > 0.0);
        assert!(planet.atmosphere_spin() < 0.0);
    }

    #[test]
    fn test_sparkles_hug_the_surface() {
        let mut rng = Pcg64Mcg::seed_from_u64(43);
        let planet = Planet::new(&mut rng);
        assert_eq!(planet.sparkles().len(), 50);
        for (p, _) in planet.sparkles().world_points() {
            assert!(p.abs().max_element() <= SPARKLE_EDGE / 2.0, "{p}");
        }
    }

    #[test]
    fn test_halo_colours_are_pink_purple() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let planet = Planet::new(&mut rng);
        assert_eq!(planet.halo().len(), 500);
        // Hues in [288°, 360°) keep red and blue above green
        for (_, c) in planet.halo().world_points() {
            assert!(c.0 >= c.1 && c.2 >= c.1, "{c}");
        }
    }
}

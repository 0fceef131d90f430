//! Static scene lighting.

use galaxy_core::Rgb;
use glam::Vec3;

/// An omnidirectional light without falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

/// Ambient term plus a handful of point lights.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: Rgb,
    pub ambient_intensity: f32,
    pub points: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Rgb(0x2a, 0x0a, 0x40),
            ambient_intensity: 0.5,
            points: vec![
                PointLight {
                    position: Vec3::new(10.0, 10.0, 5.0),
                    color: Rgb(0xff, 0xcc, 0xff),
                    intensity: 1.5,
                },
                PointLight {
                    position: Vec3::new(-10.0, -5.0, -5.0),
                    color: Rgb(0x4b, 0x00, 0x82),
                    intensity: 0.5,
                },
            ],
        }
    }
}

fn channels(c: Rgb) -> Vec3 {
    Vec3::new(c.0 as f32, c.1 as f32, c.2 as f32) / 255.0
}

impl Lighting {
    /// Lambert shading of a surface point, plus a constant emissive term.
    pub fn shade(&self, albedo: Rgb, emissive: Rgb, point: Vec3, normal: Vec3) -> Rgb {
        let normal = normal.normalize_or_zero();
        let mut light = channels(self.ambient) * self.ambient_intensity;
        for lamp in &self.points {
            let to_light = (lamp.position - point).normalize_or_zero();
            let lambert = normal.dot(to_light).max(0.0);
            light += channels(lamp.color) * lamp.intensity * lambert;
        }
        let lit = channels(albedo) * light + channels(emissive);
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb(to_u8(lit.x), to_u8(lit.y), to_u8(lit.z))
    }
}

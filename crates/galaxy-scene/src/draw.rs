//! Render graph handed to whatever draws the scene.

use galaxy_core::Rgb;
use glam::Vec3;

use crate::transient::Flight;

/// Which point cloud a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLayer {
    /// Distant background shell.
    Background,
    /// Volumetric star field around the scene.
    StarField,
    /// Coloured particles around the planet.
    Halo,
    /// Twinkling sparkles; `seed` varies the twinkle phase.
    Sparkle { seed: u32 },
}

/// Role of a sphere in the planet stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SphereKind {
    /// Lit, opaque surface rotated by `spin` radians.
    Surface { spin: f32, emissive: Rgb },
    /// Additive translucent shell, its faint banding rotated by `spin`.
    Glow { opacity: f32, spin: f32 },
}

/// A single thing to draw, in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drawable {
    Point {
        position: Vec3,
        color: Rgb,
        layer: PointLayer,
    },
    Glyph {
        position: Vec3,
        glyph: char,
        color: Rgb,
        outline: Rgb,
    },
    Sphere {
        center: Vec3,
        radius: f32,
        color: Rgb,
        kind: SphereKind,
    },
    Comet {
        index: usize,
        position: Vec3,
        scale: f32,
        opacity: f32,
        hovered: bool,
        color: Rgb,
    },
    Meteor {
        flight: Flight,
        head: Rgb,
        trail: Rgb,
        trail_length: f32,
    },
}

impl Drawable {
    /// Anchor point used for projection.
    pub fn position(&self) -> Vec3 {
        match self {
            Drawable::Point { position, .. }
            | Drawable::Glyph { position, .. }
            | Drawable::Comet { position, .. } => *position,
            Drawable::Sphere { center, .. } => *center,
            Drawable::Meteor { flight, .. } => flight.position,
        }
    }
}

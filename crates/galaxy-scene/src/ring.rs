//! Rings of glyphs spinning around the planet.

use std::f32::consts::{FRAC_PI_2, TAU};

use galaxy_core::{RingSettings, tilt_quat};
use glam::{Quat, Vec3};

/// A glyph's resting place on its ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub glyph: char,
    /// Position in the ring's own plane.
    pub position: Vec3,
    /// Rotation about the ring axis so the glyph faces outward.
    pub yaw: f32,
}

/// Place every character of `text` at equal steps around a circle.
///
/// Glyph `i` sits at angle `-i * step`. An empty text or a non-finite
/// radius yields no glyphs.
pub fn layout(text: &str, radius: f32) -> Vec<GlyphPlacement> {
    let glyphs: Vec<char> = text.chars().collect();
    if glyphs.is_empty() || !radius.is_finite() {
        return Vec::new();
    }
    let step = TAU / glyphs.len() as f32;
    glyphs
        .into_iter()
        .enumerate()
        .map(|(i, glyph)| {
            let angle = -(i as f32) * step;
            GlyphPlacement {
                glyph,
                position: Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius),
                yaw: -angle + FRAC_PI_2,
            }
        })
        .collect()
}

/// A tilted ring spinning by a constant amount every frame.
///
/// The spin is counted in frames, not seconds, so its angular speed
/// follows the frame rate.
#[derive(Debug, Clone)]
pub struct LabelRing {
    glyphs: Vec<GlyphPlacement>,
    tilt: Quat,
    spin: f32,
    spin_per_frame: f32,
}

impl LabelRing {
    pub fn new(settings: &RingSettings) -> Self {
        let spin_per_frame = if settings.spin_per_frame.is_finite() {
            settings.spin_per_frame
        } else {
            0.0
        };
        Self {
            glyphs: layout(&settings.text, settings.radius),
            tilt: tilt_quat(Vec3::from_array(settings.tilt)),
            spin: 0.0,
            spin_per_frame,
        }
    }

    /// Add one frame's worth of spin.
    pub fn advance_frame(&mut self) {
        self.spin = (self.spin + self.spin_per_frame).rem_euclid(TAU);
    }

    /// Accumulated spin in `[0, 2π)`.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn glyphs(&self) -> &[GlyphPlacement] {
        &self.glyphs
    }

    /// Glyphs with their scene-space positions.
    pub fn world_glyphs(&self) -> impl Iterator<Item = (char, Vec3)> + '_ {
        let rotation = self.tilt * Quat::from_rotation_y(self.spin);
        self.glyphs
            .iter()
            .map(move |g| (g.glyph, rotation * g.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::angle_delta;

    fn ring(text: &str, spin_per_frame: f32) -> LabelRing {
        LabelRing::new(&RingSettings {
            text: text.into(),
            radius: 2.5,
            tilt: [0.3, 0.0, 0.0],
            spin_per_frame,
        })
    }

    #[test]
    fn test_layout_spacing() {
        let glyphs = layout("ABCD", 2.0);
        assert_eq!(glyphs.len(), 4);
        assert!(glyphs[0].position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert!(glyphs[1].position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
        for g in &glyphs {
            assert!((g.position.length() - 2.0).abs() < 1e-5);
        }
        assert!((glyphs[0].yaw - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_layout_counts_chars_not_bytes() {
        assert_eq!(layout("MY • LOVE", 1.0).len(), 9);
    }

    #[test]
    fn test_empty_text_has_no_glyphs() {
        assert!(layout("", 3.0).is_empty());
        assert!(layout("abc", f32::NAN).is_empty());
        let mut r = ring("", 0.005);
        r.advance_frame();
        assert_eq!(r.world_glyphs().count(), 0);
    }

    #[test]
    fn test_opposite_rings_spin_apart() {
        let mut a = ring("AB", -0.005);
        let mut b = ring("AB", 0.005);
        for _ in 0..100 {
            a.advance_frame();
            b.advance_frame();
        }
        assert!((angle_delta(0.0, a.spin()) + 0.5).abs() < 1e-4);
        assert!((angle_delta(0.0, b.spin()) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_spin_follows_frame_count_not_time() {
        // One second at 30 fps versus one second at 60 fps
        let mut slow = ring("AB", 0.005);
        let mut fast = ring("AB", 0.005);
        for _ in 0..30 {
            slow.advance_frame();
        }
        for _ in 0..60 {
            fast.advance_frame();
        }
        assert!((fast.spin() - 2.0 * slow.spin()).abs() < 1e-5);
    }

    #[test]
    fn test_spin_keeps_radius() {
        let mut r = ring("HELLO", 0.3);
        for _ in 0..7 {
            r.advance_frame();
        }
        for (_, p) in r.world_glyphs() {
            assert!((p.length() - 2.5).abs() < 1e-4);
        }
    }
}

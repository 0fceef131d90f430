//! Tunable scene parameters.

use serde::{Deserialize, Serialize};

/// One rotating ring of glyphs around the planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingSettings {
    /// Text laid out around the ring.
    pub text: String,
    /// Ring radius in world units.
    pub radius: f32,
    /// Static Euler tilt of the ring plane.
    #[serde(default)]
    pub tilt: [f32; 3],
    /// Rotation added every frame, in radians.
    pub spin_per_frame: f32,
}

/// Parameters for building and animating the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Seed for the scene RNG. `None` seeds from the wall clock.
    pub seed: Option<u64>,
    /// Number of orbiting memory comets.
    pub comet_count: usize,
    /// Smallest orbit radius along either axis.
    pub orbit_radius_min: f32,
    /// Largest orbit radius along either axis (exclusive).
    pub orbit_radius_max: f32,
    /// Slowest orbital speed in radians per second.
    pub orbit_speed_min: f32,
    /// Random extra speed added on top of the minimum.
    pub orbit_speed_jitter: f32,
    /// Scale a hovered comet grows to.
    pub hover_scale: f32,
    /// Exponential smoothing rate for the hover scale.
    pub hover_smoothing: f32,
    /// Number of self-respawning shooting stars.
    pub shooting_star_count: usize,
    /// Per-frame activation chance of an idle shooting star.
    pub shooting_star_probability: f32,
    /// Horizontal speed of a shooting star.
    pub shooting_star_speed: f32,
    /// Stars in the one-off meteor shower.
    pub shower_star_count: usize,
    /// Seconds after mount before the shower begins.
    pub shower_start_delay: f32,
    /// Upper bound of each shower star's own start delay.
    pub shower_max_delay: f32,
    /// Slowest shower star speed.
    pub shower_speed_min: f32,
    /// Random extra speed for shower stars.
    pub shower_speed_jitter: f32,
    /// Camera distance at mount.
    pub intro_start_z: f32,
    /// Camera distance the intro eases towards.
    pub intro_target_z: f32,
    /// Per-frame interpolation factor of the intro.
    pub intro_lerp: f32,
    /// Distance at which the intro counts as finished.
    pub intro_epsilon: f32,
    /// Points in the volumetric star field.
    pub star_field_count: usize,
    /// Radius of the volumetric star field.
    pub star_field_radius: f32,
    /// Points in the distant background star shell.
    pub background_star_count: usize,
    /// Rotating glyph rings.
    pub rings: Vec<RingSettings>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seed: None,
            comet_count: 350,
            orbit_radius_min: 4.0,
            orbit_radius_max: 8.0,
            orbit_speed_min: 0.1,
            orbit_speed_jitter: 0.01,
            hover_scale: 2.0,
            hover_smoothing: 5.0,
            shooting_star_count: 3,
            shooting_star_probability: 0.005,
            shooting_star_speed: 15.0,
            shower_star_count: 20,
            shower_start_delay: 5.0,
            shower_max_delay: 3.0,
            shower_speed_min: 20.0,
            shower_speed_jitter: 15.0,
            intro_start_z: 2.0,
            intro_target_z: 16.0,
            intro_lerp: 0.02,
            intro_epsilon: 0.1,
            star_field_count: 6000,
            star_field_radius: 30.0,
            background_star_count: 2000,
            rings: vec![
                RingSettings {
                    text: "YOU ARE MY UNIVERSE • MY LOVE • MY GALAXY •".into(),
                    radius: 2.5,
                    tilt: [0.3, 0.0, 0.0],
                    spin_per_frame: -0.005,
                },
                RingSettings {
                    text: "FOREVER YOURS • INFINITE LOVE • ETERNAL •".into(),
                    radius: 3.0,
                    tilt: [0.5, 0.0, std::f32::consts::FRAC_PI_2],
                    spin_per_frame: 0.005,
                },
            ],
        }
    }
}

//! Memory comets travelling on tilted elliptical orbits.

use std::f32::consts::TAU;

use galaxy_core::{CursorKind, Memory, Propagation, Rgb, damp, tilt_quat, wrap_angle};
use glam::{Quat, Vec3};
use rand::Rng;

use crate::effects::UiEffects;
use crate::error::{SceneError, SceneResult};

/// Colour hints handed out to comets at random.
pub const COMET_COLORS: [Rgb; 4] = [
    Rgb(0xff, 0x66, 0xcc),
    Rgb(0x9d, 0x4e, 0xdd),
    Rgb(0x00, 0xcc, 0xff),
    Rgb(0xff, 0xcc, 0x00),
];

/// Scale a comet settles at when not hovered.
const REST_SCALE: f32 = 1.0;

/// Height of the image card above the comet, before scaling.
const CARD_LIFT: f32 = 0.5;

/// Immutable orbit description of one comet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitParams {
    /// Semi-axis along local x.
    pub radius_x: f32,
    /// Semi-axis along local z.
    pub radius_z: f32,
    /// Radians per second, any sign.
    pub angular_speed: f32,
    /// Angle at mount, any real value.
    pub start_angle: f32,
    /// Euler tilt of the orbit plane.
    pub tilt: Vec3,
    /// Index of the memory asset this comet carries.
    pub asset: usize,
    /// Tint used for the comet marker.
    pub color: Rgb,
}

impl OrbitParams {
    /// Check radii are positive and every value is finite.
    pub fn validate(self) -> SceneResult<Self> {
        let radii_ok = self.radius_x.is_finite()
            && self.radius_z.is_finite()
            && self.radius_x > 0.0
            && self.radius_z > 0.0;
        if !radii_ok {
            return Err(SceneError::InvalidOrbit(format!(
                "radii must be positive, got ({}, {})",
                self.radius_x, self.radius_z
            )));
        }
        if !self.angular_speed.is_finite() || !self.start_angle.is_finite() {
            return Err(SceneError::InvalidOrbit(
                "angular speed and start angle must be finite".into(),
            ));
        }
        if !self.tilt.is_finite() {
            return Err(SceneError::InvalidOrbit("tilt must be finite".into()));
        }
        Ok(self)
    }

    /// Draw randomized orbit parameters for the comet carrying `asset`.
    pub fn random(
        rng: &mut impl Rng,
        asset: usize,
        radius: (f32, f32),
        speed_min: f32,
        speed_jitter: f32,
    ) -> Self {
        let (lo, hi) = radius;
        let span = (hi - lo).max(0.0);
        Self {
            radius_x: lo + rng.r#gen::<f32>() * span,
            radius_z: lo + rng.r#gen::<f32>() * span,
            angular_speed: speed_min + rng.r#gen::<f32>() * speed_jitter,
            start_angle: rng.r#gen::<f32>() * TAU,
            tilt: Vec3::new(
                (rng.r#gen::<f32>() - 0.5) * 0.1,
                9.0,
                (rng.r#gen::<f32>() - 0.5) * 0.2 + 0.3,
            ),
            asset,
            color: COMET_COLORS[rng.gen_range(0..COMET_COLORS.len())],
        }
    }
}

/// A clickable comet orbiting the planet.
#[derive(Debug, Clone)]
pub struct Comet {
    params: OrbitParams,
    memory: Memory,
    tilt: Quat,
    angle: f32,
    scale: f32,
    hovered: bool,
    local: Vec3,
    hover_scale: f32,
    smoothing_rate: f32,
}

impl Comet {
    /// Mount a comet. The start angle is normalized into `[0, 2π)`.
    pub fn new(params: OrbitParams, memory: Memory) -> SceneResult<Self> {
        let params = params.validate()?;
        let angle = wrap_angle(params.start_angle);
        let mut comet = Self {
            tilt: tilt_quat(params.tilt),
            params,
            memory,
            angle,
            scale: REST_SCALE,
            hovered: false,
            local: Vec3::ZERO,
            hover_scale: 2.0,
            smoothing_rate: 5.0,
        };
        comet.update_position();
        Ok(comet)
    }

    /// Override the hover scale target and smoothing rate.
    pub fn with_hover(mut self, hover_scale: f32, smoothing_rate: f32) -> Self {
        if hover_scale.is_finite() && hover_scale >= 0.0 {
            self.hover_scale = hover_scale;
        }
        if smoothing_rate.is_finite() && smoothing_rate >= 0.0 {
            self.smoothing_rate = smoothing_rate;
        }
        self
    }

    /// Advance the orbit and the hover scale by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.angle = wrap_angle(self.angle + self.params.angular_speed * dt);
        self.update_position();
        self.scale = damp(self.scale, self.target_scale(), self.smoothing_rate, dt);
    }

    fn update_position(&mut self) {
        self.local = Vec3::new(
            self.angle.cos() * self.params.radius_x,
            0.0,
            self.angle.sin() * self.params.radius_z,
        );
    }

    fn target_scale(&self) -> f32 {
        if self.hovered {
            self.hover_scale
        } else {
            REST_SCALE
        }
    }

    /// Pointer entered the comet.
    pub fn on_pointer_enter(&mut self, effects: &mut dyn UiEffects) {
        self.hovered = true;
        effects.set_cursor(CursorKind::Pointer);
    }

    /// Pointer left the comet; the cursor always falls back to the default.
    pub fn on_pointer_leave(&mut self, effects: &mut dyn UiEffects) {
        self.hovered = false;
        effects.set_cursor(CursorKind::Default);
    }

    /// Hand this comet's memory to `on_select` and consume the click.
    pub fn on_click(&self, on_select: &mut dyn FnMut(&Memory)) -> Propagation {
        on_select(&self.memory);
        Propagation::Stop
    }

    /// Orbit parameters.
    pub fn params(&self) -> &OrbitParams {
        &self.params
    }

    /// Memory carried by this comet.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Current angle in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current smoothed scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Position in the tilted orbit plane.
    pub fn local_position(&self) -> Vec3 {
        self.local
    }

    /// Position in scene space.
    pub fn world_position(&self) -> Vec3 {
        self.tilt * self.local
    }

    /// Where the image card floats, just above the comet in its own frame.
    pub fn card_position(&self) -> Vec3 {
        self.tilt * (self.local + Vec3::Y * CARD_LIFT * self.scale)
    }

    /// Size of the attached image card.
    pub fn image_scale(&self) -> f32 {
        if self.hovered { 0.6 } else { 0.5 }
    }

    /// Opacity of the attached image card.
    pub fn image_opacity(&self) -> f32 {
        if self.hovered { 1.0 } else { 0.8 }
    }
}

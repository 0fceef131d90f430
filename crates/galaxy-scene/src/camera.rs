//! Camera, scripted intro approach, and the free orbit rig that follows it.

use std::f32::consts::{PI, TAU};

use galaxy_core::lerp;
use glam::{Mat4, Vec3, Vec4};

/// Perspective camera that always looks at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at `(0, 0, z)` with a 45° field of view.
    pub fn at_z(z: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, z),
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Combined projection and view matrix for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let projection = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        projection * view
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the camera or outside the depth
    /// range. `z` of the result is the view distance, useful for depth tests.
    pub fn project(&self, view_projection: &Mat4, world: Vec3) -> Option<Vec3> {
        let clip = *view_projection * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= self.near || clip.w >= self.far {
            return None;
        }
        Some(Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.w))
    }
}

/// Phase of the scripted intro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntroPhase {
    Approaching,
    Finished,
}

/// One-shot ease of the camera from a close-up to its orbit distance.
///
/// Each frame moves `z` a fixed fraction of the remaining distance, so the
/// approach is exponential and never passes the target.
#[derive(Debug, Clone, PartialEq)]
pub struct IntroCamera {
    z: f32,
    target: f32,
    factor: f32,
    epsilon: f32,
    phase: IntroPhase,
}

impl IntroCamera {
    /// Create an intro from `start` to `target`. The per-frame factor is
    /// clamped into `(0, 1]`.
    pub fn new(start: f32, target: f32, factor: f32, epsilon: f32) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(1e-4, 1.0)
        } else {
            0.02
        };
        Self {
            z: start,
            target,
            factor,
            epsilon: epsilon.abs(),
            phase: IntroPhase::Approaching,
        }
    }

    /// Step one frame. `on_finish` runs on the frame the camera arrives and
    /// never again.
    pub fn advance(&mut self, on_finish: impl FnOnce()) {
        if self.phase == IntroPhase::Finished {
            return;
        }
        if (self.z - self.target).abs() >= self.epsilon {
            self.z = lerp(self.z, self.target, self.factor);
        }
        if (self.z - self.target).abs() < self.epsilon {
            self.phase = IntroPhase::Finished;
            on_finish();
        }
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn is_finished(&self) -> bool {
        self.phase == IntroPhase::Finished
    }
}

/// Smallest polar angle the rig may reach, keeping away from the poles.
const POLAR_MARGIN: f32 = 0.01;

/// Free orbit, zoom and auto-rotation around the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    azimuth: f32,
    polar: f32,
    distance: f32,
    azimuth_velocity: f32,
    polar_velocity: f32,
    enabled: bool,
    auto_rotate: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate_speed: f32,
    pub damping: f32,
}

impl OrbitRig {
    /// Rig positioned at `position`, disabled until [`OrbitRig::enable`].
    pub fn from_position(position: Vec3) -> Self {
        let distance = position.length().max(f32::EPSILON);
        let polar = (position.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = position.x.atan2(position.z);
        Self {
            azimuth,
            polar: polar.clamp(POLAR_MARGIN, PI - POLAR_MARGIN),
            distance,
            azimuth_velocity: 0.0,
            polar_velocity: 0.0,
            enabled: false,
            auto_rotate: false,
            min_distance: 3.0,
            max_distance: 25.0,
            rotate_speed: 0.5,
            zoom_speed: 0.5,
            auto_rotate_speed: 0.5,
            damping: 0.05,
        }
    }

    /// Hand control to the user and start auto-rotation.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.auto_rotate = true;
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Drag by a fraction of the viewport (`1.0` = full width/height).
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.enabled || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.azimuth_velocity -= TAU * dx * self.rotate_speed;
        self.polar_velocity -= TAU * dy * self.rotate_speed;
    }

    /// Zoom by scroll steps; positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled || !steps.is_finite() {
            return;
        }
        let scale = 0.95f32.powf(self.zoom_speed * steps);
        self.distance = (self.distance * scale).clamp(self.min_distance, self.max_distance);
    }

    /// Swing back to the front view at the current distance.
    pub fn reset(&mut self) {
        self.azimuth = 0.0;
        self.polar = PI / 2.0;
        self.azimuth_velocity = 0.0;
        self.polar_velocity = 0.0;
    }

    /// Apply auto-rotation and damped user motion for one frame.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.auto_rotate {
            self.azimuth += TAU / 60.0 * self.auto_rotate_speed * dt;
        }
        // Damped motion releases a fraction of the pending rotation per frame
        let step = match self.damping.clamp(0.0, 1.0) {
            d if d > 0.0 => d,
            _ => 1.0,
        };
        self.azimuth = (self.azimuth + self.azimuth_velocity * step).rem_euclid(TAU);
        self.polar = (self.polar + self.polar_velocity * step)
            .clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
        self.azimuth_velocity *= 1.0 - step;
        self.polar_velocity *= 1.0 - step;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Camera position on the orbit sphere.
    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            self.distance * sin_polar * self.azimuth.sin(),
            self.distance * self.polar.cos(),
            self.distance * sin_polar * self.azimuth.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intro_converges_without_overshoot() {
        let mut intro = IntroCamera::new(2.0, 16.0, 0.02, 0.1);
        let mut finishes = 0;
        let mut steps = 0;
        while !intro.is_finished() {
            intro.advance(|| finishes += 1);
            assert!(intro.z() <= 16.0);
            steps += 1;
            assert!(steps < 300, "intro did not converge");
        }
        assert!((intro.z() - 16.0).abs() < 0.1);
        assert_eq!(finishes, 1);

        // Inert once finished
        let z = intro.z();
        for _ in 0..10 {
            intro.advance(|| finishes += 1);
        }
        assert_eq!(intro.z(), z);
        assert_eq!(finishes, 1);
    }

    #[test]
    fn test_intro_is_monotone() {
        let mut intro = IntroCamera::new(2.0, 16.0, 0.02, 0.1);
        let mut last = intro.z();
        for _ in 0..400 {
            intro.advance(|| {});
            assert!(intro.z() >= last);
            last = intro.z();
        }
    }

    #[test]
    fn test_intro_already_at_target() {
        let mut intro = IntroCamera::new(16.0, 16.0, 0.02, 0.1);
        let mut done = false;
        intro.advance(|| done = true);
        assert!(done);
        assert_eq!(intro.z(), 16.0);
    }

    #[test]
    fn test_rig_round_trips_position() {
        let start = Vec3::new(0.0, 0.0, 16.0);
        let rig = OrbitRig::from_position(start);
        assert!(rig.position().abs_diff_eq(start, 1e-3));
    }

    #[test]
    fn test_rig_ignores_input_until_enabled() {
        let mut rig = OrbitRig::from_position(Vec3::new(0.0, 0.0, 16.0));
        rig.zoom(10.0);
        rig.rotate(0.5, 0.0);
        rig.advance(1.0);
        assert_eq!(rig.distance(), 16.0);
        assert!(rig.position().abs_diff_eq(Vec3::new(0.0, 0.0, 16.0), 1e-3));
    }

    #[test]
    fn test_rig_auto_rotates_and_clamps_zoom() {
        let mut rig = OrbitRig::from_position(Vec3::new(0.0, 0.0, 16.0));
        rig.enable();
        let before = rig.position();
        rig.advance(1.0);
        assert!(!rig.position().abs_diff_eq(before, 1e-4));
        assert!((rig.position().length() - 16.0).abs() < 1e-3);

        rig.zoom(1000.0);
        assert_eq!(rig.distance(), 3.0);
        rig.zoom(-1000.0);
        assert_eq!(rig.distance(), 25.0);
    }

    #[test]
    fn test_project_origin_to_center() {
        let camera = Camera::at_z(16.0);
        let vp = camera.view_projection(2.0);
        let ndc = camera.project(&vp, Vec3::ZERO).unwrap();
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((ndc.z - 16.0).abs() < 1e-3);
        assert!(camera.project(&vp, Vec3::new(0.0, 0.0, 30.0)).is_none());
    }
}

//! Shooting stars: short-lived streaks with a spawn, fly and retire cycle.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use glam::Vec3;
use rand::Rng;

use crate::timer::{Scheduler, TimerHandle};

/// Horizontal position past which an active star retires.
pub const RETIRE_X: f32 = -100.0;

/// Downward drift applied to every star, in units per second.
pub const STAR_DRIFT: f32 = 2.0;

/// Callback run once when a one-shot star retires.
pub type CompletionFn = Box<dyn FnOnce()>;

/// Box that new stars appear in: far right, wide vertical spread, behind
/// the planet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnVolume {
    pub x: Range<f32>,
    pub y: Range<f32>,
    pub z: Range<f32>,
}

impl Default for SpawnVolume {
    fn default() -> Self {
        Self {
            x: 50.0..150.0,
            y: -40.0..40.0,
            z: -50.0..10.0,
        }
    }
}

impl SpawnVolume {
    /// Pick a uniformly random point inside the volume.
    pub fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        let (u, v, w) = (rng.r#gen::<f32>(), rng.r#gen::<f32>(), rng.r#gen::<f32>());
        Vec3::new(along(&self.x, u), along(&self.y, v), along(&self.z, w))
    }
}

fn along(range: &Range<f32>, t: f32) -> f32 {
    range.start + t * (range.end - range.start)
}

/// Position and velocity of a star in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Flight {
    fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

/// Lifecycle of a transient star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransientState {
    /// Waiting for its start delay to elapse.
    Pending { delay: f32 },
    /// Visible and moving.
    Active(Flight),
    /// Off screen. Respawning stars may come back from here.
    Retired,
}

/// Transition reported by [`TransientStar::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientEvent {
    Activated,
    Retired,
}

/// What happens after a star retires.
enum Retrigger {
    /// Re-enter flight with the given chance per frame.
    Respawn { probability: f32 },
    /// Stay retired. The timer gates the first flight.
    Once {
        timer: TimerHandle,
        on_complete: Option<CompletionFn>,
    },
}

impl fmt::Debug for Retrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retrigger::Respawn { probability } => f
                .debug_struct("Respawn")
                .field("probability", probability)
                .finish(),
            Retrigger::Once { timer, on_complete } => f
                .debug_struct("Once")
                .field("timer", timer)
                .field("on_complete", &on_complete.is_some())
                .finish(),
        }
    }
}

/// A single shooting star.
#[derive(Debug)]
pub struct TransientStar {
    state: TransientState,
    retrigger: Retrigger,
    spawn: SpawnVolume,
    /// Start point of a one-shot star, fixed at creation.
    start: Vec3,
    speed: f32,
    drift: f32,
    boundary_x: f32,
}

impl TransientStar {
    /// A star that keeps coming back, activating with `probability` per frame.
    pub fn respawning(probability: f32, speed: f32, spawn: SpawnVolume) -> Self {
        Self {
            state: TransientState::Retired,
            retrigger: Retrigger::Respawn {
                probability: probability.clamp(0.0, 1.0),
            },
            spawn,
            start: Vec3::ZERO,
            speed,
            drift: STAR_DRIFT,
            boundary_x: RETIRE_X,
        }
    }

    /// A star that flies once, `delay` seconds after creation.
    ///
    /// Start point and speed are drawn now. The delay runs on `scheduler`,
    /// and dropping the star cancels it.
    pub fn one_shot(
        delay: f32,
        speed: f32,
        spawn: SpawnVolume,
        scheduler: &dyn Scheduler,
        rng: &mut impl Rng,
        on_complete: Option<CompletionFn>,
    ) -> Self {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        let start = spawn.sample(rng);
        Self {
            state: TransientState::Pending { delay },
            retrigger: Retrigger::Once {
                timer: scheduler.schedule(Duration::from_secs_f32(delay)),
                on_complete,
            },
            spawn,
            start,
            speed,
            drift: STAR_DRIFT,
            boundary_x: RETIRE_X,
        }
    }

    fn velocity(&self) -> Vec3 {
        Vec3::new(-self.speed, -self.drift, 0.0)
    }

    /// Step the lifecycle by one frame.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> Option<TransientEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match &mut self.state {
            TransientState::Pending { .. } => {
                let ready = match &self.retrigger {
                    Retrigger::Once { timer, .. } => timer.has_fired(),
                    Retrigger::Respawn { .. } => true,
                };
                if !ready {
                    return None;
                }
                self.state = TransientState::Active(Flight {
                    position: self.start,
                    velocity: self.velocity(),
                });
                Some(TransientEvent::Activated)
            }
            TransientState::Active(flight) => {
                flight.advance(dt);
                if flight.position.x >= self.boundary_x {
                    return None;
                }
                self.state = TransientState::Retired;
                if let Retrigger::Once { on_complete, .. } = &mut self.retrigger
                    && let Some(done) = on_complete.take()
                {
                    done();
                }
                Some(TransientEvent::Retired)
            }
            TransientState::Retired => {
                let Retrigger::Respawn { probability } = self.retrigger else {
                    return None;
                };
                if rng.r#gen::<f32>() >= probability {
                    return None;
                }
                self.state = TransientState::Active(Flight {
                    position: self.spawn.sample(rng),
                    velocity: self.velocity(),
                });
                Some(TransientEvent::Activated)
            }
        }
    }

    pub fn state(&self) -> &TransientState {
        &self.state
    }

    /// Stars are drawn only while in flight.
    pub fn is_visible(&self) -> bool {
        matches!(self.state, TransientState::Active(_))
    }

    /// Current flight, if visible.
    pub fn flight(&self) -> Option<Flight> {
        match self.state {
            TransientState::Active(flight) => Some(flight),
            _ => None,
        }
    }

    pub fn is_retired(&self) -> bool {
        matches!(self.state, TransientState::Retired)
    }
}

//! Frame timing supplied to every animated entity.

use std::time::Instant;

/// Elapsed and delta time for one frame tick, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

impl FrameTime {
    /// Build a frame time from raw values, clamping a negative delta to zero.
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self {
            elapsed,
            delta: delta.max(0.0),
        }
    }
}

/// Monotonic clock producing one [`FrameTime`] per call to [`FrameClock::tick`].
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a new clock at the current instant.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Sample the clock for the next frame.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Sample the clock at a given instant. Instants earlier than the previous
    /// sample yield a zero delta so time never runs backwards.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let now = now.max(self.last);
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        FrameTime::new(now.duration_since(self.start).as_secs_f32(), delta)
    }
}

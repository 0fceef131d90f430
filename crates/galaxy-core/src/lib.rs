//! Core types for the galaxy greeting scene.
//!
//! These are shared between the animation core, the configuration layer and
//! the terminal front end: frame timing, colours, memories, pointer cursor
//! kinds, scene settings and the small pieces of math every animated entity
//! relies on.

mod color;
mod math;
mod memory;
mod settings;
mod time;

pub use color::{Rgb, hsl_to_rgb};
pub use math::{angle_delta, damp, lerp, tilt_quat, wrap_angle};
pub use memory::Memory;
pub use settings::{RingSettings, SceneSettings};
pub use time::{FrameClock, FrameTime};

/// Pointer cursor shape requested by whichever entity owns the hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    /// Regular arrow; the safe state after any pointer-leave.
    #[default]
    Default,
    /// Hand cursor shown over clickable memories.
    Pointer,
}

impl CursorKind {
    /// Whether this cursor advertises something clickable.
    pub fn is_pointer(self) -> bool {
        self == CursorKind::Pointer
    }
}

/// Whether a pointer event keeps travelling to the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The event reaches the background handler.
    Continue,
    /// The event was consumed by an entity.
    Stop,
}

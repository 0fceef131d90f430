//! Animation core for the galaxy greeting scene.
//!
//! Every animated entity is a plain owned struct stepped once per frame by
//! [`Scene::tick`]: orbiting memory comets, respawning shooting stars, the
//! delayed meteor shower, the intro camera and orbit rig, spinning label
//! rings, particle fields and the planet. Delayed activations run on a
//! [`Scheduler`] whose timers only flip flags read back by the next tick.
//! The scene hands out a flat draw list and never renders anything itself.

mod camera;
mod comet;
mod draw;
mod effects;
mod error;
mod field;
mod light;
mod planet;
mod ring;
mod scene;
mod selection;
mod shower;
mod timer;
mod transient;

pub use camera::{Camera, IntroCamera, OrbitRig};
pub use comet::{COMET_COLORS, Comet, OrbitParams};
pub use draw::{Drawable, PointLayer, SphereKind};
pub use effects::UiEffects;
pub use error::{SceneError, SceneResult};
pub use field::{ParticleField, Spin, cube, shell, uniform_ball};
pub use light::{Lighting, PointLight};
pub use planet::Planet;
pub use ring::{GlyphPlacement, LabelRing, layout};
pub use scene::Scene;
pub use selection::MemorySelection;
pub use shower::{MeteorShower, ShowerConfig, ShowerEvent, ShowerPhase};
pub use timer::{ManualScheduler, Scheduler, ThreadScheduler, TimerHandle};
pub use transient::{
    CompletionFn, Flight, RETIRE_X, STAR_DRIFT, SpawnVolume, TransientEvent, TransientState,
    TransientStar,
};

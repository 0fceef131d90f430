//! Scene composer: owns every entity and drives them once per frame.

use std::f32::consts::FRAC_PI_4;
use std::rc::Rc;

use galaxy_core::{FrameTime, Memory, Propagation, Rgb, SceneSettings};
use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::camera::{Camera, IntroCamera, OrbitRig};
use crate::comet::{Comet, OrbitParams};
use crate::draw::{Drawable, PointLayer, SphereKind};
use crate::effects::UiEffects;
use crate::error::{SceneError, SceneResult};
use crate::field::{ParticleField, Spin, cube, shell, uniform_ball};
use crate::light::Lighting;
use crate::planet::{self, Planet};
use crate::ring::LabelRing;
use crate::selection::MemorySelection;
use crate::shower::{MeteorShower, ShowerConfig, ShowerEvent};
use crate::timer::Scheduler;
use crate::transient::{SpawnVolume, TransientStar};

const STAR_FIELD_COLOR: Rgb = Rgb(0xaa, 0xaa, 0xff);
const BACKGROUND_STAR_COLOR: Rgb = Rgb(0xdd, 0xdd, 0xee);
const DISTANT_SPARKLE_COLOR: Rgb = Rgb(0xff, 0xb6, 0xc1);
const RING_COLOR: Rgb = Rgb::WHITE;
const RING_OUTLINE: Rgb = Rgb(0xff, 0x00, 0xcc);
const METEOR_HEAD: Rgb = Rgb(0xff, 0x40, 0x40);
const METEOR_TRAIL: Rgb = Rgb(0xff, 0x00, 0xcc);

/// Capture the wall clock as a seed.
fn wall_clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn check_settings(settings: &SceneSettings) -> SceneResult<()> {
    let lo = settings.orbit_radius_min;
    let hi = settings.orbit_radius_max;
    if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi >= lo) {
        return Err(SceneError::InvalidSettings(format!(
            "orbit radius range must be positive and ordered, got {lo}..{hi}"
        )));
    }
    if !settings.intro_start_z.is_finite() || !settings.intro_target_z.is_finite() {
        return Err(SceneError::InvalidSettings(
            "intro distances must be finite".into(),
        ));
    }
    let (lerp, epsilon) = (settings.intro_lerp, settings.intro_epsilon);
    if !(lerp > 0.0 && lerp <= 1.0 && epsilon > 0.0 && epsilon.is_finite()) {
        return Err(SceneError::InvalidSettings(format!(
            "intro needs lerp in (0, 1] and a positive epsilon, got {lerp} and {epsilon}"
        )));
    }
    let speed = settings.shooting_star_speed;
    if !(speed.is_finite() && speed > 0.0) {
        return Err(SceneError::InvalidSettings(format!(
            "shooting star speed must be positive, got {speed}"
        )));
    }
    let (min, jitter) = (settings.shower_speed_min, settings.shower_speed_jitter);
    if !(min.is_finite() && jitter.is_finite() && min > 0.0 && jitter >= 0.0) {
        return Err(SceneError::InvalidSettings(format!(
            "shower speeds must be positive, got {min} + {jitter}"
        )));
    }
    Ok(())
}

/// The whole animated scene.
pub struct Scene {
    camera: Camera,
    intro: Option<IntroCamera>,
    rig: OrbitRig,
    intro_finished: bool,
    comets: Vec<Comet>,
    shooting_stars: Vec<TransientStar>,
    shower: MeteorShower,
    rings: Vec<LabelRing>,
    star_field: ParticleField,
    background: ParticleField,
    sparkles: ParticleField,
    planet: Planet,
    lighting: Lighting,
    selection: MemorySelection,
    hovered: Option<usize>,
    time: FrameTime,
    rng: Pcg64Mcg,
    scheduler: Rc<dyn Scheduler>,
}

impl Scene {
    /// Mount the scene. Comet `i` carries memory `i % memories.len()`; with
    /// no memories there are no comets.
    pub fn new(
        settings: &SceneSettings,
        memories: &[Memory],
        scheduler: Rc<dyn Scheduler>,
    ) -> SceneResult<Self> {
        check_settings(settings)?;

        let seed = settings.seed.unwrap_or_else(wall_clock_seed);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);

        let comets = if memories.is_empty() {
            log::warn!("no memories configured, the scene will have no comets");
            Vec::new()
        } else {
            (0..settings.comet_count)
                .map(|i| {
                    let asset = i % memories.len();
                    let params = OrbitParams::random(
                        &mut rng,
                        asset,
                        (settings.orbit_radius_min, settings.orbit_radius_max),
                        settings.orbit_speed_min,
                        settings.orbit_speed_jitter,
                    );
                    Comet::new(params, memories[asset].clone()).map(|comet| {
                        comet.with_hover(settings.hover_scale, settings.hover_smoothing)
                    })
                })
                .collect::<SceneResult<Vec<_>>>()?
        };

        let shooting_stars = (0..settings.shooting_star_count)
            .map(|_| {
                TransientStar::respawning(
                    settings.shooting_star_probability,
                    settings.shooting_star_speed,
                    SpawnVolume::default(),
                )
            })
            .collect();

        let shower = MeteorShower::new(
            ShowerConfig {
                star_count: settings.shower_star_count,
                start_delay: settings.shower_start_delay,
                max_delay: settings.shower_max_delay,
                speed_min: settings.shower_speed_min,
                speed_jitter: settings.shower_speed_jitter,
            },
            scheduler.as_ref(),
        );

        let star_field = ParticleField::new(
            uniform_ball(settings.star_field_count, settings.star_field_radius, &mut rng),
            STAR_FIELD_COLOR,
            Spin::PerSecond(Vec3::new(-1.0 / 50.0, -1.0 / 60.0, 0.0)),
        )
        .with_tilt(Vec3::new(0.0, 0.0, FRAC_PI_4));
        let background = ParticleField::new(
            shell(settings.background_star_count, 100.0, 150.0, &mut rng),
            BACKGROUND_STAR_COLOR,
            Spin::PerFrame(Vec3::ZERO),
        );
        let sparkles = ParticleField::new(
            cube(100, 20.0, &mut rng),
            DISTANT_SPARKLE_COLOR,
            Spin::PerFrame(Vec3::ZERO),
        );
        let planet = Planet::new(&mut rng);

        let camera = Camera::at_z(settings.intro_start_z);
        let intro = IntroCamera::new(
            settings.intro_start_z,
            settings.intro_target_z,
            settings.intro_lerp,
            settings.intro_epsilon,
        );

        log::info!(
            "scene mounted: {} comets over {} memories, seed {seed}",
            comets.len(),
            memories.len()
        );

        Ok(Self {
            rig: OrbitRig::from_position(camera.position),
            camera,
            intro: Some(intro),
            intro_finished: false,
            comets,
            shooting_stars,
            shower,
            rings: settings.rings.iter().map(LabelRing::new).collect(),
            star_field,
            background,
            sparkles,
            planet,
            lighting: Lighting::default(),
            selection: MemorySelection::default(),
            hovered: None,
            time: FrameTime::default(),
            rng,
            scheduler,
        })
    }

    /// Advance every entity by one frame.
    pub fn tick(&mut self, time: FrameTime) {
        self.time = time;
        let dt = time.delta;

        if let Some(intro) = &mut self.intro {
            let mut arrived = false;
            intro.advance(|| arrived = true);
            self.camera.position = Vec3::new(0.0, 0.0, intro.z());
            if arrived {
                self.finish_intro();
            }
        } else {
            self.rig.advance(dt);
            self.camera.position = self.rig.position();
        }

        for comet in &mut self.comets {
            comet.advance(dt);
        }
        for star in &mut self.shooting_stars {
            star.advance(dt, &mut self.rng);
        }
        match self.shower.advance(dt, &mut self.rng, self.scheduler.as_ref()) {
            Some(ShowerEvent::Started) => log::info!("meteor shower started"),
            Some(ShowerEvent::Finished) => log::info!("meteor shower finished"),
            None => {}
        }
        for ring in &mut self.rings {
            ring.advance_frame();
        }
        self.star_field.advance(dt);
        self.planet.advance(time);
    }

    fn finish_intro(&mut self) {
        self.intro = None;
        self.intro_finished = true;
        self.rig = OrbitRig::from_position(self.camera.position);
        self.rig.enable();
        log::info!("intro finished, orbit controls enabled");
    }

    /// Move hover to the comet at `hit`, or to nothing.
    pub fn pointer_move(&mut self, hit: Option<usize>, effects: &mut dyn UiEffects) {
        let hit = hit.filter(|&i| i < self.comets.len());
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.comets[old].on_pointer_leave(effects);
        }
        if let Some(new) = hit {
            self.comets[new].on_pointer_enter(effects);
            self.hovered = Some(new);
        }
    }

    /// Dispatch a click. Comets consume it; otherwise it reaches the
    /// background, which recentres the view once free navigation is on.
    pub fn click(&mut self, hit: Option<usize>) -> Propagation {
        if let Some(comet) = hit.and_then(|i| self.comets.get(i)) {
            let selection = &mut self.selection;
            let outcome = comet.on_click(&mut |memory| selection.select(memory.clone()));
            log::info!("memory selected: {}", comet.memory().image.display());
            return outcome;
        }
        if self.intro_finished {
            self.rig.reset();
        }
        Propagation::Continue
    }

    /// Close the memory modal. Returns whether one was open.
    pub fn close_memory(&mut self) -> bool {
        let closed = self.selection.close().is_some();
        if closed {
            log::info!("memory closed");
        }
        closed
    }

    /// Drag the view by a fraction of the viewport. Ignored during the intro.
    pub fn orbit_drag(&mut self, dx: f32, dy: f32) {
        self.rig.rotate(dx, dy);
    }

    /// Zoom by scroll steps. Ignored during the intro.
    pub fn zoom(&mut self, steps: f32) {
        self.rig.zoom(steps);
    }

    /// Nearest comet whose card covers `ndc`, if any.
    ///
    /// `tolerance` is the minimum pick radius in NDC units so tiny, distant
    /// cards stay clickable.
    pub fn pick(&self, ndc: Vec2, aspect: f32, tolerance: f32) -> Option<usize> {
        let view_projection = self.camera.view_projection(aspect);
        let half_height = (self.camera.fov_y / 2.0).tan();

        self.comets
            .iter()
            .enumerate()
            .filter_map(|(i, comet)| {
                let p = self.camera.project(&view_projection, comet.card_position())?;
                let radius = (comet.image_scale() * comet.scale() / 2.0) / (p.z * half_height);
                let offset = Vec2::new((p.x - ndc.x) * aspect, p.y - ndc.y);
                (offset.length() <= radius.max(tolerance)).then_some((i, p.z))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Everything visible this frame.
    pub fn draw_list(&self) -> Vec<Drawable> {
        let mut list = Vec::with_capacity(
            self.background.len() + self.star_field.len() + self.comets.len() + 1024,
        );

        list.extend(self.background.world_points().map(|(position, color)| {
            Drawable::Point {
                position,
                color,
                layer: PointLayer::Background,
            }
        }));
        list.extend(self.star_field.world_points().map(|(position, color)| {
            Drawable::Point {
                position,
                color,
                layer: PointLayer::StarField,
            }
        }));
        list.extend(
            self.sparkles
                .world_points()
                .enumerate()
                .map(|(i, (position, color))| Drawable::Point {
                    position,
                    color,
                    layer: PointLayer::Sparkle { seed: i as u32 },
                }),
        );

        let lift = self.planet.float_offset();
        list.push(Drawable::Sphere {
            center: lift,
            radius: planet::SURFACE_RADIUS * self.planet.pulse_scale(),
            color: planet::SURFACE_COLOR,
            kind: SphereKind::Surface {
                spin: self.planet.surface_spin(),
                emissive: planet::SURFACE_EMISSIVE,
            },
        });
        list.push(Drawable::Sphere {
            center: lift,
            radius: planet::GLOW_RADIUS,
            color: planet::GLOW_COLOR,
            kind: SphereKind::Glow {
                opacity: self.planet.glow_opacity(),
                spin: 0.0,
            },
        });
        list.push(Drawable::Sphere {
            center: lift,
            radius: planet::ATMOSPHERE_RADIUS,
            color: planet::ATMOSPHERE_COLOR,
            kind: SphereKind::Glow {
                opacity: 0.2,
                spin: self.planet.atmosphere_spin(),
            },
        });
        list.extend(
            self.planet
                .sparkles()
                .world_points()
                .enumerate()
                .map(|(i, (p, color))| Drawable::Point {
                    position: p + lift,
                    color,
                    layer: PointLayer::Sparkle { seed: 1000 + i as u32 },
                }),
        );
        list.extend(self.planet.halo().world_points().map(|(position, color)| {
            Drawable::Point {
                position,
                color,
                layer: PointLayer::Halo,
            }
        }));

        for ring in &self.rings {
            list.extend(ring.world_glyphs().map(|(glyph, position)| Drawable::Glyph {
                position,
                glyph,
                color: RING_COLOR,
                outline: RING_OUTLINE,
            }));
        }

        list.extend(self.comets.iter().enumerate().map(|(index, comet)| {
            Drawable::Comet {
                index,
                position: comet.card_position(),
                scale: comet.image_scale() * comet.scale(),
                opacity: comet.image_opacity(),
                hovered: comet.is_hovered(),
                color: comet.params().color,
            }
        }));

        let meteors = self
            .shooting_stars
            .iter()
            .filter_map(TransientStar::flight)
            .map(|flight| (flight, 6.0))
            .chain(self.shower.flights().map(|flight| (flight, 8.0)));
        list.extend(meteors.map(|(flight, trail_length)| Drawable::Meteor {
            flight,
            head: METEOR_HEAD,
            trail: METEOR_TRAIL,
            trail_length,
        }));

        list
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn comets(&self) -> &[Comet] {
        &self.comets
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected_memory(&self) -> Option<&Memory> {
        self.selection.current()
    }

    /// Whether the intro gate has opened.
    pub fn intro_finished(&self) -> bool {
        self.intro_finished
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn shower(&self) -> &MeteorShower {
        &self.shower
    }

    pub fn rings(&self) -> &[LabelRing] {
        &self.rings
    }

    /// Shooting stars currently in flight, shower included.
    pub fn visible_meteors(&self) -> usize {
        self.shooting_stars.iter().filter(|s| s.is_visible()).count()
            + self.shower.flights().count()
    }
}

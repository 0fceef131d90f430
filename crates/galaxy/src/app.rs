use std::convert::Infallible;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use galaxy_config::Config;
use galaxy_core::{FrameClock, Memory, Propagation};
use galaxy_scene::{Scene, Scheduler, ThreadScheduler, UiEffects};
use ratatui::{DefaultTerminal, Frame, buffer::Buffer, layout::Rect};

use crate::assets::ImageCache;
use crate::effects::TerminalEffects;
use crate::overlay::{
    ErrorScreen, Hud, IntroScreen, MemoryModal, OverlayState, modal_image_area, sound_label_area,
};
use crate::recorder::Recorder;
use crate::recovery::{RenderError, run_with_recovery};
use crate::view::{SceneView, aspect, cell_to_ndc};

/// Orbit drag applied per arrow key press, as a fraction of the screen.
const KEY_ORBIT_STEP: f32 = 0.02;

/// Minimum pick radius around the pointer, in cell heights.
const PICK_TOLERANCE_CELLS: f32 = 0.75;

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    scene: Scene,
    clock: FrameClock,
    effects: TerminalEffects,
    overlay: OverlayState,
    images: ImageCache,
    recorder: Recorder,
    recording_since: Option<Instant>,
    /// Last known mouse cell.
    pointer: Option<(u16, u16)>,
    /// Where the current left-button press started, and whether it moved.
    press: Option<((u16, u16), bool)>,
    /// Area of the last rendered frame.
    screen: Rect,
    /// Set once a frame fails; the app then only shows the error screen.
    failure: Option<RenderError>,
}

impl App {
    /// Construct a new instance of [`App`] with threaded timers.
    pub fn new(config: Config) -> color_eyre::Result<Self> {
        Self::with_scheduler(config, Rc::new(ThreadScheduler))
    }

    pub fn with_scheduler(
        config: Config,
        scheduler: Rc<dyn Scheduler>,
    ) -> color_eyre::Result<Self> {
        let memories: Vec<Memory> = config
            .memories
            .iter()
            .map(|memory| Memory::new(config.asset_path(&memory.image), memory.message.clone()))
            .collect();
        let scene = Scene::new(&config.scene, &memories, scheduler)?;
        let effects = TerminalEffects::new(&config.audio, config.asset_path(&config.audio.path));
        let duration = Duration::try_from_secs_f32(config.recording.duration_secs)
            .unwrap_or(Duration::from_secs(5));
        let recorder = Recorder::new(config.recording_dir(), duration);

        Ok(Self {
            running: false,
            config,
            scene,
            clock: FrameClock::new(),
            effects,
            overlay: OverlayState::default(),
            images: ImageCache::new(),
            recorder,
            recording_since: None,
            pointer: None,
            press: None,
            screen: Rect::default(),
            failure: None,
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let interval = self.config.frame_interval();
        log::info!(
            "galaxy started with {} comets",
            self.scene.comets().len()
        );
        while self.running {
            let frame_start = Instant::now();
            self.step();
            let completed = terminal.draw(|frame| self.render(frame))?;
            self.capture(completed.buffer);
            self.handle_crossterm_events(interval.saturating_sub(frame_start.elapsed()))?;
        }
        self.recorder.finish();
        self.effects.stop_ambient();
        Ok(())
    }

    /// Advance the scene by one frame.
    fn step(&mut self) {
        if self.failure.is_some() {
            return;
        }
        let time = self.clock.tick();
        let scene = &mut self.scene;
        let stepped = run_with_recovery(|| {
            scene.tick(time);
            Ok::<_, Infallible>(())
        });
        if let Err(err) = stepped {
            self.fail(err);
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.screen = area;

        if self.failure.is_none() {
            let view = SceneView::new(&self.scene).pointer(self.pointer, self.effects.cursor());
            let drawn = run_with_recovery(|| {
                frame.render_widget(view, area);
                Ok::<_, Infallible>(())
            });
            if let Err(err) = drawn {
                self.fail(err);
            }
        }
        if let Some(error) = &self.failure {
            frame.render_widget(ErrorScreen { error }, area);
            return;
        }

        if !self.overlay.started() {
            frame.render_widget(
                IntroScreen {
                    text: &self.config.overlay,
                },
                area,
            );
            return;
        }

        let recording = self.recording_since.map(|since| {
            self.recorder
                .duration()
                .saturating_sub(since.elapsed())
                .as_secs_f32()
        });
        frame.render_widget(
            Hud {
                text: &self.config.overlay,
                muted: self.overlay.muted(),
                show_help: self.overlay.show_help(),
                recording,
            },
            area,
        );

        if let Some(memory) = self.scene.selected_memory() {
            let (_, width, height) = modal_image_area(area);
            let image = self.images.fitted(&memory.image, width, height);
            frame.render_widget(MemoryModal { memory, image }, area);
        }
    }

    fn fail(&mut self, err: RenderError) {
        log::error!("switching to error screen: {err}");
        self.effects.set_cursor(Default::default());
        self.failure = Some(err);
    }

    /// Feed the finished frame to a running capture.
    fn capture(&mut self, buffer: &Buffer) {
        let Some(since) = self.recording_since else {
            return;
        };
        self.recorder.capture(buffer, since.elapsed());
        if !self.recorder.is_recording() {
            self.recording_since = None;
        }
    }

    fn start_recording(&mut self) {
        match self
            .recorder
            .start(self.screen.width, self.screen.height, Local::now())
        {
            Ok(_) => self.recording_since = Some(Instant::now()),
            Err(err) => log::warn!("could not start recording: {err}"),
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits up to `timeout` for the first event, then drains the rest.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        let mut wait = timeout;
        while event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(_, _) => {}
                _ => {}
            }
            wait = Duration::ZERO;
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C'))
            | (_, KeyCode::Char('q')) => self.quit(),
            _ if self.failure.is_some() => {
                if key.code == KeyCode::Esc {
                    self.quit();
                }
            }
            _ if !self.overlay.started() => self.enter(),
            (_, KeyCode::Esc) => {
                if !self.scene.close_memory() {
                    self.quit();
                }
            }
            (_, KeyCode::Char('x')) => {
                self.scene.close_memory();
            }
            (_, KeyCode::Char('s')) => self.overlay.toggle_sound(&mut self.effects),
            (_, KeyCode::Char('r')) => self.start_recording(),
            (_, KeyCode::Char('?')) => self.overlay.toggle_help(),
            (_, KeyCode::Left) => self.scene.orbit_drag(-KEY_ORBIT_STEP, 0.0),
            (_, KeyCode::Right) => self.scene.orbit_drag(KEY_ORBIT_STEP, 0.0),
            (_, KeyCode::Up) => self.scene.orbit_drag(0.0, -KEY_ORBIT_STEP),
            (_, KeyCode::Down) => self.scene.orbit_drag(0.0, KEY_ORBIT_STEP),
            (_, KeyCode::Char('+') | KeyCode::Char('=')) => self.scene.zoom(1.0),
            (_, KeyCode::Char('-')) => self.scene.zoom(-1.0),
            _ => {}
        }
    }

    /// Handles mouse input: hover, click, drag to orbit, scroll to zoom.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        let cell = (mouse.column, mouse.row);
        self.pointer = Some(cell);
        if self.failure.is_some() {
            return;
        }

        match mouse.kind {
            MouseEventKind::Moved => self.hover(cell),
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.overlay.started() {
                    self.enter();
                } else if self.scene.selected_memory().is_some() {
                    self.scene.close_memory();
                } else if sound_label_area(self.screen, self.overlay.muted())
                    .contains(cell.into())
                {
                    self.overlay.toggle_sound(&mut self.effects);
                } else {
                    self.press = Some((cell, false));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((from, moved)) = &mut self.press {
                    let dx = (cell.0 as f32 - from.0 as f32) / self.screen.width.max(1) as f32;
                    let dy = (cell.1 as f32 - from.1 as f32) / self.screen.height.max(1) as f32;
                    if dx != 0.0 || dy != 0.0 {
                        self.scene.orbit_drag(dx, dy);
                        *from = cell;
                        *moved = true;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((_, false)) = self.press.take() {
                    self.click(cell);
                }
            }
            MouseEventKind::ScrollUp => self.scene.zoom(1.0),
            MouseEventKind::ScrollDown => self.scene.zoom(-1.0),
            _ => {}
        }
    }

    fn pick(&self, (column, row): (u16, u16)) -> Option<usize> {
        let ndc = cell_to_ndc(self.screen, column, row)?;
        let tolerance = PICK_TOLERANCE_CELLS * 2.0 / self.screen.height.max(1) as f32;
        self.scene.pick(ndc, aspect(self.screen), tolerance)
    }

    fn hover(&mut self, cell: (u16, u16)) {
        let hit = if self.overlay.started() && self.scene.selected_memory().is_none() {
            self.pick(cell)
        } else {
            None
        };
        self.scene.pointer_move(hit, &mut self.effects);
    }

    fn click(&mut self, cell: (u16, u16)) {
        let hit = self.pick(cell);
        if self.scene.click(hit) == Propagation::Stop {
            // The modal takes the pointer.
            self.scene.pointer_move(None, &mut self.effects);
        }
    }

    fn enter(&mut self) {
        if self.overlay.enter(&mut self.effects) {
            log::info!("entered the galaxy");
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

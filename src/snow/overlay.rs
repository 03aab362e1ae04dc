use crate::snow::atlas::SpriteAtlas;
use crate::snow::debounce::Debounce;
use crate::snow::field::{particle_count, ParticleField};
use crate::snow::layers::LayerTable;
use crate::snow::surface::{PixelSurface, Viewport};
use crate::snow::{motion, paint};
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub struct SnowConfig {
    pub base_count: usize,
    /// Upper bound on the device density used for the backing store.
    pub max_device_scale: f32,
    pub resize_debounce: Duration,
    pub sprite_radius: u32,
    pub seed: Option<u64>,
    pub layers: LayerTable,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            base_count: 5000,
            max_device_scale: 2.0,
            resize_debounce: Duration::from_millis(150),
            sprite_radius: 10,
            seed: None,
            layers: LayerTable::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayStats {
    pub flakes: usize,
    pub frames: u64,
    pub regenerations: u64,
    pub device_scale: f32,
    pub logical_width: f32,
    pub logical_height: f32,
}

struct Engine {
    surface: PixelSurface,
    atlas: SpriteAtlas,
    field: ParticleField,
    cfg: SnowConfig,
    rng: fastrand::Rng,
    state: RunState,
    /// Id of the single outstanding frame request.
    pending_frame: Option<u64>,
    next_request: u64,
    resize: Debounce<Viewport>,
    frames: u64,
    regenerations: u64,
}

/// Falling-snow animation bound to one drawing surface.
///
/// The host calls [`SnowOverlay::tick`] once per display refresh. Built without
/// a surface, or if the sprite atlas cannot be rasterized, the overlay is inert
/// and every call is a no-op.
pub struct SnowOverlay {
    engine: Option<Engine>,
}

impl SnowOverlay {
    pub fn new(surface: Option<PixelSurface>, viewport: Viewport, cfg: SnowConfig) -> Self {
        let Some(mut surface) = surface else {
            log::warn!("no drawing surface; snow overlay stays inert");
            return Self { engine: None };
        };

        let atlas = match SpriteAtlas::build(&cfg.layers.opacities(), cfg.sprite_radius) {
            Ok(atlas) => atlas,
            Err(err) => {
                log::warn!("sprite atlas unavailable ({err}); snow overlay stays inert");
                return Self { engine: None };
            }
        };

        let rng = match cfg.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        surface.resize(viewport, cfg.max_device_scale);
        let mut engine = Engine {
            surface,
            atlas,
            field: ParticleField::new(),
            resize: Debounce::new(cfg.resize_debounce),
            cfg,
            rng,
            state: RunState::Stopped,
            pending_frame: None,
            next_request: 0,
            frames: 0,
            regenerations: 0,
        };
        engine.regenerate(viewport);
        Self {
            engine: Some(engine),
        }
    }

    pub fn is_inert(&self) -> bool {
        self.engine.is_none()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.engine
            .as_ref()
            .map(|e| e.state)
            .unwrap_or(RunState::Stopped)
    }

    /// True while a frame request is outstanding.
    pub fn frame_pending(&self) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|e| e.pending_frame.is_some())
    }

    pub fn start(&mut self) {
        let Some(e) = self.engine.as_mut() else {
            return;
        };
        if e.state == RunState::Running {
            return;
        }
        e.state = RunState::Running;
        e.surface.set_active(true);
        e.request_frame();
        log::debug!("snow started ({} flakes)", e.field.len());
    }

    pub fn stop(&mut self) {
        let Some(e) = self.engine.as_mut() else {
            return;
        };
        if e.state == RunState::Stopped {
            return;
        }
        e.state = RunState::Stopped;
        e.surface.set_active(false);
        e.pending_frame = None;
        e.surface.clear();
        log::debug!("snow stopped after {} frames", e.frames);
    }

    pub fn notify_resize(&mut self, now: Instant, viewport: Viewport) {
        if let Some(e) = self.engine.as_mut() {
            e.resize.push(now, viewport);
        }
    }

    /// Apply a resize whose debounce window has elapsed. Returns whether the
    /// field was rebuilt.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        let Some(e) = self.engine.as_mut() else {
            return false;
        };
        let Some(viewport) = e.resize.poll(now) else {
            return false;
        };
        e.surface.resize(viewport, e.cfg.max_device_scale);
        e.regenerate(viewport);
        log::debug!(
            "resized to {:.0}x{:.0} @{:.2}x",
            e.surface.logical_width(),
            e.surface.logical_height(),
            e.surface.scale()
        );
        true
    }

    /// Body of the scheduled frame callback. Runs one simulate-then-render
    /// pass if a frame is pending and the overlay is running, then asks for
    /// the next frame. Returns whether a frame was drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.poll_resize(now);
        let Some(e) = self.engine.as_mut() else {
            return false;
        };
        let Some(request) = e.pending_frame.take() else {
            return false;
        };
        if e.state != RunState::Running {
            return false;
        }
        log::trace!("frame request {request}");

        let width = e.surface.logical_width();
        let height = e.surface.logical_height();
        motion::step(&mut e.field, width, height, &mut e.rng);
        paint::render(&mut e.surface, &e.field, &e.atlas);
        e.frames += 1;

        if e.state == RunState::Running {
            e.request_frame();
        }
        true
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.engine.as_ref().map(|e| &e.field)
    }

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.engine.as_ref().map(|e| &e.surface)
    }

    pub fn atlas(&self) -> Option<&SpriteAtlas> {
        self.engine.as_ref().map(|e| &e.atlas)
    }

    pub fn stats(&self) -> OverlayStats {
        let Some(e) = self.engine.as_ref() else {
            return OverlayStats::default();
        };
        OverlayStats {
            flakes: e.field.len(),
            frames: e.frames,
            regenerations: e.regenerations,
            device_scale: e.surface.scale(),
            logical_width: e.surface.logical_width(),
            logical_height: e.surface.logical_height(),
        }
    }
}

impl Engine {
    fn request_frame(&mut self) {
        self.next_request = self.next_request.wrapping_add(1);
        self.pending_frame = Some(self.next_request);
    }

    /// Population follows the layout rect; positions cover the surface the
    /// flakes are drawn on.
    fn regenerate(&mut self, viewport: Viewport) {
        let count = particle_count(self.cfg.base_count, viewport.width, viewport.height);
        self.field = ParticleField::populate(
            count,
            self.surface.logical_width(),
            self.surface.logical_height(),
            &self.cfg.layers,
            &mut self.rng,
        );
        self.regenerations += 1;
    }
}

use crate::config::{Config, RendererMode};
use crate::prefs::{AppPrefs, PrefsStore};
use crate::render::{compose_over, AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::snow::{OverlayStats, PixelSurface, SnowOverlay, Viewport};
use crate::terminal::{TermMetrics, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    ToggleSnow,
    ToggleHud,
    ToggleHelp,
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = cfg.renderer.cell_pixels();
    let cell = (cfg.cell_width, cfg.cell_height);

    let store = PrefsStore::locate(cfg.prefs_file.clone());
    let mut prefs = store.load().unwrap_or_else(|err| {
        log::warn!("ignoring unreadable prefs: {err}");
        AppPrefs::default()
    });
    if let Some(on) = cfg.snow {
        prefs.snow_enabled = on;
    }

    let mut metrics = TermMetrics::query()?;
    if metrics.rows < 2 || metrics.cols < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            metrics.cols,
            metrics.rows
        ));
    }

    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(metrics.rows, prefs.show_hud);

    let mut overlay = SnowOverlay::new(
        Some(PixelSurface::new()),
        layout_viewport(metrics, hud_rows, cell, cfg.device_scale),
        cfg.snow_config(),
    );
    if prefs.snow_enabled {
        overlay.start();
    }

    let mut fps = FpsCounter::new();
    let mut grid = Vec::new();
    let budget = cfg.frame_budget();

    loop {
        let now = Instant::now();
        let mut relayout = false;

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match key_action(k.code, k.modifiers) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::ToggleSnow => {
                            toggle_snow(&mut overlay, &mut prefs, &store);
                        }
                        KeyAction::ToggleHud => {
                            prefs.show_hud = !prefs.show_hud;
                            persist(&store, &prefs);
                            relayout = true;
                        }
                        KeyAction::ToggleHelp => show_help = !show_help,
                        KeyAction::None => {}
                    }
                }
                Event::Resize(c, r) => {
                    metrics = TermMetrics::query().unwrap_or(TermMetrics {
                        cols: c,
                        rows: r,
                        pixel_size: None,
                    });
                    relayout = true;
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let (c, r) = crossterm::terminal::size()?;
        if (c, r) != (metrics.cols, metrics.rows) {
            metrics = TermMetrics::query()?;
            relayout = true;
        }

        let stats = overlay.stats();
        let hud = if prefs.show_hud {
            build_hud(
                metrics.cols as usize,
                &stats,
                overlay.is_running(),
                overlay.is_inert(),
                fps.fps(),
                renderer.name(),
            )
        } else {
            String::new()
        };
        let target_hud_rows = hud_rows_for_text(metrics.rows, prefs.show_hud, &hud);
        if target_hud_rows != hud_rows {
            hud_rows = target_hud_rows;
            relayout = true;
        }
        if relayout {
            overlay.notify_resize(now, layout_viewport(metrics, hud_rows, cell, cfg.device_scale));
        }

        overlay.tick(now);

        let visual_rows = metrics.rows.saturating_sub(hud_rows).max(1);
        let w = (metrics.cols as usize).saturating_mul(px_w_mul);
        let h = (visual_rows as usize).saturating_mul(px_h_mul);
        match overlay.surface() {
            Some(s) => compose_over(s.pixels(), s.width(), s.height(), w, h, cfg.background, &mut grid),
            None => compose_over(&[], 0, 0, w, h, cfg.background, &mut grid),
        }

        let frame = Frame {
            term_cols: metrics.cols,
            term_rows: metrics.rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: &grid,
            hud: &hud,
            hud_rows,
            overlay: show_help.then_some(help_popup_text()),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing stands in for the display refresh.
        let elapsed = now.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }
}

/// Logical-pixel layout rect of the snow area. Uses the terminal's reported
/// pixel size when there is one, otherwise `cell` logical pixels per cell.
/// HUD rows are not part of the area.
pub fn layout_viewport(metrics: TermMetrics, hud_rows: u16, cell: (f32, f32), device_scale: f32) -> Viewport {
    let visual_rows = metrics.rows.saturating_sub(hud_rows).max(1);
    let (w, h) = match metrics.pixel_size {
        Some((pw, ph)) if metrics.rows > 0 => (
            pw as f32,
            ph as f32 * visual_rows as f32 / metrics.rows as f32,
        ),
        _ => (
            metrics.cols as f32 * cell.0,
            visual_rows as f32 * cell.1,
        ),
    };
    Viewport::new(w, h, device_scale)
}

pub fn key_action(code: KeyCode, mods: KeyModifiers) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char(' ') => KeyAction::ToggleSnow,
        KeyCode::Char('i') | KeyCode::Char('I') => KeyAction::ToggleHud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            KeyAction::ToggleHelp
        }
        _ => KeyAction::None,
    }
}

/// Flip the stored preference and drive the overlay from it.
pub fn toggle_snow(overlay: &mut SnowOverlay, prefs: &mut AppPrefs, store: &PrefsStore) {
    prefs.snow_enabled = !prefs.snow_enabled;
    if prefs.snow_enabled {
        overlay.start();
    } else {
        overlay.stop();
    }
    persist(store, prefs);
}

fn persist(store: &PrefsStore, prefs: &AppPrefs) {
    if let Err(err) = store.save(prefs) {
        log::warn!("could not save prefs: {err}");
    }
}

fn hud_rows_for_size(rows: u16, show_hud: bool) -> u16 {
    if !show_hud || rows <= 1 {
        return 0;
    }
    (rows - 1).min(2)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let wanted = hud.lines().count() as u16;
    wanted.min(term_rows.saturating_sub(1))
}

pub fn build_hud(
    cols: usize,
    stats: &OverlayStats,
    running: bool,
    inert: bool,
    fps: f32,
    renderer_name: &str,
) -> String {
    let state = match (inert, running) {
        (true, _) => "unavailable",
        (false, true) => "on",
        (false, false) => "off",
    };
    let lines = [
        format!(
            "Snow: {} | Flakes: {} | Area: {:.0}x{:.0} @{:.2}x | FPS: {:>4.1} | Renderer: {}",
            state,
            stats.flakes,
            stats.logical_width,
            stats.logical_height,
            stats.device_scale,
            fps,
            renderer_name
        ),
        "Keys: s/space snow on/off | i HUD | ?/h help | q quit".to_string(),
    ];
    lines
        .iter()
        .flat_map(|l| hard_wrap_line(l, cols.max(1)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    line.chars()
        .collect::<Vec<_>>()
        .chunks(width)
        .map(|c| c.iter().collect())
        .collect()
}

fn help_popup_text() -> &'static str {
    "Snowfall\n\
s / space  start or stop the snow (remembered)\n\
i  show/hide HUD\n\
? / h / F1  toggle this help\n\
q / esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

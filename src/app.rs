use crate::audio::AudioMonitor;
use crate::bolt::BoltPool;
use crate::canvas::{self, Pixmap, BLACK, WHITE};
use crate::config::{Config, RendererMode};
use crate::geometry::Point;
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, KittyRenderer, Renderer};
use crate::scene::{self, SceneSet};
use crate::strobe::{StrobeTick, ThunderTransition};
use crate::terminal::TerminalGuard;
use anyhow::{bail, Context};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tracing::info;

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = renderer.cell_pixels();

    let dirs = scene::scan_scene_dirs(&cfg.images)?;
    if dirs.is_empty() {
        bail!("no scene directories found in {}", cfg.images.display());
    }

    // Audio comes up before any expensive precompute so a missing input
    // device fails fast.
    let audio = AudioMonitor::start(cfg.device.as_deref())
        .context("start audio capture (an input device is required)")?;
    info!("audio capture running at {} Hz", audio.sample_rate_hz);
    let level_cell = audio.level_cell();

    let (term_cols, term_rows) = crossterm::terminal::size().context("get terminal size")?;
    if term_cols < 4 || term_rows < 2 {
        bail!(
            "terminal too small (need at least 4x2, got {}x{})",
            term_cols,
            term_rows
        );
    }
    let hud_rows: u16 = 1;
    let base_cols = term_cols as usize;
    let base_rows = (term_rows - hud_rows) as usize;
    let width = base_cols * px_w_mul;
    let height = base_rows * px_h_mul;

    // All precompute happens up front: pool and rotation caches are the two
    // places that can exhaust memory, and they must do so before the loop.
    info!("precomputing {} bolts", cfg.bolts);
    let pool = BoltPool::precompute(
        cfg.bolts,
        Point::new(width as f32 / 2.0, 0.0),
        cfg.branches,
        cfg.max_depth,
    );

    let scenes = scene::load_scenes(&dirs, (width, height));
    info!("{} of {} scenes loaded", scenes.len(), dirs.len());
    let mut set = SceneSet::new(scenes)?;

    let term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    set.switch_to(0);

    let mut canvas = Pixmap::new(width, height);
    let mut transition: ThunderTransition<usize> =
        ThunderTransition::new(Duration::from_millis(cfg.strike_ms));
    let scene_period = Duration::from_secs_f32(cfg.seconds_per_scene.max(0.1));
    let mut sensitivity = cfg.sensitivity;

    let start = Instant::now();
    let mut last_change = start;
    let mut fps = FpsCounter::new();

    'outer: loop {
        let now = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Release {
                    continue;
                }
                match k.code {
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break 'outer,
                    KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                        break 'outer;
                    }
                    KeyCode::Char('n') | KeyCode::Right => {
                        if !transition.is_active() {
                            transition.begin(now, set.next_index());
                        }
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        sensitivity = (sensitivity + 0.1).min(8.0);
                    }
                    KeyCode::Char('-') => {
                        sensitivity = (sensitivity - 0.1).max(0.1);
                    }
                    _ => {}
                }
            }
        }

        let level = level_cell.load();
        let is_loud = level > cfg.loud_threshold * sensitivity;

        {
            let scene = set.current_mut();
            // Both modulation paths run each tick; the coarse one writes
            // last, so it wins within the frame.
            scene.particles.apply_audio_level(level);
            scene.particles.apply_loudness(is_loud);
            scene.backdrop.pause_if_loud(now, is_loud);

            canvas.fill(BLACK);
            let cx = (width / 2) as i32;
            let cy = (height / 2) as i32;
            let bg = scene.backdrop.next_frame(now);
            canvas.blit_centered(bg, cx, cy);
            let center = scene
                .center
                .scaled(now.duration_since(start).as_secs_f32(), level);
            canvas.blit_centered(&center, cx, cy);
            scene.particles.draw(&mut canvas);
        }

        if !transition.is_active() && now.duration_since(last_change) >= scene_period {
            transition.begin(now, set.next_index());
        }
        if transition.is_active() {
            match transition.tick(now) {
                StrobeTick::Flash => {
                    // An empty pool means nothing to draw this frame.
                    if let Some(bolt) = pool.get_random() {
                        bolt.draw(&mut canvas, WHITE);
                    }
                }
                StrobeTick::Blank => canvas.fill(WHITE),
                StrobeTick::Advance => {
                    let next = transition.take().unwrap_or_else(|| set.next_index());
                    set.switch_to(next);
                    last_change = now;
                }
                StrobeTick::Inactive => {}
            }
        }

        fps.tick();
        let hud = format!(
            "Scene: {} | Level: {:>6.2} | {} | Sens: {:.1} | FPS: {:>4.1} | n next, +/- sens, q quit",
            set.current().name,
            level,
            if is_loud { "LOUD" } else { "quiet" },
            sensitivity,
            fps.fps(),
        );

        // Resize degrades gracefully: the composed frame is rescaled to the
        // live cell grid, no caches are rebuilt.
        let (cur_cols, cur_rows) = crossterm::terminal::size()?;
        let cur_visual = cur_rows.saturating_sub(hud_rows).max(1);
        let (out_w, out_h) = (
            cur_cols as usize * px_w_mul,
            cur_visual as usize * px_h_mul,
        );
        let rescaled;
        let pixels = if (out_w, out_h) == (width, height) {
            canvas.data()
        } else {
            rescaled = canvas::resize(&canvas, out_w, out_h);
            rescaled.data()
        };

        let frame = Frame {
            term_cols: cur_cols,
            term_rows: cur_rows,
            visual_rows: cur_visual,
            pixel_width: out_w,
            pixel_height: out_h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;

        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }

    // Background contexts stop before the rendering surface is released.
    set.stop_all();
    drop(audio);
    drop(out);
    drop(term);
    Ok(())
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
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

use crate::backdrop::{CenterPiece, RotatingBackdrop, DEFAULT_STEP};
use crate::canvas::Pixmap;
use crate::particles::{ParticleField, ParticlesConfig};
use anyhow::{bail, Context};
use std::collections::VecDeque;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use tracing::{info, warn};

/// One directory's worth of content: rotating background, breathing center
/// image, and a particle field configured by the directory's JSON.
pub struct Scene {
    pub name: String,
    pub backdrop: RotatingBackdrop,
    pub center: CenterPiece,
    pub particles: ParticleField,
}

/// Sub-directories of `root`, sorted by name for a stable slideshow order.
pub fn scan_scene_dirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("read scene root {}", root.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn load_pixmap(path: &Path) -> anyhow::Result<Pixmap> {
    let img = image::open(path)
        .with_context(|| format!("load image {}", path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Ok(Pixmap::from_rgba(w as usize, h as usize, img.into_raw()))
}

/// Build one scene. Any missing or malformed asset fails this scene only;
/// the caller decides whether that is fatal.
pub fn load_scene(dir: &Path, bounds: (usize, usize)) -> anyhow::Result<Scene> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    info!("loading scene {name}");

    let background = load_pixmap(&dir.join("background.png"))?;
    let center = load_pixmap(&dir.join("center.png"))?;

    let config_path = dir.join("particles_config.json");
    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("read {}", config_path.display()))?;
    let config: ParticlesConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parse {}", config_path.display()))?;

    let sprite = match config.particle_properties.first().and_then(|p| p.src.as_ref()) {
        Some(src) => Some(load_pixmap(&dir.join(src))?),
        None => None,
    };

    let backdrop = RotatingBackdrop::build(&background, bounds, DEFAULT_STEP);
    let particles = ParticleField::spawn(
        &config,
        sprite,
        (bounds.0 as f32, bounds.1 as f32),
    )?;

    Ok(Scene {
        name,
        backdrop,
        center: CenterPiece::new(center),
        particles,
    })
}

/// Load every directory on a bounded worker pool. Results arrive in
/// completion order, not submission order; failed scenes are logged and
/// skipped so one bad directory never takes the show down.
pub fn load_scenes(dirs: &[PathBuf], bounds: (usize, usize)) -> Vec<Scene> {
    if dirs.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(dirs.len());

    let queue: Mutex<VecDeque<PathBuf>> = Mutex::new(dirs.iter().cloned().collect());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || loop {
                let next = queue
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .pop_front();
                let Some(dir) = next else {
                    break;
                };
                match load_scene(&dir, bounds) {
                    Ok(scene) => {
                        let _ = tx.send(scene);
                    }
                    Err(err) => warn!("skipping scene {}: {err:#}", dir.display()),
                }
            });
        }
        drop(tx);
        rx.into_iter().collect()
    })
}

/// The loaded scenes plus the index of the one on screen.
pub struct SceneSet {
    scenes: Vec<Scene>,
    current: usize,
}

impl SceneSet {
    pub fn new(scenes: Vec<Scene>) -> anyhow::Result<Self> {
        if scenes.is_empty() {
            bail!("no scene could be loaded");
        }
        Ok(Self { scenes, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_index(&self) -> usize {
        (self.current + 1) % self.scenes.len()
    }

    pub fn current(&self) -> &Scene {
        &self.scenes[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Scene {
        &mut self.scenes[self.current]
    }

    /// Switch to `index`, stopping the outgoing scene's particle worker and
    /// starting the incoming one.
    pub fn switch_to(&mut self, index: usize) {
        let index = index % self.scenes.len();
        if index != self.current {
            self.scenes[self.current].particles.stop();
            self.current = index;
        }
        self.scenes[self.current].particles.start();
    }

    pub fn stop_all(&mut self) {
        for scene in &mut self.scenes {
            scene.particles.stop();
        }
    }
}

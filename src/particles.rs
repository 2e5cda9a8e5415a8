use crate::canvas::{self, Pixmap, Rgb};
use crate::geometry;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Physics tick interval for the background worker (50 Hz, independent of
/// the render rate).
const WORKER_INTERVAL: Duration = Duration::from_millis(20);

/// One entry of `particle_properties` in a scene's `particles_config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParticleProfile {
    pub color: ColorSpec,
    pub size_min: f32,
    pub size_max: f32,
    pub velocity_range: [f32; 2],
    #[serde(default)]
    pub src: Option<PathBuf>,
}

/// Either a fixed `[r, g, b]` triple or the string `"random"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Fixed([u8; 3]),
    Mode(String),
}

impl ColorSpec {
    pub fn resolve(&self) -> anyhow::Result<Rgb> {
        match self {
            Self::Fixed([r, g, b]) => Ok(Rgb(*r, *g, *b)),
            Self::Mode(mode) if mode == "random" => {
                Ok(Rgb(fastrand::u8(..), fastrand::u8(..), fastrand::u8(..)))
            }
            Self::Mode(other) => bail!("unknown particle color mode: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticlesConfig {
    pub total_particles: usize,
    pub particle_properties: Vec<ParticleProfile>,
}

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub velocity: f32,
    pub angle: f32,
    pub base_size: f32,
    pub size: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub color: Rgb,
}

impl Particle {
    pub fn spawn(profile: &ParticleProfile, bounds: (f32, f32)) -> anyhow::Result<Self> {
        let pos = geometry::point_in(bounds.0, bounds.1);
        Ok(Self {
            x: pos.x,
            y: pos.y,
            velocity: geometry::range(profile.velocity_range[0], profile.velocity_range[1]),
            angle: geometry::full_angle(),
            base_size: geometry::range(profile.size_min, profile.size_max),
            size: geometry::range(profile.size_min, profile.size_max),
            size_min: profile.size_min,
            size_max: profile.size_max,
            color: profile.color.resolve()?,
        })
    }

    /// One physics step. The edge reflections are deliberately approximate,
    /// not mirror-exact: x-crossings map the angle to `pi - angle`,
    /// y-crossings to `-angle`.
    pub fn step(&mut self, bounds: (f32, f32)) {
        self.x += self.angle.cos() * self.velocity;
        self.y += self.angle.sin() * self.velocity;
        if self.x < 0.0 || self.x > bounds.0 {
            self.angle = PI - self.angle;
        }
        if self.y < 0.0 || self.y > bounds.1 {
            self.angle = -self.angle;
        }
    }

    /// Continuous modulation: size follows the loudness scalar around the
    /// particle's base size, clamped to its configured range.
    pub fn apply_audio_level(&mut self, level: f32) {
        let next = self.base_size + (level - 0.5) * 10.0;
        self.size = next.clamp(self.size_min, self.size_max);
    }

    /// Coarse modulation: grow toward size_max while loud, shrink toward
    /// size_min otherwise, one unit per tick. Runs alongside
    /// `apply_audio_level`; whichever writes last in a tick wins.
    pub fn apply_loudness(&mut self, is_loud: bool) {
        if is_loud {
            self.size = (self.size + 1.0).min(self.size_max);
        } else {
            self.size = (self.size - 1.0).max(self.size_min);
        }
    }
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// The particles of one scene plus their optional background physics
/// worker. Shared state is a single mutex; the worker mutates positions,
/// the render thread reads them for drawing and writes sizes through the
/// two modulation paths.
pub struct ParticleField {
    particles: Arc<Mutex<Vec<Particle>>>,
    bounds: (f32, f32),
    sprite: Option<Pixmap>,
    worker: Option<Worker>,
}

// Particle state stays usable even if a worker panicked mid-tick.
fn lock_particles(particles: &Mutex<Vec<Particle>>) -> MutexGuard<'_, Vec<Particle>> {
    particles.lock().unwrap_or_else(|e| e.into_inner())
}

impl ParticleField {
    pub fn spawn(
        config: &ParticlesConfig,
        sprite: Option<Pixmap>,
        bounds: (f32, f32),
    ) -> anyhow::Result<Self> {
        let profile = config
            .particle_properties
            .first()
            .context("particle_properties is empty")?;
        if profile.size_min > profile.size_max {
            bail!(
                "size_min {} exceeds size_max {}",
                profile.size_min,
                profile.size_max
            );
        }

        let mut particles = Vec::with_capacity(config.total_particles);
        for _ in 0..config.total_particles {
            particles.push(Particle::spawn(profile, bounds)?);
        }

        Ok(Self {
            particles: Arc::new(Mutex::new(particles)),
            bounds,
            sprite,
            worker: None,
        })
    }

    pub fn len(&self) -> usize {
        lock_particles(&self.particles).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Copy of the current particle state, for callers that must not hold
    /// the lock (and for tests).
    pub fn snapshot(&self) -> Vec<Particle> {
        lock_particles(&self.particles).clone()
    }

    /// Advance every particle one step on the calling thread.
    pub fn step_all(&self) {
        let mut particles = lock_particles(&self.particles);
        for p in particles.iter_mut() {
            p.step(self.bounds);
        }
    }

    pub fn apply_audio_level(&self, level: f32) {
        let mut particles = lock_particles(&self.particles);
        for p in particles.iter_mut() {
            p.apply_audio_level(level);
        }
    }

    pub fn apply_loudness(&self, is_loud: bool) {
        let mut particles = lock_particles(&self.particles);
        for p in particles.iter_mut() {
            p.apply_loudness(is_loud);
        }
    }

    /// Start the 50 Hz physics worker. Calling while it is already running
    /// is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let particles = Arc::clone(&self.particles);
        let bounds = self.bounds;

        let handle = thread::spawn(move || {
            while !stop_for_thread.load(Ordering::Relaxed) {
                thread::sleep(WORKER_INTERVAL);
                let mut particles = lock_particles(&particles);
                for p in particles.iter_mut() {
                    p.step(bounds);
                }
            }
        });

        self.worker = Some(Worker { stop, handle });
    }

    /// Stop and join the worker. Safe to call when it is not running; the
    /// field can be restarted afterwards.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Relaxed);
            let _ = worker.handle.join();
        }
    }

    pub fn draw(&self, canvas: &mut Pixmap) {
        let particles = lock_particles(&self.particles);
        match &self.sprite {
            Some(sprite) => {
                for p in particles.iter() {
                    let side = (p.size.max(1.0)) as usize;
                    let scaled = canvas::resize(sprite, side, side);
                    canvas.blit(&scaled, p.x as i32, p.y as i32);
                }
            }
            None => {
                for p in particles.iter() {
                    canvas.circle(p.x, p.y, p.size, p.color);
                }
            }
        }
    }
}

impl Drop for ParticleField {
    fn drop(&mut self) {
        self.stop();
    }
}

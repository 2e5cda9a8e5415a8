use crate::canvas::{self, Pixmap};
use std::f32::consts::PI;
use std::time::{Duration, Instant};
use tracing::debug;

/// Degrees of source rotation between cached frames.
pub const DEFAULT_STEP: u32 = 2;
/// Degrees the visible rotation advances per served frame.
pub const DEFAULT_ROTATION_SPEED: u32 = 3;
/// How long a loud sample freezes the rotation.
pub const DEFAULT_PAUSE_WINDOW: Duration = Duration::from_millis(200);

/// Pre-rotated, screen-fit frames for one scene's background. The full
/// 360-degree ring is rendered once at load time; serving a frame is an
/// index lookup, never a rotation.
pub struct RotatingBackdrop {
    frames: Vec<Pixmap>,
    step: u32,
    rotation_speed: u32,
    angle_index: u32,
    pause_window: Duration,
    paused_at: Option<Instant>,
}

impl RotatingBackdrop {
    pub fn build(source: &Pixmap, bounds: (usize, usize), step: u32) -> Self {
        Self::build_with(source, bounds, step, DEFAULT_ROTATION_SPEED, DEFAULT_PAUSE_WINDOW)
    }

    pub fn build_with(
        source: &Pixmap,
        bounds: (usize, usize),
        step: u32,
        rotation_speed: u32,
        pause_window: Duration,
    ) -> Self {
        let step = step.clamp(1, 360);
        let mut frames = Vec::with_capacity((360 / step) as usize);
        for angle in (0..360).step_by(step as usize) {
            let rotated = canvas::rotate_expand(source, angle as f32);
            frames.push(canvas::scale_to_fit(&rotated, bounds.0, bounds.1));
            debug!("cached backdrop frame at {angle} degrees");
        }

        Self {
            frames,
            step,
            rotation_speed,
            angle_index: 0,
            pause_window,
            paused_at: None,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn angle_index(&self) -> u32 {
        self.angle_index
    }

    /// A loud sample stamps `now` as the pause start. Repeated loud samples
    /// re-arm the window from scratch; they never extend it cumulatively.
    pub fn pause_if_loud(&mut self, now: Instant, is_loud: bool) {
        if is_loud {
            self.paused_at = Some(now);
        }
    }

    /// Serve the frame for the current angle, then advance the angle by
    /// `rotation_speed` unless a pause window is still open. The served
    /// index depends only on the angle, never on wall-clock time.
    pub fn next_frame(&mut self, now: Instant) -> &Pixmap {
        let index = (self.angle_index / self.step) as usize % self.frames.len();

        let frozen = self
            .paused_at
            .is_some_and(|t| now.duration_since(t) < self.pause_window);
        if !frozen {
            self.paused_at = None;
            self.angle_index = (self.angle_index + self.rotation_speed) % 360;
        }

        &self.frames[index]
    }
}

/// The scene's center image: a slow sine "breath" between 90% and 110%
/// scale, swelled further by the loudness scalar.
pub struct CenterPiece {
    image: Pixmap,
    base_scale: f32,
}

const BREATH_MIN: f32 = 0.9;
const BREATH_MAX: f32 = 1.1;
const BREATH_CYCLE_SECS: f32 = 2.0;

impl CenterPiece {
    pub fn new(image: Pixmap) -> Self {
        Self {
            image,
            base_scale: 0.3,
        }
    }

    pub fn scaled(&self, elapsed_secs: f32, level: f32) -> Pixmap {
        let breath = (BREATH_MAX - BREATH_MIN) / 2.0
            * (2.0 * PI * elapsed_secs / BREATH_CYCLE_SECS).sin()
            + (BREATH_MAX + BREATH_MIN) / 2.0;
        let swell = 1.0 + level / 10.0;
        let scale = self.base_scale * breath * swell;

        let w = ((self.image.width() as f32 * scale) as usize).max(1);
        let h = ((self.image.height() as f32 * scale) as usize).max(1);
        canvas::resize(&self.image, w, h)
    }
}

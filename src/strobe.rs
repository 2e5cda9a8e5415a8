use crate::canvas::{Pixmap, Rgb};
use crate::geometry::{self, Point};
use std::time::{Duration, Instant};

/// Strikes per transition. The triple flash is part of the effect's
/// identity, not a tunable.
pub const STRIKES_PER_TRANSITION: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrobePhase {
    Idle,
    Flashing,
    Blanked,
}

/// What the caller should do with the surface on this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrobeTick {
    Inactive,
    /// Draw a fresh lightning overlay (pool bolt or streak, per call site).
    Flash,
    /// Fill the surface white.
    Blank,
    /// Cycle complete: switch to the next scene.
    Advance,
}

/// Flash-pause-blank cycle played three times, then a one-shot advance.
/// Phase changes are driven purely by wall-clock elapsed time checked once
/// per tick, so pacing is independent of the caller's frame rate.
pub struct StrobeSequencer {
    phase: StrobePhase,
    strikes_done: u32,
    phase_start: Instant,
    strike_duration: Duration,
}

impl StrobeSequencer {
    pub fn new(strike_duration: Duration) -> Self {
        Self {
            phase: StrobePhase::Idle,
            strikes_done: 0,
            phase_start: Instant::now(),
            strike_duration,
        }
    }

    pub fn phase(&self) -> StrobePhase {
        self.phase
    }

    pub fn strikes_done(&self) -> u32 {
        self.strikes_done
    }

    pub fn is_active(&self) -> bool {
        self.phase != StrobePhase::Idle
    }

    pub fn arm(&mut self, now: Instant) {
        self.phase = StrobePhase::Flashing;
        self.strikes_done = 0;
        self.phase_start = now;
    }

    pub fn tick(&mut self, now: Instant) -> StrobeTick {
        let elapsed = now.duration_since(self.phase_start);
        match self.phase {
            StrobePhase::Idle => StrobeTick::Inactive,
            StrobePhase::Flashing => {
                if elapsed <= self.strike_duration {
                    StrobeTick::Flash
                } else {
                    self.phase = StrobePhase::Blanked;
                    self.phase_start = now;
                    StrobeTick::Blank
                }
            }
            StrobePhase::Blanked => {
                if elapsed <= self.strike_duration {
                    StrobeTick::Blank
                } else {
                    self.strikes_done += 1;
                    if self.strikes_done >= STRIKES_PER_TRANSITION {
                        self.phase = StrobePhase::Idle;
                        self.strikes_done = 0;
                        StrobeTick::Advance
                    } else {
                        self.phase = StrobePhase::Flashing;
                        self.phase_start = now;
                        StrobeTick::Flash
                    }
                }
            }
        }
    }
}

/// Scene-level variant: the same cycle, but `Advance` resolves to a payload
/// the caller parked when it began the transition (the next scene).
pub struct ThunderTransition<T> {
    seq: StrobeSequencer,
    payload: Option<T>,
}

impl<T> ThunderTransition<T> {
    pub fn new(strike_duration: Duration) -> Self {
        Self {
            seq: StrobeSequencer::new(strike_duration),
            payload: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.seq.is_active()
    }

    pub fn begin(&mut self, now: Instant, payload: T) {
        self.seq.arm(now);
        self.payload = Some(payload);
    }

    pub fn tick(&mut self, now: Instant) -> StrobeTick {
        self.seq.tick(now)
    }

    /// The parked payload; yields once, after `tick` returned `Advance`.
    pub fn take(&mut self) -> Option<T> {
        self.payload.take()
    }
}

/// The plain bright streak used where no precomputed bolt is wanted: a
/// random top-edge point to a random bottom-edge point, stroked white.
pub fn draw_streak(canvas: &mut Pixmap) {
    let w = canvas.width() as f32;
    let h = canvas.height() as f32;
    let top = Point::new(geometry::range(0.0, w), 0.0);
    let bottom = Point::new(geometry::range(0.0, w), h);
    canvas.line(top, bottom, Rgb(255, 255, 255), 2);
}

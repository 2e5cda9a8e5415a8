use crate::canvas::{Pixmap, Rgb};
use crate::geometry::{self, Point};
use tracing::info;

/// One line of a lightning strike. `weight` ranks trunk segments above deep
/// branches (branch_count at depth 0 down to branch_count - max_depth).
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub weight: i32,
}

/// A single strike: a tree of segments grown once at construction and never
/// mutated afterwards.
pub struct FractalBolt {
    origin: Point,
    segments: Vec<Segment>,
}

impl FractalBolt {
    /// Grow a bolt from `origin`. Every branch picks a random length in
    /// [100, 300] and an angle outside the near-horizontal dead zone, then
    /// sprouts up to three single-branch children while depth allows.
    /// `branch_count == 0` yields a valid, empty bolt.
    pub fn generate(origin: Point, branch_count: u32, max_depth: u32) -> Self {
        let mut segments = Vec::new();
        grow(&mut segments, origin, branch_count, branch_count, 0, max_depth);
        Self { origin, segments }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn draw(&self, canvas: &mut Pixmap, color: Rgb) {
        for seg in &self.segments {
            canvas.line(seg.start, seg.end, color, 2);
        }
    }
}

fn grow(
    segments: &mut Vec<Segment>,
    start: Point,
    branch_count: u32,
    top_branches: u32,
    depth: u32,
    max_depth: u32,
) {
    if depth > max_depth {
        return;
    }

    for _ in 0..branch_count {
        let end = start.project(geometry::bolt_angle(), geometry::bolt_length());
        segments.push(Segment {
            start,
            end,
            weight: top_branches as i32 - depth as i32,
        });

        let children = if depth < max_depth {
            fastrand::u32(0..=3)
        } else {
            0
        };
        for _ in 0..children {
            grow(segments, end, 1, top_branches, depth + 1, max_depth);
        }
    }
}

/// Fixed-size collection of strikes built before the render loop starts, so
/// a transition never pays generation cost mid-frame.
pub struct BoltPool {
    bolts: Vec<FractalBolt>,
}

impl BoltPool {
    pub fn precompute(count: usize, origin: Point, branch_count: u32, max_depth: u32) -> Self {
        let mut bolts = Vec::with_capacity(count);
        for i in 0..count {
            info!("generating bolt {} of {}", i + 1, count);
            bolts.push(FractalBolt::generate(origin, branch_count, max_depth));
        }
        Self { bolts }
    }

    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }

    /// Uniform random pool member; `None` on an empty pool means "no strike
    /// to draw this frame", not an error.
    pub fn get_random(&self) -> Option<&FractalBolt> {
        if self.bolts.is_empty() {
            return None;
        }
        Some(&self.bolts[fastrand::usize(0..self.bolts.len())])
    }
}

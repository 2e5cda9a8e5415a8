use std::f32::consts::PI;

/// Lightning segment lengths are drawn from this range (pixels).
pub const BOLT_LENGTH_MIN: f32 = 100.0;
pub const BOLT_LENGTH_MAX: f32 = 300.0;

/// Angles inside (-pi/4.5, pi/4.5) are never emitted: near-horizontal
/// segments make a bolt read as sideways drift instead of a strike.
pub const DEAD_ZONE: f32 = PI / 4.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Endpoint reached by walking `length` along `angle` from here.
    pub fn project(self, angle: f32, length: f32) -> Self {
        Self {
            x: self.x + angle.cos() * length,
            y: self.y + angle.sin() * length,
        }
    }
}

pub fn range(lo: f32, hi: f32) -> f32 {
    lo + fastrand::f32() * (hi - lo)
}

pub fn bolt_length() -> f32 {
    range(BOLT_LENGTH_MIN, BOLT_LENGTH_MAX)
}

/// Uniform over [-pi, -pi/4.5] U [pi/4.5, pi]: a coin flip picks the half,
/// then the angle is uniform within it.
pub fn bolt_angle() -> f32 {
    let angle = if fastrand::bool() {
        range(-PI, -DEAD_ZONE)
    } else {
        range(DEAD_ZONE, PI)
    };
    debug_assert!(!in_dead_zone(angle));
    angle
}

pub fn in_dead_zone(angle: f32) -> bool {
    angle > -DEAD_ZONE && angle < DEAD_ZONE
}

/// Uniform angle over a full turn, [0, 2pi).
pub fn full_angle() -> f32 {
    fastrand::f32() * 2.0 * PI
}

pub fn point_in(width: f32, height: f32) -> Point {
    Point::new(range(0.0, width), range(0.0, height))
}

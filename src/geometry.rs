use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn add(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Point at parameter `t` on the segment from `self` to `other`.
    pub fn lerp(&self, other: Vec2, t: f64) -> Vec2 {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    a.sub(b).length()
}

pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

pub fn orbit_position(center: Vec2, radius: f64, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(center.x + c * radius, center.y + s * radius)
}

/// Angle of slot `index` out of `count` evenly spaced slots, first slot at the top.
pub fn ring_angle(index: usize, count: usize) -> f64 {
    let step = 2.0 * PI / count.max(1) as f64;
    index as f64 * step - PI / 2.0
}

/// Elastic wall reflection on one axis: velocity flips once the position leaves
/// `[0, max]`, and the position is clamped back inside.
pub fn bounce_axis(pos: f64, vel: f64, max: f64) -> (f64, f64) {
    let vel = if pos < 0.0 || pos > max { -vel } else { vel };
    (pos.clamp(0.0, max.max(0.0)), vel)
}

/// Toroidal wrap on one axis: leaving one edge re-enters at the opposite one.
pub fn wrap_axis(pos: f64, max: f64) -> f64 {
    if pos < 0.0 {
        max
    } else if pos > max {
        0.0
    } else {
        pos
    }
}

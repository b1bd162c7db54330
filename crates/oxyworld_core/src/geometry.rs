//! Plane geometry used by vision and locomotion.
//!
//! Headings are compass-style degrees: 0 points along +y, 90 along +x.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector of length `len` pointing along `heading` degrees.
    #[must_use]
    pub fn from_heading(heading: f64, len: f64) -> Self {
        let rad = heading.to_radians();
        Self::new(len * rad.sin(), len * rad.cos())
    }

    #[must_use]
    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[must_use]
    pub fn distance(self, other: Vec2) -> f64 {
        self.sub(other).length_squared().sqrt()
    }

    /// Heading from `self` towards `target`, in [0, 360).
    #[must_use]
    pub fn heading_to(self, target: Vec2) -> f64 {
        normalize_degrees((target.x - self.x).atan2(target.y - self.y).to_degrees())
    }
}

/// `true` when `v2` lies strictly clockwise of `v1`.
#[must_use]
pub fn are_clockwise(v1: Vec2, v2: Vec2) -> bool {
    -v1.y * v2.x + v1.x * v2.y > 0.0
}

#[must_use]
pub fn is_within_radius(v: Vec2, radius: f64) -> bool {
    v.length_squared() <= radius * radius
}

/// Wraps any angle into [0, 360).
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Point of the segment closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let d = self.end.sub(self.start);
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return self.start;
        }
        let param = point.sub(self.start).x * d.x + point.sub(self.start).y * d.y;
        let param = param / len_sq;
        if param < 0.0 {
            self.start
        } else if param > 1.0 {
            self.end
        } else {
            Vec2::new(self.start.x + param * d.x, self.start.y + param * d.y)
        }
    }
}

/// Intersection of segments p0-p1 and p2-p3, endpoints included.
///
/// Parallel and collinear segments never intersect.
#[must_use]
pub fn segment_intersection(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Option<Vec2> {
    let s10 = p1.sub(p0);
    let s32 = p3.sub(p2);
    let denom = s10.x * s32.y - s32.x * s10.y;
    if denom == 0.0 {
        return None;
    }
    let positive = denom > 0.0;
    let s02 = p0.sub(p2);

    let s_numer = s10.x * s02.y - s10.y * s02.x;
    if (s_numer < 0.0) == positive {
        return None;
    }
    let t_numer = s32.x * s02.y - s32.y * s02.x;
    if (t_numer < 0.0) == positive {
        return None;
    }
    if (s_numer > denom) == positive || (t_numer > denom) == positive {
        return None;
    }

    let t = t_numer / denom;
    Some(Vec2::new(p0.x + t * s10.x, p0.y + t * s10.y))
}

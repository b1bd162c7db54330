//! Cone-of-vision sensing.
//!
//! A viewer sees entities inside a circular sector centred on its heading.
//! Membership is decided by a pair of cross-product tests against the two
//! boundary rays, so headings near 0/360 need no special casing. Walls are
//! sensed by intersecting the boundary rays with each wall segment.

use crate::geometry::{are_clockwise, is_within_radius, segment_intersection, Segment, Vec2};
use serde::{Deserialize, Serialize};

/// Extra half-angle so entities exactly on a boundary ray are included.
const HALF_ANGLE_EPSILON: f64 = 0.00001;

/// One entry in an agent's visible-entity list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sensed {
    Agent { id: u32, rank: u32, x: f64, y: f64 },
    Food { id: u32, x: f64, y: f64 },
    /// Synthetic observation of the nearest visible point on a boundary wall.
    Wall { x: f64, y: f64 },
}

impl Sensed {
    fn is_agent(&self, agent_id: u32) -> bool {
        matches!(*self, Sensed::Agent { id, .. } if id == agent_id)
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        match *self {
            Sensed::Agent { x, y, .. } | Sensed::Food { x, y, .. } | Sensed::Wall { x, y } => {
                Vec2::new(x, y)
            }
        }
    }
}

/// The four boundary walls of a `width` x `height` world.
///
/// ```text
///     ___1___
///     |     |
///     0     2
///     |__3__|
/// ```
#[must_use]
pub fn boundary_walls(width: u32, height: u32) -> [Segment; 4] {
    let (w, h) = (f64::from(width), f64::from(height));
    [
        Segment::new(Vec2::new(0.0, h), Vec2::new(0.0, 0.0)),
        Segment::new(Vec2::new(0.0, 0.0), Vec2::new(w, 0.0)),
        Segment::new(Vec2::new(w, 0.0), Vec2::new(w, h)),
        Segment::new(Vec2::new(w, h), Vec2::new(0.0, h)),
    ]
}

/// Sector of a single viewer for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionCone {
    pub center: Vec2,
    pub left: Vec2,
    pub right: Vec2,
    pub length: f64,
}

impl VisionCone {
    #[must_use]
    pub fn new(center: Vec2, heading: f64, length: f64, half_angle: f64) -> Self {
        let spread = half_angle + HALF_ANGLE_EPSILON;
        Self {
            center,
            left: Vec2::from_heading(heading + spread, length),
            right: Vec2::from_heading(heading - spread, length),
            length,
        }
    }

    /// Whether `point` lies inside the sector. The viewer's own position never does.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let rel = point.sub(self.center);
        is_within_radius(rel, self.length)
            && !are_clockwise(self.right, rel)
            && are_clockwise(self.left, rel)
    }

    /// Nearest observable point of `wall`, if either boundary ray reaches it
    /// and the point lies within `max_distance`.
    #[must_use]
    pub fn sense_wall(&self, wall: &Segment, max_distance: f64) -> Option<Vec2> {
        let left_end = self.center.add(self.left);
        let right_end = self.center.add(self.right);
        let left_hit = segment_intersection(self.center, left_end, wall.start, wall.end);
        let right_hit = segment_intersection(self.center, right_end, wall.start, wall.end);

        let visible_part = match (left_hit, right_hit) {
            (Some(_), Some(_)) => *wall,
            (Some(hit), None) => Segment::new(wall.end, hit),
            (None, Some(hit)) => Segment::new(wall.start, hit),
            (None, None) => return None,
        };
        let nearest = visible_part.closest_point(self.center);
        (nearest.distance(self.center) <= max_distance).then_some(nearest)
    }
}

/// Everything an agent at `cone` perceives this tick.
///
/// Walls come first, in boundary order, then `candidates` in roster order.
/// The viewer's own entry among the candidates is skipped.
#[must_use]
pub fn compute_sight(
    viewer_id: u32,
    cone: &VisionCone,
    walls: &[Segment],
    wall_range: f64,
    candidates: &[Sensed],
) -> Vec<Sensed> {
    let mut seen: Vec<Sensed> = walls
        .iter()
        .filter_map(|wall| cone.sense_wall(wall, wall_range))
        .map(|p| Sensed::Wall { x: p.x, y: p.y })
        .collect();

    seen.extend(
        candidates
            .iter()
            .filter(|c| !c.is_agent(viewer_id))
            .filter(|c| cone.contains(c.position()))
            .copied(),
    );
    seen
}

/// Visible entities split by kind, in sensing order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Perception {
    pub agents: Vec<(u32, u32, Vec2)>,
    pub foods: Vec<(u32, Vec2)>,
    pub walls: Vec<Vec2>,
}

impl Perception {
    #[must_use]
    pub fn from_sensed(sensed: &[Sensed]) -> Self {
        let mut p = Perception::default();
        for s in sensed {
            match *s {
                Sensed::Agent { id, rank, x, y } => p.agents.push((id, rank, Vec2::new(x, y))),
                Sensed::Food { id, x, y } => p.foods.push((id, Vec2::new(x, y))),
                Sensed::Wall { x, y } => p.walls.push(Vec2::new(x, y)),
            }
        }
        p
    }
}

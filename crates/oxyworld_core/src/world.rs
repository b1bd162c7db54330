//! The spatial world: occupancy grid, boundary walls, per-agent vision and
//! periodic food cycling.
//!
//! Grid mutations are serialized by one lock. Vision lists are recomputed for
//! every agent at the start of each tick and stay read-only while agents step.

use crate::config::WorldConfig;
use crate::entity::Roster;
use crate::error::BoundsError;
use crate::geometry::{is_within_radius, Segment, Vec2};
use crate::grid::{Grid, Occupant, Relocation, Resident};
use crate::vision::{boundary_walls, compute_sight, Sensed, VisionCone};
use oxyworld_data::WorldDynamics;
use rayon::prelude::*;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FoodChange {
    Hide,
    Reveal,
}

type Phase = (FoodChange, &'static [(f64, f64)]);

const SEASONAL_PHASES: [Phase; 6] = [
    (FoodChange::Hide, &[(89.0, 89.0)]),
    (FoodChange::Hide, &[(9.0, 9.0)]),
    (FoodChange::Hide, &[(89.0, 9.0)]),
    (FoodChange::Reveal, &[(89.0, 9.0)]),
    (FoodChange::Reveal, &[(9.0, 9.0)]),
    (FoodChange::Reveal, &[(89.0, 89.0)]),
];

const EXTREME_PHASES: [Phase; 2] = [
    (FoodChange::Hide, &[(9.0, 9.0), (9.0, 89.0), (89.0, 9.0)]),
    (FoodChange::Reveal, &[(9.0, 9.0), (9.0, 89.0), (89.0, 9.0)]),
];

pub struct World {
    width: u32,
    height: u32,
    vision_length: f64,
    vision_half_angle: f64,
    wall_range: f64,
    walls: [Segment; 4],
    dynamics: WorldDynamics,
    dynamics_warmup: u64,
    dynamics_period: u64,
    owner_radius: f64,
    co_feeding_radius: f64,
    grid: RwLock<Grid>,
    sight: Vec<Vec<Sensed>>,
    ticks: u64,
    phase: usize,
}

impl World {
    #[must_use]
    pub fn new(config: &WorldConfig, population: u32, dynamics: WorldDynamics) -> Self {
        Self {
            width: config.width,
            height: config.height,
            vision_length: config.vision_length,
            vision_half_angle: config.vision_half_angle,
            wall_range: config.vision_length * config.wall_sense_fraction,
            walls: boundary_walls(config.width, config.height),
            dynamics,
            dynamics_warmup: config.dynamics_warmup,
            dynamics_period: config.dynamics_period.max(1),
            owner_radius: 4.0,
            co_feeding_radius: 1.0,
            grid: RwLock::new(Grid::new(config.width, config.height)),
            sight: vec![Vec::new(); population as usize],
            ticks: 0,
            phase: 0,
        }
    }

    /// Overrides the radii used for food ownership and co-feeding.
    #[must_use]
    pub fn with_food_radii(mut self, owner: f64, co_feeding: f64) -> Self {
        self.owner_radius = owner;
        self.co_feeding_radius = co_feeding;
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dynamics(&self) -> WorldDynamics {
        self.dynamics
    }

    /// Number of world ticks applied so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn walls(&self) -> &[Segment; 4] {
        &self.walls
    }

    fn read_grid(&self) -> RwLockReadGuard<'_, Grid> {
        self.grid.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_grid(&self) -> RwLockWriteGuard<'_, Grid> {
        self.grid.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn place(&self, resident: Resident, x: f64, y: f64) -> Result<(), BoundsError> {
        self.write_grid().place(resident, x, y)
    }

    /// Removes `resident` from its cell. Out-of-bounds coordinates are logged and ignored.
    pub fn clear(&self, resident: Resident, x: f64, y: f64) -> bool {
        match self.write_grid().clear(resident, x, y) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(?resident, %err, "Ignoring clear outside the world");
                false
            }
        }
    }

    pub fn move_resident(
        &self,
        resident: Resident,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<Relocation, BoundsError> {
        self.write_grid().move_resident(resident, from, to)
    }

    pub fn copy_resident(
        &self,
        resident: Resident,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<Relocation, BoundsError> {
        self.write_grid().copy_resident(resident, from, to)
    }

    #[must_use]
    pub fn contains(&self, resident: Resident, x: f64, y: f64) -> bool {
        self.read_grid().contains(x, y, resident)
    }

    #[must_use]
    pub fn occupant_at(&self, x: f64, y: f64) -> Option<Occupant> {
        self.read_grid().cell(x, y).cloned()
    }

    /// Runs `f` with shared access to the grid.
    pub fn with_grid<R>(&self, f: impl FnOnce(&Grid) -> R) -> R {
        f(&self.read_grid())
    }

    /// Entities visible to agent `id` this tick: walls first, then roster order.
    #[must_use]
    pub fn sight(&self, id: u32) -> &[Sensed] {
        (id as usize)
            .checked_sub(1)
            .and_then(|i| self.sight.get(i))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn cone(&self, x: f64, y: f64, direction: f64) -> VisionCone {
        VisionCone::new(
            Vec2::new(x, y),
            direction,
            self.vision_length,
            self.vision_half_angle,
        )
    }

    /// Start-of-tick update: food cycling, then food occupancy, then every agent's vision.
    pub fn tick(&mut self, roster: &Roster) {
        if self.ticks >= self.dynamics_warmup && self.ticks % self.dynamics_period == 0 {
            self.apply_dynamics(roster);
        }
        self.ticks += 1;

        let candidates: Vec<Sensed> = roster.entities().filter_map(|e| e.sighting()).collect();
        self.update_food_occupancy(roster, &candidates);
        self.sight = self.compute_vision(roster, &candidates);
    }

    fn apply_dynamics(&mut self, roster: &Roster) {
        let phases: &[Phase] = match self.dynamics {
            WorldDynamics::Static => return,
            WorldDynamics::Seasonal => &SEASONAL_PHASES,
            WorldDynamics::Extreme => &EXTREME_PHASES,
        };
        let cycle = self.dynamics.phase_count() as usize;
        debug_assert_eq!(cycle, phases.len());
        let (change, positions) = phases[self.phase % cycle];
        for &(x, y) in positions {
            let Some(food) = roster.food_at(x, y) else {
                tracing::debug!(x, y, "No live food to cycle");
                continue;
            };
            match change {
                FoodChange::Hide if !food.is_hidden() => {
                    food.set_hidden(true);
                    self.clear(food.resident(), x, y);
                }
                FoodChange::Reveal if food.is_hidden() => {
                    food.set_hidden(false);
                    if let Err(err) = self.place(food.resident(), x, y) {
                        tracing::warn!(food = food.id(), %err, "Could not re-place revealed food");
                    }
                }
                _ => {}
            }
        }
        tracing::debug!(
            tick = self.ticks,
            dynamics = %self.dynamics,
            phase = self.phase % cycle,
            ?change,
            "World dynamics phase"
        );
        self.phase = (self.phase + 1) % cycle;
    }

    /// Recomputes owner and co-feeders of every live food source from live agent positions.
    fn update_food_occupancy(&self, roster: &Roster, candidates: &[Sensed]) {
        for food in roster.foods().iter().filter(|f| f.is_alive()) {
            let (fx, fy) = food.position();
            let center = Vec2::new(fx, fy);
            let mut owner: Option<(u32, u32)> = None;
            let mut eating = Vec::new();
            for sensed in candidates {
                let Sensed::Agent { id, rank, x, y } = *sensed else {
                    continue;
                };
                let rel = Vec2::new(x, y).sub(center);
                if !is_within_radius(rel, self.owner_radius) {
                    continue;
                }
                if owner.map_or(true, |(_, best)| rank > best) {
                    owner = Some((id, rank));
                }
                if is_within_radius(rel, self.co_feeding_radius) {
                    eating.push(id);
                }
            }
            food.set_occupancy(owner.map(|(id, _)| id), eating);
        }
    }

    fn compute_vision(&self, roster: &Roster, candidates: &[Sensed]) -> Vec<Vec<Sensed>> {
        roster
            .agents()
            .par_iter()
            .map(|agent| {
                let pose = agent.with_state(|s| s.alive.then_some((s.x, s.y, s.direction)));
                match pose {
                    Some((x, y, direction)) => compute_sight(
                        agent.id(),
                        &self.cone(x, y, direction),
                        &self.walls,
                        self.wall_range,
                        candidates,
                    ),
                    None => Vec::new(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tests::test_agent;
    use crate::config::SimConfig;
    use crate::food::Food;

    fn corner_foods() -> Vec<Food> {
        SimConfig::default()
            .food
            .positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Food::new(i as u32 + 1, x, y, 4.0))
            .collect()
    }

    fn world_for(roster: &Roster, dynamics: WorldDynamics) -> World {
        let world = World::new(&SimConfig::default().world, roster.population(), dynamics);
        for e in roster.entities() {
            let (x, y) = e.position();
            let resident = match e {
                crate::entity::EntityRef::Agent(a) => a.resident(),
                crate::entity::EntityRef::Food(f) => f.resident(),
            };
            world.place(resident, x, y).unwrap();
        }
        world
    }

    #[test]
    fn test_seasonal_cycle() {
        let roster = Roster::new(vec![], corner_foods());
        let mut world = world_for(&roster, WorldDynamics::Seasonal);
        let hidden_after = |world: &mut World, until: u64| {
            while world.ticks() <= until {
                world.tick(&roster);
            }
            roster
                .foods()
                .iter()
                .filter(|f| f.is_hidden())
                .map(Food::position)
                .collect::<Vec<_>>()
        };

        assert!(hidden_after(&mut world, 1999).is_empty());
        assert_eq!(hidden_after(&mut world, 2000), vec![(89.0, 89.0)]);
        assert!(world.occupant_at(89.0, 89.0).is_none());
        assert_eq!(hidden_after(&mut world, 3000), vec![(9.0, 9.0), (89.0, 89.0)]);
        assert_eq!(hidden_after(&mut world, 4000).len(), 3);
        assert_eq!(hidden_after(&mut world, 5000).len(), 2);
        assert_eq!(hidden_after(&mut world, 6000), vec![(89.0, 89.0)]);
        assert!(hidden_after(&mut world, 7000).is_empty());
        assert!(world.contains(Resident::Food(2), 89.0, 89.0));
        // Seventh phase wraps to the first.
        assert_eq!(hidden_after(&mut world, 8000), vec![(89.0, 89.0)]);
    }

    #[test]
    fn test_extreme_cycle() {
        let roster = Roster::new(vec![], corner_foods());
        let mut world = world_for(&roster, WorldDynamics::Extreme);
        while world.ticks() <= 2000 {
            world.tick(&roster);
        }
        let visible: Vec<_> = roster
            .foods()
            .iter()
            .filter(|f| !f.is_hidden())
            .map(Food::position)
            .collect();
        assert_eq!(visible, vec![(89.0, 89.0)]);
        while world.ticks() <= 3000 {
            world.tick(&roster);
        }
        assert!(roster.foods().iter().all(|f| !f.is_hidden()));
        while world.ticks() <= 4000 {
            world.tick(&roster);
        }
        assert_eq!(roster.foods().iter().filter(|f| f.is_hidden()).count(), 3);
    }

    #[test]
    fn test_static_never_changes() {
        let roster = Roster::new(vec![], corner_foods());
        let mut world = world_for(&roster, WorldDynamics::Static);
        while world.ticks() <= 4000 {
            world.tick(&roster);
        }
        assert!(roster.foods().iter().all(|f| !f.is_hidden()));
    }

    #[test]
    fn test_vision_lists_are_replaced() {
        let roster = Roster::new(
            vec![
                test_agent(1, vec![], 50.0, 50.0, 0.0),
                test_agent(2, vec![], 50.0, 55.0, 0.0),
            ],
            vec![],
        );
        let mut world = world_for(&roster, WorldDynamics::Static);
        world.tick(&roster);
        assert_eq!(world.sight(1).len(), 1);
        assert!(world.sight(2).is_empty());

        roster.agent(1).unwrap().with_state(|s| s.direction = 180.0);
        world.tick(&roster);
        assert!(world.sight(1).is_empty());
        assert!(world.sight(99).is_empty());
    }

    #[test]
    fn test_dead_agents_are_invisible() {
        let roster = Roster::new(
            vec![
                test_agent(1, vec![], 50.0, 50.0, 0.0),
                test_agent(2, vec![], 50.0, 55.0, 0.0),
            ],
            vec![],
        );
        roster.agent(2).unwrap().with_state(|s| s.alive = false);
        let mut world = world_for(&roster, WorldDynamics::Static);
        world.tick(&roster);
        assert!(world.sight(1).is_empty());
    }

    #[test]
    fn test_food_owner_is_highest_rank_nearby() {
        let roster = Roster::new(
            vec![
                test_agent(1, vec![], 9.5, 9.5, 0.0),
                test_agent(2, vec![], 11.0, 9.0, 0.0),
                test_agent(3, vec![], 30.0, 30.0, 0.0),
            ],
            corner_foods(),
        );
        let mut world = world_for(&roster, WorldDynamics::Static);
        world.tick(&roster);
        let food = roster.food_at(9.0, 9.0).unwrap();
        assert_eq!(food.owner(), Some(2));
        assert_eq!(food.eating_agents(), vec![1]);
        assert_eq!(roster.food_at(89.0, 89.0).unwrap().owner(), None);
    }

    #[test]
    fn test_clear_out_of_bounds_is_ignored() {
        let world = World::new(&SimConfig::default().world, 0, WorldDynamics::Static);
        assert!(!world.clear(Resident::Agent(1), 0.0, 5.0));
        assert!(world.place(Resident::Agent(1), 99.0, 5.0).is_err());
    }
}

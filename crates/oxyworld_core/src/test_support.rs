//! Shared scaffolding for unit tests that need a live step context.

use crate::agent::StepContext;
use crate::config::SimConfig;
use crate::entity::Roster;
use crate::metrics::Metrics;
use crate::world::World;
use oxyworld_data::{DsiMode, WorldDynamics};

pub(crate) struct Fixture {
    pub world: World,
    pub roster: Roster,
    pub config: SimConfig,
    pub metrics: Metrics,
    population: u32,
}

impl Fixture {
    /// Static world sized for `population` agents, with nobody on it.
    pub fn new(config: SimConfig, population: u32) -> Self {
        Self {
            world: World::new(&config.world, population, WorldDynamics::Static),
            roster: Roster::default(),
            config,
            metrics: Metrics::new(),
            population,
        }
    }

    /// Static world with every roster entry already placed on the grid.
    pub fn with_roster(config: SimConfig, roster: Roster) -> Self {
        let population = roster.population();
        let world = World::new(&config.world, population, WorldDynamics::Static);
        for e in roster.entities() {
            let (x, y) = e.position();
            let resident = match e {
                crate::entity::EntityRef::Agent(a) => a.resident(),
                crate::entity::EntityRef::Food(f) => f.resident(),
            };
            world.place(resident, x, y).unwrap();
        }
        Self {
            world,
            roster,
            config,
            metrics: Metrics::new(),
            population,
        }
    }

    pub fn with_ctx<R>(&self, dsi_mode: DsiMode, f: impl FnOnce(&StepContext<'_>) -> R) -> R {
        let ctx = StepContext {
            world: &self.world,
            roster: &self.roster,
            config: &self.config.agent,
            food: &self.config.food,
            population: self.population.max(self.roster.population()),
            dsi_mode,
            metrics: &self.metrics,
            iteration: 0,
        };
        f(&ctx)
    }
}

//! Validated construction of a run from its start parameters.

use crate::agent::Agent;
use crate::config::SimConfig;
use crate::entity::Roster;
use crate::error::{ConfigError, SimError};
use crate::food::Food;
use crate::scheduler::Scheduler;
use crate::world::World;
use oxyworld_data::{BondGroups, DsiMode, WorldDynamics};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashSet};

/// The four values a caller supplies to start a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub population: u32,
    pub dynamics: WorldDynamics,
    pub bonds: BondGroups,
    pub dsi_mode: DsiMode,
}

impl RunParameters {
    #[must_use]
    pub fn new(population: u32, dynamics: WorldDynamics, bonds: BondGroups, dsi_mode: DsiMode) -> Self {
        Self {
            population,
            dynamics,
            bonds,
            dsi_mode,
        }
    }

    /// Parses textual modes and bonds, then validates the whole set.
    pub fn parse(population: u32, dynamics: &str, bonds: &str, dsi_mode: &str) -> Result<Self, ConfigError> {
        let params = Self::new(
            population,
            dynamics.parse()?,
            bonds.parse()?,
            dsi_mode.parse()?,
        );
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        validate_bonds(&self.bonds, self.population)
    }
}

/// Every bonded id must exist and appear at most once across all groups.
pub fn validate_bonds(bonds: &BondGroups, population: u32) -> Result<(), ConfigError> {
    let mut bonded = HashSet::new();
    for (group_idx, group) in bonds.groups().iter().enumerate() {
        let mut members = HashSet::new();
        for &id in group {
            if id == 0 || id > population {
                return Err(ConfigError::BondIdOutOfRange { id, population });
            }
            if !members.insert(id) {
                return Err(ConfigError::DuplicateBond { id, group: group_idx });
            }
            if !bonded.insert(id) {
                return Err(ConfigError::OverlappingBondGroups { id });
            }
        }
    }
    Ok(())
}

/// Uniform coordinate strictly inside `(0, limit)`.
fn random_coordinate(rng: &mut ChaCha8Rng, limit: f64) -> f64 {
    loop {
        let v = rng.gen::<f64>() * limit;
        if v > 0.0 && v < limit {
            return v;
        }
    }
}

/// Assembles world, roster and scheduler for one run.
///
/// Agents get random positions and headings unless placed explicitly.
pub struct SimulationBuilder {
    config: SimConfig,
    params: RunParameters,
    seed: Option<u64>,
    iterations: Option<u64>,
    placements: BTreeMap<u32, (f64, f64, f64)>,
    energies: BTreeMap<u32, f64>,
    foods: Option<Vec<(f64, f64)>>,
}

impl SimulationBuilder {
    #[must_use]
    pub fn new(config: SimConfig, params: RunParameters) -> Self {
        Self {
            config,
            params,
            seed: None,
            iterations: None,
            placements: BTreeMap::new(),
            energies: BTreeMap::new(),
            foods: None,
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Fixes the starting position and heading of agent `id`.
    #[must_use]
    pub fn place_agent(mut self, id: u32, x: f64, y: f64, direction: f64) -> Self {
        self.placements.insert(id, (x, y, direction));
        self
    }

    #[must_use]
    pub fn agent_energy(mut self, id: u32, energy: f64) -> Self {
        self.energies.insert(id, energy);
        self
    }

    /// Replaces the configured food positions for this run.
    #[must_use]
    pub fn foods(mut self, positions: Vec<(f64, f64)>) -> Self {
        self.foods = Some(positions);
        self
    }

    pub fn build(self) -> Result<Scheduler, SimError> {
        self.config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.params.validate()?;

        let n = self.params.population;
        for &id in self.placements.keys().chain(self.energies.keys()) {
            if id == 0 || id > n {
                return Err(ConfigError::Invalid(format!("no agent with id {id}")).into());
            }
        }
        if let Some(bad) = self.energies.values().find(|e| !(0.0..=1.0).contains(*e)) {
            return Err(ConfigError::Invalid(format!("agent energy {bad} outside [0, 1]")).into());
        }

        let condition = self.config.agent.cortisol_threshold;
        let thresholds = (1..=n)
            .map(|rank| {
                condition
                    .threshold(rank)
                    .ok_or_else(|| ConfigError::CortisolThreshold {
                        condition: condition.to_string(),
                        rank,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let seed = self.seed.or(self.config.run.seed);
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        let world = World::new(&self.config.world, n, self.params.dynamics).with_food_radii(
            self.config.food.owner_radius,
            self.config.food.co_feeding_radius,
        );
        let (w, h) = (
            f64::from(self.config.world.width),
            f64::from(self.config.world.height),
        );

        let mut agents = Vec::with_capacity(n as usize);
        for (idx, threshold) in thresholds.into_iter().enumerate() {
            let id = idx as u32 + 1;
            let (x, y, direction) = match self.placements.get(&id) {
                Some(&placed) => placed,
                None => (
                    random_coordinate(&mut rng, w),
                    random_coordinate(&mut rng, h),
                    rng.gen::<f64>() * 360.0,
                ),
            };
            let agent_rng = ChaCha8Rng::seed_from_u64(rng.gen());
            let agent = Agent::new(
                id,
                id,
                threshold,
                self.params.bonds.partners_of(id),
                (x, y),
                direction,
                &self.config.agent,
                agent_rng,
            );
            if let Some(&energy) = self.energies.get(&id) {
                agent.with_state(|s| s.energy = energy);
            }
            world.place(agent.resident(), x, y)?;
            agents.push(agent);
        }

        let positions = self
            .foods
            .unwrap_or_else(|| self.config.food.positions.clone());
        let mut foods = Vec::with_capacity(positions.len());
        for (idx, (x, y)) in positions.into_iter().enumerate() {
            let food = Food::new(idx as u32 + 1, x, y, self.config.food.max_resource);
            world.place(food.resident(), x, y)?;
            foods.push(food);
        }

        tracing::info!(
            population = n,
            foods = foods.len(),
            dynamics = %self.params.dynamics,
            dsi_mode = %self.params.dsi_mode,
            seed = ?seed,
            "Simulation assembled"
        );

        let limit = self.iterations.unwrap_or(self.config.run.iterations);
        let mut scheduler = Scheduler::new(
            world,
            Roster::new(agents, foods),
            self.config,
            self.params.dsi_mode,
        );
        scheduler.limit_iterations(limit);
        Ok(scheduler)
    }
}

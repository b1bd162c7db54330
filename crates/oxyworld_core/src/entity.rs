//! The roster: every entity the scheduler steps, in a fixed order.
//!
//! Agents come first (id `n` at index `n - 1`), then food sources.

use crate::agent::{Agent, StepContext};
use crate::error::Result;
use crate::food::Food;
use crate::vision::Sensed;
use oxyworld_data::{EntityKind, EntityRecord};
use rayon::prelude::*;

/// Borrowed view of one roster entry.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Agent(&'a Agent),
    Food(&'a Food),
}

impl EntityRef<'_> {
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            EntityRef::Agent(a) => a.id(),
            EntityRef::Food(f) => f.id(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Agent(_) => EntityKind::Agent,
            EntityRef::Food(_) => EntityKind::Food,
        }
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        match self {
            EntityRef::Agent(a) => a.position(),
            EntityRef::Food(f) => f.position(),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        match self {
            EntityRef::Agent(a) => a.is_alive(),
            EntityRef::Food(f) => f.is_alive(),
        }
    }

    /// What an agent would perceive of this entity right now.
    #[must_use]
    pub fn sighting(&self) -> Option<Sensed> {
        match self {
            EntityRef::Agent(a) => a.sighting(),
            EntityRef::Food(f) => f.sighting(),
        }
    }

    #[must_use]
    pub fn record(&self) -> EntityRecord {
        match self {
            EntityRef::Agent(a) => a.record(),
            EntityRef::Food(f) => f.record(),
        }
    }

    /// Per-tick action of the entity.
    pub fn step(&self, ctx: &StepContext<'_>) -> Result<()> {
        match self {
            EntityRef::Agent(a) => a.step(ctx),
            EntityRef::Food(f) => {
                f.step(ctx.food.regen_rate);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Roster {
    agents: Vec<Agent>,
    foods: Vec<Food>,
}

impl Roster {
    /// Builds a roster. Agents must be supplied in id order starting at 1.
    #[must_use]
    pub fn new(agents: Vec<Agent>, foods: Vec<Food>) -> Self {
        debug_assert!(agents
            .iter()
            .enumerate()
            .all(|(i, a)| a.id() as usize == i + 1));
        Self { agents, foods }
    }

    #[must_use]
    pub fn agent(&self, id: u32) -> Option<&Agent> {
        let idx = (id as usize).checked_sub(1)?;
        self.agents.get(idx)
    }

    #[must_use]
    pub fn food(&self, id: u32) -> Option<&Food> {
        self.foods.iter().find(|f| f.id() == id)
    }

    /// Live food source sitting exactly at `(x, y)`.
    #[must_use]
    pub fn food_at(&self, x: f64, y: f64) -> Option<&Food> {
        self.foods
            .iter()
            .find(|f| f.position() == (x, y) && f.is_alive())
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    #[must_use]
    pub fn population(&self) -> u32 {
        self.agents.len() as u32
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len() + self.foods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.agents
            .iter()
            .map(EntityRef::Agent)
            .chain(self.foods.iter().map(EntityRef::Food))
    }

    pub fn par_entities(&self) -> impl ParallelIterator<Item = EntityRef<'_>> {
        self.agents
            .par_iter()
            .map(EntityRef::Agent)
            .chain(self.foods.par_iter().map(EntityRef::Food))
    }

    /// Snapshot of every entry, dead ones included, in roster order.
    #[must_use]
    pub fn records(&self) -> Vec<EntityRecord> {
        self.entities().map(|e| e.record()).collect()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&EntityRef<'_>) -> bool,
    {
        self.entities().filter(|e| predicate(e)).count()
    }

    #[must_use]
    pub fn live_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    #[must_use]
    pub fn live_foods(&self) -> usize {
        self.foods.iter().filter(|f| f.is_alive()).count()
    }
}

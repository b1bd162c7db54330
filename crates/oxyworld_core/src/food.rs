//! Depletable, regenerating food sources.

use crate::grid::Resident;
use crate::vision::Sensed;
use crate::world::World;
use oxyworld_data::{EntityKind, EntityRecord};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct FoodState {
    pub resource: f64,
    pub alive: bool,
    pub hidden: bool,
    /// Highest-ranked live agent within the ownership radius, if any.
    pub owner: Option<u32>,
    /// Agents within the co-feeding radius, in roster order.
    pub eating_agents: Vec<u32>,
}

/// A food source at a fixed position.
#[derive(Debug)]
pub struct Food {
    id: u32,
    x: f64,
    y: f64,
    max_resource: f64,
    state: Mutex<FoodState>,
}

impl Food {
    #[must_use]
    pub fn new(id: u32, x: f64, y: f64, max_resource: f64) -> Self {
        Self {
            id,
            x,
            y,
            max_resource,
            state: Mutex::new(FoodState {
                resource: max_resource,
                alive: true,
                hidden: false,
                owner: None,
                eating_agents: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FoodState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[must_use]
    pub fn resident(&self) -> Resident {
        Resident::Food(self.id)
    }

    #[must_use]
    pub fn max_resource(&self) -> f64 {
        self.max_resource
    }

    #[must_use]
    pub fn state(&self) -> FoodState {
        self.lock().clone()
    }

    #[must_use]
    pub fn resource(&self) -> f64 {
        self.lock().resource
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.lock().hidden
    }

    #[must_use]
    pub fn owner(&self) -> Option<u32> {
        self.lock().owner
    }

    #[must_use]
    pub fn eating_agents(&self) -> Vec<u32> {
        self.lock().eating_agents.clone()
    }

    /// Per-tick regeneration. Hidden sources keep regenerating; depleted ones never return.
    pub fn step(&self, regen_rate: f64) {
        let mut state = self.lock();
        if !state.alive {
            return;
        }
        state.resource = (state.resource + regen_rate).min(self.max_resource);
    }

    /// Takes up to `amount` from the source and returns what was actually taken.
    ///
    /// Emptying the source kills it and vacates its cell.
    pub fn consume(&self, amount: f64, world: &World) -> f64 {
        let mut state = self.lock();
        if !state.alive {
            return 0.0;
        }
        let taken = amount.min(state.resource).max(0.0);
        state.resource -= amount;
        if state.resource <= 0.0 {
            state.resource = 0.0;
            state.alive = false;
            state.owner = None;
            state.eating_agents.clear();
            if !state.hidden {
                world.clear(self.resident(), self.x, self.y);
            }
            tracing::debug!(food = self.id, x = self.x, y = self.y, "Food source exhausted");
        }
        taken
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.lock().hidden = hidden;
    }

    pub fn set_occupancy(&self, owner: Option<u32>, eating_agents: Vec<u32>) {
        let mut state = self.lock();
        state.owner = owner;
        state.eating_agents = eating_agents;
    }

    /// What a viewer would sense, or `None` when the source is gone or hidden.
    #[must_use]
    pub fn sighting(&self) -> Option<Sensed> {
        let state = self.lock();
        (state.alive && !state.hidden).then_some(Sensed::Food {
            id: self.id,
            x: self.x,
            y: self.y,
        })
    }

    #[must_use]
    pub fn record(&self) -> EntityRecord {
        EntityRecord {
            kind: EntityKind::Food,
            id: self.id,
            x: self.x,
            y: self.y,
            alive: self.is_alive(),
        }
    }
}

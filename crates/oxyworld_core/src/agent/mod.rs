//! Hormone-driven social agents.
//!
//! Each agent owns its state behind a mutex. During a tick an agent decides
//! with only its own lock held; grooming and aggression then take both the
//! actor's and the partner's locks, always lower id first.

mod behavior;
mod hormones;
mod social;

pub use social::{Contact, ContactKind};

use crate::config::{AgentConfig, FoodConfig};
use crate::entity::Roster;
use crate::error::Result;
use crate::grid::Resident;
use crate::metrics::Metrics;
use crate::vision::{Perception, Sensed};
use crate::world::World;
use oxyworld_data::{DsiMode, EntityKind, EntityRecord};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Everything an agent reads while stepping, borrowed from the scheduler.
pub struct StepContext<'a> {
    pub world: &'a World,
    pub roster: &'a Roster,
    pub config: &'a AgentConfig,
    pub food: &'a FoodConfig,
    pub population: u32,
    pub dsi_mode: DsiMode,
    pub metrics: &'a Metrics,
    pub iteration: u64,
}

/// Mutable part of an agent.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, [0, 360).
    pub direction: f64,
    pub alive: bool,
    pub energy: f64,
    pub oxytocin: f64,
    pub cortisol: f64,
    pub socialness: f64,
    pub stressed: bool,
    /// Dyadic strength per bond partner, parallel to the agent's partner list.
    pub dsi: Vec<f64>,
    pub step_size: f64,
    pub food_time_waiting: u32,

    pub motivation: f64,
    pub touch_intensity: f64,
    pub tactile_intensity: f64,
    pub groomed_with: Option<u32>,
    pub aggression_on: Option<u32>,

    // Meal episode: survives across ticks until the agent walks away from food.
    pub eat_together_intensity: f64,
    pub tactile_eat: f64,
    pub just_ate: bool,
    pub shared_food_with: Vec<u32>,

    pub grooms: u64,
    pub aggressions: u64,
    pub meals: u64,

    rng: ChaCha8Rng,
}

impl AgentState {
    fn reset_transients(&mut self) {
        self.motivation = 0.0;
        self.touch_intensity = 0.0;
        self.tactile_intensity = 0.0;
        self.groomed_with = None;
        self.aggression_on = None;
    }
}

/// Serializable snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: u32,
    pub rank: u32,
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub alive: bool,
    pub energy: f64,
    pub oxytocin: f64,
    pub cortisol: f64,
    pub socialness: f64,
    pub stressed: bool,
    pub threshold: f64,
    /// `(partner id, dyadic strength)` pairs.
    pub bonds: Vec<(u32, f64)>,
    pub just_ate: bool,
    pub food_time_waiting: u32,
    pub groomed_with: Option<u32>,
    pub aggression_on: Option<u32>,
    pub grooms: u64,
    pub aggressions: u64,
    pub meals: u64,
}

#[derive(Debug)]
pub struct Agent {
    id: u32,
    rank: u32,
    threshold: f64,
    bond_partners: Vec<u32>,
    state: Mutex<AgentState>,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: u32,
        rank: u32,
        threshold: f64,
        bond_partners: Vec<u32>,
        position: (f64, f64),
        direction: f64,
        config: &AgentConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        let dsi = vec![config.initial_dsi; bond_partners.len()];
        let stressed = config.initial_cortisol > threshold;
        Self {
            id,
            rank,
            threshold,
            bond_partners,
            state: Mutex::new(AgentState {
                x: position.0,
                y: position.1,
                direction: crate::geometry::normalize_degrees(direction),
                alive: true,
                energy: config.initial_energy,
                oxytocin: config.initial_oxytocin,
                cortisol: config.initial_cortisol,
                socialness: config.initial_socialness,
                stressed,
                dsi,
                step_size: config.base_step,
                food_time_waiting: 0,
                motivation: 0.0,
                touch_intensity: 0.0,
                tactile_intensity: 0.0,
                groomed_with: None,
                aggression_on: None,
                eat_together_intensity: 0.0,
                tactile_eat: 0.0,
                just_ate: false,
                shared_food_with: Vec::new(),
                grooms: 0,
                aggressions: 0,
                meals: 0,
                rng,
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` against the locked state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut AgentState) -> R) -> R {
        f(&mut self.lock())
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn rank(&self) -> u32 {
        self.rank
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn bond_partners(&self) -> &[u32] {
        &self.bond_partners
    }

    #[must_use]
    pub fn resident(&self) -> Resident {
        Resident::Agent(self.id)
    }

    fn partner_index(&self, id: u32) -> Option<usize> {
        self.bond_partners.iter().position(|&p| p == id)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        let s = self.lock();
        (s.x, s.y)
    }

    /// What a viewer would sense, or `None` once dead.
    #[must_use]
    pub fn sighting(&self) -> Option<Sensed> {
        let s = self.lock();
        s.alive.then_some(Sensed::Agent {
            id: self.id,
            rank: self.rank,
            x: s.x,
            y: s.y,
        })
    }

    #[must_use]
    pub fn record(&self) -> EntityRecord {
        let s = self.lock();
        EntityRecord {
            kind: EntityKind::Agent,
            id: self.id,
            x: s.x,
            y: s.y,
            alive: s.alive,
        }
    }

    #[must_use]
    pub fn view(&self) -> AgentView {
        let s = self.lock();
        AgentView {
            id: self.id,
            rank: self.rank,
            x: s.x,
            y: s.y,
            direction: s.direction,
            alive: s.alive,
            energy: s.energy,
            oxytocin: s.oxytocin,
            cortisol: s.cortisol,
            socialness: s.socialness,
            stressed: s.stressed,
            threshold: self.threshold,
            bonds: self
                .bond_partners
                .iter()
                .copied()
                .zip(s.dsi.iter().copied())
                .collect(),
            just_ate: s.just_ate,
            food_time_waiting: s.food_time_waiting,
            groomed_with: s.groomed_with,
            aggression_on: s.aggression_on,
            grooms: s.grooms,
            aggressions: s.aggressions,
            meals: s.meals,
        }
    }

    /// One tick of behaviour: decide and act, apply any social contact,
    /// then update hormones. A dead agent does nothing.
    pub fn step(&self, ctx: &StepContext<'_>) -> Result<()> {
        let contact = {
            let mut s = self.lock();
            s.reset_transients();
            if !s.alive {
                return Ok(());
            }
            let perception = Perception::from_sensed(ctx.world.sight(self.id));
            self.select_action(&mut s, &perception, ctx)?
        };

        if let Some(contact) = contact {
            self.apply_contact(&contact, ctx)?;
        }

        let mut s = self.lock();
        if contact.is_some() {
            self.random_move(&mut s, ctx);
        }
        self.update_internals(&mut s, ctx);
        if s.energy <= 0.0 {
            self.die(&mut s, ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SimConfig;
    use rand::SeedableRng;

    pub(crate) fn test_agent(id: u32, partners: Vec<u32>, x: f64, y: f64, dir: f64) -> Agent {
        Agent::new(
            id,
            id,
            0.5,
            partners,
            (x, y),
            dir,
            &SimConfig::default().agent,
            ChaCha8Rng::seed_from_u64(u64::from(id)),
        )
    }

    #[test]
    fn test_new_agent_defaults() {
        let agent = test_agent(2, vec![1, 3], 10.0, 10.0, 370.0);
        let view = agent.view();
        assert_eq!(view.energy, 1.0);
        assert_eq!(view.oxytocin, 1.0);
        assert_eq!(view.cortisol, 0.0);
        assert_eq!(view.socialness, 1.0);
        assert!(!view.stressed);
        assert_eq!(view.bonds, vec![(1, 2.0), (3, 2.0)]);
        assert!((view.direction - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sighting_disappears_on_death() {
        let agent = test_agent(1, vec![], 10.0, 10.0, 0.0);
        assert!(agent.sighting().is_some());
        agent.with_state(|s| s.alive = false);
        assert!(agent.sighting().is_none());
        assert!(!agent.record().alive);
    }
}

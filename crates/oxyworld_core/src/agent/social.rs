//! Social valuation and two-party contact: grooming, aggression, shared meals.

use super::{Agent, AgentState, StepContext};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Groom,
    Aggression,
}

/// A decided touch interaction, applied once the actor's own lock is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub partner: u32,
    pub kind: ContactKind,
    pub intensity: f64,
}

impl Agent {
    /// Worth of `other` as seen by this agent: rank advantage plus bond strength
    /// weighted by oxytocin.
    pub(super) fn agent_val(&self, s: &AgentState, other: u32, other_rank: u32, n: u32) -> f64 {
        self.rank_term(self.rank, other_rank, n) + self.bond_term(s, other)
    }

    /// Like [`Agent::agent_val`] with the rank term reversed; used to choose a grooming partner.
    pub(super) fn normalised_agent_val(
        &self,
        s: &AgentState,
        other: u32,
        other_rank: u32,
        n: u32,
    ) -> f64 {
        self.rank_term(other_rank, self.rank, n) + self.bond_term(s, other)
    }

    fn bond_term(&self, s: &AgentState, other: u32) -> f64 {
        self.partner_index(other)
            .map_or(0.0, |i| s.dsi[i] * s.oxytocin)
    }

    /// Locks this agent and `other`, lower id first. Returns `(self, other)` guards.
    fn lock_pair<'a>(
        &'a self,
        other: &'a Agent,
    ) -> Result<(MutexGuard<'a, AgentState>, MutexGuard<'a, AgentState>)> {
        if self.id == other.id {
            return Err(SimError::invariant(format!(
                "agent {} attempted contact with itself",
                self.id
            )));
        }
        if self.id < other.id {
            let me = self.lock();
            let them = other.lock();
            Ok((me, them))
        } else {
            let them = other.lock();
            let me = self.lock();
            Ok((me, them))
        }
    }

    /// Applies a grooming or aggression contact to both parties.
    ///
    /// A partner that died earlier in the tick is left untouched.
    pub(super) fn apply_contact(&self, contact: &Contact, ctx: &StepContext<'_>) -> Result<()> {
        let partner = ctx.roster.agent(contact.partner).ok_or_else(|| {
            SimError::invariant(format!("contact with unknown agent {}", contact.partner))
        })?;
        let (mut me, mut them) = self.lock_pair(partner)?;
        if !them.alive {
            return Ok(());
        }

        let cfg = ctx.config;
        let variable = ctx.dsi_mode.is_variable();
        let my_slot = self.partner_index(partner.id);
        let their_slot = partner.partner_index(self.id);
        let t = contact.intensity;

        match contact.kind {
            ContactKind::Groom => {
                me.groomed_with = Some(partner.id);
                let gain = (1.0 - me.oxytocin) * cfg.groom_oxytocin_gain;
                me.add_oxytocin(gain);
                them.add_oxytocin(gain);
                them.modulate_cortisol(-t * cfg.groom_cortisol_relief);
                if variable {
                    if let Some(i) = my_slot {
                        me.modulate_dsi(i, t * cfg.groom_dsi_gain, cfg.max_dsi);
                    }
                    if let Some(i) = their_slot {
                        them.modulate_dsi(i, t * cfg.groom_dsi_gain, cfg.max_dsi);
                    }
                }
                me.grooms += 1;
                ctx.metrics.record_groom();
                tracing::trace!(agent = self.id, partner = partner.id, intensity = t, "Groom");
            }
            ContactKind::Aggression => {
                me.aggression_on = Some(partner.id);
                me.modulate_cortisol(-t * cfg.aggression_relief);
                them.modulate_cortisol(t * cfg.aggression_stress);
                if variable {
                    if let Some(i) = my_slot {
                        me.modulate_dsi(i, -t * cfg.aggression_dsi_loss, cfg.max_dsi);
                    }
                    if let Some(i) = their_slot {
                        them.modulate_dsi(i, -t * cfg.aggression_dsi_loss, cfg.max_dsi);
                    }
                }
                me.aggressions += 1;
                ctx.metrics.record_aggression();
                tracing::trace!(agent = self.id, target = partner.id, intensity = t, "Aggression");
            }
        }
        Ok(())
    }

    /// Remembers bonded partners currently feeding at the same source.
    pub(super) fn note_co_feeders(&self, s: &mut AgentState, eating_agents: &[u32]) {
        for &id in eating_agents {
            if id != self.id && self.partner_index(id).is_some() && !s.shared_food_with.contains(&id)
            {
                s.shared_food_with.push(id);
            }
        }
    }

    /// Ends the meal episode: the oxytocin bonus and, with variable DSI,
    /// stronger bonds to every partner who ate alongside.
    pub(super) fn share_meal(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        s.meals += 1;
        ctx.metrics.record_meal();
        if s.shared_food_with.is_empty() {
            return;
        }
        let gain = 2.0 - (2.0 * s.oxytocin) * 0.2;
        s.add_oxytocin(gain);
        if ctx.dsi_mode.is_variable() {
            let delta = s.tactile_eat * ctx.config.meal_dsi_gain;
            for id in std::mem::take(&mut s.shared_food_with) {
                if let Some(i) = self.partner_index(id) {
                    s.modulate_dsi(i, delta, ctx.config.max_dsi);
                }
            }
        }
        s.shared_food_with.clear();
    }
}

//! Hormone dynamics: cortisol release, per-tick decay and death.

use super::{Agent, AgentState, StepContext};
use crate::vision::Perception;

impl AgentState {
    pub(crate) fn add_oxytocin(&mut self, amount: f64) {
        self.oxytocin = (self.oxytocin + amount).min(1.0);
    }

    pub(crate) fn modulate_cortisol(&mut self, amount: f64) {
        self.cortisol = (self.cortisol + amount).clamp(0.0, 1.0);
    }

    pub(crate) fn modulate_dsi(&mut self, index: usize, amount: f64, max_dsi: f64) {
        if let Some(dsi) = self.dsi.get_mut(index) {
            *dsi = (*dsi + amount).clamp(0.0, max_dsi);
        }
    }
}

impl Agent {
    /// Rank difference scaled to the population, in [-1, 1].
    pub(super) fn rank_term(&self, from: u32, to: u32, population: u32) -> f64 {
        let denom = f64::from(population.saturating_sub(1).max(1));
        (f64::from(from) - f64::from(to)) / denom
    }

    /// Adjusts cortisol from the gap between needs and the relief in sight.
    ///
    /// Relief comes from the friendliest visible agent and from visible food
    /// that is not guarded by someone hostile. Falling cortisol moves at half speed.
    pub(super) fn update_cortisol(
        &self,
        s: &mut AgentState,
        sum_of_errors: f64,
        seen: &Perception,
        ctx: &StepContext<'_>,
    ) {
        let mut available_agents = 0.0;
        let mut best_agent_val = 0.0;
        if !seen.agents.is_empty() {
            let mut best = -1.0_f64;
            let mut rank_diff = 0.0_f64;
            let mut bond = 0.0;
            let mut dsi = 0.0_f64;
            for &(id, rank, _) in &seen.agents {
                if let Some(i) = self.partner_index(id) {
                    bond = 1.0;
                    dsi = dsi.max(s.dsi[i]);
                }
                rank_diff = rank_diff.max(self.rank_term(rank, self.rank, ctx.population));
                best = best.max(self.agent_val(s, id, rank, ctx.population));
            }
            available_agents = (1.0 - rank_diff) + bond * dsi * s.oxytocin;
            best_agent_val = best;
        }
        let available_foods = if !seen.foods.is_empty() && best_agent_val >= 0.0 {
            1.0
        } else {
            0.0
        };

        let mut release =
            ((sum_of_errors - available_agents - available_foods) / 2.0) * ctx.config.cortisol_change;
        if release < 0.0 {
            release /= 2.0;
        }
        s.modulate_cortisol(release);
        s.stressed = s.cortisol > self.threshold;
    }

    /// Metabolism and decay applied at the end of every tick.
    pub(super) fn update_internals(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        let cfg = ctx.config;
        s.energy -= cfg.nutrition_change * s.step_size;
        s.socialness = (s.socialness.min(1.0) - cfg.social_change).max(0.0);
        s.oxytocin = (s.oxytocin.min(1.0) - cfg.oxytocin_change).max(0.0);

        let variable = ctx.dsi_mode.is_variable();
        for dsi in &mut s.dsi {
            let mut v = dsi.min(cfg.max_dsi);
            if variable {
                v *= cfg.dsi_decay;
            }
            *dsi = v.max(0.0);
        }
        s.stressed = s.cortisol > self.threshold;
    }

    /// Irreversible: the agent stops acting and vacates its cell but stays in the roster.
    pub(super) fn die(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        s.alive = false;
        s.energy = 0.0;
        s.cortisol = 1.0;
        s.socialness = 0.0;
        s.oxytocin = 0.0;
        s.stressed = s.cortisol > self.threshold;
        ctx.world.clear(self.resident(), s.x, s.y);
        ctx.metrics.record_death(self.id, ctx.iteration);
    }
}

//! Action selection and locomotion.

use super::social::{Contact, ContactKind};
use super::{Agent, AgentState, StepContext};
use crate::error::Result;
use crate::geometry::{normalize_degrees, Vec2};
use crate::grid::Relocation;
use crate::vision::Perception;
use rand::Rng;

impl Agent {
    /// Weighs hunger against loneliness and acts on the stronger drive.
    ///
    /// Returns the contact to apply when the agent ends up touching another agent.
    pub(super) fn select_action(
        &self,
        s: &mut AgentState,
        seen: &Perception,
        ctx: &StepContext<'_>,
    ) -> Result<Option<Contact>> {
        let energy_err = 1.0 - s.energy;
        let eat_motivation = energy_err * (1.0 + seen.foods.len() as f64);
        let social_err = 1.0 - s.socialness;
        let agent_salience = if seen.agents.is_empty() { 0.0 } else { 1.0 };
        let groom_motivation = social_err * (1.0 + agent_salience);

        self.update_cortisol(s, energy_err + social_err, seen, ctx);

        if groom_motivation > eat_motivation {
            if s.just_ate {
                self.leave_food(s, ctx);
                return Ok(None);
            }
            s.motivation = groom_motivation;
            s.touch_intensity = s.motivation * ctx.config.physical_touch_effect;
            let tactile = s.touch_intensity * s.cortisol * ctx.config.touch_intensity_scale;
            s.tactile_intensity = if tactile < 0.0 { 1.0 } else { tactile.ceil() };
            Ok(self.pick_agent(s, seen, ctx))
        } else {
            s.motivation = eat_motivation;
            s.eat_together_intensity = s.motivation * ctx.config.eat_together_effect;
            s.tactile_eat = s.eat_together_intensity * s.cortisol;
            self.find_food(s, seen, ctx)?;
            Ok(None)
        }
    }

    fn pick_agent(
        &self,
        s: &mut AgentState,
        seen: &Perception,
        ctx: &StepContext<'_>,
    ) -> Option<Contact> {
        let mut best: Option<(u32, u32, Vec2)> = None;
        let mut best_val = -1.0;
        for &(id, rank, pos) in &seen.agents {
            let val = self.normalised_agent_val(s, id, rank, ctx.population);
            if val >= best_val {
                best_val = val;
                best = Some((id, rank, pos));
            }
        }

        match best {
            Some((id, rank, pos)) => self.groom_aggress_or_avoid(s, id, rank, pos, seen, ctx),
            None => {
                self.wander(s, seen, ctx);
                None
            }
        }
    }

    fn groom_aggress_or_avoid(
        &self,
        s: &mut AgentState,
        partner: u32,
        partner_rank: u32,
        partner_pos: Vec2,
        seen: &Perception,
        ctx: &StepContext<'_>,
    ) -> Option<Contact> {
        let val = self.agent_val(s, partner, partner_rank, ctx.population);
        let here = Vec2::new(s.x, s.y);

        if here.distance(partner_pos) < ctx.config.contact_distance {
            s.socialness =
                (s.socialness + s.tactile_intensity * ctx.config.touch_socialness_gain).min(1.0);
            let kind = if s.stressed && self.rank > partner_rank && val <= 1.0 {
                ContactKind::Aggression
            } else {
                ContactKind::Groom
            };
            return Some(Contact {
                partner,
                kind,
                intensity: s.tactile_intensity,
            });
        }

        self.move_to(s, partner_pos, ctx);
        if val < 0.0 {
            s.direction = if !seen.foods.is_empty() {
                normalize_degrees(s.direction - 180.0)
            } else {
                let swing = self.avoid_swing(s);
                normalize_degrees(s.direction + self.random_sign(s) * swing)
            };
        }
        None
    }

    fn find_food(&self, s: &mut AgentState, seen: &Perception, ctx: &StepContext<'_>) -> Result<()> {
        let nearest = seen
            .foods
            .iter()
            .map(|&(id, pos)| (id, pos, Vec2::new(s.x, s.y).distance(pos)))
            .fold(None, |acc: Option<(u32, Vec2, f64)>, cur| match acc {
                Some(best) if best.2 <= cur.2 => Some(best),
                _ => Some(cur),
            });

        let Some((food_id, food_pos, dist)) = nearest else {
            self.avoid_or_wander(s, seen, ctx);
            return Ok(());
        };

        if dist <= ctx.food.eat_distance {
            self.eat(s, food_id, ctx)?;
            if s.energy >= 1.0 {
                s.energy = 1.0;
                self.leave_food(s, ctx);
            }
        } else {
            self.approach_or_avoid(s, food_id, food_pos, ctx);
        }
        Ok(())
    }

    /// No food in sight: steer clear of hostile agents, otherwise roam.
    fn avoid_or_wander(&self, s: &mut AgentState, seen: &Perception, ctx: &StepContext<'_>) {
        let mut outranked = false;
        for &(id, rank, _) in &seen.agents {
            if self.agent_val(s, id, rank, ctx.population) < 0.0 {
                if s.stressed {
                    let swing = self.avoid_swing(s);
                    let heading = s.direction + self.random_sign(s) * swing;
                    self.move_heading(s, heading, ctx);
                    return;
                }
                outranked = true;
            }
        }

        if outranked {
            let heading = s.direction + self.random_sign(s) * 90.0 * s.cortisol;
            self.move_heading(s, heading, ctx);
        } else {
            self.wander(s, seen, ctx);
        }
    }

    /// Bites on every `bite_interval`-th tick spent at the food.
    fn eat(&self, s: &mut AgentState, food_id: u32, ctx: &StepContext<'_>) -> Result<()> {
        let food = ctx.roster.food(food_id).ok_or_else(|| {
            crate::error::SimError::invariant(format!("sensed unknown food {food_id}"))
        })?;

        if s.food_time_waiting + 1 < ctx.food.bite_interval {
            s.food_time_waiting += 1;
        } else {
            s.energy += food.consume(ctx.food.bite, ctx.world);
            s.food_time_waiting += 1;
        }
        if s.food_time_waiting >= ctx.food.bite_interval {
            s.food_time_waiting = 0;
        }

        s.just_ate = true;
        self.note_co_feeders(s, &food.eating_agents());
        Ok(())
    }

    /// Turns 90 degrees away from the food and closes the meal episode.
    fn leave_food(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        let heading = s.direction + self.random_sign(s) * 90.0;
        self.move_heading(s, heading, ctx);
        s.just_ate = false;
        s.food_time_waiting = 0;
        self.share_meal(s, ctx);
    }

    /// Keeps away from food guarded by someone this agent values negatively.
    fn approach_or_avoid(
        &self,
        s: &mut AgentState,
        food_id: u32,
        food_pos: Vec2,
        ctx: &StepContext<'_>,
    ) {
        let owner = ctx.roster.food(food_id).and_then(|f| f.owner());
        let val = match owner {
            Some(owner) if owner != self.id => {
                let owner_rank = ctx.roster.agent(owner).map_or(owner, |a| a.rank());
                self.agent_val(s, owner, owner_rank, ctx.population)
            }
            _ => 1.0,
        };

        if val < 0.0 {
            let heading = s.direction - 180.0;
            self.move_heading(s, heading, ctx);
        } else {
            self.move_to(s, food_pos, ctx);
        }
    }

    fn wander(&self, s: &mut AgentState, seen: &Perception, ctx: &StepContext<'_>) {
        if seen.walls.is_empty() {
            self.random_move(s, ctx);
        } else {
            self.turn_from_wall(s, ctx);
        }
    }

    /// Turns in place by a random amount; no step is taken.
    fn turn_from_wall(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        let turn = ctx.config.wall_turn;
        let delta = s.rng.gen::<f64>() * turn - s.rng.gen::<f64>() * turn;
        s.direction = normalize_degrees(s.direction + delta);
    }

    pub(super) fn random_move(&self, s: &mut AgentState, ctx: &StepContext<'_>) {
        let jitter = ctx.config.wander_jitter;
        let delta = s.rng.gen::<f64>() * jitter - s.rng.gen::<f64>() * jitter;
        let heading = s.direction + delta;
        self.move_heading(s, heading, ctx);
    }

    fn move_to(&self, s: &mut AgentState, target: Vec2, ctx: &StepContext<'_>) {
        let heading = Vec2::new(s.x, s.y).heading_to(target);
        self.move_heading(s, heading, ctx);
    }

    /// Turn angle when backing away: wider when stressed, scaled by cortisol.
    fn avoid_swing(&self, s: &AgentState) -> f64 {
        if s.stressed {
            90.0 * 1.5 * s.cortisol
        } else {
            90.0 * s.cortisol
        }
    }

    fn random_sign(&self, s: &mut AgentState) -> f64 {
        if s.rng.gen_bool(0.5) {
            -1.0
        } else {
            1.0
        }
    }

    /// Takes one step along `heading`. An out-of-bounds destination restores
    /// the previous position and heading.
    pub(super) fn move_heading(&self, s: &mut AgentState, heading: f64, ctx: &StepContext<'_>) {
        let cfg = ctx.config;
        let (old_x, old_y, old_direction) = (s.x, s.y, s.direction);

        s.direction = normalize_degrees(heading);
        let gain = if s.stressed {
            cfg.stressed_step_gain
        } else {
            cfg.calm_step_gain
        };
        s.step_size = cfg.base_step + s.cortisol * gain;
        let step = Vec2::from_heading(s.direction, s.step_size);
        let (new_x, new_y) = (old_x + step.x, old_y + step.y);

        let outcome = if cfg.trail {
            ctx.world
                .copy_resident(self.resident(), (old_x, old_y), (new_x, new_y))
        } else {
            ctx.world
                .move_resident(self.resident(), (old_x, old_y), (new_x, new_y))
        };

        match outcome {
            Ok(Relocation::SameCell | Relocation::Relocated | Relocation::Restored) => {
                s.x = new_x;
                s.y = new_y;
            }
            Err(err) => {
                s.direction = old_direction;
                ctx.metrics.record_bounds_rejection();
                tracing::trace!(agent = self.id, %err, "Move rejected at boundary");
            }
        }
    }
}

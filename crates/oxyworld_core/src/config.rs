//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration structures mapping to an optional
//! `oxyworld.toml` file. Every section has defaults, so a file only needs the
//! keys it wants to change.
//!
//! ## Example `oxyworld.toml`
//!
//! ```toml
//! [world]
//! width = 99
//! height = 99
//! vision_length = 20.0
//!
//! [agent]
//! cortisol_threshold = "Low-High"
//! trail = false
//!
//! [run]
//! iterations = 15000
//! seed = 42
//! ```

use crate::error::ConfigError;
use oxyworld_data::CortisolThresholdCondition;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of the plane, vision and the food-cycling clock.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub vision_length: f64,
    /// Half-angle of the vision cone in degrees.
    pub vision_half_angle: f64,
    /// A wall is only perceived within this fraction of the vision length.
    pub wall_sense_fraction: f64,
    pub dynamics_warmup: u64,
    pub dynamics_period: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 99,
            height: 99,
            vision_length: 20.0,
            vision_half_angle: 40.0,
            wall_sense_fraction: 0.5,
            dynamics_warmup: 2000,
            dynamics_period: 1000,
        }
    }
}

/// Hormone dynamics, locomotion and social-contact coefficients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub initial_energy: f64,
    pub initial_oxytocin: f64,
    pub initial_cortisol: f64,
    pub initial_socialness: f64,
    /// Energy lost per tick, scaled by the last step size.
    pub nutrition_change: f64,
    pub social_change: f64,
    pub oxytocin_change: f64,
    pub cortisol_change: f64,
    pub physical_touch_effect: f64,
    pub eat_together_effect: f64,
    /// Multiplier turning touch drive and cortisol into a whole-number intensity.
    pub touch_intensity_scale: f64,
    pub base_step: f64,
    pub stressed_step_gain: f64,
    pub calm_step_gain: f64,
    pub initial_dsi: f64,
    pub max_dsi: f64,
    pub dsi_decay: f64,
    pub cortisol_threshold: CortisolThresholdCondition,
    /// Agents leave a copy of themselves in every cell they pass through.
    pub trail: bool,
    pub contact_distance: f64,
    pub touch_socialness_gain: f64,
    pub groom_oxytocin_gain: f64,
    pub groom_cortisol_relief: f64,
    pub groom_dsi_gain: f64,
    pub aggression_relief: f64,
    pub aggression_stress: f64,
    pub aggression_dsi_loss: f64,
    pub meal_dsi_gain: f64,
    pub wander_jitter: f64,
    pub wall_turn: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_energy: 1.0,
            initial_oxytocin: 1.0,
            initial_cortisol: 0.0,
            initial_socialness: 1.0,
            nutrition_change: 0.0006,
            social_change: 0.0005,
            oxytocin_change: 0.0005,
            cortisol_change: 0.005,
            physical_touch_effect: 0.1,
            eat_together_effect: 0.1,
            touch_intensity_scale: 25.0,
            base_step: 0.5,
            stressed_step_gain: 1.25,
            calm_step_gain: 0.75,
            initial_dsi: 2.0,
            max_dsi: 2.0,
            dsi_decay: 0.9997,
            cortisol_threshold: CortisolThresholdCondition::Neutral,
            trail: false,
            contact_distance: 2.0,
            touch_socialness_gain: 0.15,
            groom_oxytocin_gain: 0.7,
            groom_cortisol_relief: 0.2,
            groom_dsi_gain: 0.3,
            aggression_relief: 0.15,
            aggression_stress: 0.15,
            aggression_dsi_loss: 0.15,
            meal_dsi_gain: 0.3,
            wander_jitter: 20.0,
            wall_turn: 135.0,
        }
    }
}

/// Food sources: capacity, regeneration, bites and the two proximity radii.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FoodConfig {
    pub max_resource: f64,
    pub regen_rate: f64,
    pub bite: f64,
    /// A bite is taken once every `bite_interval` ticks spent at the food.
    pub bite_interval: u32,
    pub eat_distance: f64,
    pub owner_radius: f64,
    pub co_feeding_radius: f64,
    pub positions: Vec<(f64, f64)>,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            max_resource: 4.0,
            regen_rate: 0.001,
            bite: 0.01,
            bite_interval: 6,
            eat_distance: 1.0,
            owner_radius: 4.0,
            co_feeding_radius: 1.0,
            positions: vec![(9.0, 9.0), (89.0, 89.0), (9.0, 89.0), (89.0, 9.0)],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub iterations: u64,
    /// Frames buffered between the tick loop and the frame consumer.
    pub snapshot_buffer: usize,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: 15000,
            snapshot_buffer: 1,
            seed: None,
        }
    }
}

/// Root configuration structure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub agent: AgentConfig,
    pub food: FoodConfig,
    pub run: RunConfig,
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first rule that fails.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.world.width > 1, "World width must be greater than 1");
        anyhow::ensure!(self.world.height > 1, "World height must be greater than 1");
        anyhow::ensure!(
            self.world.width <= 10_000 && self.world.height <= 10_000,
            "World too large (max 10000 per side)"
        );
        anyhow::ensure!(
            self.world.vision_length > 0.0,
            "Vision length must be positive"
        );
        anyhow::ensure!(
            self.world.vision_half_angle > 0.0 && self.world.vision_half_angle < 180.0,
            "Vision half-angle must be in (0, 180)"
        );
        anyhow::ensure!(
            self.world.wall_sense_fraction > 0.0 && self.world.wall_sense_fraction <= 1.0,
            "Wall sense fraction must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.world.dynamics_period > 0,
            "Dynamics period must be positive"
        );

        let a = &self.agent;
        for (name, value) in [
            ("initial energy", a.initial_energy),
            ("initial oxytocin", a.initial_oxytocin),
            ("initial cortisol", a.initial_cortisol),
            ("initial socialness", a.initial_socialness),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&value),
                "Agent {name} must be in [0.0, 1.0]"
            );
        }
        for (name, value) in [
            ("nutrition change", a.nutrition_change),
            ("social change", a.social_change),
            ("oxytocin change", a.oxytocin_change),
            ("cortisol change", a.cortisol_change),
            ("base step", a.base_step),
            ("stressed step gain", a.stressed_step_gain),
            ("calm step gain", a.calm_step_gain),
            ("contact distance", a.contact_distance),
        ] {
            anyhow::ensure!(value >= 0.0, "Agent {name} must be non-negative");
        }
        anyhow::ensure!(a.max_dsi > 0.0, "Maximum DSI must be positive");
        anyhow::ensure!(
            (0.0..=a.max_dsi).contains(&a.initial_dsi),
            "Initial DSI must be in [0.0, max_dsi]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&a.dsi_decay),
            "DSI decay must be in [0.0, 1.0]"
        );

        let f = &self.food;
        anyhow::ensure!(f.max_resource > 0.0, "Food max resource must be positive");
        anyhow::ensure!(f.regen_rate >= 0.0, "Food regen rate must be non-negative");
        anyhow::ensure!(f.bite > 0.0, "Food bite must be positive");
        anyhow::ensure!(f.bite_interval > 0, "Food bite interval must be positive");
        anyhow::ensure!(
            f.owner_radius >= 0.0 && f.co_feeding_radius >= 0.0,
            "Food radii must be non-negative"
        );
        let (w, h) = (f64::from(self.world.width), f64::from(self.world.height));
        for &(x, y) in &f.positions {
            anyhow::ensure!(
                x > 0.0 && x < w && y > 0.0 && y < h,
                "Food position ({x}, {y}) lies outside the world"
            );
        }

        anyhow::ensure!(
            self.run.snapshot_buffer > 0,
            "Snapshot buffer must hold at least one frame"
        );
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config =
            toml::from_str::<Self>(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.food.positions.len(), 4);
    }

    #[test]
    fn test_invalid_world_width() {
        let config = SimConfig {
            world: WorldConfig {
                width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_food_outside_world_rejected() {
        let config = SimConfig {
            food: FoodConfig {
                positions: vec![(99.0, 9.0)],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_initial_hormone() {
        let config = SimConfig {
            agent: AgentConfig {
                initial_oxytocin: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml(
            r#"
            [agent]
            cortisol_threshold = "High-Low"

            [run]
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(
            config.agent.cortisol_threshold,
            CortisolThresholdCondition::HighLow
        );
        assert_eq!(config.run.seed, Some(9));
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = SimConfig::from_toml("[world]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = SimConfig::load("/nonexistent/oxyworld.toml").unwrap();
        assert_eq!(config, SimConfig::default());
    }
}

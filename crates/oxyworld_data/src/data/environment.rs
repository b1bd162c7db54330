use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a textual mode name does not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} must be one of: {expected} (got {value:?})")]
pub struct ParseModeError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Governs whether and how the fixed food sources are hidden and revealed over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorldDynamics {
    /// Food sources never change.
    #[default]
    Static,
    /// One source at a time is hidden, then the hidden ones return in reverse order.
    Seasonal,
    /// Three of the four sources vanish together, then come back together.
    Extreme,
}

impl WorldDynamics {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldDynamics::Static => "Static",
            WorldDynamics::Seasonal => "Seasonal",
            WorldDynamics::Extreme => "Extreme",
        }
    }

    /// Number of phases in one full cycle.
    #[must_use]
    pub fn phase_count(&self) -> u32 {
        match self {
            WorldDynamics::Static => 1,
            WorldDynamics::Seasonal => 6,
            WorldDynamics::Extreme => 2,
        }
    }
}

impl fmt::Display for WorldDynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorldDynamics {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Static" => Ok(WorldDynamics::Static),
            "Seasonal" => Ok(WorldDynamics::Seasonal),
            "Extreme" => Ok(WorldDynamics::Extreme),
            other => Err(ParseModeError {
                kind: "world dynamics",
                value: other.to_string(),
                expected: "Static, Seasonal, Extreme",
            }),
        }
    }
}

/// Whether dyadic bond strength stays frozen or evolves with interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DsiMode {
    #[default]
    Fixed,
    Variable,
}

impl DsiMode {
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, DsiMode::Variable)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DsiMode::Fixed => "Fixed",
            DsiMode::Variable => "Variable",
        }
    }
}

impl fmt::Display for DsiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DsiMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Fixed" => Ok(DsiMode::Fixed),
            "Variable" => Ok(DsiMode::Variable),
            other => Err(ParseModeError {
                kind: "DSI mode",
                value: other.to_string(),
                expected: "Fixed, Variable",
            }),
        }
    }
}

/// Selects the cortisol level above which an agent counts as stressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CortisolThresholdCondition {
    /// Threshold above the hormone range: agents never become stressed.
    Control,
    #[default]
    Neutral,
    High,
    Low,
    /// Rank 1 gets the highest threshold, rank 6 the lowest.
    #[serde(rename = "Low-High")]
    LowHigh,
    /// Rank 1 gets the lowest threshold, rank 6 the highest.
    #[serde(rename = "High-Low")]
    HighLow,
}

impl CortisolThresholdCondition {
    /// Adaptive threshold for an agent of the given rank.
    ///
    /// Rank-dependent conditions are only defined for ranks 1 through 6.
    #[must_use]
    pub fn threshold(&self, rank: u32) -> Option<f64> {
        match self {
            CortisolThresholdCondition::Control => Some(1.1),
            CortisolThresholdCondition::Neutral => Some(0.5),
            CortisolThresholdCondition::High => Some(0.7),
            CortisolThresholdCondition::Low => Some(0.2),
            CortisolThresholdCondition::LowHigh => match rank {
                1..=6 => Some(0.7 - f64::from(rank - 1) * 0.1),
                _ => None,
            },
            CortisolThresholdCondition::HighLow => match rank {
                1..=6 => Some(0.2 + f64::from(rank - 1) * 0.1),
                _ => None,
            },
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CortisolThresholdCondition::Control => "Control",
            CortisolThresholdCondition::Neutral => "Neutral",
            CortisolThresholdCondition::High => "High",
            CortisolThresholdCondition::Low => "Low",
            CortisolThresholdCondition::LowHigh => "Low-High",
            CortisolThresholdCondition::HighLow => "High-Low",
        }
    }
}

impl fmt::Display for CortisolThresholdCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CortisolThresholdCondition {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Control" => Ok(CortisolThresholdCondition::Control),
            "Neutral" => Ok(CortisolThresholdCondition::Neutral),
            "High" => Ok(CortisolThresholdCondition::High),
            "Low" => Ok(CortisolThresholdCondition::Low),
            "Low-High" => Ok(CortisolThresholdCondition::LowHigh),
            "High-Low" => Ok(CortisolThresholdCondition::HighLow),
            other => Err(ParseModeError {
                kind: "cortisol threshold condition",
                value: other.to_string(),
                expected: "Control, Neutral, High, Low, Low-High, High-Low",
            }),
        }
    }
}

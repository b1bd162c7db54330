//! Error types for the simulation engine.
//!
//! Configuration problems are fatal at startup. Bounds problems are reported
//! per operation and never abort a running simulation on their own.

use oxyworld_data::data::bonds::ParseBondsError;
use oxyworld_data::ParseModeError;
use thiserror::Error;

/// Problems detected while assembling a run. Always fatal to that run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Unknown DSI mode, world-dynamics mode or cortisol-threshold condition name.
    #[error(transparent)]
    Mode(#[from] ParseModeError),

    #[error(transparent)]
    Bonds(#[from] ParseBondsError),

    #[error("invalid cortisol threshold condition {condition} for agent rank {rank}")]
    CortisolThreshold { condition: String, rank: u32 },

    #[error("invalid agent id {id}: bonded ids must be in 1..={population}")]
    BondIdOutOfRange { id: u32, population: u32 },

    #[error("agent bond duplicate: id {id} repeated in bond group {group}")]
    DuplicateBond { id: u32, group: usize },

    #[error("agent {id} appears in more than one bond group")]
    OverlappingBondGroups { id: u32 },

    #[error("population must contain at least one agent")]
    EmptyPopulation,

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// A grid coordinate outside the open interval (0, width) x (0, height).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("coordinate ({x}, {y}) outside (0, {width}) x (0, {height})")]
pub struct BoundsError {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
}

/// Main error type for engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// Broken internal invariant; indicates a defect rather than bad input.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::Invariant(msg.into())
    }

    /// Whether the running simulation can absorb this error and carry on.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::Bounds(_))
    }
}

//! # oxyworld core
//!
//! Tick-based simulation of hormone-driven social agents on a bounded 2-D plane.
//!
//! This crate contains the three tightly coupled systems of the engine:
//! - **Spatial world**: discretized occupancy grid, cone-of-vision sensing,
//!   boundary walls and periodic food cycling
//! - **Agent behaviour**: vision-driven action selection, hormone updates,
//!   grooming, aggression and shared feeding
//! - **Scheduler**: lockstep tick loop with parallel agent steps, a hard
//!   barrier per tick, reporting and pause/resume control
//!
//! ## Example
//!
//! ```
//! use oxyworld_core::config::SimConfig;
//! use oxyworld_core::setup::{RunParameters, SimulationBuilder};
//! use oxyworld_data::{BondGroups, DsiMode, WorldDynamics};
//!
//! let params = RunParameters::new(4, WorldDynamics::Static, BondGroups::none(), DsiMode::Fixed);
//! let mut sim = SimulationBuilder::new(SimConfig::default(), params)
//!     .seed(7)
//!     .iterations(10)
//!     .build()
//!     .unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.iterations, 10);
//! ```

/// Agent state, hormones and behavioural decisions
pub mod agent;
/// Configuration management for simulation parameters
pub mod config;
/// Roster of polymorphic entities stepped each tick
pub mod entity;
/// Error taxonomy shared by every subsystem
pub mod error;
/// Depletable, regenerating food sources
pub mod food;
/// Vector math, sector tests and segment intersection
pub mod geometry;
/// Occupancy grid with multi-occupant cell resolution
pub mod grid;
/// Tick counters and structured logging
pub mod metrics;
/// Tick loop, state machine and control commands
pub mod scheduler;
/// Validated construction of a run from its start parameters
pub mod setup;
#[cfg(test)]
mod test_support;
/// Cone-of-vision sensing against agents, food and walls
pub mod vision;
/// Spatial world: grid lock, vision slots and world-dynamics cycling
pub mod world;

pub use agent::{Agent, AgentView};
pub use entity::{EntityRef, Roster};
pub use error::{BoundsError, ConfigError, Result, SimError};
pub use metrics::{init_logging, Metrics};
pub use scheduler::{ControlCommand, ReportFlow, Scheduler, SchedulerState};
pub use world::World;

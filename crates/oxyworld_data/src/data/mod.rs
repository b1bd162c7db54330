//! Core data structures for the oxyworld simulation.

pub mod bonds;
pub mod entity;
pub mod environment;
pub mod stats;

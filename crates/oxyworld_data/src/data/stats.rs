use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Ticks fully executed (barrier joined and reported).
    pub iterations: u64,
    pub live_agents: usize,
    pub dead_agents: usize,
    pub grooms: u64,
    pub aggressions: u64,
    pub meals: u64,
    pub elapsed_ms: u64,
    /// True when the run stopped before its iteration limit.
    pub terminated_early: bool,
}

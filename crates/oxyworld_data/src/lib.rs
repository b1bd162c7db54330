//! Plain data shared between the oxyworld engine and its surrounding layers.

pub mod data;

pub use data::bonds::{BondGroups, ParseBondsError};
pub use data::entity::{EntityKind, EntityRecord, TickFrame};
pub use data::environment::{CortisolThresholdCondition, DsiMode, ParseModeError, WorldDynamics};
pub use data::stats::RunSummary;

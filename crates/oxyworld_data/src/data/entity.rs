use serde::{Deserialize, Serialize};

/// Kind of a roster entity as it appears in the snapshot feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Agent,
    Food,
}

/// Position record for one roster entry at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    /// Agent id (1..=N) or food id (1..=F); the two are numbered independently.
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub alive: bool,
}

/// One message of the per-tick snapshot stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TickFrame {
    /// All current roster entries after the tick's barrier join.
    Tick {
        iteration: u64,
        entities: Vec<EntityRecord>,
    },
    /// End-of-stream marker; no frame follows it.
    End { iterations: u64 },
}

impl TickFrame {
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, TickFrame::End { .. })
    }

    /// Agent records of a tick frame, in roster order.
    pub fn agents(&self) -> impl Iterator<Item = &EntityRecord> {
        let entities: &[EntityRecord] = match self {
            TickFrame::Tick { entities, .. } => entities,
            TickFrame::End { .. } => &[],
        };
        entities.iter().filter(|e| e.kind == EntityKind::Agent)
    }
}

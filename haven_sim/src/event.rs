// Player-visible narrative events.
//
// Every store operation returns a `StepResult` listing what happened, in
// the order it happened. Events are output only: the snapshot is the truth,
// and events let a UI animate or log changes without diffing snapshots.
// Rejections show up here as events too, never as errors.
//
// See also: `store.rs` which emits these, `command.rs` for the input side.

use crate::harvest::Rejection;
use crate::inventory::InventoryError;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A narrative event stamped with the host time it happened at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub at_ms: u64,
    pub kind: GameEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// The player left the title screen; the clock is running.
    SessionStarted,
    /// A fresh world was placed.
    WorldGenerated { object_count: usize },
    PlayerMoved { from: Position, to: Position },
    HarvestStarted { object_id: String, ready_at_ms: u64 },
    HarvestRejected { object_id: String, reason: Rejection },
    /// An accepted harvest. `gains` lists what was rolled; a full inventory
    /// may have dropped some of it.
    ResourcesGained {
        object_id: String,
        gains: Vec<ResourceGain>,
        experience: u32,
    },
    ObjectDepleted { object_id: String },
    DayStarted { day: u32 },
    ToolEquipped { tool_type: ToolType },
    ToolUnequipped { tool_type: ToolType },
    ResourcesSpent { costs: Vec<ResourceGain> },
    SpendRejected { error: InventoryError },
    /// The persistence backend failed. The in-memory state is unaffected.
    SaveFailed { reason: String },
}

/// Output of one store operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepResult {
    pub events: Vec<GameEvent>,
}

impl StepResult {
    pub fn push(&mut self, at_ms: u64, kind: GameEventKind) {
        self.events.push(GameEvent { at_ms, kind });
    }

    pub fn extend(&mut self, other: StepResult) {
        self.events.extend(other.events);
    }

    pub fn kinds(&self) -> impl Iterator<Item = &GameEventKind> {
        self.events.iter().map(|e| &e.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// Commands that mutate session state.
//
// Every external change to a session goes through `GameStateStore`, either
// via its typed methods or by handing a `GameCommand` to `apply()`. The
// command form exists so a host can queue, log, or replay player intent:
// a recorded seed plus the recorded command list rebuilds a session exactly.
//
// A `GameCommand` carries the host's wall-clock time (`now_ms`) and a
// `GameAction`. The store never reads a clock of its own.
//
// See also: `store.rs` for `apply()` which dispatches these, `event.rs` for
// what comes back.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// A player action stamped with the host time it happened at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameCommand {
    pub now_ms: u64,
    pub action: GameAction,
}

impl GameCommand {
    pub fn new(now_ms: u64, action: GameAction) -> Self {
        Self { now_ms, action }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameAction {
    /// Leave the title screen. The clock only runs after this.
    StartSession,
    /// Teleport the player. No collision checks.
    MovePlayer { position: Position },
    /// Start harvesting an object; arms the busy guard.
    BeginHarvest { object_id: String },
    /// Resolve the pending harvest if its duration has passed.
    FinishHarvest,
    /// Real time has passed. The command's `now_ms` is not consulted.
    Tick { elapsed_ms: u64 },
    EquipTool { tool_type: ToolType },
    UnequipTool,
    /// Pay resources out of the inventory, all or nothing.
    SpendResources { costs: Vec<ResourceGain> },
    /// Persist the full snapshot.
    Save,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serialization_roundtrip() {
        let commands = vec![
            GameCommand::new(0, GameAction::StartSession),
            GameCommand::new(
                10,
                GameAction::BeginHarvest {
                    object_id: "tree_3".into(),
                },
            ),
            GameCommand::new(
                20,
                GameAction::SpendResources {
                    costs: vec![ResourceGain::new(ResourceType::Wood, 3)],
                },
            ),
        ];
        let json = serde_json::to_string(&commands).unwrap();
        let restored: Vec<GameCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(commands, restored);
    }
}

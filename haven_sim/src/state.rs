// Player and game-state snapshot types.
//
// `GameState` is the aggregate root: the player, every world object, the
// clock reading, and the environment records. The store owns exactly one
// and replaces it wholesale on every mutation. Each `with_*` method here
// consumes nothing and returns a new snapshot, leaving the original intact,
// so a caller holding an older snapshot never sees it change.
//
// Field names serialize in camelCase to match the saved-game format.
// Structures, threats, season, and weather are carried so the snapshot is
// complete, but nothing simulates them yet.
//
// See also: `store.rs` which drives these transitions, `persistence.rs` for
// how a snapshot is split into saved blobs and rebuilt.

use crate::catalog::ResourceCatalog;
use crate::clock::ClockReading;
use crate::config::GameConfig;
use crate::harvest::HarvestOutcome;
use crate::inventory::Inventory;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Name given to players who have not chosen one.
pub const DEFAULT_PLAYER_NAME: &str = "Survivor";

/// Vital stats. Each value is kept in `[0, max]` independently.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub health: f32,
    pub max_health: f32,
    pub hunger: f32,
    pub max_hunger: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub warmth: f32,
    pub max_warmth: f32,
}

impl PlayerStats {
    /// Every stat at its configured maximum.
    pub fn full(config: &GameConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            hunger: config.max_hunger,
            max_hunger: config.max_hunger,
            energy: config.max_energy,
            max_energy: config.max_energy,
            warmth: config.max_warmth,
            max_warmth: config.max_warmth,
        }
    }

    /// Copy with each stat pulled into `[0, max]`. NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn clamp(value: f32, max: f32) -> f32 {
            let max = max.max(0.0);
            if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, max)
            }
        }
        Self {
            health: clamp(self.health, self.max_health),
            hunger: clamp(self.hunger, self.max_hunger),
            energy: clamp(self.energy, self.max_energy),
            warmth: clamp(self.warmth, self.max_warmth),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub experience: u32,
    pub stats: PlayerStats,
    pub position: Position,
    pub inventory: Inventory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipped_tool: Option<Tool>,
    pub max_inventory_slots: u32,
}

impl Player {
    /// A brand-new player at the spawn point with the starting inventory.
    pub fn fresh(config: &GameConfig, catalog: &ResourceCatalog, id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: DEFAULT_PLAYER_NAME.to_string(),
            level: 1,
            experience: 0,
            stats: PlayerStats::full(config),
            position: config.spawn_position,
            inventory: starting_inventory(config, catalog),
            equipped_tool: None,
            max_inventory_slots: config.max_inventory_slots,
        }
    }
}

/// The configured starting stacks, one slot per entry.
pub fn starting_inventory(config: &GameConfig, catalog: &ResourceCatalog) -> Inventory {
    Inventory(
        config
            .starting_resources
            .iter()
            .map(|gain| catalog.new_stack(&gain.resource_type, gain.quantity))
            .collect(),
    )
}

/// The whole session at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub player: Player,
    pub world_objects: Vec<WorldObject>,
    pub structures: Vec<Structure>,
    pub threats: Vec<Threat>,
    /// Hour of day in [0, 24).
    pub time_of_day: f64,
    /// Starts at 1.
    pub day_count: u32,
    pub season: Season,
    pub weather: Weather,
    pub game_mode: GameMode,
    pub difficulty: Difficulty,
}

impl GameState {
    /// Start-of-game snapshot around an already generated world.
    pub fn fresh(config: &GameConfig, player: Player, world_objects: Vec<WorldObject>) -> Self {
        Self {
            player,
            world_objects,
            structures: Vec::new(),
            threats: Vec::new(),
            time_of_day: config.starting_time_of_day,
            day_count: 1,
            season: Season::default(),
            weather: Weather::default(),
            game_mode: GameMode::default(),
            difficulty: Difficulty::default(),
        }
    }

    pub fn object(&self, id: &str) -> Option<&WorldObject> {
        self.world_objects.iter().find(|o| o.id == id)
    }

    pub fn clock_reading(&self) -> ClockReading {
        ClockReading {
            time_of_day: self.time_of_day,
            day_count: self.day_count,
        }
    }

    pub fn with_player_position(&self, position: Position) -> Self {
        let mut next = self.clone();
        next.player.position = position;
        next
    }

    pub fn with_clock(&self, reading: ClockReading) -> Self {
        let mut next = self.clone();
        next.time_of_day = reading.time_of_day;
        next.day_count = reading.day_count;
        next
    }

    pub fn with_inventory(&self, inventory: Inventory) -> Self {
        let mut next = self.clone();
        next.player.inventory = inventory;
        next
    }

    pub fn with_equipped(&self, tool: Option<Tool>) -> Self {
        let mut next = self.clone();
        next.player.equipped_tool = tool;
        next
    }

    /// Fold an accepted harvest in: swap the damaged object into place, set
    /// the new inventory, add experience.
    pub fn with_harvest(&self, outcome: &HarvestOutcome, inventory: Inventory) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next
            .world_objects
            .iter_mut()
            .find(|o| o.id == outcome.updated_object.id)
        {
            *slot = outcome.updated_object.clone();
        }
        next.player.inventory = inventory;
        next.player.experience = next.player.experience.saturating_add(outcome.experience_delta);
        next
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn fresh_state() -> GameState {
        let config = GameConfig::default();
        let catalog = ResourceCatalog::from_config(&config);
        let bush = catalog
            .template("berry_bush")
            .unwrap()
            .instantiate("bush_0".into(), Position::new(2, 2));
        GameState::fresh(&config, Player::fresh(&config, &catalog, "p1"), vec![bush])
    }

    #[test]
    fn fresh_state_matches_config() {
        let state = fresh_state();
        assert_eq!(state.time_of_day, 8.0);
        assert_eq!(state.day_count, 1);
        assert_eq!(state.season, Season::Spring);
        assert_eq!(state.weather.kind, WeatherType::Clear);
        assert_eq!(state.player.position, Position::new(10, 7));
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.max_inventory_slots, 20);
        let inv = &state.player.inventory;
        assert_eq!(inv.quantity_of(&ResourceType::Wood), 10);
        assert_eq!(inv.quantity_of(&ResourceType::Stone), 5);
        assert_eq!(inv.quantity_of(&ResourceType::Food), 3);
        assert_eq!(state.player.stats.health, 100.0);
    }

    #[test]
    fn transitions_leave_the_original_untouched() {
        let before = fresh_state();
        let after = before.with_player_position(Position::new(0, 0));
        assert_eq!(before.player.position, Position::new(10, 7));
        assert_eq!(after.player.position, Position::new(0, 0));

        let later = before.with_clock(ClockReading {
            time_of_day: 0.0,
            day_count: 2,
        });
        assert_eq!(before.day_count, 1);
        assert_eq!(later.day_count, 2);
    }

    #[test]
    fn with_harvest_replaces_object_and_adds_experience() {
        let state = fresh_state();
        let mut depleted = state.object("bush_0").unwrap().clone();
        depleted.health = 0;
        depleted.last_harvested = Some(10);
        let outcome = HarvestOutcome {
            resources_gained: smallvec![ResourceGain::new(ResourceType::Food, 2)],
            updated_object: depleted.clone(),
            experience_delta: 5,
        };
        let next = state.with_harvest(&outcome, Inventory::default());
        assert_eq!(next.object("bush_0"), Some(&depleted));
        assert_eq!(next.player.experience, 5);
        assert_eq!(next.player.inventory.slots_used(), 0);
        assert_eq!(state.object("bush_0").unwrap().health, 10);
    }

    #[test]
    fn stats_clamp_independently() {
        let stats = PlayerStats {
            health: 140.0,
            hunger: -3.0,
            energy: f32::NAN,
            warmth: 55.0,
            ..PlayerStats::full(&GameConfig::default())
        }
        .clamped();
        assert_eq!(stats.health, 100.0);
        assert_eq!(stats.hunger, 0.0);
        assert_eq!(stats.energy, 0.0);
        assert_eq!(stats.warmth, 55.0);
    }

    #[test]
    fn snapshot_json_roundtrip() {
        let state = fresh_state().with_equipped(Some(Tool {
            tool_type: ToolType::Knife,
            durability: 40,
            max_durability: 40,
            efficiency: 1.2,
        }));
        let json = state.to_json().unwrap();
        assert!(json.contains("\"timeOfDay\""));
        assert!(json.contains("\"equippedTool\""));
        assert_eq!(GameState::from_json(&json).unwrap(), state);
    }
}

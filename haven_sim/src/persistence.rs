// Persistence boundary: saved-game records and the repository seam.
//
// A session is stored as one `SavedGame` record keyed by `"game_" +
// player_id`. The record holds the clock reading directly and two nested
// JSON strings: `worldObjects` (an array of world objects) and `playerData`
// (the player object). The nesting is a second encoding layer inside the
// outer record, so backends that store flat rows never need to understand
// the game's types.
//
// Writing goes through `GameRepository`:
// - `create` writes a whole record, overwriting any existing one.
// - `update` merges a `SavedGamePatch` into an existing record, and fails
//   with `NotFound` if there is none.
//
// Reading goes through `restore`, which rebuilds a `GameState` from a
// record. Saved data may be partial: every missing field takes its
// fresh-game default. Only absence counts as missing, so a saved time of
// day of 0 stays 0. Blobs that are present but do not parse are a hard
// `LoadError`.
//
// See also: `store.rs` which decides when to create, update, or restore,
// `state.rs` for the snapshot being split and rebuilt.

use crate::catalog::ResourceCatalog;
use crate::config::{ConfigError, GameConfig};
use crate::inventory::Inventory;
use crate::state::{DEFAULT_PLAYER_NAME, GameState, Player, PlayerStats, starting_inventory};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage key for a player's saved game.
pub fn record_id(player_id: &str) -> String {
    format!("game_{player_id}")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One stored session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub world_objects: String,
    #[serde(default)]
    pub player_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f64>,
}

impl SavedGame {
    /// Encode a whole snapshot.
    pub fn from_state(state: &GameState) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: record_id(&state.player.id),
            user_id: state.player.id.clone(),
            world_objects: serde_json::to_string(&state.world_objects)?,
            player_data: serde_json::to_string(&state.player)?,
            day_count: Some(state.day_count),
            time_of_day: Some(state.time_of_day),
        })
    }

    /// Overwrite every field the patch carries.
    pub fn apply(&mut self, patch: SavedGamePatch) {
        if let Some(world_objects) = patch.world_objects {
            self.world_objects = world_objects;
        }
        if let Some(player_data) = patch.player_data {
            self.player_data = player_data;
        }
        if let Some(day_count) = patch.day_count {
            self.day_count = Some(day_count);
        }
        if let Some(time_of_day) = patch.time_of_day {
            self.time_of_day = Some(time_of_day);
        }
    }
}

/// A partial record for `GameRepository::update`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGamePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_objects: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f64>,
}

impl SavedGamePatch {
    /// What a harvest changes: the world and the player. The clock is left
    /// to full saves.
    pub fn after_harvest(state: &GameState) -> Result<Self, PersistenceError> {
        Ok(Self {
            world_objects: Some(serde_json::to_string(&state.world_objects)?),
            player_data: Some(serde_json::to_string(&state.player)?),
            ..Self::default()
        })
    }

    /// Player data only.
    pub fn player_only(state: &GameState) -> Result<Self, PersistenceError> {
        Ok(Self {
            player_data: Some(serde_json::to_string(&state.player)?),
            ..Self::default()
        })
    }

    /// Everything, including the clock.
    pub fn full(state: &GameState) -> Result<Self, PersistenceError> {
        let saved = SavedGame::from_state(state)?;
        Ok(Self {
            world_objects: Some(saved.world_objects),
            player_data: Some(saved.player_data),
            day_count: saved.day_count,
            time_of_day: saved.time_of_day,
        })
    }
}

/// `playerData` as found on disk. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRecord {
    name: Option<String>,
    level: Option<u32>,
    experience: Option<u32>,
    stats: Option<StatsRecord>,
    position: Option<Position>,
    inventory: Option<Inventory>,
    equipped_tool: Option<Tool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct StatsRecord {
    health: Option<f32>,
    hunger: Option<f32>,
    energy: Option<f32>,
    warmth: Option<f32>,
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

/// Rebuild a snapshot from a stored record, filling gaps with defaults.
///
/// Stat maximums and the slot limit always come from `config`, not from the
/// record. Stats are clamped into range and object health is capped at its
/// maximum. A day count of 0 or an hour outside `[0, 24)` falls back to the
/// fresh-game value; empty inventory stacks are dropped.
pub fn restore(
    saved: &SavedGame,
    player_id: &str,
    config: &GameConfig,
    catalog: &ResourceCatalog,
) -> Result<GameState, LoadError> {
    let mut world_objects: Vec<WorldObject> = if saved.world_objects.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&saved.world_objects).map_err(|source| LoadError::Corrupt {
            field: "worldObjects",
            source,
        })?
    };
    for object in &mut world_objects {
        object.health = object.health.min(object.max_health);
    }

    let record: PlayerRecord = if saved.player_data.trim().is_empty() {
        PlayerRecord::default()
    } else {
        serde_json::from_str(&saved.player_data).map_err(|source| LoadError::Corrupt {
            field: "playerData",
            source,
        })?
    };

    let full = PlayerStats::full(config);
    let saved_stats = record.stats.unwrap_or_default();
    let stats = PlayerStats {
        health: saved_stats.health.unwrap_or(full.health),
        hunger: saved_stats.hunger.unwrap_or(full.hunger),
        energy: saved_stats.energy.unwrap_or(full.energy),
        warmth: saved_stats.warmth.unwrap_or(full.warmth),
        ..full
    }
    .clamped();

    let player = Player {
        id: player_id.to_string(),
        name: record.name.unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string()),
        level: record.level.unwrap_or(1),
        experience: record.experience.unwrap_or(0),
        stats,
        position: record.position.unwrap_or(config.spawn_position),
        inventory: record
            .inventory
            .map(|Inventory(stacks)| {
                Inventory(stacks.into_iter().filter(|s| s.quantity > 0).collect())
            })
            .unwrap_or_else(|| starting_inventory(config, catalog)),
        equipped_tool: record.equipped_tool,
        max_inventory_slots: config.max_inventory_slots,
    };

    let mut state = GameState::fresh(config, player, world_objects);
    // Zero is a real hour. Anything outside the clock face is not.
    if let Some(time_of_day) = saved.time_of_day.filter(|t| (0.0..24.0).contains(t)) {
        state.time_of_day = time_of_day;
    }
    if let Some(day_count) = saved.day_count.filter(|&d| d >= 1) {
        state.day_count = day_count;
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Repository seam
// ---------------------------------------------------------------------------

/// Record store keyed by `record_id(player_id)`.
pub trait GameRepository {
    fn load(&mut self, player_id: &str) -> Result<Option<SavedGame>, PersistenceError>;

    /// Write a whole record. Overwrites.
    fn create(&mut self, record: SavedGame) -> Result<(), PersistenceError>;

    /// Merge a patch into an existing record.
    fn update(&mut self, id: &str, patch: SavedGamePatch) -> Result<(), PersistenceError>;
}

/// In-process backend. Used by tests and by hosts without real storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    records: BTreeMap<String, SavedGame>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&SavedGame> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store a record as-is, e.g. to seed a test with hand-written data.
    pub fn insert(&mut self, record: SavedGame) {
        self.records.insert(record.id.clone(), record);
    }
}

impl GameRepository for MemoryRepository {
    fn load(&mut self, player_id: &str) -> Result<Option<SavedGame>, PersistenceError> {
        Ok(self.records.get(&record_id(player_id)).cloned())
    }

    fn create(&mut self, record: SavedGame) -> Result<(), PersistenceError> {
        self.insert(record);
        Ok(())
    }

    fn update(&mut self, id: &str, patch: SavedGamePatch) -> Result<(), PersistenceError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        record.apply(patch);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A repository call failed. Always recoverable: the session keeps playing.
#[derive(Debug)]
pub enum PersistenceError {
    Serialize(serde_json::Error),
    NotFound(String),
    Backend(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serialize(e)
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialize(e) => write!(f, "serialization error: {e}"),
            PersistenceError::NotFound(id) => write!(f, "no saved game {id}"),
            PersistenceError::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

/// Startup could not produce a session. Surfaced to the host.
#[derive(Debug)]
pub enum LoadError {
    /// A saved blob exists but does not parse.
    Corrupt {
        field: &'static str,
        source: serde_json::Error,
    },
    /// The configuration is unusable.
    Config(Vec<ConfigError>),
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Config(vec![e])
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Corrupt { field, source } => {
                write!(f, "saved {field} is corrupt: {source}")
            }
            LoadError::Config(errors) => {
                write!(f, "invalid configuration:")?;
                for e in errors {
                    write!(f, " {e};")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Corrupt { source, .. } => Some(source),
            LoadError::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GameConfig, ResourceCatalog) {
        let config = GameConfig::default();
        let catalog = ResourceCatalog::from_config(&config);
        (config, catalog)
    }

    fn sample_state(config: &GameConfig, catalog: &ResourceCatalog) -> GameState {
        let bush = catalog
            .template("berry_bush")
            .unwrap()
            .instantiate("bush_0".into(), Position::new(4, 4));
        let mut state = GameState::fresh(config, Player::fresh(config, catalog, "p7"), vec![bush]);
        state.time_of_day = 13.5;
        state.day_count = 3;
        state.player.experience = 15;
        state
    }

    #[test]
    fn record_id_is_prefixed() {
        assert_eq!(record_id("abc"), "game_abc");
    }

    #[test]
    fn saved_game_nests_json_strings() {
        let (config, catalog) = setup();
        let saved = SavedGame::from_state(&sample_state(&config, &catalog)).unwrap();
        let value = serde_json::to_value(&saved).unwrap();
        assert_eq!(value["id"], "game_p7");
        assert_eq!(value["userId"], "p7");
        assert!(value["worldObjects"].is_string());
        assert!(value["playerData"].is_string());
        assert_eq!(value["dayCount"], 3);
        assert_eq!(value["timeOfDay"], 13.5);
    }

    #[test]
    fn restore_is_lossless_for_a_full_record() {
        let (config, catalog) = setup();
        let state = sample_state(&config, &catalog);
        let saved = SavedGame::from_state(&state).unwrap();
        let restored = restore(&saved, "p7", &config, &catalog).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let (config, catalog) = setup();
        let saved = SavedGame {
            id: record_id("p1"),
            user_id: "p1".into(),
            world_objects: String::new(),
            player_data: r#"{"experience": 40, "stats": {"health": 35.0}}"#.into(),
            day_count: None,
            time_of_day: None,
        };
        let state = restore(&saved, "p1", &config, &catalog).unwrap();
        assert!(state.world_objects.is_empty());
        assert_eq!(state.time_of_day, 8.0);
        assert_eq!(state.day_count, 1);
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.experience, 40);
        assert_eq!(state.player.stats.health, 35.0);
        assert_eq!(state.player.stats.hunger, 100.0);
        assert_eq!(state.player.position, Position::new(10, 7));
        assert_eq!(state.player.inventory.quantity_of(&ResourceType::Wood), 10);
    }

    #[test]
    fn zero_values_are_not_treated_as_missing() {
        let (config, catalog) = setup();
        let saved = SavedGame {
            id: record_id("p1"),
            user_id: "p1".into(),
            world_objects: "[]".into(),
            player_data: r#"{"experience": 0, "stats": {"health": 0.0}, "inventory": []}"#.into(),
            day_count: Some(2),
            time_of_day: Some(0.0),
        };
        let state = restore(&saved, "p1", &config, &catalog).unwrap();
        assert_eq!(state.time_of_day, 0.0);
        assert_eq!(state.player.stats.health, 0.0);
        assert_eq!(state.player.inventory.slots_used(), 0);
    }

    #[test]
    fn impossible_clock_values_fall_back_to_a_fresh_clock() {
        let (config, catalog) = setup();
        for (day_count, time_of_day) in [(0, -5.0), (0, 24.0), (4, f64::NAN), (4, 31.5)] {
            let saved = SavedGame {
                id: record_id("p1"),
                user_id: "p1".into(),
                world_objects: "[]".into(),
                player_data: "{}".into(),
                day_count: Some(day_count),
                time_of_day: Some(time_of_day),
            };
            let state = restore(&saved, "p1", &config, &catalog).unwrap();
            assert_eq!(state.day_count, day_count.max(1));
            assert_eq!(state.time_of_day, 8.0);
        }
    }

    #[test]
    fn empty_stacks_are_dropped_on_restore() {
        let (config, catalog) = setup();
        let saved = SavedGame {
            id: record_id("p1"),
            user_id: "p1".into(),
            world_objects: "[]".into(),
            player_data: r#"{"inventory": [
                {"resourceType": "wood", "quantity": 0, "maxStack": 50},
                {"resourceType": "stone", "quantity": 2, "maxStack": 50}
            ]}"#
            .into(),
            day_count: Some(1),
            time_of_day: Some(23.5),
        };
        let state = restore(&saved, "p1", &config, &catalog).unwrap();
        assert_eq!(state.time_of_day, 23.5);
        assert_eq!(state.player.inventory.slots_used(), 1);
        assert_eq!(state.player.inventory.quantity_of(&ResourceType::Stone), 2);
        assert_eq!(state.player.inventory.quantity_of(&ResourceType::Wood), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let (config, catalog) = setup();
        let mut state = sample_state(&config, &catalog);
        state.world_objects[0].health = 500;
        state.player.stats.warmth = 250.0;
        let saved = SavedGame::from_state(&state).unwrap();
        let restored = restore(&saved, "p7", &config, &catalog).unwrap();
        assert_eq!(restored.world_objects[0].health, 10);
        assert_eq!(restored.player.stats.warmth, 100.0);
    }

    #[test]
    fn corrupt_blob_is_a_hard_error() {
        let (config, catalog) = setup();
        let saved = SavedGame {
            id: record_id("p1"),
            user_id: "p1".into(),
            world_objects: "[{\"id\": 3".into(),
            player_data: String::new(),
            day_count: None,
            time_of_day: None,
        };
        let err = restore(&saved, "p1", &config, &catalog).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { field: "worldObjects", .. }));
    }

    #[test]
    fn memory_repository_create_and_update() {
        let (config, catalog) = setup();
        let mut state = sample_state(&config, &catalog);
        let mut repo = MemoryRepository::new();

        let err = repo
            .update(&record_id("p7"), SavedGamePatch::after_harvest(&state).unwrap())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));

        repo.create(SavedGame::from_state(&state).unwrap()).unwrap();
        state.player.experience = 99;
        state.day_count = 8;
        repo.update(&record_id("p7"), SavedGamePatch::after_harvest(&state).unwrap())
            .unwrap();

        let saved = repo.load("p7").unwrap().unwrap();
        let restored = restore(&saved, "p7", &config, &catalog).unwrap();
        assert_eq!(restored.player.experience, 99);
        // Harvest patches leave the stored clock alone.
        assert_eq!(restored.day_count, 3);
        assert!(repo.load("nobody").unwrap().is_none());
    }
}

// Session orchestrator: the single owner of the canonical `GameState`.
//
// `GameStateStore` wires the pure components together. Each operation reads
// the current snapshot, delegates to a component (`HarvestResolver`,
// `InventoryManager`, `Clock`), builds the next snapshot with the `with_*`
// transitions in `state.rs`, and returns a `StepResult` of narrative
// events. Callers only ever get `&GameState`; nothing outside the store can
// mutate it.
//
// ## Lifecycle
//
// `initialize` validates the config, asks the repository for a saved game,
// and either restores it or builds a fresh player. If the resulting world is
// empty a new one is generated and a full record is created. A repository
// that fails to load is logged and the session starts detached (see
// Persistence); a saved record that does not parse is a hard `LoadError`.
//
// The clock is frozen until `start_session`. Before that, `tick` is a
// silent no-op and harvests are refused with `NotStarted`.
//
// ## Harvest pacing
//
// Harvesting takes `harvest_duration_ms`. `begin_harvest` checks the target
// and arms a single pending-harvest slot; while it is armed every other
// `begin_harvest` is refused with `Busy` (not queued). `finish_harvest`, or
// a `tick` that carries host time past the ready point, resolves the harvest
// against the object as it is *then*, applies gains and experience, and
// clears the slot. A harvest that has begun always resolves; there is no
// cancel. `harvest` runs both halves back to back.
//
// ## Persistence
//
// Harvests patch the saved world and player; equip/unequip/spend patch the
// player. Ticks never persist; the host calls `save` at its own pacing.
// Every repository failure is logged with `warn!`, reported as a
// `SaveFailed` event, and otherwise ignored: the in-memory state stays
// authoritative and the session keeps playing.
//
// If the initial load fails the session runs detached: it never writes, so
// a stand-in world cannot overwrite a saved game that merely failed to load.
//
// ## Time
//
// The store never reads a system clock. Every operation takes the host's
// `now_ms`; the store keeps the latest value it has seen and advances it by
// `elapsed_ms` on each tick.
//
// See also: `command.rs` / `apply()` for the command form of each
// operation, `persistence.rs` for the record format, `respawn.rs` for the
// scheduler consulted on tick.
//
// **Critical constraint: determinism.** All randomness comes from the one
// `RandomSource` the store owns, drawn in operation order. The object index
// is an `FxHashMap` used only for lookups, never iterated.

use crate::catalog::ResourceCatalog;
use crate::clock::Clock;
use crate::command::{GameAction, GameCommand};
use crate::config::GameConfig;
use crate::event::{GameEventKind, StepResult};
use crate::harvest::{HarvestResolver, Rejection};
use crate::inventory::InventoryManager;
use crate::persistence::{
    GameRepository, LoadError, PersistenceError, SavedGame, SavedGamePatch, record_id, restore,
};
use crate::prng::GameRng;
use crate::respawn::{NeverRespawn, RespawnScheduler};
use crate::rng::RandomSource;
use crate::state::{GameState, Player};
use crate::types::*;
use crate::world_gen;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

/// The harvest currently occupying the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingHarvest {
    pub object_id: String,
    pub ready_at_ms: u64,
}

pub struct GameStateStore<R, G = GameRng> {
    config: GameConfig,
    catalog: ResourceCatalog,
    clock: Clock,
    resolver: HarvestResolver,
    repository: R,
    rng: G,
    respawn: Box<dyn RespawnScheduler>,
    state: GameState,
    session_started: bool,
    /// Set when the initial load failed; no writes are attempted.
    detached: bool,
    pending_harvest: Option<PendingHarvest>,
    /// Real milliseconds not yet worth a whole clock tick.
    clock_carry_ms: u64,
    now_ms: u64,
    /// World object id -> index into `state.world_objects`.
    object_index: FxHashMap<String, usize>,
}

impl<R: GameRepository> GameStateStore<R, GameRng> {
    /// Load or create the session for `player_id`, drawing from a `GameRng`
    /// seeded with `seed`.
    pub fn initialize(
        config: GameConfig,
        repository: R,
        player_id: &str,
        seed: u64,
    ) -> Result<(Self, StepResult), LoadError> {
        Self::initialize_with_rng(config, repository, player_id, GameRng::new(seed))
    }
}

impl<R: GameRepository, G: RandomSource> GameStateStore<R, G> {
    pub fn initialize_with_rng(
        config: GameConfig,
        mut repository: R,
        player_id: &str,
        mut rng: G,
    ) -> Result<(Self, StepResult), LoadError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(LoadError::Config(errors));
        }
        let catalog = ResourceCatalog::from_config(&config);
        let mut result = StepResult::default();

        let mut detached = false;
        let saved = match repository.load(player_id) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("loading saved game for {player_id} failed, playing unsaved: {e}");
                result.push(0, GameEventKind::SaveFailed { reason: e.to_string() });
                detached = true;
                None
            }
        };

        let mut state = match &saved {
            Some(record) => {
                info!("restoring saved game {}", record.id);
                restore(record, player_id, &config, &catalog)?
            }
            None => {
                info!("no saved game for {player_id}, creating a new one");
                let player = Player::fresh(&config, &catalog, player_id);
                GameState::fresh(&config, player, Vec::new())
            }
        };

        let generated = state.world_objects.is_empty();
        if generated {
            state.world_objects = world_gen::generate(&catalog, &config.placements, &mut rng)?;
            info!("generated world with {} objects", state.world_objects.len());
            result.push(
                0,
                GameEventKind::WorldGenerated {
                    object_count: state.world_objects.len(),
                },
            );
        }

        let mut store = Self {
            clock: Clock::from_config(&config),
            resolver: HarvestResolver::from_config(&config),
            config,
            catalog,
            repository,
            rng,
            respawn: Box::new(NeverRespawn),
            state,
            session_started: false,
            detached,
            pending_harvest: None,
            clock_carry_ms: 0,
            now_ms: 0,
            object_index: FxHashMap::default(),
        };
        store.rebuild_object_index();

        if generated && !store.detached {
            let write = SavedGame::from_state(&store.state)
                .and_then(|record| store.repository.create(record));
            if let Err(e) = write {
                store.report_persistence_failure("creating saved game", e, &mut result);
            }
        }

        Ok((store, result))
    }

    /// Replace the respawn scheduler consulted on every tick.
    pub fn set_respawn_scheduler(&mut self, scheduler: Box<dyn RespawnScheduler>) {
        self.respawn = scheduler;
    }

    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// End the session and hand the backend back, e.g. to reopen it.
    pub fn into_repository(self) -> R {
        self.repository
    }

    /// The random source, e.g. for a host to snapshot its state.
    pub fn rng(&self) -> &G {
        &self.rng
    }

    pub fn is_started(&self) -> bool {
        self.session_started
    }

    /// True if the initial load failed and nothing is being saved.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn is_busy(&self) -> bool {
        self.pending_harvest.is_some()
    }

    pub fn pending_harvest(&self) -> Option<&PendingHarvest> {
        self.pending_harvest.as_ref()
    }

    /// Latest host time the store has seen.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_daytime(&self) -> bool {
        self.clock.is_daytime(self.state.time_of_day)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn start_session(&mut self, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        if !self.session_started {
            self.session_started = true;
            info!("session started for {}", self.state.player.id);
            result.push(self.now_ms, GameEventKind::SessionStarted);
        }
        result
    }

    /// Put the player on `position`. No bounds or collision checks.
    pub fn move_player(&mut self, position: Position, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let from = self.state.player.position;
        self.state = self.state.with_player_position(position);
        let mut result = StepResult::default();
        result.push(self.now_ms, GameEventKind::PlayerMoved { from, to: position });
        result
    }

    pub fn begin_harvest(&mut self, object_id: &str, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        if let Err(reason) = self.check_harvest(object_id) {
            self.reject(object_id, reason, &mut result);
            return result;
        }
        let ready_at_ms = now_ms + self.config.harvest_duration_ms;
        self.pending_harvest = Some(PendingHarvest {
            object_id: object_id.to_string(),
            ready_at_ms,
        });
        result.push(
            self.now_ms,
            GameEventKind::HarvestStarted {
                object_id: object_id.to_string(),
                ready_at_ms,
            },
        );
        result
    }

    /// Resolve the pending harvest if `now_ms` has reached its ready point.
    /// Does nothing otherwise.
    pub fn finish_harvest(&mut self, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        let ready = self
            .pending_harvest
            .as_ref()
            .is_some_and(|p| now_ms >= p.ready_at_ms);
        if !ready {
            return result;
        }
        let Some(pending) = self.pending_harvest.take() else {
            return result;
        };
        self.resolve_harvest(&pending.object_id, now_ms, &mut result);
        result
    }

    /// Begin and immediately finish, as if the harvest duration had passed.
    /// A refused begin finishes nothing, including a harvest already pending.
    pub fn harvest(&mut self, object_id: &str, now_ms: u64) -> StepResult {
        let mut result = self.begin_harvest(object_id, now_ms);
        let armed = result.kinds().find_map(|k| match k {
            GameEventKind::HarvestStarted { ready_at_ms, .. } => Some(*ready_at_ms),
            _ => None,
        });
        if let Some(ready_at_ms) = armed {
            result.extend(self.finish_harvest(ready_at_ms));
        }
        result
    }

    /// Advance the clock by `elapsed_ms` of real time. Does nothing before
    /// the session has started.
    pub fn tick(&mut self, elapsed_ms: u64) -> StepResult {
        let mut result = StepResult::default();
        if !self.session_started {
            return result;
        }
        self.now_ms += elapsed_ms;

        let advance = self
            .clock
            .advance(self.state.clock_reading(), self.clock_carry_ms + elapsed_ms);
        self.clock_carry_ms = advance.leftover_ms;
        if advance.ticks > 0 {
            self.state = self.state.with_clock(advance.reading);
        }
        for day in advance.days_started {
            info!("day {day} begins");
            result.push(self.now_ms, GameEventKind::DayStarted { day });
        }

        let due = self.respawn.due(&self.state.world_objects, self.now_ms);
        if !due.is_empty() {
            debug!("{} objects due to respawn; revival is not implemented", due.len());
        }

        result.extend(self.finish_harvest(self.now_ms));
        result
    }

    /// Equip a fresh tool of `tool_type`, replacing whatever was equipped.
    pub fn equip_tool(&mut self, tool_type: ToolType, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        let Some(tool) = self.catalog.new_tool(tool_type) else {
            debug!("equip refused: {tool_type} is not in the tool table");
            return result;
        };
        self.state = self.state.with_equipped(Some(tool));
        result.push(self.now_ms, GameEventKind::ToolEquipped { tool_type });
        self.persist_player(&mut result);
        result
    }

    pub fn unequip_tool(&mut self, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        let Some(tool) = self.state.player.equipped_tool.as_ref() else {
            return result;
        };
        let tool_type = tool.tool_type;
        self.state = self.state.with_equipped(None);
        result.push(self.now_ms, GameEventKind::ToolUnequipped { tool_type });
        self.persist_player(&mut result);
        result
    }

    /// Pay `costs` from the inventory. All or nothing; a shortfall is
    /// reported as `SpendRejected` and changes nothing.
    pub fn spend_resources(&mut self, costs: &[ResourceGain], now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        let manager = InventoryManager::new(&self.catalog, self.config.stack_policy);
        match manager.spend(&self.state.player.inventory, costs) {
            Ok(inventory) => {
                self.state = self.state.with_inventory(inventory);
                result.push(
                    self.now_ms,
                    GameEventKind::ResourcesSpent {
                        costs: costs.to_vec(),
                    },
                );
                self.persist_player(&mut result);
            }
            Err(error) => {
                debug!("spend refused: {error}");
                result.push(self.now_ms, GameEventKind::SpendRejected { error });
            }
        }
        result
    }

    /// Persist the whole snapshot, clock included. Recreates the record if
    /// the backend has lost it.
    pub fn save(&mut self, now_ms: u64) -> StepResult {
        self.observe(now_ms);
        let mut result = StepResult::default();
        if self.detached {
            debug!("save skipped: session is detached from storage");
            return result;
        }
        let id = record_id(&self.state.player.id);
        let write = SavedGamePatch::full(&self.state).and_then(|patch| {
            match self.repository.update(&id, patch) {
                Err(PersistenceError::NotFound(_)) => {
                    self.repository.create(SavedGame::from_state(&self.state)?)
                }
                other => other,
            }
        });
        if let Err(e) = write {
            self.report_persistence_failure("saving game", e, &mut result);
        }
        result
    }

    /// Dispatch one command. Every action observes `command.now_ms` except
    /// `Tick`, which is elapsed-only: it moves the store's time forward by
    /// `elapsed_ms` and ignores the stamp, so a replayed log advances
    /// exactly as the live session did.
    pub fn apply(&mut self, command: &GameCommand) -> StepResult {
        let now_ms = command.now_ms;
        match &command.action {
            GameAction::StartSession => self.start_session(now_ms),
            GameAction::MovePlayer { position } => self.move_player(*position, now_ms),
            GameAction::BeginHarvest { object_id } => self.begin_harvest(object_id, now_ms),
            GameAction::FinishHarvest => self.finish_harvest(now_ms),
            GameAction::Tick { elapsed_ms } => self.tick(*elapsed_ms),
            GameAction::EquipTool { tool_type } => self.equip_tool(*tool_type, now_ms),
            GameAction::UnequipTool => self.unequip_tool(now_ms),
            GameAction::SpendResources { costs } => self.spend_resources(costs, now_ms),
            GameAction::Save => self.save(now_ms),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn observe(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn rebuild_object_index(&mut self) {
        self.object_index = self
            .state
            .world_objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.clone(), i))
            .collect();
    }

    fn object(&self, object_id: &str) -> Option<&WorldObject> {
        self.object_index
            .get(object_id)
            .and_then(|&i| self.state.world_objects.get(i))
    }

    fn check_harvest(&self, object_id: &str) -> Result<(), Rejection> {
        if !self.session_started {
            return Err(Rejection::NotStarted);
        }
        if self.pending_harvest.is_some() {
            return Err(Rejection::Busy);
        }
        let object = self.object(object_id).ok_or(Rejection::UnknownObject)?;
        self.resolver
            .check(object, self.state.player.equipped_tool.as_ref())
    }

    fn resolve_harvest(&mut self, object_id: &str, now_ms: u64, result: &mut StepResult) {
        let Some(&index) = self.object_index.get(object_id) else {
            self.reject(object_id, Rejection::UnknownObject, result);
            return;
        };
        let object = &self.state.world_objects[index];
        let tool = self.state.player.equipped_tool.as_ref();
        let outcome = match self.resolver.resolve(object, tool, &mut self.rng, now_ms) {
            Ok(outcome) => outcome,
            Err(reason) => {
                self.reject(object_id, reason, result);
                return;
            }
        };

        let manager = InventoryManager::new(&self.catalog, self.config.stack_policy);
        let inventory = manager.apply_gain(
            &self.state.player.inventory,
            self.state.player.max_inventory_slots,
            &outcome.resources_gained,
        );
        self.state = self.state.with_harvest(&outcome, inventory);

        debug!(
            "harvested {object_id}: {:?}, health now {}",
            outcome.resources_gained,
            outcome.updated_object.health
        );
        result.push(
            self.now_ms,
            GameEventKind::ResourcesGained {
                object_id: object_id.to_string(),
                gains: outcome.resources_gained.to_vec(),
                experience: outcome.experience_delta,
            },
        );
        if outcome.depleted() {
            result.push(
                self.now_ms,
                GameEventKind::ObjectDepleted {
                    object_id: object_id.to_string(),
                },
            );
        }

        if self.detached {
            return;
        }
        let id = record_id(&self.state.player.id);
        let write = SavedGamePatch::after_harvest(&self.state)
            .and_then(|patch| self.repository.update(&id, patch));
        if let Err(e) = write {
            self.report_persistence_failure("saving harvest", e, result);
        }
    }

    fn persist_player(&mut self, result: &mut StepResult) {
        if self.detached {
            return;
        }
        let id = record_id(&self.state.player.id);
        let write = SavedGamePatch::player_only(&self.state)
            .and_then(|patch| self.repository.update(&id, patch));
        if let Err(e) = write {
            self.report_persistence_failure("saving player", e, result);
        }
    }

    fn reject(&self, object_id: &str, reason: Rejection, result: &mut StepResult) {
        debug!("harvest of {object_id} refused: {reason}");
        result.push(
            self.now_ms,
            GameEventKind::HarvestRejected {
                object_id: object_id.to_string(),
                reason,
            },
        );
    }

    fn report_persistence_failure(
        &self,
        action: &str,
        error: PersistenceError,
        result: &mut StepResult,
    ) {
        warn!("{action} failed, continuing in memory: {error}");
        result.push(
            self.now_ms,
            GameEventKind::SaveFailed {
                reason: error.to_string(),
            },
        );
    }
}

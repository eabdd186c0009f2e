// Test-only session harness for end-to-end scenarios.
//
// Wraps a real `GameStateStore` (from `haven_sim::store`) around a
// `FlakyRepository`, an in-memory backend whose loads and writes can be made
// to fail on demand. `TestSession` keeps its own host clock so scenarios can
// say "harvest this, then let ten seconds pass" without threading
// timestamps, and it keeps every event the store emits.
//
// The only test-specific code is the clock bookkeeping and the failure
// switches. Harvesting, inventory, clock, and persistence all run through
// the same store paths a real host uses.
//
// See also: `tests/full_session.rs` for the scenarios.

use haven_sim::config::GameConfig;
use haven_sim::event::{GameEvent, GameEventKind, StepResult};
use haven_sim::persistence::{
    GameRepository, LoadError, MemoryRepository, PersistenceError, SavedGame, SavedGamePatch,
    record_id,
};
use haven_sim::rng::RandomSource;
use haven_sim::state::GameState;
use haven_sim::store::GameStateStore;
use haven_sim::types::{ResourceGain, ToolType, WorldObjectType};

/// Host time the harness starts at. Arbitrary but non-zero, like a real
/// wall clock.
pub const START_MS: u64 = 1_700_000_000_000;

/// In-memory backend with failure switches.
#[derive(Clone, Debug, Default)]
pub struct FlakyRepository {
    pub inner: MemoryRepository,
    pub fail_loads: bool,
    pub fail_writes: bool,
    /// Write attempts seen, failed or not.
    pub writes: usize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, player_id: &str) -> Option<&SavedGame> {
        self.inner.get(&record_id(player_id))
    }

    fn check_write(&mut self) -> Result<(), PersistenceError> {
        self.writes += 1;
        if self.fail_writes {
            Err(PersistenceError::Backend("disk unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl GameRepository for FlakyRepository {
    fn load(&mut self, player_id: &str) -> Result<Option<SavedGame>, PersistenceError> {
        if self.fail_loads {
            return Err(PersistenceError::Backend("connection refused".into()));
        }
        self.inner.load(player_id)
    }

    fn create(&mut self, record: SavedGame) -> Result<(), PersistenceError> {
        self.check_write()?;
        self.inner.create(record)
    }

    fn update(&mut self, id: &str, patch: SavedGamePatch) -> Result<(), PersistenceError> {
        self.check_write()?;
        self.inner.update(id, patch)
    }
}

/// A live session plus a host clock and an event log.
pub struct TestSession<G: RandomSource = haven_sim::prng::GameRng> {
    pub store: GameStateStore<FlakyRepository, G>,
    pub now_ms: u64,
    pub events: Vec<GameEvent>,
    pub player_id: String,
}

impl TestSession {
    /// Open (or reopen) `player_id`'s session on `repository` with a seeded
    /// generator and start it.
    pub fn open(
        config: GameConfig,
        repository: FlakyRepository,
        player_id: &str,
        seed: u64,
    ) -> Result<Self, LoadError> {
        let (store, init) = GameStateStore::initialize(config, repository, player_id, seed)?;
        Ok(Self::wrap(store, init, player_id))
    }

    /// Fresh default-config session on an empty backend.
    pub fn fresh(player_id: &str, seed: u64) -> Self {
        match Self::open(GameConfig::default(), FlakyRepository::new(), player_id, seed) {
            Ok(session) => session,
            Err(e) => panic!("default config failed to load: {e}"),
        }
    }

    /// Shut down and reopen on the same backend, as after a restart.
    pub fn restart(self, seed: u64) -> Result<Self, LoadError> {
        let config = self.store.config().clone();
        let player_id = self.player_id.clone();
        Self::open(config, self.store.into_repository(), &player_id, seed)
    }
}

impl<G: RandomSource> TestSession<G> {
    pub fn open_with_rng(
        config: GameConfig,
        repository: FlakyRepository,
        player_id: &str,
        rng: G,
    ) -> Result<Self, LoadError> {
        let (store, init) =
            GameStateStore::initialize_with_rng(config, repository, player_id, rng)?;
        Ok(Self::wrap(store, init, player_id))
    }

    fn wrap(store: GameStateStore<FlakyRepository, G>, init: StepResult, player_id: &str) -> Self {
        let mut session = Self {
            store,
            now_ms: START_MS,
            events: Vec::new(),
            player_id: player_id.to_string(),
        };
        session.record(init);
        let started = session.store.start_session(START_MS);
        session.record(started);
        session
    }

    fn record(&mut self, result: StepResult) -> StepResult {
        self.events.extend(result.events.iter().cloned());
        result
    }

    pub fn state(&self) -> &GameState {
        self.store.snapshot()
    }

    pub fn repository(&self) -> &FlakyRepository {
        self.store.repository()
    }

    pub fn repository_mut(&mut self) -> &mut FlakyRepository {
        self.store.repository_mut()
    }

    /// Harvest and let the harvest duration pass on the host clock.
    pub fn harvest(&mut self, object_id: &str) -> StepResult {
        let result = self.store.harvest(object_id, self.now_ms);
        self.now_ms += self.store.config().harvest_duration_ms;
        self.record(result)
    }

    /// Let `seconds` of real time pass.
    pub fn wait_seconds(&mut self, seconds: u64) -> StepResult {
        let elapsed = seconds * 1000;
        self.now_ms += elapsed;
        let result = self.store.tick(elapsed);
        self.record(result)
    }

    pub fn equip(&mut self, tool_type: ToolType) -> StepResult {
        let result = self.store.equip_tool(tool_type, self.now_ms);
        self.record(result)
    }

    pub fn spend(&mut self, costs: &[ResourceGain]) -> StepResult {
        let result = self.store.spend_resources(costs, self.now_ms);
        self.record(result)
    }

    pub fn save(&mut self) -> StepResult {
        let result = self.store.save(self.now_ms);
        self.record(result)
    }

    /// Ids of every object of `kind`, in world order.
    pub fn ids_of(&self, kind: WorldObjectType) -> Vec<String> {
        self.state()
            .world_objects
            .iter()
            .filter(|o| o.object_type == kind)
            .map(|o| o.id.clone())
            .collect()
    }

    /// How many `SaveFailed` events the session has seen.
    pub fn save_failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, GameEventKind::SaveFailed { .. }))
            .count()
    }
}

// haven_sim: pure Rust simulation library for Survivor's Haven.
//
// This crate contains the world simulation and progression engine: world
// generation, harvest resolution, inventory rules, the day/night clock, and
// the session store that ties them together behind one canonical
// `GameState`. It has no rendering, input, or storage dependencies; storage
// is reached through the `GameRepository` trait.
//
// Module overview:
// - `store.rs`:       GameStateStore, the session orchestrator and sole owner of GameState.
// - `state.rs`:       GameState / Player / PlayerStats snapshot types and pure transitions.
// - `harvest.rs`:     HarvestResolver: tool gating, drop rolls, object damage.
// - `inventory.rs`:   Inventory, InventoryManager, StackPolicy.
// - `world_gen.rs`:   Initial world-object placement from templates.
// - `clock.rs`:       Time-of-day / day-count advancement.
// - `catalog.rs`:     ResourceCatalog: resource, tool, and template definitions.
// - `config.rs`:      GameConfig: every tunable, plus validation.
// - `persistence.rs`: SavedGame records, restore, GameRepository, MemoryRepository.
// - `command.rs`:     GameCommand / GameAction, the replayable input form.
// - `event.rs`:       Narrative GameEvents and StepResult.
// - `respawn.rs`:     RespawnScheduler seam (no-op today).
// - `rng.rs`:         RandomSource trait and ScriptedRng.
// - `prng`:           Re-exported from `haven_prng`, xoshiro256++ with SplitMix64 seeding.
// - `types.rs`:       Positions, resource/tool/object kinds, drops, stacks, world objects.
//
// **Critical constraint: determinism.** Given the same config, seed, and
// command list, a session produces the same snapshots. No system time, no OS
// entropy; hosts pass time in. Use `BTreeMap` for anything iterated.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod event;
pub mod harvest;
pub mod inventory;
pub mod persistence;
pub use haven_prng as prng;
pub mod respawn;
pub mod rng;
pub mod state;
pub mod store;
pub mod types;
pub mod world_gen;

// Respawn scheduling seam.
//
// World objects carry `respawn_time_ms` and `last_harvested`, but nothing
// revives a depleted object yet. The store asks a `RespawnScheduler` on
// every tick which objects are due and only logs the answer. The shipped
// scheduler, `NeverRespawn`, always answers "none".

use crate::types::WorldObject;

pub trait RespawnScheduler {
    /// Ids of depleted objects that would be ready to revive at `now_ms`.
    fn due(&self, objects: &[WorldObject], now_ms: u64) -> Vec<String>;
}

/// Nothing ever respawns.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverRespawn;

impl RespawnScheduler for NeverRespawn {
    fn due(&self, _objects: &[WorldObject], _now_ms: u64) -> Vec<String> {
        Vec::new()
    }
}

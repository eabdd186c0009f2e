// The random-source seam.
//
// World placement and harvest resolution never touch `GameRng` directly;
// they draw through `RandomSource`, which has two implementations:
// - `GameRng` (from `haven_prng`), the seeded generator a live session owns.
// - `ScriptedRng`, which replays a fixed list of unit values. Hosts use it
//   to replay a recorded session; tests use it to rig drop rolls.
//
// The default integer helpers map one unit draw onto an inclusive range with
// `low + floor(u * span)`, so a scripted value of 0.5 on a `[1, 3]` range
// always yields 2. `GameRng` overrides them with exact integer sampling.

use crate::prng::GameRng;

/// A stream of uniform values in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[low, high]`. Callers guarantee `low <= high`.
    fn roll_inclusive(&mut self, low: u32, high: u32) -> u32 {
        let span = (high - low) as f64 + 1.0;
        let offset = (self.next_unit() * span).floor() as u32;
        (low + offset).min(high)
    }

    /// Uniform grid coordinate in `[low, high]`. Callers guarantee `low <= high`.
    fn roll_cell(&mut self, low: i32, high: i32) -> i32 {
        let span = (high as i64 - low as i64) as f64 + 1.0;
        let offset = (self.next_unit() * span).floor() as i64;
        (low as i64 + offset).min(high as i64) as i32
    }

    /// `true` when the next draw falls below `p`.
    fn roll_chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

impl RandomSource for GameRng {
    fn next_unit(&mut self) -> f64 {
        self.next_f64()
    }

    fn roll_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.range_u64(low as u64, high as u64 + 1) as u32
    }

    fn roll_cell(&mut self, low: i32, high: i32) -> i32 {
        self.range_i32_inclusive(low, high)
    }

    fn roll_chance(&mut self, p: f64) -> bool {
        self.chance(p)
    }
}

/// Replays a fixed sequence of unit values, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    /// Build from a non-empty list of values, each clamped into `[0, 1)`.
    ///
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values: Vec<f64> = values.into();
        assert!(!values.is_empty(), "ScriptedRng needs at least one value");
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRng {
    fn next_unit(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

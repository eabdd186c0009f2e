// Day/night clock.
//
// Time of day is an hour value in [0, 24). The clock moves only in whole
// ticks of `clock_tick_ms` real milliseconds; each tick adds
// `24 / (day_duration_ms / clock_tick_ms)` hours, so a full day takes
// `day_duration_ms` of real time (20 minutes by default, 0.02 h per second).
//
// When a tick brings the hour to 24 or past it, the hour resets to exactly 0
// and the day count goes up by one. The overshoot is discarded rather than
// carried into the new day, which loses a sliver of time at each boundary.
// The reset is applied per tick, so a long `advance` can cross several days.
//
// Elapsed time shorter than a tick is returned as `leftover_ms` for the
// caller to carry into the next call.

use crate::config::GameConfig;

/// Hour of day and day number at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockReading {
    pub time_of_day: f64,
    pub day_count: u32,
}

/// Result of `Clock::advance`.
#[derive(Clone, Debug, PartialEq)]
pub struct Advance {
    pub reading: ClockReading,
    pub ticks: u64,
    pub leftover_ms: u64,
    /// Day numbers that began during this advance, in order.
    pub days_started: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    tick_ms: u64,
    increment: f64,
    night_start: f64,
    night_end: f64,
}

impl Clock {
    pub fn from_config(config: &GameConfig) -> Self {
        let ticks_per_day = config.day_duration_ms as f64 / config.clock_tick_ms as f64;
        Self {
            tick_ms: config.clock_tick_ms,
            increment: 24.0 / ticks_per_day,
            night_start: config.night_start,
            night_end: config.night_end,
        }
    }

    /// Hours added per tick.
    pub fn increment_per_tick(&self) -> f64 {
        self.increment
    }

    pub fn advance(&self, from: ClockReading, elapsed_ms: u64) -> Advance {
        let ticks = elapsed_ms / self.tick_ms;
        let mut reading = from;
        let mut days_started = Vec::new();
        for _ in 0..ticks {
            reading.time_of_day += self.increment;
            if reading.time_of_day >= 24.0 {
                reading.time_of_day = 0.0;
                reading.day_count += 1;
                days_started.push(reading.day_count);
            }
        }
        Advance {
            reading,
            ticks,
            leftover_ms: elapsed_ms % self.tick_ms,
            days_started,
        }
    }

    /// Daytime is `[night_end, night_start)`.
    pub fn is_daytime(&self, time_of_day: f64) -> bool {
        time_of_day >= self.night_end && time_of_day < self.night_start
    }
}

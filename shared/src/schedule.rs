//! Tournament schedule and countdown helpers
//!
//! Schedule timestamps are informational: they seed heat start times and drive
//! the status display, but never gate a transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigViolation;
use crate::types::TournamentType;

/// Stage start and end times
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub qualifying_start: DateTime<Utc>,
    pub qualifying_end: DateTime<Utc>,
    pub heats_start: DateTime<Utc>,
    pub final_start: DateTime<Utc>,
}

impl Schedule {
    /// Check stage ordering for the given tournament type.
    ///
    /// Single-day events need strictly increasing stage times; multi-day
    /// events may start heats on the day qualifying closes.
    pub fn validate(&self, tournament_type: TournamentType) -> Result<(), ConfigViolation> {
        if self.qualifying_start >= self.qualifying_end {
            return Err(ConfigViolation {
                field: "qualifying_end",
                reason: "qualifying must end after it starts",
            });
        }

        let (heats_ok, final_ok) = match tournament_type {
            TournamentType::SingleDay => (
                self.heats_start > self.qualifying_end,
                self.final_start > self.heats_start,
            ),
            TournamentType::MultiDay => (
                self.heats_start >= self.qualifying_end,
                self.final_start >= self.heats_start,
            ),
        };

        if !heats_ok {
            return Err(ConfigViolation {
                field: "heats_start",
                reason: "heats must start after qualifying ends",
            });
        }
        if !final_ok {
            return Err(ConfigViolation {
                field: "final_start",
                reason: "the final must start after the heats",
            });
        }
        Ok(())
    }

    /// Infer the tournament type for records created without one
    pub fn infer_type(&self) -> TournamentType {
        let day = self.qualifying_start.date_naive();
        let same_day = [self.qualifying_end, self.heats_start, self.final_start]
            .iter()
            .all(|t| t.date_naive() == day);

        if same_day {
            TournamentType::SingleDay
        } else {
            TournamentType::MultiDay
        }
    }
}

/// Countdown to `end` as `HH:MM:SS`, zero once it has passed
pub fn time_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return "00:00:00".to_string();
    }

    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Percentage of the `start..end` window elapsed at `now`, clamped to 0..=100
pub fn stage_progress(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let total = (end - start).num_milliseconds();
    let elapsed = (now - start).num_milliseconds();

    if elapsed <= 0 {
        return 0.0;
    }
    if elapsed >= total {
        return 100.0;
    }
    elapsed as f64 / total as f64 * 100.0
}

/// Lap or race time as `MM:SS.mmm`; `-` for a missing (zero) time
pub fn format_lap_time(elapsed_ms: u64) -> String {
    if elapsed_ms == 0 {
        return "-".to_string();
    }

    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms % 60_000) / 1000;
    let millis = elapsed_ms % 1000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

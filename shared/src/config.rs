//! Configuration types for tournaments and the progression engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::schedule::Schedule;
use crate::types::TournamentType;

/// Heats created at the qualifying -> heats transition unless configured otherwise
pub const DEFAULT_HEAT_COUNT: u32 = 2;

/// Upper bound on qualifiers per site accepted by the admin form
pub const MAX_QUALIFIERS_PER_SITE: u32 = 10;

/// The karting sites currently running qualifying sessions
pub const KNOWN_SITES: [&str; 5] = ["Fishkill", "Patterson", "San Juan", "Wallkill", "Warwick"];

/// A configuration rule that was broken
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigViolation {
    pub field: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn default_heat_count() -> u32 {
    DEFAULT_HEAT_COUNT
}

/// Admin input for creating a tournament
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TournamentConfig {
    pub name: String,
    pub date: DateTime<Utc>,
    pub tournament_type: TournamentType,
    pub schedule: Schedule,
    pub sites_included: Vec<String>,
    pub qualifiers_per_site: u32,
    #[serde(default = "default_heat_count")]
    pub heat_count: u32,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        if self.name.trim().is_empty() {
            return Err(ConfigViolation {
                field: "name",
                reason: "tournament name is required",
            });
        }
        validate_structure(&self.sites_included, self.qualifiers_per_site, self.heat_count)?;
        self.schedule.validate(self.tournament_type)
    }
}

/// Shared checks for the fields that shape progression
pub fn validate_structure(
    sites_included: &[String],
    qualifiers_per_site: u32,
    heat_count: u32,
) -> Result<(), ConfigViolation> {
    if sites_included.is_empty() {
        return Err(ConfigViolation {
            field: "sites_included",
            reason: "select at least one site",
        });
    }

    let mut seen = HashSet::new();
    for site in sites_included {
        if site.trim().is_empty() {
            return Err(ConfigViolation {
                field: "sites_included",
                reason: "site names must not be blank",
            });
        }
        if !seen.insert(site.as_str()) {
            return Err(ConfigViolation {
                field: "sites_included",
                reason: "site names must be unique",
            });
        }
    }

    if qualifiers_per_site == 0 || qualifiers_per_site > MAX_QUALIFIERS_PER_SITE {
        return Err(ConfigViolation {
            field: "qualifiers_per_site",
            reason: "must be between 1 and 10",
        });
    }

    if heat_count == 0 {
        return Err(ConfigViolation {
            field: "heat_count",
            reason: "at least one heat is required",
        });
    }
    Ok(())
}

/// Partial edit of an existing tournament. `None` leaves a field unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TournamentSettings {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub tournament_type: Option<TournamentType>,
    pub schedule: Option<Schedule>,
    pub sites_included: Option<Vec<String>>,
    pub qualifiers_per_site: Option<u32>,
    pub heat_count: Option<u32>,
}

impl TournamentSettings {
    /// Whether the edit touches fields that are frozen once setup ends
    pub fn changes_structure(&self) -> bool {
        self.sites_included.is_some() || self.qualifiers_per_site.is_some() || self.heat_count.is_some()
    }
}

/// Progression engine tuning
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Reloads allowed after losing a compare-and-swap race
    pub max_conflict_retries: u32,
    /// Buffered events per subscriber before lagging ones miss updates
    pub event_capacity: usize,
    /// Fixed seed for heat shuffling, random when unset
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            event_capacity: 64,
            rng_seed: None,
        }
    }
}

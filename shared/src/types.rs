//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};
use crate::schedule::Schedule;

/// Unique identifier for a tournament document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TournamentId(Uuid);

impl TournamentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> SharedResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| SharedError::InvalidTournamentId {
                input: s.to_string(),
                source,
            })
    }
}

impl Default for TournamentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TournamentId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Stable external participant identifier.
///
/// Seeded by the ingestion layer (often from the timing system's driver id),
/// but never derived from a display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Tournament lifecycle stage. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Setup,
    Qualifying,
    Heats,
    Final,
    Completed,
}

impl TournamentStatus {
    /// The stage that follows this one, `None` once completed
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Setup => Some(Self::Qualifying),
            Self::Qualifying => Some(Self::Heats),
            Self::Heats => Some(Self::Final),
            Self::Final => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Qualifying => "qualifying",
            Self::Heats => "heats",
            Self::Final => "final",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "setup" => Ok(Self::Setup),
            "qualifying" => Ok(Self::Qualifying),
            "heats" => Ok(Self::Heats),
            "final" => Ok(Self::Final),
            "completed" => Ok(Self::Completed),
            _ => Err(SharedError::unknown("status", s)),
        }
    }
}

/// Whether the schedule spans one calendar day or several
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TournamentType {
    SingleDay,
    #[default]
    MultiDay,
}

impl TournamentType {
    /// `SingleDay` when every stage falls on one calendar date
    pub fn infer(schedule: &Schedule) -> Self {
        schedule.infer_type()
    }
}

impl fmt::Display for TournamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentType::SingleDay => write!(f, "singleDay"),
            TournamentType::MultiDay => write!(f, "multiDay"),
        }
    }
}

impl FromStr for TournamentType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleDay" | "single-day" | "single" => Ok(Self::SingleDay),
            "multiDay" | "multi-day" | "multi" => Ok(Self::MultiDay),
            _ => Err(SharedError::unknown("tournament type", s)),
        }
    }
}

/// Race status for heats and the grand final. Never reverts to scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatStatus {
    #[default]
    Scheduled,
    Completed,
}

impl fmt::Display for HeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatStatus::Scheduled => write!(f, "scheduled"),
            HeatStatus::Completed => write!(f, "completed"),
        }
    }
}

//! Tournament engine error types

use shared::{ConfigViolation, SharedError, TournamentId, TournamentStatus};
use std::fmt;
use thiserror::Error;

/// State machine operations, used to label rejected calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    RecordQualifier,
    AdvanceToHeats,
    ResolveHeat,
    AdvanceToFinal,
    ResolveFinal,
    AdvanceToCompleted,
    UpdateSettings,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Start => "start",
            Operation::RecordQualifier => "record qualifying result",
            Operation::AdvanceToHeats => "advance to heats",
            Operation::ResolveHeat => "resolve heat",
            Operation::AdvanceToFinal => "advance to final",
            Operation::ResolveFinal => "resolve final",
            Operation::AdvanceToCompleted => "advance to completed",
            Operation::UpdateSettings => "update settings",
        };
        f.write_str(name)
    }
}

/// Why a transition precondition failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionBlocker {
    /// The operation is not legal from the current status
    WrongStatus { expected: TournamentStatus },
    /// Heats still waiting for results
    HeatsIncomplete { pending: Vec<u32> },
    /// The grand final has not been resolved
    FinalIncomplete,
    /// No sites or no qualifier slots configured
    NothingToQualify,
    /// The tournament has finished and is read-only
    Finished,
}

impl fmt::Display for TransitionBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionBlocker::WrongStatus { expected } => write!(f, "requires status {expected}"),
            TransitionBlocker::HeatsIncomplete { pending } => write!(f, "heats still pending: {pending:?}"),
            TransitionBlocker::FinalIncomplete => write!(f, "the final has not been completed"),
            TransitionBlocker::NothingToQualify => write!(f, "no sites with qualifier slots configured"),
            TransitionBlocker::Finished => write!(f, "the tournament has finished"),
        }
    }
}

/// Which race a result was submitted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceRef {
    Heat(u32),
    Final,
}

impl fmt::Display for RaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceRef::Heat(number) => write!(f, "heat {number}"),
            RaceRef::Final => write!(f, "final"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TournamentError {
    #[error("Cannot {operation} while {status}: {blocker}")]
    InvalidTransition {
        operation: Operation,
        status: TournamentStatus,
        blocker: TransitionBlocker,
    },

    #[error("Results for {race} were already recorded")]
    AlreadyCompleted { race: RaceRef },

    #[error("Invalid finishing order: {reason}")]
    InvalidFinishingOrder { reason: String },

    #[error("Final needs at least {required} participants, found {found}")]
    InsufficientParticipants { required: usize, found: usize },

    #[error("Heat {heat_number} does not exist")]
    HeatNotFound { heat_number: u32 },

    #[error("Site is not part of this tournament: {site}")]
    UnknownSite { site: String },

    #[error("{participant} already qualified at {site}")]
    ParticipantAtOtherSite { participant: String, site: String },

    #[error("Invalid lap time {elapsed_ms} ms for {participant}")]
    InvalidLapTime { participant: String, elapsed_ms: u64 },

    #[error("Invalid configuration: {field} ({reason})")]
    InvalidConfig { field: String, reason: String },

    #[error("Tournament not found: {id}")]
    TournamentNotFound { id: TournamentId },

    #[error("Tournament {id} changed concurrently (expected revision {expected}, found {actual})")]
    RevisionConflict { id: TournamentId, expected: u64, actual: u64 },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TournamentError {
    pub fn wrong_status(operation: Operation, status: TournamentStatus, expected: TournamentStatus) -> Self {
        Self::InvalidTransition {
            operation,
            status,
            blocker: TransitionBlocker::WrongStatus { expected },
        }
    }

    pub fn finishing_order(reason: impl Into<String>) -> Self {
        Self::InvalidFinishingOrder { reason: reason.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }
}

impl From<ConfigViolation> for TournamentError {
    fn from(violation: ConfigViolation) -> Self {
        Self::InvalidConfig {
            field: violation.field.to_string(),
            reason: violation.reason.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

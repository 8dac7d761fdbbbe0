//! Shared types for the kart tournament workspace
//!
//! Contains the tournament document model and the configuration, error and
//! logging pieces used by both the progression engine and the simulator.

pub mod config;
pub mod errors;
pub mod logging;
pub mod schedule;
pub mod tournament;
pub mod types;

pub use errors::*;
pub use types::*;

pub use config::{
    ConfigViolation, DEFAULT_HEAT_COUNT, EngineConfig, KNOWN_SITES, MAX_QUALIFIERS_PER_SITE, TournamentConfig,
    TournamentSettings,
};
pub use schedule::Schedule;
pub use tournament::{
    FinalEntrant, FinalHeat, Heat, HeatEntrant, Participant, QualifierEntry, Tournament, Winners, find_active,
};

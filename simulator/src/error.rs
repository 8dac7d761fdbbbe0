//! Simulator error types

use thiserror::Error;
use tournament::TournamentError;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("No simulated tournament has been created yet")]
    NoTournament,

    #[error("Invalid simulation setting: {field} ({reason})")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Simulated {stage} has no drivers to race")]
    EmptyRace { stage: String },

    #[error("Tournament error: {0}")]
    Tournament(#[from] TournamentError),
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;

//! Errors raised while parsing shared identifiers and enum names

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("'{input}' is not a tournament id: {source}")]
    InvalidTournamentId {
        input: String,
        #[source]
        source: uuid::Error,
    },

    #[error("unknown {kind} '{input}'")]
    UnknownName { kind: &'static str, input: String },
}

impl SharedError {
    pub(crate) fn unknown(kind: &'static str, input: &str) -> Self {
        Self::UnknownName {
            kind,
            input: input.to_string(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;

//! Change notifications published by the engine after each successful write

use serde::{Deserialize, Serialize};

use shared::{ParticipantId, TournamentId, TournamentStatus, Winners};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TournamentEvent {
    Created {
        id: TournamentId,
    },
    SettingsUpdated {
        id: TournamentId,
    },
    StatusChanged {
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    },
    QualifierRecorded {
        id: TournamentId,
        site: String,
        participant_id: ParticipantId,
        elapsed_ms: u64,
    },
    HeatResolved {
        id: TournamentId,
        heat_number: u32,
    },
    FinalResolved {
        id: TournamentId,
        winners: Winners,
    },
}

impl TournamentEvent {
    pub fn tournament_id(&self) -> TournamentId {
        match self {
            TournamentEvent::Created { id }
            | TournamentEvent::SettingsUpdated { id }
            | TournamentEvent::StatusChanged { id, .. }
            | TournamentEvent::QualifierRecorded { id, .. }
            | TournamentEvent::HeatResolved { id, .. }
            | TournamentEvent::FinalResolved { id, .. } => *id,
        }
    }
}

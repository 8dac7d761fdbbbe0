//! Grand final resolution and podium

use std::collections::HashMap;

use shared::{FinalEntrant, FinalHeat, HeatStatus, ParticipantId, Winners};

use super::heats::validate_finishing_order;
use crate::error::{RaceRef, TournamentError, TournamentResult};

/// Entrants needed to fill the podium
pub const PODIUM_SIZE: usize = 3;

/// Apply a finishing order to the final and compute the podium.
///
/// Guards run in order: already completed, too few entrants, then the
/// finishing order itself. Nothing is returned on failure, so the caller's
/// snapshot stays as it was.
pub fn resolve_final(
    final_heat: &FinalHeat,
    order: &[ParticipantId],
    race_id: Option<String>,
) -> TournamentResult<(FinalHeat, Winners)> {
    if final_heat.is_completed() {
        return Err(TournamentError::AlreadyCompleted { race: RaceRef::Final });
    }
    if final_heat.participants.len() < PODIUM_SIZE {
        return Err(TournamentError::InsufficientParticipants {
            required: PODIUM_SIZE,
            found: final_heat.participants.len(),
        });
    }
    validate_finishing_order(&final_heat.participant_ids(), order)?;

    let by_id: HashMap<&ParticipantId, &FinalEntrant> = final_heat
        .participants
        .iter()
        .map(|p| (p.participant_id(), p))
        .collect();

    let participants: Vec<FinalEntrant> = order
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .zip(1u32..)
        .map(|(entrant, position)| FinalEntrant {
            position: Some(position),
            ..entrant.clone()
        })
        .collect();

    let winners = match participants.as_slice() {
        [first, second, third, ..] => Winners {
            first: first.participant.clone(),
            second: second.participant.clone(),
            third: third.participant.clone(),
        },
        _ => {
            return Err(TournamentError::InsufficientParticipants {
                required: PODIUM_SIZE,
                found: participants.len(),
            });
        }
    };

    let resolved = FinalHeat {
        status: HeatStatus::Completed,
        race_id: race_id.or_else(|| final_heat.race_id.clone()),
        participants,
        ..final_heat.clone()
    };
    Ok((resolved, winners))
}

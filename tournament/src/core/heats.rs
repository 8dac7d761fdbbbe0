//! Heat assembly and heat result resolution

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

use shared::{Heat, HeatEntrant, HeatStatus, Participant, ParticipantId, Tournament};

use super::qualifiers::top_qualifiers;
use super::scoring::points_for_position;
use crate::error::{RaceRef, TournamentError, TournamentResult};

/// Top qualifiers of every included site, in site order
pub fn qualifier_pool(tournament: &Tournament) -> Vec<Participant> {
    let limit = tournament.qualifiers_per_site as usize;
    tournament
        .sites_included
        .iter()
        .flat_map(|site| {
            top_qualifiers(tournament.qualifiers_for(site), limit)
                .iter()
                .cloned()
                .map(move |entry| entry.into_participant(site))
        })
        .collect()
}

/// Heat sizes for `total` drivers over `heats` heats, as equal as possible.
///
/// The first `total % heats` heats take the extra driver.
pub fn heat_sizes(total: usize, heats: usize) -> Vec<usize> {
    let heats = heats.max(1);
    let base = total / heats;
    let extra = total % heats;
    (0..heats).map(|i| base + usize::from(i < extra)).collect()
}

/// Build the scheduled heats from qualifying results.
///
/// The pool is shuffled so drivers from one site do not cluster in a heat.
/// An empty pool still yields the configured number of (empty) heats.
pub fn assemble_heats<R: Rng + ?Sized>(tournament: &Tournament, rng: &mut R) -> Vec<Heat> {
    let mut pool = qualifier_pool(tournament);
    pool.shuffle(rng);

    let sizes = heat_sizes(pool.len(), tournament.heat_count as usize);
    let mut drivers = pool.into_iter();

    sizes
        .into_iter()
        .enumerate()
        .map(|(index, size)| {
            let heat_number = index as u32 + 1;
            Heat {
                heat_id: format!("heat-{heat_number}"),
                heat_number,
                status: HeatStatus::Scheduled,
                scheduled_time: tournament.schedule.heats_start,
                race_id: None,
                participants: drivers.by_ref().take(size).map(HeatEntrant::new).collect(),
            }
        })
        .collect()
}

/// Check that `order` is a permutation of exactly the `expected` ids.
///
/// A race whose own entry list repeats an id can never be resolved, and is
/// reported as such.
pub fn validate_finishing_order(expected: &[ParticipantId], order: &[ParticipantId]) -> TournamentResult<()> {
    let mut expected_set: HashSet<&ParticipantId> = HashSet::with_capacity(expected.len());
    if let Some(repeated) = expected.iter().find(|id| !expected_set.insert(*id)) {
        return Err(TournamentError::finishing_order(format!(
            "race entry list names participant {repeated} more than once"
        )));
    }
    let mut seen = HashSet::with_capacity(order.len());

    for id in order {
        if !expected_set.contains(id) {
            return Err(TournamentError::finishing_order(format!("unknown participant {id}")));
        }
        if !seen.insert(id) {
            return Err(TournamentError::finishing_order(format!("participant {id} listed twice")));
        }
    }

    if let Some(missing) = expected.iter().find(|id| !seen.contains(id)) {
        return Err(TournamentError::finishing_order(format!("participant {missing} missing")));
    }
    Ok(())
}

/// Apply a finishing order to a scheduled heat.
///
/// Returns the completed heat with participants listed in finishing order;
/// the input heat is never modified.
pub fn resolve_heat(heat: &Heat, order: &[ParticipantId], race_id: Option<String>) -> TournamentResult<Heat> {
    if heat.is_completed() {
        return Err(TournamentError::AlreadyCompleted {
            race: RaceRef::Heat(heat.heat_number),
        });
    }
    validate_finishing_order(&heat.participant_ids(), order)?;

    let by_id: HashMap<&ParticipantId, &HeatEntrant> =
        heat.participants.iter().map(|p| (p.participant_id(), p)).collect();

    let participants = order
        .iter()
        .enumerate()
        .filter_map(|(index, id)| by_id.get(id).map(|entrant| (index as u32 + 1, *entrant)))
        .map(|(position, entrant)| HeatEntrant {
            participant: entrant.participant.clone(),
            position: Some(position),
            points: Some(points_for_position(position)),
        })
        .collect();

    Ok(Heat {
        status: HeatStatus::Completed,
        race_id: race_id.or_else(|| heat.race_id.clone()),
        participants,
        ..heat.clone()
    })
}

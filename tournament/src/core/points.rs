//! Points aggregation across completed heats

use std::collections::HashMap;

use shared::{FinalEntrant, Heat, ParticipantId};

/// Sum heat points per participant into final entrants.
///
/// Sorted by total points descending; equal totals keep the order in which
/// participants first appear across the heats. Drivers on zero points are
/// still entrants.
pub fn aggregate_points(heats: &[Heat]) -> Vec<FinalEntrant> {
    let mut entrants: Vec<FinalEntrant> = Vec::new();
    let mut index_of: HashMap<ParticipantId, usize> = HashMap::new();

    for entrant in heats.iter().flat_map(|heat| heat.participants.iter()) {
        let points = entrant.points.unwrap_or(0);
        match index_of.get(entrant.participant_id()).copied() {
            Some(index) => {
                entrants[index].total_points += points;
            }
            None => {
                index_of.insert(entrant.participant_id().clone(), entrants.len());
                entrants.push(FinalEntrant {
                    participant: entrant.participant.clone(),
                    total_points: points,
                    position: None,
                });
            }
        }
    }

    // stable: ties stay in first-seen order
    entrants.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    entrants
}

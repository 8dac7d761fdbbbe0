//! Qualifier aggregation
//!
//! Ranks a site's submitted times and keeps each driver's best lap. Ranking is
//! a stable sort, so equal times stay in submission order.

use shared::QualifierEntry;

/// Result of offering a time to a site's qualifying list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First time for this participant
    Inserted,
    /// Faster than the participant's previous best
    Improved { previous_ms: u64 },
    /// Not faster than the existing best, list unchanged
    Ignored { best_ms: u64 },
}

/// Sort ascending by elapsed time; index 0 is the fastest
pub fn rank_qualifiers(mut entries: Vec<QualifierEntry>) -> Vec<QualifierEntry> {
    // sort_by_key is stable: equal times keep their submission order
    entries.sort_by_key(|entry| entry.elapsed_ms);
    entries
}

/// Whether a timing-system value is a real finishing time.
///
/// Zero and all-nines values are the timing system's "no time" sentinels.
pub fn is_valid_lap_time(elapsed_ms: u64) -> bool {
    if elapsed_ms == 0 {
        return false;
    }
    !elapsed_ms.to_string().chars().all(|c| c == '9')
}

/// Offer a time to a site's ranked list, keeping one best entry per participant.
///
/// An improved time is treated as a fresh submission for tie ordering.
pub fn record_best_time(entries: &[QualifierEntry], entry: QualifierEntry) -> (Vec<QualifierEntry>, RecordOutcome) {
    let existing = entries.iter().find(|e| e.participant_id == entry.participant_id);

    let outcome = match existing {
        Some(best) if best.elapsed_ms <= entry.elapsed_ms => {
            return (entries.to_vec(), RecordOutcome::Ignored { best_ms: best.elapsed_ms });
        }
        Some(best) => RecordOutcome::Improved {
            previous_ms: best.elapsed_ms,
        },
        None => RecordOutcome::Inserted,
    };

    let mut updated: Vec<QualifierEntry> = entries
        .iter()
        .filter(|e| e.participant_id != entry.participant_id)
        .cloned()
        .collect();
    updated.push(entry);
    (rank_qualifiers(updated), outcome)
}

/// The first `limit` entries of an already-ranked list
pub fn top_qualifiers(entries: &[QualifierEntry], limit: usize) -> &[QualifierEntry] {
    &entries[..entries.len().min(limit)]
}

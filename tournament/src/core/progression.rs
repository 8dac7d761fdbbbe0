//! Tournament state machine
//!
//! Every transition is a pure function from a snapshot to a new snapshot.
//! Guards run before anything is built, so an `Err` means the input snapshot
//! is still the current truth. Revisions are left alone here; the store owns
//! them.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;

use shared::{
    FinalHeat, HeatStatus, ParticipantId, QualifierEntry, Tournament, TournamentConfig, TournamentId,
    TournamentSettings, TournamentStatus, config::validate_structure,
};

use super::final_race;
use super::heats::{self, assemble_heats};
use super::points::aggregate_points;
use super::qualifiers::{RecordOutcome, is_valid_lap_time, record_best_time};
use crate::error::{Operation, TournamentError, TournamentResult, TransitionBlocker};

fn require_status(tournament: &Tournament, operation: Operation, expected: TournamentStatus) -> TournamentResult<()> {
    if tournament.status == expected {
        Ok(())
    } else {
        Err(TournamentError::wrong_status(operation, tournament.status, expected))
    }
}

fn blocked(tournament: &Tournament, operation: Operation, blocker: TransitionBlocker) -> TournamentError {
    TournamentError::InvalidTransition {
        operation,
        status: tournament.status,
        blocker,
    }
}

/// Empty qualifying lists for each site, keeping any existing entries
fn qualifying_slots(
    sites: &[String],
    existing: &BTreeMap<String, Vec<QualifierEntry>>,
) -> BTreeMap<String, Vec<QualifierEntry>> {
    sites
        .iter()
        .map(|site| (site.clone(), existing.get(site).cloned().unwrap_or_default()))
        .collect()
}

/// Another included site that already lists this participant
fn site_holding<'a>(tournament: &'a Tournament, participant: &ParticipantId, site: &str) -> Option<&'a str> {
    tournament
        .sites_included
        .iter()
        .map(String::as_str)
        .filter(|other| *other != site)
        .find(|other| {
            tournament
                .qualifiers_for(other)
                .iter()
                .any(|entry| &entry.participant_id == participant)
        })
}

/// Move races without results onto the current schedule
fn reschedule_open_races(tournament: &mut Tournament) {
    let schedule = tournament.schedule;
    for heat in tournament.heats.iter_mut().filter(|h| !h.is_completed()) {
        heat.scheduled_time = schedule.heats_start;
    }
    if let Some(final_heat) = tournament.final_heat.as_mut().filter(|f| !f.is_completed()) {
        final_heat.scheduled_time = schedule.final_start;
    }
}

/// The status after `tournament.status`, for a forward transition
fn next_status(tournament: &Tournament, operation: Operation) -> TournamentResult<TournamentStatus> {
    tournament
        .status
        .next()
        .ok_or_else(|| blocked(tournament, operation, TransitionBlocker::Finished))
}

/// Build a new tournament in `setup` from validated admin input
pub fn create_tournament(config: TournamentConfig, now: DateTime<Utc>) -> TournamentResult<Tournament> {
    config.validate()?;

    Ok(Tournament {
        id: TournamentId::new(),
        qualifying_results: qualifying_slots(&config.sites_included, &BTreeMap::new()),
        name: config.name,
        date: config.date,
        tournament_type: config.tournament_type,
        status: TournamentStatus::Setup,
        schedule: config.schedule,
        sites_included: config.sites_included,
        qualifiers_per_site: config.qualifiers_per_site,
        heat_count: config.heat_count,
        heats: Vec::new(),
        final_heat: None,
        winners: None,
        revision: 0,
        created_at: now,
        updated_at: now,
    })
}

/// Apply an admin settings edit.
///
/// Display fields may change until the tournament completes; fields that
/// shape progression are frozen once qualifying opens.
pub fn update_settings(
    tournament: &Tournament,
    settings: &TournamentSettings,
    now: DateTime<Utc>,
) -> TournamentResult<Tournament> {
    if tournament.status.is_terminal() {
        return Err(blocked(tournament, Operation::UpdateSettings, TransitionBlocker::Finished));
    }
    if settings.changes_structure() {
        require_status(tournament, Operation::UpdateSettings, TournamentStatus::Setup)?;
    }

    let mut next = tournament.clone();
    if let Some(name) = &settings.name {
        if name.trim().is_empty() {
            return Err(TournamentError::InvalidConfig {
                field: "name".to_string(),
                reason: "tournament name is required".to_string(),
            });
        }
        next.name = name.clone();
    }
    if let Some(date) = settings.date {
        next.date = date;
    }
    if let Some(tournament_type) = settings.tournament_type {
        next.tournament_type = tournament_type;
    }
    if let Some(schedule) = settings.schedule {
        next.schedule = schedule;
        reschedule_open_races(&mut next);
    }
    if let Some(sites) = &settings.sites_included {
        next.qualifying_results = qualifying_slots(sites, &next.qualifying_results);
        next.sites_included = sites.clone();
    }
    if let Some(qualifiers_per_site) = settings.qualifiers_per_site {
        next.qualifiers_per_site = qualifiers_per_site;
    }
    if let Some(heat_count) = settings.heat_count {
        next.heat_count = heat_count;
    }

    validate_structure(&next.sites_included, next.qualifiers_per_site, next.heat_count)?;
    next.schedule.validate(next.tournament_type)?;

    next.updated_at = now;
    Ok(next)
}

/// setup -> qualifying
pub fn start(tournament: &Tournament, now: DateTime<Utc>) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::Start, TournamentStatus::Setup)?;
    if tournament.sites_included.is_empty() || tournament.qualifiers_per_site == 0 {
        return Err(blocked(tournament, Operation::Start, TransitionBlocker::NothingToQualify));
    }

    Ok(Tournament {
        status: next_status(tournament, Operation::Start)?,
        updated_at: now,
        ..tournament.clone()
    })
}

/// Offer one qualifying time for a site.
///
/// An `Ignored` outcome returns an unchanged copy of the snapshot.
pub fn record_qualifier(
    tournament: &Tournament,
    site: &str,
    entry: QualifierEntry,
    now: DateTime<Utc>,
) -> TournamentResult<(Tournament, RecordOutcome)> {
    require_status(tournament, Operation::RecordQualifier, TournamentStatus::Qualifying)?;
    if !tournament.includes_site(site) {
        return Err(TournamentError::UnknownSite { site: site.to_string() });
    }
    if !is_valid_lap_time(entry.elapsed_ms) {
        return Err(TournamentError::InvalidLapTime {
            participant: entry.participant_id.to_string(),
            elapsed_ms: entry.elapsed_ms,
        });
    }
    if let Some(other) = site_holding(tournament, &entry.participant_id, site) {
        return Err(TournamentError::ParticipantAtOtherSite {
            participant: entry.participant_id.to_string(),
            site: other.to_string(),
        });
    }

    let (ranked, outcome) = record_best_time(tournament.qualifiers_for(site), entry);
    if matches!(outcome, RecordOutcome::Ignored { .. }) {
        return Ok((tournament.clone(), outcome));
    }

    let mut next = tournament.clone();
    next.qualifying_results.insert(site.to_string(), ranked);
    next.updated_at = now;
    Ok((next, outcome))
}

/// qualifying -> heats, assembling the heats exactly once
pub fn advance_to_heats<R: Rng + ?Sized>(
    tournament: &Tournament,
    rng: &mut R,
    now: DateTime<Utc>,
) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::AdvanceToHeats, TournamentStatus::Qualifying)?;

    Ok(Tournament {
        status: next_status(tournament, Operation::AdvanceToHeats)?,
        heats: assemble_heats(tournament, rng),
        updated_at: now,
        ..tournament.clone()
    })
}

/// Record the finishing order of one heat
pub fn resolve_heat(
    tournament: &Tournament,
    heat_number: u32,
    order: &[ParticipantId],
    race_id: Option<String>,
    now: DateTime<Utc>,
) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::ResolveHeat, TournamentStatus::Heats)?;

    let index = tournament
        .heats
        .iter()
        .position(|h| h.heat_number == heat_number)
        .ok_or(TournamentError::HeatNotFound { heat_number })?;
    let resolved = heats::resolve_heat(&tournament.heats[index], order, race_id)?;

    let mut next = tournament.clone();
    next.heats[index] = resolved;
    next.updated_at = now;
    Ok(next)
}

/// heats -> final, seeding the final from aggregated heat points
pub fn advance_to_final(tournament: &Tournament, now: DateTime<Utc>) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::AdvanceToFinal, TournamentStatus::Heats)?;

    let pending = tournament.pending_heats();
    if !pending.is_empty() {
        return Err(blocked(
            tournament,
            Operation::AdvanceToFinal,
            TransitionBlocker::HeatsIncomplete { pending },
        ));
    }

    let final_heat = FinalHeat {
        status: HeatStatus::Scheduled,
        scheduled_time: tournament.schedule.final_start,
        race_id: None,
        participants: aggregate_points(&tournament.heats),
    };

    Ok(Tournament {
        status: next_status(tournament, Operation::AdvanceToFinal)?,
        final_heat: Some(final_heat),
        updated_at: now,
        ..tournament.clone()
    })
}

/// Record the final's finishing order and the podium
pub fn resolve_final(
    tournament: &Tournament,
    order: &[ParticipantId],
    race_id: Option<String>,
    now: DateTime<Utc>,
) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::ResolveFinal, TournamentStatus::Final)?;

    let final_heat = tournament
        .final_heat
        .as_ref()
        .ok_or_else(|| blocked(tournament, Operation::ResolveFinal, TransitionBlocker::FinalIncomplete))?;
    let (resolved, winners) = final_race::resolve_final(final_heat, order, race_id)?;

    Ok(Tournament {
        final_heat: Some(resolved),
        winners: Some(winners),
        updated_at: now,
        ..tournament.clone()
    })
}

/// final -> completed
pub fn advance_to_completed(tournament: &Tournament, now: DateTime<Utc>) -> TournamentResult<Tournament> {
    require_status(tournament, Operation::AdvanceToCompleted, TournamentStatus::Final)?;

    let final_done = tournament.final_heat.as_ref().is_some_and(FinalHeat::is_completed);
    if !final_done || tournament.winners.is_none() {
        return Err(blocked(
            tournament,
            Operation::AdvanceToCompleted,
            TransitionBlocker::FinalIncomplete,
        ));
    }

    Ok(Tournament {
        status: next_status(tournament, Operation::AdvanceToCompleted)?,
        updated_at: now,
        ..tournament.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{sample_config, tournament_with_qualifiers};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shared::Schedule;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn qualifying() -> Tournament {
        let created = create_tournament(sample_config(), now()).unwrap();
        start(&created, now()).unwrap()
    }

    #[test]
    fn test_create_starts_in_setup_with_empty_site_lists() {
        let tournament = create_tournament(sample_config(), now()).unwrap();

        assert_eq!(tournament.status, TournamentStatus::Setup);
        assert_eq!(tournament.revision, 0);
        assert_eq!(tournament.qualifying_results.len(), 2);
        assert!(tournament.qualifying_results.values().all(Vec::is_empty));
        assert!(tournament.heats.is_empty());
        assert!(tournament.final_heat.is_none());
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let mut config = sample_config();
        config.sites_included.clear();

        let result = create_tournament(config, now());
        assert!(matches!(result, Err(TournamentError::InvalidConfig { ref field, .. }) if field == "sites_included"));
    }

    #[test]
    fn test_start_only_from_setup() {
        let tournament = qualifying();
        assert_eq!(tournament.status, TournamentStatus::Qualifying);

        let again = start(&tournament, now());
        assert!(matches!(
            again,
            Err(TournamentError::InvalidTransition {
                operation: Operation::Start,
                status: TournamentStatus::Qualifying,
                ..
            })
        ));
    }

    #[test]
    fn test_start_blocked_without_sites() {
        let mut tournament = create_tournament(sample_config(), now()).unwrap();
        tournament.sites_included.clear();

        let result = start(&tournament, now());
        assert!(matches!(
            result,
            Err(TournamentError::InvalidTransition {
                blocker: TransitionBlocker::NothingToQualify,
                ..
            })
        ));
    }

    #[test]
    fn test_record_qualifier_guards() {
        let tournament = qualifying();

        let unknown = record_qualifier(&tournament, "Nowhere", QualifierEntry::new("p", "P", 70_000, "r"), now());
        assert!(matches!(unknown, Err(TournamentError::UnknownSite { .. })));

        let sentinel = record_qualifier(&tournament, "Fishkill", QualifierEntry::new("p", "P", 999_999, "r"), now());
        assert!(matches!(sentinel, Err(TournamentError::InvalidLapTime { elapsed_ms: 999_999, .. })));

        let setup = create_tournament(sample_config(), now()).unwrap();
        let early = record_qualifier(&setup, "Fishkill", QualifierEntry::new("p", "P", 70_000, "r"), now());
        assert!(matches!(early, Err(TournamentError::InvalidTransition { .. })));
    }

    #[test]
    fn test_record_qualifier_keeps_best() {
        let tournament = qualifying();

        let lap = |ms: u64, race: &str| QualifierEntry::new("p", "P", ms, race);

        let (t, outcome) = record_qualifier(&tournament, "Fishkill", lap(70_000, "r1"), now()).unwrap();
        assert_eq!(outcome, RecordOutcome::Inserted);

        let (t, outcome) = record_qualifier(&t, "Fishkill", lap(71_000, "r2"), now()).unwrap();
        assert_eq!(outcome, RecordOutcome::Ignored { best_ms: 70_000 });

        let (t, _) = record_qualifier(&t, "Fishkill", lap(65_000, "r3"), now()).unwrap();
        let list = t.qualifiers_for("Fishkill");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].elapsed_ms, 65_000);
        assert_eq!(list[0].race_id, "r3");
    }

    #[test]
    fn test_driver_qualifies_at_one_site_only() {
        let tournament = qualifying();
        let lap = |id: &str, ms: u64| QualifierEntry::new(id, id, ms, "r");

        let (t, _) = record_qualifier(&tournament, "Fishkill", lap("dup", 60_000), now()).unwrap();
        let (t, _) = record_qualifier(&t, "Fishkill", lap("x", 62_000), now()).unwrap();
        let elsewhere = record_qualifier(&t, "Warwick", lap("dup", 61_000), now());
        assert!(matches!(
            elsewhere,
            Err(TournamentError::ParticipantAtOtherSite { ref participant, ref site })
                if participant == "dup" && site == "Fishkill"
        ));

        // Every pooled driver is distinct and each heat resolves with its own ids
        let mut t = advance_to_heats(&t, &mut rng(), now()).unwrap();
        let mut pooled: Vec<ParticipantId> = t.heats.iter().flat_map(|h| h.participant_ids()).collect();
        assert_eq!(pooled.len(), 2);
        pooled.sort();
        pooled.dedup();
        assert_eq!(pooled.len(), 2);

        for number in 1..=2 {
            let order = t.heat(number).unwrap().participant_ids();
            t = resolve_heat(&t, number, &order, None, now()).unwrap();
        }
        assert!(t.pending_heats().is_empty());
    }

    #[test]
    fn test_second_advance_to_heats_rejected() {
        let tournament = tournament_with_qualifiers(2, &[("A", 3), ("B", 3)]);
        let heats = advance_to_heats(&tournament, &mut rng(), now()).unwrap();

        assert_eq!(heats.status, TournamentStatus::Heats);
        assert_eq!(heats.heats.len(), 2);

        let again = advance_to_heats(&heats, &mut rng(), now());
        assert!(matches!(
            again,
            Err(TournamentError::InvalidTransition {
                operation: Operation::AdvanceToHeats,
                status: TournamentStatus::Heats,
                ..
            })
        ));
    }

    #[test]
    fn test_advance_to_final_lists_pending_heats() {
        let tournament = tournament_with_qualifiers(2, &[("A", 2), ("B", 2)]);
        let t = advance_to_heats(&tournament, &mut rng(), now()).unwrap();
        let order = t.heats[0].participant_ids();
        let t = resolve_heat(&t, 1, &order, None, now()).unwrap();

        let result = advance_to_final(&t, now());
        match result {
            Err(TournamentError::InvalidTransition {
                blocker: TransitionBlocker::HeatsIncomplete { pending },
                ..
            }) => assert_eq!(pending, vec![2]),
            other => panic!("expected HeatsIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_heat_number() {
        let tournament = tournament_with_qualifiers(1, &[("A", 1), ("B", 1)]);
        let t = advance_to_heats(&tournament, &mut rng(), now()).unwrap();

        let result = resolve_heat(&t, 7, &[], None, now());
        assert!(matches!(result, Err(TournamentError::HeatNotFound { heat_number: 7 })));
    }

    #[test]
    fn test_full_progression() {
        let tournament = tournament_with_qualifiers(2, &[("A", 3), ("B", 3), ("C", 2)]);
        let mut t = advance_to_heats(&tournament, &mut rng(), now()).unwrap();

        for number in 1..=2 {
            let order = t.heat(number).unwrap().participant_ids();
            t = resolve_heat(&t, number, &order, Some(format!("race-{number}")), now()).unwrap();
        }
        let t = advance_to_final(&t, now()).unwrap();

        let final_heat = t.final_heat.as_ref().unwrap();
        assert_eq!(final_heat.participants.len(), 6);
        assert_eq!(final_heat.scheduled_time, t.schedule.final_start);
        assert!(final_heat.participants.windows(2).all(|w| w[0].total_points >= w[1].total_points));

        let early = advance_to_completed(&t, now());
        assert!(matches!(
            early,
            Err(TournamentError::InvalidTransition {
                blocker: TransitionBlocker::FinalIncomplete,
                ..
            })
        ));

        let order = final_heat.participant_ids();
        let t = resolve_final(&t, &order, None, now()).unwrap();
        let winners = t.winners.clone().unwrap();
        assert_eq!(winners.first.participant_id, order[0]);
        assert_eq!(winners.third.participant_id, order[2]);

        let done = advance_to_completed(&t, now()).unwrap();
        assert_eq!(done.status, TournamentStatus::Completed);
        assert_eq!(done.heats, t.heats);
    }

    #[test]
    fn test_failed_resolution_leaves_snapshot_untouched() {
        let tournament = tournament_with_qualifiers(1, &[("A", 1), ("B", 1)]);
        let mut t = advance_to_heats(&tournament, &mut rng(), now()).unwrap();
        for number in 1..=2 {
            let order = t.heat(number).unwrap().participant_ids();
            t = resolve_heat(&t, number, &order, None, now()).unwrap();
        }
        let t = advance_to_final(&t, now()).unwrap();
        let before = t.clone();

        let order = t.final_heat.as_ref().unwrap().participant_ids();
        let result = resolve_final(&t, &order, None, now());

        assert!(matches!(result, Err(TournamentError::InsufficientParticipants { required: 3, found: 2 })));
        assert_eq!(t, before);
        assert!(t.winners.is_none());
    }

    #[test]
    fn test_structure_frozen_after_setup() {
        let tournament = qualifying();
        let settings = TournamentSettings {
            qualifiers_per_site: Some(5),
            ..Default::default()
        };

        let result = update_settings(&tournament, &settings, now());
        assert!(matches!(
            result,
            Err(TournamentError::InvalidTransition {
                operation: Operation::UpdateSettings,
                ..
            })
        ));

        let rename = TournamentSettings {
            name: Some("Autumn Cup".to_string()),
            ..Default::default()
        };
        let renamed = update_settings(&tournament, &rename, now()).unwrap();
        assert_eq!(renamed.name, "Autumn Cup");
    }

    #[test]
    fn test_update_sites_in_setup_rebuilds_slots() {
        let tournament = create_tournament(sample_config(), now()).unwrap();
        let settings = TournamentSettings {
            sites_included: Some(vec!["Warwick".to_string(), "Wallkill".to_string()]),
            heat_count: Some(3),
            ..Default::default()
        };

        let updated = update_settings(&tournament, &settings, now()).unwrap();
        let sites: Vec<&String> = updated.qualifying_results.keys().collect();
        assert_eq!(sites, vec!["Wallkill", "Warwick"]);
        assert_eq!(updated.heat_count, 3);
    }

    #[test]
    fn test_schedule_edit_moves_open_races() {
        let tournament = tournament_with_qualifiers(1, &[("A", 1), ("B", 1)]);
        let t = advance_to_heats(&tournament, &mut rng(), now()).unwrap();
        let order = t.heat(1).unwrap().participant_ids();
        let t = resolve_heat(&t, 1, &order, None, now()).unwrap();
        let original_start = t.schedule.heats_start;

        let later = Schedule {
            heats_start: t.schedule.heats_start + chrono::Duration::minutes(15),
            final_start: t.schedule.final_start + chrono::Duration::minutes(15),
            ..t.schedule
        };
        let settings = TournamentSettings {
            schedule: Some(later),
            ..Default::default()
        };
        let t = update_settings(&t, &settings, now()).unwrap();

        // The resolved heat keeps its time; the open one follows the schedule
        assert_eq!(t.heat(1).unwrap().scheduled_time, original_start);
        assert_eq!(t.heat(2).unwrap().scheduled_time, later.heats_start);

        let order = t.heat(2).unwrap().participant_ids();
        let t = resolve_heat(&t, 2, &order, None, now()).unwrap();
        let t = advance_to_final(&t, now()).unwrap();
        let even_later = Schedule {
            final_start: later.final_start + chrono::Duration::minutes(5),
            ..later
        };
        let settings = TournamentSettings {
            schedule: Some(even_later),
            ..Default::default()
        };
        let t = update_settings(&t, &settings, now()).unwrap();
        assert_eq!(t.final_heat.as_ref().unwrap().scheduled_time, even_later.final_start);
    }

    #[test]
    fn test_update_rejects_bad_schedule() {
        let tournament = create_tournament(sample_config(), now()).unwrap();
        let s = tournament.schedule;
        let settings = TournamentSettings {
            schedule: Some(Schedule {
                final_start: s.qualifying_start,
                ..s
            }),
            ..Default::default()
        };

        let result = update_settings(&tournament, &settings, now());
        assert!(matches!(result, Err(TournamentError::InvalidConfig { ref field, .. }) if field == "final_start"));
    }
}

//! Snapshot builders for the core unit tests

use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;

use shared::{
    ParticipantId, QualifierEntry, Schedule, Tournament, TournamentConfig, TournamentId, TournamentStatus,
    TournamentType,
};

pub fn ids(raw: &[&str]) -> Vec<ParticipantId> {
    raw.iter().copied().map(ParticipantId::from).collect()
}

pub fn sample_config() -> TournamentConfig {
    let start = Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap();
    TournamentConfig {
        name: "Summer Cup".to_string(),
        date: start,
        tournament_type: TournamentType::SingleDay,
        schedule: Schedule {
            qualifying_start: start,
            qualifying_end: start + Duration::hours(3),
            heats_start: start + Duration::hours(4),
            final_start: start + Duration::hours(6),
        },
        sites_included: vec!["Fishkill".to_string(), "Warwick".to_string()],
        qualifiers_per_site: 2,
        heat_count: 2,
    }
}

/// A tournament in `qualifying` whose sites hold `count` ranked drivers each.
///
/// Driver `<site>-1` is the fastest at each site.
pub fn tournament_with_qualifiers(qualifiers_per_site: u32, sites: &[(&str, usize)]) -> Tournament {
    let config = sample_config();
    let qualifying_results: BTreeMap<String, Vec<QualifierEntry>> = sites
        .iter()
        .map(|(site, count)| {
            let entries = (1..=*count)
                .map(|n| {
                    QualifierEntry::new(
                        format!("{site}-{n}"),
                        format!("{site} Driver {n}"),
                        60_000 + n as u64 * 1_000,
                        format!("race-{site}"),
                    )
                })
                .collect();
            (site.to_string(), entries)
        })
        .collect();

    Tournament {
        id: TournamentId::new(),
        name: config.name,
        date: config.date,
        tournament_type: config.tournament_type,
        status: TournamentStatus::Qualifying,
        schedule: config.schedule,
        sites_included: sites.iter().map(|(site, _)| site.to_string()).collect(),
        qualifiers_per_site,
        heat_count: config.heat_count,
        qualifying_results,
        heats: Vec::new(),
        final_heat: None,
        winners: None,
        revision: 0,
        created_at: config.date,
        updated_at: config.date,
    }
}

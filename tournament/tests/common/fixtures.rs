//! Test fixtures and data for tournament tests
//!
//! Consistent configs, schedules and qualifier data used across all suites.

use chrono::{DateTime, Duration, TimeZone, Utc};

use shared::{QualifierEntry, Schedule, TournamentConfig, TournamentType};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Standard site names
    pub const SITE_A: &'static str = "Fishkill";
    pub const SITE_B: &'static str = "Warwick";
    pub const SITE_C: &'static str = "Patterson";

    /// Standard configuration values
    pub const TOURNAMENT_NAME: &'static str = "Hudson Valley Cup";
    pub const DEFAULT_QUALIFIERS_PER_SITE: u32 = 2;
    pub const SEED: u64 = 20_250_614;

    /// Event morning
    pub fn event_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap()
    }

    /// Single-day schedule: qualifying 9-12, heats 13:00, final 15:00
    pub fn schedule() -> Schedule {
        let start = Self::event_start();
        Schedule {
            qualifying_start: start,
            qualifying_end: start + Duration::hours(3),
            heats_start: start + Duration::hours(4),
            final_start: start + Duration::hours(6),
        }
    }

    pub fn config(sites: &[&str], qualifiers_per_site: u32) -> TournamentConfig {
        TournamentConfig {
            name: Self::TOURNAMENT_NAME.to_string(),
            date: Self::event_start(),
            tournament_type: TournamentType::SingleDay,
            schedule: Self::schedule(),
            sites_included: sites.iter().map(|s| s.to_string()).collect(),
            qualifiers_per_site,
            heat_count: 2,
        }
    }

    /// Two sites, two qualifiers each
    pub fn two_site_config() -> TournamentConfig {
        Self::config(&[Self::SITE_A, Self::SITE_B], Self::DEFAULT_QUALIFIERS_PER_SITE)
    }

    /// Three sites, two qualifiers each: six drivers reach the final
    pub fn three_site_config() -> TournamentConfig {
        Self::config(
            &[Self::SITE_A, Self::SITE_B, Self::SITE_C],
            Self::DEFAULT_QUALIFIERS_PER_SITE,
        )
    }

    /// Driver `n` of a site, e.g. `Fishkill-3`
    pub fn driver_id(site: &str, n: usize) -> String {
        format!("{site}-{n}")
    }

    pub fn qualifier(site: &str, n: usize, elapsed_ms: u64) -> QualifierEntry {
        QualifierEntry::new(
            Self::driver_id(site, n),
            format!("{site} Driver {n}"),
            elapsed_ms,
            format!("race-{site}-{n}"),
        )
    }
}

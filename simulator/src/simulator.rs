//! Tournament simulator
//!
//! Walks one tournament through every stage with generated data: mock
//! qualifiers per site, then random finishing orders for each heat and the
//! final. Steps can be called one at a time or all at once.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use shared::{
    EngineConfig, ParticipantId, QualifierEntry, Schedule, Tournament, TournamentConfig, TournamentId, TournamentType,
    logging, tournament_info,
};
use tournament::core::is_valid_lap_time;
use tournament::{MemoryTournamentStore, TournamentEngine, TournamentStore};

use crate::config::SimulationConfig;
use crate::error::{SimulatorError, SimulatorResult};

const QUALIFYING_LENGTH_MINUTES: i64 = 60;
const HEATS_GAP_MINUTES: i64 = 10;
const FINAL_GAP_MINUTES: i64 = 30;

/// Lowercase, hyphenated site name used in generated ids
pub fn site_slug(site: &str) -> String {
    site.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Qualifying opens now and runs an hour; heats and the final follow on
pub fn simulated_schedule(now: DateTime<Utc>) -> Schedule {
    let qualifying_end = now + Duration::minutes(QUALIFYING_LENGTH_MINUTES);
    let heats_start = qualifying_end + Duration::minutes(HEATS_GAP_MINUTES);
    Schedule {
        qualifying_start: now,
        qualifying_end,
        heats_start,
        final_start: heats_start + Duration::minutes(FINAL_GAP_MINUTES),
    }
}

pub struct TournamentSimulator<S>
where
    S: TournamentStore + 'static,
{
    engine: TournamentEngine<S>,
    config: SimulationConfig,
    rng: StdRng,
    tournament_id: Option<TournamentId>,
}

impl TournamentSimulator<MemoryTournamentStore> {
    /// Simulator over a throwaway in-memory store
    pub fn in_memory(config: SimulationConfig) -> SimulatorResult<Self> {
        let engine = TournamentEngine::new(
            MemoryTournamentStore::new(),
            EngineConfig {
                rng_seed: config.seed,
                ..EngineConfig::default()
            },
        );
        Self::new(engine, config)
    }
}

impl<S> TournamentSimulator<S>
where
    S: TournamentStore + 'static,
{
    pub fn new(engine: TournamentEngine<S>, config: SimulationConfig) -> SimulatorResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            engine,
            config,
            rng,
            tournament_id: None,
        })
    }

    pub fn engine(&self) -> &TournamentEngine<S> {
        &self.engine
    }

    pub fn tournament_id(&self) -> Option<TournamentId> {
        self.tournament_id
    }

    fn require_id(&self) -> SimulatorResult<TournamentId> {
        self.tournament_id.ok_or(SimulatorError::NoTournament)
    }

    /// Current snapshot of the simulated tournament
    pub async fn tournament(&self) -> SimulatorResult<Tournament> {
        Ok(self.engine.get(&self.require_id()?).await?)
    }

    fn shuffled(&mut self, mut ids: Vec<ParticipantId>) -> Vec<ParticipantId> {
        ids.shuffle(&mut self.rng);
        ids
    }

    fn lap_time(&mut self) -> u64 {
        loop {
            let elapsed_ms = self.rng.gen_range(self.config.min_lap_ms..self.config.max_lap_ms);
            if is_valid_lap_time(elapsed_ms) {
                return elapsed_ms;
            }
        }
    }

    /// Step 1: create the tournament in setup
    pub async fn create_tournament(&mut self) -> SimulatorResult<Tournament> {
        let now = Utc::now();
        let config = TournamentConfig {
            name: self.config.name.clone(),
            date: now,
            tournament_type: TournamentType::SingleDay,
            schedule: simulated_schedule(now),
            sites_included: self.config.sites.clone(),
            qualifiers_per_site: self.config.qualifiers_per_site,
            heat_count: self.config.heat_count,
        };

        let tournament = self.engine.create(config).await?;
        self.tournament_id = Some(tournament.id);
        logging::log_progress("simulator", "create", &format!("tournament {}", tournament.id));
        Ok(tournament)
    }

    /// Step 2: open qualifying
    pub async fn start_qualifying(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        Ok(self.engine.start(&id).await?)
    }

    /// Step 3: record mock qualifying times for every site
    pub async fn add_qualifying_results(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        let sites = self.config.sites.clone();

        for site in &sites {
            let slug = site_slug(site);
            for n in 1..=self.config.drivers_per_site {
                let entry = QualifierEntry::new(
                    format!("{slug}-player-{n}"),
                    format!("{site} Player {n}"),
                    self.lap_time(),
                    format!("mock-race-{slug}"),
                );
                self.engine.record_qualifying_result(&id, site, entry).await?;
            }
        }

        tournament_info!(
            id,
            "🎲 Generated {} qualifiers at each of {} sites",
            self.config.drivers_per_site,
            sites.len()
        );
        self.tournament().await
    }

    /// Step 4: close qualifying and assign heats
    pub async fn advance_to_heats(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        Ok(self.engine.advance_to_heats(&id).await?)
    }

    /// Step 5: resolve every open heat with a random finishing order
    pub async fn complete_heats(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        let snapshot = self.engine.get(&id).await?;
        let mut latest = snapshot.clone();

        for heat in snapshot.heats.iter().filter(|h| !h.is_completed()) {
            let order = self.shuffled(heat.participant_ids());
            let race_id = format!("mock-race-heat-{}", heat.heat_number);
            latest = self.engine.resolve_heat(&id, heat.heat_number, order, Some(race_id)).await?;
        }
        Ok(latest)
    }

    /// Step 6: seed the final from heat points
    pub async fn advance_to_final(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        Ok(self.engine.advance_to_final(&id).await?)
    }

    /// Step 7a: resolve the final with a random finishing order
    pub async fn complete_final(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        let snapshot = self.engine.get(&id).await?;
        let final_heat = snapshot.final_heat.ok_or_else(|| SimulatorError::EmptyRace {
            stage: "final".to_string(),
        })?;

        let order = self.shuffled(final_heat.participant_ids());
        Ok(self
            .engine
            .resolve_final(&id, order, Some("mock-race-final".to_string()))
            .await?)
    }

    /// Step 7b: mark the tournament completed
    pub async fn complete_tournament(&mut self) -> SimulatorResult<Tournament> {
        let id = self.require_id()?;
        Ok(self.engine.advance_to_completed(&id).await?)
    }

    /// Run every step from creation to completion
    pub async fn run_to_completion(&mut self) -> SimulatorResult<Tournament> {
        self.create_tournament().await?;
        self.start_qualifying().await?;
        self.add_qualifying_results().await?;
        self.advance_to_heats().await?;
        self.complete_heats().await?;
        self.advance_to_final().await?;
        self.complete_final().await?;
        let completed = self.complete_tournament().await?;

        logging::log_success("simulator", &format!("tournament {} completed", completed.id));
        Ok(completed)
    }
}

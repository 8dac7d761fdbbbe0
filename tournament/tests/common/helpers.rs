//! Test helpers and builder patterns for tournament tests
//!
//! Builders wire an engine over a memory store or a scripted mock store;
//! helpers drive a tournament through whole stages.

use std::sync::Arc;

use shared::{EngineConfig, Tournament, TournamentConfig, TournamentId, TournamentStatus};
use tournament::traits::MockTournamentStore;
use tournament::{MemoryTournamentStore, TournamentEngine, TournamentResult};

use super::fixtures::TestFixtures;

/// Builder for test engines with sensible defaults
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Seeded engine with default retry settings
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                rng_seed: Some(TestFixtures::SEED),
                ..EngineConfig::default()
            },
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.config.max_conflict_retries = retries;
        self
    }

    /// Engine over a fresh in-memory store
    pub fn build(self) -> TournamentEngine<MemoryTournamentStore> {
        TournamentEngine::new(MemoryTournamentStore::new(), self.config)
    }

    /// Engine over a store the test keeps a handle to
    pub fn build_shared(self, store: Arc<MemoryTournamentStore>) -> TournamentEngine<MemoryTournamentStore> {
        TournamentEngine::with_shared_store(store, self.config)
    }

    /// Engine over a mock store configured by `setup`
    pub fn build_with_mock<F>(self, setup: F) -> TournamentEngine<MockTournamentStore>
    where
        F: FnOnce(&mut MockTournamentStore),
    {
        let mut store = MockTournamentStore::new();
        setup(&mut store);
        TournamentEngine::new(store, self.config)
    }
}

/// Common multi-step operations
pub struct TestHelpers;

impl TestHelpers {
    /// Create and start a tournament
    pub async fn qualifying_tournament(
        engine: &TournamentEngine<MemoryTournamentStore>,
        config: TournamentConfig,
    ) -> TournamentResult<Tournament> {
        let created = engine.create(config).await?;
        engine.start(&created.id).await
    }

    /// Record `count` drivers for a site, driver 1 fastest
    pub async fn seed_site(
        engine: &TournamentEngine<MemoryTournamentStore>,
        id: &TournamentId,
        site: &str,
        count: usize,
    ) -> TournamentResult<()> {
        for n in 1..=count {
            let entry = TestFixtures::qualifier(site, n, 60_000 + n as u64 * 500);
            engine.record_qualifying_result(id, site, entry).await?;
        }
        Ok(())
    }

    /// Resolve every heat with its participants in listed order
    pub async fn resolve_all_heats(
        engine: &TournamentEngine<MemoryTournamentStore>,
        id: &TournamentId,
    ) -> TournamentResult<Tournament> {
        let mut tournament = engine.get(id).await?;
        let heats: Vec<(u32, _)> = tournament
            .heats
            .iter()
            .map(|h| (h.heat_number, h.participant_ids()))
            .collect();

        for (heat_number, order) in heats {
            tournament = engine.resolve_heat(id, heat_number, order, None).await?;
        }
        Ok(tournament)
    }

    /// Drive a seeded three-site tournament all the way into `final`
    pub async fn tournament_in_final(engine: &TournamentEngine<MemoryTournamentStore>) -> TournamentResult<Tournament> {
        let tournament = Self::qualifying_tournament(engine, TestFixtures::three_site_config()).await?;
        for site in [TestFixtures::SITE_A, TestFixtures::SITE_B, TestFixtures::SITE_C] {
            Self::seed_site(engine, &tournament.id, site, 3).await?;
        }
        engine.advance_to_heats(&tournament.id).await?;
        Self::resolve_all_heats(engine, &tournament.id).await?;
        engine.advance_to_final(&tournament.id).await
    }

    pub fn assert_status(tournament: &Tournament, expected: TournamentStatus) {
        assert_eq!(
            tournament.status, expected,
            "tournament {} should be {expected}",
            tournament.id
        );
    }
}

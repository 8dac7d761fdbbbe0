//! End-to-end simulation tests
//!
//! Full five-site runs through the engine, step-by-step runs, and a run over
//! the file store.

use assert_matches::assert_matches;
use std::collections::HashSet;

use shared::{EngineConfig, HeatStatus, TournamentStatus};
use simulator::{SimulationConfig, SimulatorError, TournamentSimulator};
use tournament::{FileTournamentStore, TournamentEngine, TournamentError};

/// Five sites run to completion with three distinct winners
#[tokio::test]
async fn test_full_simulation_completes() {
    // Arrange
    let config = SimulationConfig::builder().seed(1234).build();
    let mut simulator = TournamentSimulator::in_memory(config).unwrap();

    // Act
    let tournament = simulator.run_to_completion().await.unwrap();

    // Assert
    assert_eq!(tournament.status, TournamentStatus::Completed);
    assert_eq!(tournament.sites_included.len(), 5);
    assert!(tournament.qualifying_results.values().all(|list| list.len() == 5));
    assert_eq!(tournament.heats.len(), 2);
    assert!(tournament.heats.iter().all(|h| h.status == HeatStatus::Completed));

    let heat_drivers: usize = tournament.heats.iter().map(|h| h.participants.len()).sum();
    assert_eq!(heat_drivers, 10);
    assert_eq!(tournament.final_heat.as_ref().unwrap().participants.len(), 10);

    let winners = tournament.winners.clone().unwrap();
    let podium: HashSet<_> = [
        &winners.first.participant_id,
        &winners.second.participant_id,
        &winners.third.participant_id,
    ]
    .into_iter()
    .collect();
    assert_eq!(podium.len(), 3);
}

/// Generated qualifiers follow the mock naming and timing rules
#[tokio::test]
async fn test_generated_qualifiers() {
    let config = SimulationConfig::builder()
        .sites(["San Juan", "Warwick"])
        .drivers_per_site(3)
        .seed(9)
        .build();
    let mut simulator = TournamentSimulator::in_memory(config).unwrap();

    simulator.create_tournament().await.unwrap();
    simulator.start_qualifying().await.unwrap();
    let tournament = simulator.add_qualifying_results().await.unwrap();

    let san_juan = tournament.qualifiers_for("San Juan");
    assert_eq!(san_juan.len(), 3);
    assert!(san_juan.windows(2).all(|w| w[0].elapsed_ms <= w[1].elapsed_ms));
    for entry in san_juan {
        assert!(entry.participant_id.as_str().starts_with("san-juan-player-"));
        assert!(entry.participant_name.starts_with("San Juan Player "));
        assert_eq!(entry.race_id, "mock-race-san-juan");
        assert!((60_000..90_000).contains(&entry.elapsed_ms));
    }
}

/// The same seed reproduces the same tournament
#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let run = |seed| async move {
        let config = SimulationConfig::builder().seed(seed).build();
        let mut simulator = TournamentSimulator::in_memory(config).unwrap();
        simulator.run_to_completion().await.unwrap()
    };

    let first = run(77).await;
    let second = run(77).await;

    assert_eq!(first.winners, second.winners);
    assert_eq!(first.qualifying_results, second.qualifying_results);
    let heat_ids = |t: &shared::Tournament| t.heats.iter().map(|h| h.participant_ids()).collect::<Vec<_>>();
    assert_eq!(heat_ids(&first), heat_ids(&second));
}

/// Steps out of order surface the engine's guard
#[tokio::test]
async fn test_steps_out_of_order() {
    let mut simulator = TournamentSimulator::in_memory(SimulationConfig::builder().seed(3).build()).unwrap();
    simulator.create_tournament().await.unwrap();

    let result = simulator.advance_to_heats().await;
    assert_matches!(
        result,
        Err(SimulatorError::Tournament(TournamentError::InvalidTransition { .. }))
    );
}

/// A single site with two drivers cannot fill the podium
#[tokio::test]
async fn test_too_small_simulation_fails_at_final() {
    let config = SimulationConfig::builder()
        .sites(["Warwick"])
        .qualifiers_per_site(2)
        .drivers_per_site(2)
        .seed(5)
        .build();
    let mut simulator = TournamentSimulator::in_memory(config).unwrap();

    let result = simulator.run_to_completion().await;

    assert_matches!(
        result,
        Err(SimulatorError::Tournament(TournamentError::InsufficientParticipants { found: 2, .. }))
    );
    let tournament = simulator.tournament().await.unwrap();
    assert_eq!(tournament.status, TournamentStatus::Final);
}

/// Simulation over the file store leaves a readable document behind
#[tokio::test]
async fn test_simulation_over_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTournamentStore::open(dir.path()).await.unwrap();
    let engine = TournamentEngine::new(store, EngineConfig::default());
    let config = SimulationConfig::builder().seed(11).drivers_per_site(2).build();

    let mut simulator = TournamentSimulator::new(engine, config).unwrap();
    let completed = simulator.run_to_completion().await.unwrap();

    let reopened = FileTournamentStore::open(dir.path()).await.unwrap();
    let engine = TournamentEngine::new(reopened, EngineConfig::default());
    assert_eq!(engine.get(&completed.id).await.unwrap(), completed);
}

/// Invalid generator settings are rejected up front
#[test]
fn test_invalid_config_rejected() {
    let config = SimulationConfig::builder().drivers_per_site(0).build();
    assert_matches!(
        TournamentSimulator::in_memory(config).err(),
        Some(SimulatorError::InvalidConfig { field: "drivers_per_site", .. })
    );
}

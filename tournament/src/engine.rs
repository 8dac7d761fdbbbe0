//! Tournament progression engine
//!
//! Runs each state machine operation as one transaction against the store:
//! load the snapshot, apply the pure transition, then compare-and-swap on the
//! loaded revision. Losing a swap reloads and re-checks the preconditions, so
//! a transition that another caller already made fails its guard instead of
//! running twice.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use shared::{
    EngineConfig, ParticipantId, QualifierEntry, Tournament, TournamentConfig, TournamentId, TournamentSettings,
    tournament_debug, tournament_info, tournament_warn,
};

use crate::core::RecordOutcome;
use crate::core::progression;
use crate::error::{Operation, TournamentError, TournamentResult};
use crate::events::TournamentEvent;
use crate::traits::TournamentStore;

/// A committed transition: the snapshot it started from and the stored result
struct Committed<T> {
    before: Tournament,
    after: Tournament,
    output: T,
}

/// Async front door for every tournament operation
pub struct TournamentEngine<S>
where
    S: TournamentStore + 'static,
{
    store: Arc<S>,
    config: EngineConfig,
    rng: Mutex<StdRng>,
    events: broadcast::Sender<TournamentEvent>,
}

impl<S> TournamentEngine<S>
where
    S: TournamentStore + 'static,
{
    /// Create an engine that owns its store
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create an engine over a store shared with other owners
    pub fn with_shared_store(store: Arc<S>, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            store,
            config,
            rng: Mutex::new(rng),
            events,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receive events for every write made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TournamentEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: TournamentEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn publish_status_change(&self, committed: &Committed<impl Sized>) {
        if committed.before.status != committed.after.status {
            self.publish(TournamentEvent::StatusChanged {
                id: committed.after.id,
                from: committed.before.status,
                to: committed.after.status,
            });
        }
    }

    /// Load-apply-swap with bounded reloads on revision conflicts.
    ///
    /// When `apply` returns the snapshot unchanged nothing is written.
    async fn transact<T, F>(&self, id: &TournamentId, operation: Operation, mut apply: F) -> TournamentResult<Committed<T>>
    where
        F: FnMut(&Tournament) -> TournamentResult<(Tournament, T)>,
    {
        let mut conflicts = 0;

        loop {
            let current = self.get(id).await?;
            let (next, output) = apply(&current)?;

            if next == current {
                tournament_debug!(id, "💤 {} left tournament unchanged", operation);
                return Ok(Committed {
                    before: current.clone(),
                    after: current,
                    output,
                });
            }

            match self.store.compare_and_swap(current.revision, next).await {
                Ok(after) => {
                    return Ok(Committed {
                        before: current,
                        after,
                        output,
                    });
                }
                Err(TournamentError::RevisionConflict { .. }) if conflicts < self.config.max_conflict_retries => {
                    conflicts += 1;
                    tournament_warn!(
                        id,
                        "⚠️ Revision conflict during {}, reloading (attempt {}/{})",
                        operation,
                        conflicts,
                        self.config.max_conflict_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Validate the config and store a new tournament in `setup`
    pub async fn create(&self, config: TournamentConfig) -> TournamentResult<Tournament> {
        let tournament = progression::create_tournament(config, Utc::now())?;
        let stored = self.store.insert(tournament).await?;

        tournament_info!(stored.id, "🏆 Created tournament '{}' for {} sites", stored.name, stored.sites_included.len());
        self.publish(TournamentEvent::Created { id: stored.id });
        Ok(stored)
    }

    pub async fn get(&self, id: &TournamentId) -> TournamentResult<Tournament> {
        self.store
            .load(id)
            .await?
            .ok_or(TournamentError::TournamentNotFound { id: *id })
    }

    pub async fn list(&self) -> TournamentResult<Vec<Tournament>> {
        self.store.list().await
    }

    pub async fn update_settings(&self, id: &TournamentId, settings: TournamentSettings) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::UpdateSettings, |t| {
                Ok((progression::update_settings(t, &settings, Utc::now())?, ()))
            })
            .await?;

        tournament_info!(id, "📝 Settings updated");
        self.publish(TournamentEvent::SettingsUpdated { id: *id });
        Ok(committed.after)
    }

    /// setup -> qualifying
    pub async fn start(&self, id: &TournamentId) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::Start, |t| Ok((progression::start(t, Utc::now())?, ())))
            .await?;

        tournament_info!(id, "🚦 Qualifying open");
        self.publish_status_change(&committed);
        Ok(committed.after)
    }

    /// Offer one qualifying time; only a new best for the driver is stored
    pub async fn record_qualifying_result(
        &self,
        id: &TournamentId,
        site: &str,
        entry: QualifierEntry,
    ) -> TournamentResult<(Tournament, RecordOutcome)> {
        let participant_id = entry.participant_id.clone();
        let elapsed_ms = entry.elapsed_ms;

        let committed = self
            .transact(id, Operation::RecordQualifier, |t| {
                progression::record_qualifier(t, site, entry.clone(), Utc::now())
            })
            .await?;

        match committed.output {
            RecordOutcome::Ignored { best_ms } => {
                tournament_debug!(id, "⏱️ {} at {}: {}ms not faster than {}ms", participant_id, site, elapsed_ms, best_ms);
            }
            _ => {
                tournament_debug!(id, "⏱️ {} at {}: {}ms recorded", participant_id, site, elapsed_ms);
                self.publish(TournamentEvent::QualifierRecorded {
                    id: *id,
                    site: site.to_string(),
                    participant_id,
                    elapsed_ms,
                });
            }
        }
        Ok((committed.after, committed.output))
    }

    /// qualifying -> heats
    pub async fn advance_to_heats(&self, id: &TournamentId) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::AdvanceToHeats, |t| {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                Ok((progression::advance_to_heats(t, &mut *rng, Utc::now())?, ()))
            })
            .await?;

        let drivers: usize = committed.after.heats.iter().map(|h| h.participants.len()).sum();
        tournament_info!(id, "🏎️ {} drivers assigned to {} heats", drivers, committed.after.heats.len());
        self.publish_status_change(&committed);
        Ok(committed.after)
    }

    /// Record a heat's finishing order
    pub async fn resolve_heat(
        &self,
        id: &TournamentId,
        heat_number: u32,
        order: Vec<ParticipantId>,
        race_id: Option<String>,
    ) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::ResolveHeat, |t| {
                Ok((
                    progression::resolve_heat(t, heat_number, &order, race_id.clone(), Utc::now())?,
                    (),
                ))
            })
            .await?;

        tournament_info!(id, "🏁 Heat {} completed", heat_number);
        self.publish(TournamentEvent::HeatResolved { id: *id, heat_number });
        Ok(committed.after)
    }

    /// heats -> final
    pub async fn advance_to_final(&self, id: &TournamentId) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::AdvanceToFinal, |t| {
                Ok((progression::advance_to_final(t, Utc::now())?, ()))
            })
            .await?;

        let entrants = committed.after.final_heat.as_ref().map_or(0, |f| f.participants.len());
        tournament_info!(id, "🎯 Final seeded with {} drivers", entrants);
        self.publish_status_change(&committed);
        Ok(committed.after)
    }

    /// Record the final's finishing order and the podium
    pub async fn resolve_final(
        &self,
        id: &TournamentId,
        order: Vec<ParticipantId>,
        race_id: Option<String>,
    ) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::ResolveFinal, |t| {
                Ok((progression::resolve_final(t, &order, race_id.clone(), Utc::now())?, ()))
            })
            .await?;

        if let Some(winners) = &committed.after.winners {
            tournament_info!(
                id,
                "🥇 {} 🥈 {} 🥉 {}",
                winners.first.participant_name,
                winners.second.participant_name,
                winners.third.participant_name
            );
            self.publish(TournamentEvent::FinalResolved {
                id: *id,
                winners: winners.clone(),
            });
        }
        Ok(committed.after)
    }

    /// final -> completed
    pub async fn advance_to_completed(&self, id: &TournamentId) -> TournamentResult<Tournament> {
        let committed = self
            .transact(id, Operation::AdvanceToCompleted, |t| {
                Ok((progression::advance_to_completed(t, Utc::now())?, ()))
            })
            .await?;

        tournament_info!(id, "✅ Tournament completed");
        self.publish_status_change(&committed);
        Ok(committed.after)
    }
}

//! In-memory tournament store
//!
//! Used by tests and by the simulator when nothing needs to outlive the
//! process.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use shared::{Tournament, TournamentId};

use crate::error::{TournamentError, TournamentResult};
use crate::traits::TournamentStore;

/// Tournament documents held in a locked map
#[derive(Default)]
pub struct MemoryTournamentStore {
    documents: RwLock<HashMap<TournamentId, Tournament>>,
}

impl MemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for MemoryTournamentStore {
    async fn load(&self, id: &TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn insert(&self, tournament: Tournament) -> TournamentResult<Tournament> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&tournament.id) {
            return Err(TournamentError::storage(format!("tournament {} already exists", tournament.id)));
        }
        documents.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn compare_and_swap(&self, expected_revision: u64, mut tournament: Tournament) -> TournamentResult<Tournament> {
        let mut documents = self.documents.write().await;
        let stored = documents
            .get(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound { id: tournament.id })?;

        if stored.revision != expected_revision {
            return Err(TournamentError::RevisionConflict {
                id: tournament.id,
                expected: expected_revision,
                actual: stored.revision,
            });
        }

        tournament.revision = expected_revision + 1;
        documents.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn list(&self) -> TournamentResult<Vec<Tournament>> {
        let mut all: Vec<Tournament> = self.documents.read().await.values().cloned().collect();
        all.sort_by_key(|t| (t.created_at, t.id));
        Ok(all)
    }

    async fn delete(&self, id: &TournamentId) -> TournamentResult<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }
}

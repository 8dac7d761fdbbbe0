//! Trait definitions with mockall annotations for testing
//!
//! The store is the only seam between the engine and persistence. Engine tests
//! inject `MockTournamentStore` to script conflicts and failures.

use shared::{Tournament, TournamentId};

use crate::error::TournamentResult;

/// Persistence for tournament documents
///
/// Implementations must make `compare_and_swap` atomic per document: a write
/// lands only when the stored revision still equals `expected_revision`, and
/// the stored copy then carries `expected_revision + 1`.
#[mockall::automock]
#[async_trait::async_trait]
pub trait TournamentStore: Send + Sync {
    /// Load a snapshot, `None` when the id is unknown
    async fn load(&self, id: &TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Store a new document. Fails if the id already exists.
    async fn insert(&self, tournament: Tournament) -> TournamentResult<Tournament>;

    /// Replace the document if nobody else wrote since `expected_revision`
    ///
    /// # Returns
    /// The stored snapshot with its bumped revision, or `RevisionConflict`
    async fn compare_and_swap(&self, expected_revision: u64, tournament: Tournament) -> TournamentResult<Tournament>;

    /// All documents, oldest first
    async fn list(&self) -> TournamentResult<Vec<Tournament>>;

    /// Remove a document; `false` when it did not exist
    async fn delete(&self, id: &TournamentId) -> TournamentResult<bool>;
}

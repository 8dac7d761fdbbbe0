//! Kart tournament progression engine
//!
//! Pure transition functions over tournament snapshots, a store seam with
//! compare-and-swap writes, and the async engine that ties them together for
//! the admin, ingestion and display layers.

pub mod core;
pub mod engine;
pub mod error;
pub mod events;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use core::{RecordOutcome, points_for_position};
pub use engine::TournamentEngine;
pub use error::{Operation, RaceRef, TournamentError, TournamentResult, TransitionBlocker};
pub use events::TournamentEvent;
pub use services::{FileTournamentStore, MemoryTournamentStore};
pub use traits::TournamentStore;

//! Core progression logic
//!
//! Pure transforms over tournament snapshots with no I/O. Randomness is
//! injected by the caller so every function is deterministic under test.

pub mod final_race;
pub mod heats;
pub mod points;
pub mod progression;
pub mod qualifiers;
pub mod scoring;

#[cfg(test)]
pub(crate) mod test_support;

pub use final_race::{PODIUM_SIZE, resolve_final};
pub use heats::{assemble_heats, heat_sizes, qualifier_pool, resolve_heat, validate_finishing_order};
pub use points::aggregate_points;
pub use qualifiers::{RecordOutcome, is_valid_lap_time, rank_qualifiers, record_best_time, top_qualifiers};
pub use scoring::points_for_position;

//! Store implementations
//!
//! Real implementations of the `TournamentStore` trait.

pub mod file_store;
pub mod memory_store;

#[cfg(test)]
mod tests;

pub use file_store::FileTournamentStore;
pub use memory_store::MemoryTournamentStore;

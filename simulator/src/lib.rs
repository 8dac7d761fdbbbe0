//! Tournament simulator
//!
//! Drives a complete tournament through the progression engine with
//! generated qualifying times and random race results, for demos and for
//! exercising the engine end to end.
//!
//! ```no_run
//! use simulator::{SimulationConfig, TournamentSimulator};
//!
//! # async fn run() -> simulator::SimulatorResult<()> {
//! let config = SimulationConfig::builder().seed(42).build();
//! let mut simulator = TournamentSimulator::in_memory(config)?;
//! let tournament = simulator.run_to_completion().await?;
//! assert!(tournament.winners.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod simulator;

pub use config::{SimulationConfig, SimulationConfigBuilder};
pub use error::{SimulatorError, SimulatorResult};
pub use simulator::{TournamentSimulator, simulated_schedule, site_slug};

//! Simulation configuration and builder

use serde::{Deserialize, Serialize};

use shared::{DEFAULT_HEAT_COUNT, KNOWN_SITES};

use crate::error::{SimulatorError, SimulatorResult};

/// How a simulated tournament is set up and populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    pub sites: Vec<String>,
    pub qualifiers_per_site: u32,
    pub heat_count: u32,
    /// Mock drivers generated per site during qualifying
    pub drivers_per_site: usize,
    /// Generated lap times fall in `min_lap_ms..max_lap_ms`
    pub min_lap_ms: u64,
    pub max_lap_ms: u64,
    /// Seed for lap times, finishing orders and heat assignment
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "Simulated Tournament".to_string(),
            sites: KNOWN_SITES.iter().map(|s| s.to_string()).collect(),
            qualifiers_per_site: 2,
            heat_count: DEFAULT_HEAT_COUNT,
            drivers_per_site: 5,
            min_lap_ms: 60_000,
            max_lap_ms: 90_000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
    }

    /// Checks the generator settings; tournament fields are checked on creation
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.drivers_per_site == 0 {
            return Err(SimulatorError::InvalidConfig {
                field: "drivers_per_site",
                reason: "at least one driver per site is required".to_string(),
            });
        }
        if self.min_lap_ms == 0 || self.min_lap_ms >= self.max_lap_ms {
            return Err(SimulatorError::InvalidConfig {
                field: "min_lap_ms",
                reason: format!("lap range {}..{} is empty", self.min_lap_ms, self.max_lap_ms),
            });
        }
        Ok(())
    }
}

pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    /// Set the tournament name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = name.into();
        self
    }

    /// Replace the site list
    pub fn sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.sites = sites.into_iter().map(Into::into).collect();
        self
    }

    pub fn qualifiers_per_site(mut self, count: u32) -> Self {
        self.config.qualifiers_per_site = count;
        self
    }

    pub fn heat_count(mut self, count: u32) -> Self {
        self.config.heat_count = count;
        self
    }

    pub fn drivers_per_site(mut self, count: usize) -> Self {
        self.config.drivers_per_site = count;
        self
    }

    /// Set the generated lap time range in milliseconds
    pub fn lap_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.config.min_lap_ms = min_ms;
        self.config.max_lap_ms = max_ms;
        self
    }

    /// Fix the seed for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> SimulationConfig {
        self.config
    }
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

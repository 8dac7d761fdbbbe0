//! Simulator runner
//!
//! Runs one simulated tournament to completion, either in memory or against
//! the JSON document directory the `kartcup` admin CLI reads.

use clap::Parser;
use std::path::PathBuf;

use shared::{EngineConfig, Tournament, logging};
use simulator::{SimulationConfig, TournamentSimulator};
use tournament::{FileTournamentStore, TournamentEngine, TournamentStore};

#[derive(Parser)]
#[command(name = "kartcup-sim")]
#[command(about = "Simulates a kart tournament from qualifying to the podium")]
struct Args {
    /// Persist to this document directory instead of memory
    #[arg(long, env = "KARTCUP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Tournament name
    #[arg(long, default_value = "Simulated Tournament")]
    name: String,

    /// Comma-separated sites, defaults to all five
    #[arg(long, value_delimiter = ',')]
    sites: Option<Vec<String>>,

    #[arg(long, default_value = "2")]
    qualifiers_per_site: u32,

    #[arg(long, default_value = "2")]
    heat_count: u32,

    /// Mock drivers per site
    #[arg(long, default_value = "5")]
    drivers_per_site: usize,

    /// Seed for a reproducible run
    #[arg(long, env = "KARTCUP_SEED")]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KARTCUP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print the final document as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        let mut builder = SimulationConfig::builder()
            .name(self.name.clone())
            .qualifiers_per_site(self.qualifiers_per_site)
            .heat_count(self.heat_count)
            .drivers_per_site(self.drivers_per_site);
        if let Some(sites) = &self.sites {
            builder = builder.sites(sites.iter().map(|s| s.trim().to_string()));
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}

async fn simulate<S: TournamentStore + 'static>(
    engine: TournamentEngine<S>,
    config: SimulationConfig,
) -> anyhow::Result<Tournament> {
    let mut simulator = TournamentSimulator::new(engine, config)?;
    Ok(simulator.run_to_completion().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup("kartcup-sim", &format!("simulating '{}'", args.name));

    let config = args.simulation_config();
    let engine_config = EngineConfig {
        rng_seed: config.seed,
        ..EngineConfig::default()
    };

    let result = match &args.data_dir {
        Some(dir) => {
            let store = FileTournamentStore::open(dir).await?;
            simulate(TournamentEngine::new(store, engine_config), config).await
        }
        None => simulate(TournamentEngine::new(tournament::MemoryTournamentStore::new(), engine_config), config).await,
    };

    let tournament = match result {
        Ok(tournament) => tournament,
        Err(e) => {
            logging::log_error("kartcup-sim", "simulation", &e);
            return Err(e);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tournament)?);
    } else if let Some(winners) = &tournament.winners {
        println!("{} ({})", tournament.name, tournament.id);
        println!("  🥇 {} ({})", winners.first.participant_name, winners.first.site);
        println!("  🥈 {} ({})", winners.second.participant_name, winners.second.site);
        println!("  🥉 {} ({})", winners.third.participant_name, winners.third.site);
    }

    logging::log_shutdown("kartcup-sim", "simulation finished");
    Ok(())
}

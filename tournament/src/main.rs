//! Main entry point for the kartcup admin CLI
//!
//! Every subcommand runs one engine operation against a directory of JSON
//! tournament documents and prints the resulting snapshot.

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use shared::schedule::{format_lap_time, stage_progress, time_remaining};
use shared::{
    DEFAULT_HEAT_COUNT, EngineConfig, ParticipantId, QualifierEntry, Schedule, Tournament, TournamentConfig,
    TournamentId, TournamentSettings, TournamentStatus, TournamentType, find_active, logging,
};
use tournament::{FileTournamentStore, RecordOutcome, TournamentEngine};

/// Admin tool for kart tournament progression
#[derive(Parser)]
#[command(name = "kartcup")]
#[command(about = "Runs a kart tournament from qualifying to the podium")]
pub struct Cli {
    /// Directory holding one JSON document per tournament
    #[arg(long, env = "KARTCUP_DATA_DIR", default_value = "./data/tournaments")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KARTCUP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Reloads allowed after a concurrent write
    #[arg(long, env = "KARTCUP_MAX_CONFLICT_RETRIES", default_value = "3")]
    pub max_conflict_retries: u32,

    /// Fixed seed for heat assignment
    #[arg(long, env = "KARTCUP_SEED")]
    pub seed: Option<u64>,

    /// Print full JSON documents instead of summaries
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a tournament in setup
    Create {
        #[arg(long)]
        name: String,
        /// Comma-separated site names
        #[arg(long, value_delimiter = ',', required = true)]
        sites: Vec<String>,
        #[arg(long, default_value = "2")]
        qualifiers_per_site: u32,
        #[arg(long, default_value_t = DEFAULT_HEAT_COUNT)]
        heat_count: u32,
        /// singleDay or multiDay; inferred from the schedule when omitted
        #[arg(long)]
        tournament_type: Option<TournamentType>,
        /// RFC 3339 timestamps
        #[arg(long)]
        qualifying_start: DateTime<Utc>,
        #[arg(long)]
        qualifying_end: DateTime<Utc>,
        #[arg(long)]
        heats_start: DateTime<Utc>,
        #[arg(long)]
        final_start: DateTime<Utc>,
        /// Event date, defaults to the qualifying start
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
    /// List all tournaments
    List,
    /// Show one tournament, or the active one when no id is given
    Show { id: Option<TournamentId> },
    /// Edit tournament settings
    Update {
        id: TournamentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        sites: Option<Vec<String>>,
        #[arg(long)]
        qualifiers_per_site: Option<u32>,
        #[arg(long)]
        heat_count: Option<u32>,
        #[arg(long)]
        date: Option<DateTime<Utc>>,
        #[arg(long)]
        tournament_type: Option<TournamentType>,
        /// Schedule changes; omitted timestamps keep their current value
        #[command(flatten)]
        schedule: ScheduleEdit,
    },
    /// Open qualifying
    Start { id: TournamentId },
    /// Record a qualifying lap time
    Record {
        id: TournamentId,
        #[arg(long)]
        site: String,
        #[arg(long)]
        participant_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        elapsed_ms: u64,
        #[arg(long)]
        race_id: String,
    },
    /// Close qualifying and assign heats
    AdvanceHeats { id: TournamentId },
    /// Record a heat finishing order
    ResolveHeat {
        id: TournamentId,
        #[arg(long)]
        heat: u32,
        /// Comma-separated participant ids, winner first
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<String>,
        #[arg(long)]
        race_id: Option<String>,
    },
    /// Close the heats and seed the final
    AdvanceFinal { id: TournamentId },
    /// Record the final finishing order
    ResolveFinal {
        id: TournamentId,
        /// Comma-separated participant ids, winner first
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<String>,
        #[arg(long)]
        race_id: Option<String>,
    },
    /// Mark the tournament completed
    Complete { id: TournamentId },
}

/// Optional RFC 3339 overrides for individual schedule timestamps
#[derive(Args, Debug, Default)]
pub struct ScheduleEdit {
    #[arg(long)]
    pub qualifying_start: Option<DateTime<Utc>>,
    #[arg(long)]
    pub qualifying_end: Option<DateTime<Utc>>,
    #[arg(long)]
    pub heats_start: Option<DateTime<Utc>>,
    #[arg(long)]
    pub final_start: Option<DateTime<Utc>>,
}

impl ScheduleEdit {
    fn is_empty(&self) -> bool {
        self.qualifying_start.is_none()
            && self.qualifying_end.is_none()
            && self.heats_start.is_none()
            && self.final_start.is_none()
    }

    fn apply_to(&self, current: Schedule) -> Schedule {
        Schedule {
            qualifying_start: self.qualifying_start.unwrap_or(current.qualifying_start),
            qualifying_end: self.qualifying_end.unwrap_or(current.qualifying_end),
            heats_start: self.heats_start.unwrap_or(current.heats_start),
            final_start: self.final_start.unwrap_or(current.final_start),
        }
    }
}

fn to_ids(raw: Vec<String>) -> Vec<ParticipantId> {
    raw.into_iter().map(|id| ParticipantId::new(id.trim())).collect()
}

fn print_summary(tournament: &Tournament) {
    let now = Utc::now();
    println!("{} [{}] {}", tournament.name, tournament.status, tournament.id);
    println!("  type: {}, revision: {}", tournament.tournament_type, tournament.revision);

    match tournament.status {
        TournamentStatus::Qualifying => {
            let schedule = &tournament.schedule;
            println!(
                "  qualifying closes in {} ({:.0}% elapsed)",
                time_remaining(schedule.qualifying_end, now),
                stage_progress(schedule.qualifying_start, schedule.qualifying_end, now)
            );
        }
        TournamentStatus::Heats => {
            println!("  final starts in {}", time_remaining(tournament.schedule.final_start, now));
        }
        _ => {}
    }

    for site in &tournament.sites_included {
        let entries = tournament.qualifiers_for(site);
        println!("  {site}: {} qualifying times", entries.len());
        for (rank, entry) in entries.iter().take(tournament.qualifiers_per_site as usize).enumerate() {
            println!(
                "    {}. {} ({}) {}",
                rank + 1,
                entry.participant_name,
                entry.participant_id,
                format_lap_time(entry.elapsed_ms)
            );
        }
    }

    for heat in &tournament.heats {
        println!("  Heat {} [{}]", heat.heat_number, heat.status);
        for entrant in &heat.participants {
            let result = match (entrant.position, entrant.points) {
                (Some(position), Some(points)) => format!("P{position} {points}pts"),
                _ => "-".to_string(),
            };
            println!("    {} ({}) {}", entrant.participant.participant_name, entrant.participant.site, result);
        }
    }

    if let Some(final_heat) = &tournament.final_heat {
        println!("  Final [{}]", final_heat.status);
        for entrant in &final_heat.participants {
            let position = entrant.position.map_or("-".to_string(), |p| format!("P{p}"));
            println!(
                "    {} ({}) {}pts {}",
                entrant.participant.participant_name, entrant.participant.site, entrant.total_points, position
            );
        }
    }

    if let Some(winners) = &tournament.winners {
        println!(
            "  🥇 {}  🥈 {}  🥉 {}",
            winners.first.participant_name, winners.second.participant_name, winners.third.participant_name
        );
    }
}

fn print_tournament(tournament: &Tournament, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tournament)?);
    } else {
        print_summary(tournament);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Cli::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup("kartcup", &format!("data dir {}", args.data_dir.display()));

    let store = FileTournamentStore::open(&args.data_dir)
        .await
        .with_context(|| format!("opening tournament store at {}", args.data_dir.display()))?;
    let engine = TournamentEngine::new(
        store,
        EngineConfig {
            max_conflict_retries: args.max_conflict_retries,
            rng_seed: args.seed,
            ..EngineConfig::default()
        },
    );

    let tournament = match args.command {
        Command::Create {
            name,
            sites,
            qualifiers_per_site,
            heat_count,
            tournament_type,
            qualifying_start,
            qualifying_end,
            heats_start,
            final_start,
            date,
        } => {
            let schedule = Schedule {
                qualifying_start,
                qualifying_end,
                heats_start,
                final_start,
            };
            let config = TournamentConfig {
                name,
                date: date.unwrap_or(qualifying_start),
                tournament_type: tournament_type.unwrap_or_else(|| TournamentType::infer(&schedule)),
                schedule,
                sites_included: sites.into_iter().map(|s| s.trim().to_string()).collect(),
                qualifiers_per_site,
                heat_count,
            };
            engine.create(config).await?
        }
        Command::List => {
            let all = engine.list().await?;
            if all.is_empty() {
                println!("No tournaments in {}", args.data_dir.display());
            }
            for t in &all {
                println!("{}  {:<10}  {}", t.id, t.status, t.name);
            }
            return Ok(());
        }
        Command::Show { id: Some(id) } => engine.get(&id).await?,
        Command::Show { id: None } => {
            let all = engine.list().await?;
            match find_active(&all) {
                Some(active) => active.clone(),
                None => bail!("no active tournament"),
            }
        }
        Command::Update {
            id,
            name,
            sites,
            qualifiers_per_site,
            heat_count,
            date,
            tournament_type,
            schedule,
        } => {
            let schedule = if schedule.is_empty() {
                None
            } else {
                Some(schedule.apply_to(engine.get(&id).await?.schedule))
            };
            let settings = TournamentSettings {
                name,
                date,
                tournament_type,
                schedule,
                sites_included: sites,
                qualifiers_per_site,
                heat_count,
            };
            engine.update_settings(&id, settings).await?
        }
        Command::Start { id } => engine.start(&id).await?,
        Command::Record {
            id,
            site,
            participant_id,
            name,
            elapsed_ms,
            race_id,
        } => {
            let entry = QualifierEntry::new(participant_id, name, elapsed_ms, race_id);
            let (tournament, outcome) = engine.record_qualifying_result(&id, &site, entry).await?;
            match outcome {
                RecordOutcome::Inserted => println!("Recorded new qualifier"),
                RecordOutcome::Improved { previous_ms } => {
                    println!("Improved on {}", format_lap_time(previous_ms))
                }
                RecordOutcome::Ignored { best_ms } => {
                    println!("Kept existing best of {}", format_lap_time(best_ms))
                }
            }
            tournament
        }
        Command::AdvanceHeats { id } => engine.advance_to_heats(&id).await?,
        Command::ResolveHeat {
            id,
            heat,
            order,
            race_id,
        } => engine.resolve_heat(&id, heat, to_ids(order), race_id).await?,
        Command::AdvanceFinal { id } => engine.advance_to_final(&id).await?,
        Command::ResolveFinal { id, order, race_id } => engine.resolve_final(&id, to_ids(order), race_id).await?,
        Command::Complete { id } => engine.advance_to_completed(&id).await?,
    };

    print_tournament(&tournament, args.json)?;
    Ok(())
}

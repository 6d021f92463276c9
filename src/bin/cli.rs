use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use team_settlement::settlement::{daily_stats, record_result};
use team_settlement::teams::matching::are_equivalent;
use team_settlement::teams::normalizer::{normalize, team_name_variations, NormalizeMode};
use team_settlement::{settle_snapshot, Config, GameId, Ledger, ResultPayload};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli", about = "Team identity resolution and bet settlement")]
struct Cli {
    /// Ledger snapshot (overrides SETTLEMENT_SNAPSHOT)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the normalized form of a team name
    Normalize {
        name: String,
        /// Strip the trailing mascot as well
        #[arg(long)]
        lookup: bool,
        /// Also list alternative spellings
        #[arg(long)]
        variations: bool,
    },
    /// Check whether two names denote the same program
    Match { a: String, b: String },
    /// Attach a result payload (JSON) to a game
    RecordResult { game_id: i64, payload: String },
    /// Settle every pick for a date (default: yesterday)
    Settle {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Grade games concurrently
        #[arg(long)]
        parallel: bool,
    },
    /// Show performance for a date (default: yesterday)
    Stats {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List teams whose stored names are not canonical
    Audit,
}

fn yesterday() -> NaiveDate {
    (Local::now() - Duration::days(1)).date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = cli.snapshot {
        config.snapshot_path = path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    match cli.command {
        Command::Normalize {
            name,
            lookup,
            variations,
        } => {
            let mode = if lookup {
                NormalizeMode::Lookup
            } else {
                NormalizeMode::Matching
            };
            println!("{}", normalize(&name, mode));
            if variations {
                for variation in team_name_variations(&name) {
                    println!("  {}", variation);
                }
            }
        }
        Command::Match { a, b } => {
            let verdict = if are_equivalent(&a, &b) {
                "same team"
            } else {
                "different teams"
            };
            println!("'{}' vs '{}': {}", a, b, verdict);
        }
        Command::RecordResult { game_id, payload } => {
            let payload: ResultPayload =
                serde_json::from_str(&payload).context("Failed to parse result payload")?;
            let mut ledger = Ledger::load(&config.snapshot_path)?;
            let home_away = record_result(&mut ledger, GameId(game_id), payload)?;
            ledger.save(&config.snapshot_path)?;
            println!("Recorded result for game {}: {:?}", game_id, home_away);
        }
        Command::Settle { date, parallel } => {
            config.parallel |= parallel;
            let date = date.unwrap_or_else(yesterday);
            let run = settle_snapshot(&config, date).await?;
            println!("{}\n", run.report.format());
            println!("{}", run.stats.format());
            if !run.pending.is_empty() {
                let ids: Vec<String> = run.pending.iter().map(|id| id.to_string()).collect();
                println!("\nStill open: {}", ids.join(", "));
            }
        }
        Command::Stats { date } => {
            let date = date.unwrap_or_else(yesterday);
            let ledger = Ledger::load(&config.snapshot_path)?;
            println!("{}", daily_stats(&ledger, date, config.unit_value).format());
        }
        Command::Audit => {
            let ledger = Ledger::load(&config.snapshot_path)?;
            let bad = ledger.registry().audit();
            if bad.is_empty() {
                println!("All {} team names are canonical.", ledger.registry().len());
            } else {
                println!("Found {} non-canonical team names:\n", bad.len());
                for (i, team) in bad.iter().enumerate() {
                    println!("{}. [{}] {}", i + 1, team.id, team.canonical_name);
                }
            }
        }
    }

    Ok(())
}

//! Binary entrypoint for the Weekly World admin CLI.
//!
//! Commands:
//! - `status` - environment, current challenge and tracked progress
//! - `cleanup` - run the deleted-world sweep over identifiers and progress
//! - `check-profile <uuid>` - query the API for a player profile
//! - `submit <uuid> [--week <n>]` - send a week completion for a player
//!
//! See the library crate docs for module-level details: `weeklyworld::`.
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use weeklyworld::challenge::restrictions::RestrictionType;
use weeklyworld::config::Paths;
use weeklyworld::{logutil, metrics, WeeklyWorld};

#[derive(Parser)]
#[command(name = "weeklyworld")]
#[command(about = "Admin tool for Weekly World challenge data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Host config directory holding the weekly_world_*.json files
    #[arg(short, long, default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Saves directory (defaults to `saves` next to the config directory)
    #[arg(short, long, global = true)]
    saves_dir: Option<PathBuf>,

    /// Append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show environment, challenge and progress summary
    Status,
    /// Remove identifiers and progress of worlds missing from the saves directory
    Cleanup,
    /// Check whether a player has a Weekly World profile
    CheckProfile {
        /// Player UUID
        uuid: String,
    },
    /// Submit a week completion for a player
    Submit {
        /// Player UUID
        uuid: String,
        /// Week number (defaults to the week in the objectives file)
        #[arg(short, long)]
        week: Option<u32>,
    },
}

fn parse_player(uuid: &str) -> Result<String> {
    match uuid::Uuid::parse_str(uuid) {
        Ok(id) => Ok(id.hyphenated().to_string()),
        Err(e) => bail!("invalid player UUID '{}': {}", uuid, e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logutil::init_logging(cli.verbose, cli.log_file.as_deref());

    let mut paths = Paths::new(cli.config_dir.clone());
    if let Some(saves) = cli.saves_dir {
        paths = paths.with_saves_dir(saves);
    }
    let service = WeeklyWorld::new(paths, tokio::runtime::Handle::current())?;

    match cli.command {
        Commands::Status => {
            let env = service.environment();
            let descriptor = service.loader().load();
            println!("Weekly World v{}", env!("CARGO_PKG_VERSION"));
            println!("Config dir:  {}", service.paths().config_dir.display());
            println!("Saves dir:   {}", service.paths().saves_dir.display());
            println!(
                "API:         {}",
                if env.is_configured() {
                    env.api_base().unwrap_or_default().to_string()
                } else {
                    "not configured".to_string()
                }
            );
            let settings = service.client().settings();
            println!(
                "Requests:    {} attempts, {}ms apart, {}s timeout",
                settings.max_retries,
                settings.retry_delay.as_millis(),
                settings.request_timeout.as_secs()
            );
            println!("Objectives file: {}", service.loader().path().display());
            println!("Week:        {}", descriptor.week());
            println!("Restrictions:");
            for r in descriptor.restrictions() {
                let known = !r.malformed && RestrictionType::parse(&r.kind).is_some();
                println!("  - {}{}", r.label(), if known { "" } else { " (never met)" });
            }
            let tasks = descriptor.tasks();
            println!("Objectives ({}):", tasks.len());
            for o in &tasks {
                println!("  - {}", o.label());
            }
            println!("Tracked players: {}", service.progress().tracked_players().len());
            println!("Tracked worlds:  {}", service.progress().tracked_worlds().len());
            println!("World identifiers: {}", service.identities().identifiers().len());
        }
        Commands::Cleanup => {
            info!("Running deleted-world sweep");
            let before = service.progress().tracked_worlds().len();
            service.on_server_started();
            let after = service.progress().tracked_worlds().len();
            println!("Tracked worlds: {} -> {}", before, after);
        }
        Commands::CheckProfile { uuid } => {
            let player = parse_player(&uuid)?;
            let outcome = service.client().check_profile(&player).await;
            let snapshot = metrics::snapshot();
            let payload = serde_json::json!({
                "player": player,
                "outcome": format!("{:?}", outcome),
                "attempts": snapshot.http_attempts,
                "retries": snapshot.http_retries,
            });
            println!("{}", payload);
        }
        Commands::Submit { uuid, week } => {
            let player = parse_player(&uuid)?;
            let week = week.unwrap_or_else(|| service.loader().load().week());
            let outcome = service.client().submit_completion(&player, week).await;
            let snapshot = metrics::snapshot();
            let payload = serde_json::json!({
                "player": player,
                "week": week,
                "outcome": format!("{:?}", outcome),
                "attempts": snapshot.http_attempts,
                "retries": snapshot.http_retries,
            });
            println!("{}", payload);
        }
    }

    Ok(())
}

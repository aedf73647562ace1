//! ShowCal CLI
//!
//! Runs the venue adapters, reconciles their listings into the live feed
//! and reports what changed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use showcal::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, RunClock},
    services::ScraperRegistry,
    storage::{FeedStorage, LocalStorage},
};

/// Exit code for errors that stop a command outright.
const EXIT_FATAL: u8 = 2;

/// ShowCal - local concert listings aggregator
#[derive(Parser, Debug)]
#[command(
    name = "showcal",
    version,
    about = "Collects venue listings into one merged, archived feed"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "showcal.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect every configured venue (or one) and update the feed
    Run {
        /// Only collect this adapter id
        #[arg(long)]
        source: Option<String>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured adapters
    List,

    /// Collect one adapter and print its events without saving anything
    Raw {
        /// Adapter id
        id: String,
    },

    /// Validate the configuration and the persisted feed
    Validate,

    /// Show what the persisted state currently holds
    Info,
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the config, falling back to defaults when the file is absent.
/// A file that exists but does not parse is an error.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_config(&cli.config);
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load {}: {}", cli.config.display(), e);
            return ExitCode::from(EXIT_FATAL);
        }
    };
    if !cli.config.exists() {
        log::info!("No config at {}, using defaults", cli.config.display());
    }

    match execute(cli.command, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn execute(command: Command, config: &Config) -> Result<u8> {
    match command {
        Command::Run { source, json } => {
            config.validate()?;
            let registry = ScraperRegistry::from_config(config)?;
            let storage = LocalStorage::from_config(config);
            let clock = RunClock::system();

            log::info!("ShowCal run starting ({} adapters)", registry.len());
            let report = match source.as_deref() {
                Some(id) => {
                    pipeline::run_single(&registry, id, &storage, &config.reconcile, &clock)?
                }
                None => pipeline::run_all(&registry, &storage, &config.reconcile, &clock)?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            Ok(report.exit_code())
        }

        Command::List => {
            let registry = ScraperRegistry::from_config(config)?;
            for info in registry.infos() {
                println!("{:<16} {:<22} {}", info.id, info.name, info.url);
            }
            Ok(0)
        }

        Command::Raw { id } => {
            let registry = ScraperRegistry::from_config(config)?;
            let scraper = registry
                .get(&id)
                .ok_or_else(|| AppError::UnknownSource(id.clone()))?;

            match scraper.collect() {
                Ok(events) => {
                    log::info!("{}: {} events", scraper.name(), events.len());
                    println!("{}", serde_json::to_string_pretty(&events)?);
                    Ok(0)
                }
                Err(e) => {
                    log::error!("{} failed: {}", scraper.name(), e);
                    Ok(1)
                }
            }
        }

        Command::Validate => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Ok(1);
            }
            log::info!("✓ Config OK ({} sources)", config.sources.len());

            let events_path = config.events_path();
            let result = pipeline::validate_file(&events_path, &config.scraper.image_url_prefix)?;

            for warning in &result.warnings {
                println!("⚠ {warning}");
            }
            for error in &result.errors {
                println!("✗ {error}");
            }

            if result.is_ok() {
                println!(
                    "✓ Validated {} events in {}",
                    result.checked,
                    events_path.display()
                );
                Ok(0)
            } else {
                println!("{} error(s) in {}", result.errors.len(), events_path.display());
                Ok(1)
            }
        }

        Command::Info => {
            let storage = LocalStorage::from_config(config);
            let feed = storage.load_feed()?;
            let history = storage.load_history()?;

            println!("Live feed: {}", storage.events_path().display());
            println!("  last updated: {}", or_never(&feed.last_updated));
            println!("  events:       {}", feed.events.len());
            println!("History: {}", storage.history_path().display());
            println!("  last updated: {}", or_never(&history.last_updated));
            println!("  shows:        {}", history.shows.len());

            if feed.sources.is_empty() {
                println!("No source statuses recorded yet.");
            } else {
                println!("Sources:");
                for status in &feed.sources {
                    match &status.error {
                        None => println!(
                            "  ✓ {:<22} {:>4} events  {}",
                            status.name, status.event_count, status.last_scraped
                        ),
                        Some(err) => println!(
                            "  ✗ {:<22} {}  {}",
                            status.name, err, status.last_scraped
                        ),
                    }
                }
            }
            Ok(0)
        }
    }
}

fn or_never(stamp: &str) -> &str {
    if stamp.is_empty() { "never" } else { stamp }
}

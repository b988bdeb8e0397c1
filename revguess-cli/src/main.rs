//! revguess - "next game" picker and guess statistics
//!
//! Command-line front end over the revguess-common core. Results go to
//! stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use revguess_common::config::ConfigResolver;
use revguess_common::SelectionMode;
use revguess_cli::app::{lifetime_label, streak_label};
use revguess_cli::{logging, App};
use tracing::{debug, info};

/// Command-line arguments for revguess
#[derive(Parser, Debug)]
#[command(name = "revguess")]
#[command(about = "Pick the next game to guess and track guess streaks")]
#[command(version)]
struct Args {
    /// Configuration file (overrides REVGUESS_CONFIG and the default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the store page of the next game
    Next {
        /// Selection mode (defaults to the saved preference)
        #[arg(short, long)]
        mode: Option<String>,

        /// Print only the game id
        #[arg(long)]
        id_only: bool,
    },
    /// Record the outcome of a finished round
    Record {
        #[arg(value_enum)]
        outcome: Outcome,
    },
    /// Show streak and lifetime stats
    Stats,
    /// Reset lifetime stats (the streak is kept)
    ClearStats,
    /// Show or set the selection mode (balanced, raw)
    Mode { value: Option<String> },
    /// Show or set the result layout (ranges, exact)
    Layout { value: Option<String> },
    /// Count the released game ids
    Released,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Correct,
    Incorrect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = logging::init();

    debug!(
        "revguess v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let (config, source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    log_level.apply_configured(&config.logging.level)?;
    info!("Configuration source: {:?}", source);

    let app = App::from_config(&config).context("Failed to initialize")?;

    match args.command {
        Command::Next { mode, id_only } => {
            // Unknown mode strings fall back to the default, like stored ones
            let mode = mode.as_deref().map(SelectionMode::coerce);
            if id_only {
                println!("{}", app.next_id(mode).await);
            } else {
                println!("{}", app.next_url(mode).await);
            }
        }
        Command::Record { outcome } => {
            let summary = app.record(outcome == Outcome::Correct);
            println!("{}", streak_label(summary.streak));
            println!("{}", lifetime_label(&summary.lifetime));
        }
        Command::Stats => {
            println!("{}", streak_label(app.stats.streak()));
            println!("{}", lifetime_label(&app.stats.lifetime()));
        }
        Command::ClearStats => {
            app.stats.clear_lifetime();
            println!("{}", lifetime_label(&app.stats.lifetime()));
        }
        Command::Mode { value } => {
            let mode = match value {
                Some(raw) => app.prefs.set_mode(&raw),
                None => app.prefs.mode(),
            };
            println!("{}", mode);
        }
        Command::Layout { value } => {
            let layout = match value {
                Some(raw) => app.prefs.set_layout(&raw),
                None => app.prefs.layout(),
            };
            println!("{}", layout);
        }
        Command::Released => {
            println!("{}", app.policy.released_ids().await.len());
        }
    }

    Ok(())
}

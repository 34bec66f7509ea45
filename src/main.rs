#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use webpresenter::errors::PresenterError;
use webpresenter::store::SlideStore;
use webpresenter::types::OutputFormat;

use crate::commands::daemon::DaemonCommands;
use crate::commands::pick::PickOptions;
use crate::commands::slides::SlidesCommands;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "webpresenter")]
#[command(about = "Pick page elements and present them as spotlighted slides", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Slide store file (default: ~/.webpresenter/slides.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored slides
    Slides {
        #[command(subcommand)]
        command: SlidesCommands,
    },

    /// Derive selectors for an element in a page snapshot
    Resolve {
        /// Page snapshot (JSON)
        snapshot: PathBuf,

        /// CSS selector locating the element
        target: String,

        /// Use the match at this index (0-based)
        #[arg(long)]
        index: Option<usize>,

        /// Override the snapshot viewport (WIDTHxHEIGHT)
        #[arg(long)]
        viewport: Option<String>,
    },

    /// Run the element picker on a page snapshot
    Pick {
        /// Page snapshot (JSON)
        snapshot: PathBuf,

        /// CSS selector for the element to click
        target: String,

        /// Use the match at this index (0-based)
        #[arg(long)]
        index: Option<usize>,

        /// Candidate to keep (0 is the most specific)
        #[arg(long, default_value = "0")]
        choose: usize,

        /// Display name for the slide
        #[arg(long)]
        name: Option<String>,

        /// Store the chosen candidate as a new slide
        #[arg(long)]
        commit: bool,
    },

    /// Show where the spotlight lands for stored slides
    Present {
        /// Page snapshot (JSON)
        snapshot: PathBuf,

        /// Slide to jump to
        #[arg(long, allow_negative_numbers = true)]
        step: Option<i64>,

        /// Ctrl shortcut to press afterwards (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Override the snapshot viewport (WIDTHxHEIGHT)
        #[arg(long)]
        viewport: Option<String>,
    },

    /// Manage the background service
    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },

    /// Send a raw message to the daemon
    Send {
        /// Message JSON, e.g. '{"type": "CLEAR_SLIDES", "payload": {}}'
        message: String,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let presenter_err: PresenterError = err.into();

            // JSON on stdout for scripts, a plain line on stderr for people
            let error_json = json!({
                "error": true,
                "message": presenter_err.to_string(),
                "exit_code": presenter_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );
            eprintln!("Error: {}", presenter_err);
            std::process::exit(presenter_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webpresenter=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Slides { command } => {
            let store = commands::utils::open_store(cli.store)?;
            commands::slides::handle_slides(command, &store, cli.format)?;
        }
        Commands::Resolve {
            snapshot,
            target,
            index,
            viewport,
        } => {
            commands::resolve::handle_resolve(
                &snapshot,
                &target,
                index,
                viewport.as_deref(),
                cli.format,
            )?;
        }
        Commands::Pick {
            snapshot,
            target,
            index,
            choose,
            name,
            commit,
        } => {
            let store = commands::utils::open_store(cli.store)?;
            let options = PickOptions {
                choose,
                name,
                commit,
            };
            commands::pick::handle_pick(&snapshot, &target, index, options, &store, cli.format)?;
        }
        Commands::Present {
            snapshot,
            step,
            keys,
            viewport,
        } => {
            let store = commands::utils::open_store(cli.store)?;
            let slides = store.get()?;
            commands::present::handle_present(
                &snapshot,
                slides,
                step,
                &keys,
                viewport.as_deref(),
                cli.format,
            )?;
        }
        Commands::Daemon { command } => {
            commands::daemon::handle_daemon(command, cli.store).await?;
        }
        Commands::Send { message } => {
            commands::send::handle_send(&message, cli.format)?;
        }
    }

    Ok(())
}

//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for Lyric Minder.
//! Each subcommand is implemented in its own submodule for maintainability:
//! - `search`: One lyric search, printed as it progresses
//! - `batch`: Many searches from a tab-separated file
//! - `info`: Normalizer preview, provider listing and config bootstrap

mod batch;
mod info;
mod search;

use clap::{Parser, Subcommand};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::Instant;

use crate::config::{self, Config};
use crate::lyrics::dispatcher::SWEEP_INTERVAL;
use crate::lyrics::{Dispatcher, LyricsCandidate, SearchOutcome, build_providers};

pub use batch::cmd_batch;
pub use info::{cmd_init_config, cmd_normalize, cmd_providers};
pub use search::cmd_search;

/// Lyric Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "LYRIC_MINDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Search lyrics for one track
    Search {
        /// Artist name (used verbatim)
        #[arg(short, long, default_value = "")]
        artist: String,
        /// Album title (normalized before searching)
        #[arg(short = 'l', long, default_value = "")]
        album: String,
        /// Track title (normalized before searching)
        #[arg(short, long)]
        title: String,
        /// Stop after listing candidates
        #[arg(long)]
        no_lyrics: bool,
    },
    /// Search lyrics for every line of a file (artist<TAB>album<TAB>title)
    Batch {
        /// Path to the request file
        path: PathBuf,
        /// Print full lyrics as they arrive
        #[arg(long)]
        show_lyrics: bool,
    },
    /// Show how a title is normalized before searching
    Normalize {
        /// Text to normalize
        text: String,
    },
    /// List enabled lyrics providers
    Providers,
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was specified.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    match command {
        Commands::Search {
            artist,
            album,
            title,
            no_lyrics,
        } => {
            let rt = Runtime::new()?;
            let config = load_config(cli);
            cmd_search(&rt, &config, artist, album, title, *no_lyrics)?;
        }
        Commands::Batch { path, show_lyrics } => {
            let rt = Runtime::new()?;
            let config = load_config(cli);
            cmd_batch(&rt, &config, path, *show_lyrics)?;
        }
        Commands::Normalize { text } => {
            cmd_normalize(&load_config(cli), text);
        }
        Commands::Providers => {
            cmd_providers(&load_config(cli), resolved_config_path(cli));
        }
        Commands::InitConfig { force } => {
            cmd_init_config(resolved_config_path(cli), *force)?;
        }
    }
    Ok(true)
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config file named by `--config`, or the OS default.
fn resolved_config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(config::config_path)
}

fn load_config(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
}

/// Build a dispatcher from configuration. Must run inside the tokio runtime.
pub(crate) fn new_dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::with_config(
        build_providers(&config.providers),
        config.search.dispatcher_config(),
    )
    .with_rules(config.search.noise_rules())
}

/// How [`drain_outcomes`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drained {
    /// Nothing left queued or running
    Idle,
    /// The callback asked to stop
    Stopped,
    /// The wait elapsed with searches still outstanding
    TimedOut,
}

/// Hand outcomes to `on_outcome` until the dispatcher is idle, the callback
/// breaks, or `wait` elapses.
///
/// The dispatcher's own sweep only runs while requests are queued, so this
/// also sweeps between outcomes to reclaim searches that ended silently.
pub(crate) async fn drain_outcomes<F>(
    dispatcher: &mut Dispatcher,
    wait: Duration,
    mut on_outcome: F,
) -> Drained
where
    F: FnMut(SearchOutcome) -> ControlFlow<()>,
{
    let deadline = Instant::now() + wait;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Drained::TimedOut;
        }
        let slice = SWEEP_INTERVAL.min(deadline - now);

        match tokio::time::timeout(slice, dispatcher.next_outcome()).await {
            Ok(Some(outcome)) => {
                if on_outcome(outcome).is_break() {
                    return Drained::Stopped;
                }
            }
            Ok(None) => return Drained::Idle,
            Err(_) => {
                dispatcher.sweep_once();
                if dispatcher.is_idle() {
                    return Drained::Idle;
                }
            }
        }
    }
}

/// Print ranked candidates, best first
pub(crate) fn print_candidates(results: &[LyricsCandidate]) {
    for (rank, candidate) in results.iter().enumerate() {
        let album = candidate
            .album
            .as_deref()
            .map(|a| format!(" ({})", a))
            .unwrap_or_default();
        println!(
            "  {:>2}. [{}] {} - {}{} ({:.0}%)",
            rank + 1,
            candidate.provider,
            candidate.artist,
            candidate.title,
            album,
            candidate.score * 100.0
        );
    }
}

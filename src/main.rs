//! Lyric Minder - finds song lyrics through public lyrics services.
//!
//! Searches are queued and run a few at a time; album and track titles are
//! cleaned of edition noise ("Remastered", "Deluxe Edition", ...) before any
//! provider sees them.

pub mod cli;
pub mod config;
pub mod error;
pub mod lyrics;
#[cfg(test)]
pub mod test_utils;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("lyric_minder=info".parse()?))
        .init();

    if !cli::run_command(&args)? {
        // No command specified
        cli::Cli::command().print_help()?;
    }
    Ok(())
}

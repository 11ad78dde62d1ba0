//! Command-line interface for lyric-minder.
//!
//! This module provides CLI commands for searching lyrics one track at a
//! time or in batches, and for inspecting the normalizer and configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};

//! Batch lyric search from a tab-separated request file.
//!
//! One request per line: `artist<TAB>album<TAB>title`. Blank lines and lines
//! starting with `#` are skipped.

use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::lyrics::SearchOutcome;

use super::{Drained, drain_outcomes, new_dispatcher, print_candidates};

/// One line of a request file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub artist: String,
    pub album: String,
    pub title: String,
}

/// Parse request file contents.
pub fn parse_batch(contents: &str) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let [artist, album, title] = fields.as_slice() else {
            return Err(Error::invalid_input(format!(
                "line {}: expected artist<TAB>album<TAB>title, found {} field(s)",
                index + 1,
                fields.len()
            )));
        };

        entries.push(BatchEntry {
            artist: artist.trim().to_string(),
            album: album.trim().to_string(),
            title: title.trim().to_string(),
        });
    }

    Ok(entries)
}

/// Read and parse a request file.
pub fn read_batch_file(path: &Path) -> Result<Vec<BatchEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(format!("Failed to read {}", path.display()))?;
    parse_batch(&contents).with_context(format!("Invalid request file {}", path.display()))
}

/// Per-id tally of what a batch produced
#[derive(Debug, Default)]
struct BatchSummary {
    with_results: HashSet<u64>,
    without_results: HashSet<u64>,
    with_lyrics: HashSet<u64>,
}

impl BatchSummary {
    fn record(&mut self, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::ResultsFound { id, results } if results.is_empty() => {
                self.without_results.insert(*id);
            }
            SearchOutcome::ResultsFound { id, .. } => {
                self.with_results.insert(*id);
            }
            SearchOutcome::LyricsReady { id, .. } => {
                self.with_lyrics.insert(*id);
            }
        }
    }

    /// Requests that never reported a search result
    fn unresolved(&self, total: usize) -> usize {
        total.saturating_sub(self.with_results.len() + self.without_results.len())
    }
}

/// Search lyrics for every request in a file
pub fn cmd_batch(
    rt: &Runtime,
    config: &Config,
    path: &Path,
    show_lyrics: bool,
) -> anyhow::Result<()> {
    let entries = read_batch_file(path)?;
    if entries.is_empty() {
        println!("No requests in {:?}", path);
        return Ok(());
    }

    rt.block_on(async {
        let mut dispatcher = new_dispatcher(config);
        let mut labels = HashMap::with_capacity(entries.len());
        for entry in &entries {
            let id = dispatcher.submit(&entry.artist, &entry.album, &entry.title);
            labels.insert(id, format!("{} - {}", entry.artist, entry.title));
        }

        println!(
            "Submitted {} search(es): {} running, {} queued",
            entries.len(),
            dispatcher.active_count(),
            dispatcher.pending_count()
        );
        println!();

        let mut summary = BatchSummary::default();
        let end = drain_outcomes(&mut dispatcher, config.search.wait_timeout(), |outcome| {
            summary.record(&outcome);
            let label = labels
                .get(&outcome.id())
                .map(String::as_str)
                .unwrap_or("?");
            match outcome {
                SearchOutcome::ResultsFound { results, .. } if results.is_empty() => {
                    println!("✗ {}: no matches", label);
                }
                SearchOutcome::ResultsFound { results, .. } => {
                    println!("✓ {}: {} candidate(s)", label, results.len());
                    print_candidates(&results[..results.len().min(3)]);
                }
                SearchOutcome::LyricsReady { lyrics, .. } => {
                    println!("♪ {}: lyrics ready ({} lines)", label, lyrics.lines().count());
                    if show_lyrics {
                        println!();
                        println!("{}", lyrics);
                        println!();
                    }
                }
            }
            ControlFlow::Continue(())
        })
        .await;

        if end == Drained::TimedOut {
            println!();
            println!(
                "Gave up after {}s; cancelling outstanding searches:",
                config.search.wait_timeout_secs
            );
            for id in dispatcher.active_ids() {
                println!("  … {} (running)", labels.get(&id).map(String::as_str).unwrap_or("?"));
            }
            for id in dispatcher.pending_ids() {
                println!("  … {} (queued)", labels.get(&id).map(String::as_str).unwrap_or("?"));
            }
            dispatcher.cancel_all();
        }

        println!();
        println!("Summary:");
        println!("  Requests:      {}", entries.len());
        println!("  With results:  {}", summary.with_results.len());
        println!("  No matches:    {}", summary.without_results.len());
        println!("  With lyrics:   {}", summary.with_lyrics.len());
        println!("  Unresolved:    {}", summary.unresolved(entries.len()));
    });

    Ok(())
}

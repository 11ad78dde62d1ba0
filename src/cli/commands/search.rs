//! Single-track lyric search command.

use std::ops::ControlFlow;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::lyrics::SearchOutcome;

use super::{Drained, drain_outcomes, new_dispatcher, print_candidates};

/// Search lyrics for one track and print candidates, then the lyrics
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    artist: &str,
    album: &str,
    title: &str,
    no_lyrics: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let mut dispatcher = new_dispatcher(config);
        let id = dispatcher.submit(artist, album, title);
        let request = dispatcher
            .active_request(id)
            .or_else(|| dispatcher.pending_request(id));
        if let Some(request) = request {
            println!(
                "Searching: {} / {} / {}",
                display_or_dash(&request.artist),
                display_or_dash(&request.album),
                display_or_dash(&request.title)
            );
            println!();
        }

        let mut got_results = false;
        let mut got_lyrics = false;
        let end = drain_outcomes(&mut dispatcher, config.search.wait_timeout(), |outcome| {
            match outcome {
                SearchOutcome::ResultsFound { results, .. } => {
                    got_results = true;
                    if results.is_empty() {
                        println!("✗ No matches found.");
                        return ControlFlow::Break(());
                    }
                    println!("✓ {} candidate(s):", results.len());
                    print_candidates(&results);
                    if no_lyrics {
                        return ControlFlow::Break(());
                    }
                }
                SearchOutcome::LyricsReady { lyrics, .. } => {
                    got_lyrics = true;
                    println!();
                    println!("{}", lyrics);
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })
        .await;

        match end {
            Drained::TimedOut => {
                println!(
                    "✗ Gave up after {}s without {}.",
                    config.search.wait_timeout_secs,
                    if got_results { "lyrics" } else { "results" }
                );
                dispatcher.cancel_all();
            }
            Drained::Idle if !got_results => {
                println!("✗ Every provider failed. Run with RUST_LOG=lyric_minder=debug for details.");
            }
            Drained::Idle if !got_lyrics && !no_lyrics => {
                println!();
                println!("✗ The best match has no lyrics text.");
            }
            _ => {}
        }
    });
    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

//! Adapter layer: Convert LRCLIB DTOs to domain models
//!
//! This is the ONLY place where LRCLIB DTO types are converted to domain types.

use once_cell::sync::Lazy;
use regex::Regex;

use super::dto;
use crate::lyrics::domain::{LyricsCandidate, LyricsQuery, ProviderKind};
use crate::lyrics::normalize::normalize;

/// Leading LRC tags: `[00:12.34]`, `[01:02]`, or metadata like `[ar:Artist]`
static LRC_TAG_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s*\[[^\]]*\])+").unwrap());

/// Keep at most this many candidates per search
const MAX_CANDIDATES: usize = 20;

/// Convert search records to candidates, best first.
pub fn to_candidates(records: Vec<dto::LyricsRecord>, query: &LyricsQuery) -> Vec<LyricsCandidate> {
    let mut candidates: Vec<_> = records
        .into_iter()
        .filter(|r| !r.track_name.trim().is_empty())
        .map(|r| {
            let score = score_match(&r, query);
            to_candidate(r, score)
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Convert a single record; `score` is supplied by the caller.
pub fn to_candidate(record: dto::LyricsRecord, score: f32) -> LyricsCandidate {
    let lyrics = lyrics_text(&record);
    LyricsCandidate {
        provider: ProviderKind::Lrclib,
        score,
        title: record.track_name.trim().to_string(),
        artist: record.artist_name.trim().to_string(),
        album: record
            .album_name
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
        duration_secs: record.duration.map(|d| d.round().max(0.0) as u32),
        provider_id: Some(record.id.to_string()),
        lyrics,
    }
}

/// Plain lyrics if present, otherwise synced lyrics with timestamps removed.
/// Instrumental tracks have no text.
pub fn lyrics_text(record: &dto::LyricsRecord) -> Option<String> {
    if record.instrumental {
        return None;
    }

    let plain = record.plain_lyrics.as_deref().map(str::trim).unwrap_or_default();
    if !plain.is_empty() {
        return Some(plain.to_string());
    }

    let synced = record.synced_lyrics.as_deref()?;
    let flattened = strip_timestamps(synced);
    if flattened.trim().is_empty() {
        None
    } else {
        Some(flattened)
    }
}

/// Remove LRC tags from each line, dropping lines that carried only tags.
pub fn strip_timestamps(lrc: &str) -> String {
    lrc.lines()
        .filter_map(|line| {
            let tagged = LRC_TAG_PREFIX.is_match(line);
            let text = LRC_TAG_PREFIX.replace(line, "");
            let text = text.trim();
            if tagged && text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Relevance of a record to the query, 0.0 to 1.0.
///
/// Title counts most, then artist, then album. Exact matches on the
/// normalized, lowercased text beat partial (substring) matches.
pub fn score_match(record: &dto::LyricsRecord, query: &LyricsQuery) -> f32 {
    let mut score = 0.0;

    score += field_score(&record.track_name, &query.title, 0.5, 0.3);
    score += field_score(&record.artist_name, &query.artist, 0.35, 0.2);
    if let Some(ref album) = record.album_name {
        score += field_score(album, &query.album, 0.15, 0.08);
    }

    score
}

fn field_score(found: &str, wanted: &str, exact: f32, partial: f32) -> f32 {
    let found = normalize(found).to_lowercase();
    let wanted = normalize(wanted).to_lowercase();
    if found.is_empty() || wanted.is_empty() {
        return 0.0;
    }
    if found == wanted {
        exact
    } else if found.contains(&wanted) || wanted.contains(&found) {
        partial
    } else {
        0.0
    }
}

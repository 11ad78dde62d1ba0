//! Test utilities and fixtures for lyric-minder tests.
//!
//! Mock factories that reduce boilerplate in dispatcher, task and provider
//! tests. Mock providers themselves live in `lyrics::traits::mocks`.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{mock_candidate, mock_request};
//!
//! let candidate = LyricsCandidate {
//!     lyrics: Some("words".to_string()),
//!     ..mock_candidate(ProviderKind::Lrclib, "Song", 0.9)
//! };
//! ```

use crate::lyrics::{LyricsCandidate, ProviderKind, SearchRequest};

/// Creates a candidate without inline lyrics.
///
/// `provider_id` is derived from the title so follow-up fetches can be told apart.
pub fn mock_candidate(provider: ProviderKind, title: &str, score: f32) -> LyricsCandidate {
    LyricsCandidate {
        provider,
        score,
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        duration_secs: Some(180),
        provider_id: Some(format!("{}:{}", provider.key(), title)),
        lyrics: None,
    }
}

/// Creates a request with sensible defaults and the given id.
pub fn mock_request(id: u64) -> SearchRequest {
    SearchRequest {
        id,
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        title: format!("Test Track {}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_candidate_defaults() {
        let candidate = mock_candidate(ProviderKind::Lrclib, "Song", 0.5);
        assert_eq!(candidate.title, "Song");
        assert_eq!(candidate.score, 0.5);
        assert!(candidate.lyrics.is_none());
        assert_eq!(candidate.provider_id.as_deref(), Some("lrclib:Song"));
    }

    #[test]
    fn test_mock_request_titles_differ() {
        assert_ne!(mock_request(1).title, mock_request(2).title);
        assert_eq!(mock_request(4).id, 4);
    }
}

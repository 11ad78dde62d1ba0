//! lyrics.ovh HTTP client
//!
//! Exact-key lookup by artist and title. There is no search endpoint and no
//! relevance score, so a hit becomes a single candidate carrying its lyrics.

use std::time::Duration;

use super::dto;
use crate::lyrics::domain::{LyricsCandidate, LyricsQuery, ProviderError, ProviderKind};

/// Score given to a lookup hit; the service only answers exact keys
const EXACT_LOOKUP_SCORE: f32 = 1.0;

/// lyrics.ovh API client
pub struct LyricsOvhClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LyricsOvhClient {
    /// Create a new client with a per-request timeout
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://api.lyrics.ovh/v1".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Look up lyrics for artist and title.
    ///
    /// Returns no candidates when either key is empty or the service has no entry.
    pub async fn lookup(&self, query: &LyricsQuery) -> Result<Vec<LyricsCandidate>, ProviderError> {
        let Some(url) = self.lookup_url(query) else {
            return Ok(Vec::new());
        };

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            return Err(ProviderError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .json::<dto::LyricsResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(to_candidate(body, query).into_iter().collect())
    }

    fn lookup_url(&self, query: &LyricsQuery) -> Option<String> {
        let artist = query.artist.trim();
        let title = query.title.trim();
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        ))
    }
}

/// Convert a response body to a candidate; `None` when it carries no text.
fn to_candidate(body: dto::LyricsResponse, query: &LyricsQuery) -> Option<LyricsCandidate> {
    if let Some(ref error) = body.error {
        tracing::debug!("lyrics.ovh: {}", error);
    }

    let lyrics = body.lyrics?.replace("\r\n", "\n").trim().to_string();
    if lyrics.is_empty() {
        return None;
    }

    Some(LyricsCandidate {
        provider: ProviderKind::LyricsOvh,
        score: EXACT_LOOKUP_SCORE,
        title: query.title.trim().to_string(),
        artist: query.artist.trim().to_string(),
        album: None,
        duration_secs: None,
        provider_id: None,
        lyrics: Some(lyrics),
    })
}

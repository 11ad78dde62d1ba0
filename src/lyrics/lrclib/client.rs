//! LRCLIB HTTP client
//!
//! Handles communication with the LRCLIB web service.
//! See: https://lrclib.net/docs
//!
//! LRCLIB asks clients to identify themselves with a User-Agent. No API key.

use std::time::Duration;

use super::{adapter, dto};
use crate::lyrics::domain::{LyricsCandidate, LyricsQuery, ProviderError};

/// User agent string sent with every request
const USER_AGENT: &str = concat!(
    "LyricMinder/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/lyric-minder)"
);

/// LRCLIB API client
pub struct LrclibClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    /// Create a new client with a per-request timeout
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://lrclib.net/api".to_string(),
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

    /// Search for lyrics records and return ranked candidates
    pub async fn search(&self, query: &LyricsQuery) -> Result<Vec<LyricsCandidate>, ProviderError> {
        let params = search_params(query);
        if params.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await?;

        let response = check_status(response).await?;
        let records = response
            .json::<Vec<dto::LyricsRecord>>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        tracing::debug!(count = records.len(), "LRCLIB search returned records");
        Ok(adapter::to_candidates(records, query))
    }

    /// Fetch the lyrics of a record by its LRCLIB id
    pub async fn get_lyrics(&self, record_id: &str) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/get/{}", self.base_url, urlencoding::encode(record_id));
        let response = self.http_client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let record = response
            .json::<dto::LyricsRecord>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(adapter::lyrics_text(&record))
    }
}

/// Map non-success statuses to provider errors
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }

    // Try to parse error response
    if let Ok(error) = response.json::<dto::ApiError>().await {
        return Err(ProviderError::Api(error.message));
    }
    Err(ProviderError::Network(format!(
        "HTTP {}: {}",
        status,
        status.canonical_reason().unwrap_or("Unknown")
    )))
}

/// Query parameters for `/api/search`.
///
/// LRCLIB needs either `track_name` or a free-text `q`; empty fields are left out.
fn search_params(query: &LyricsQuery) -> Vec<(&'static str, String)> {
    let title = query.title.trim();
    let artist = query.artist.trim();
    let album = query.album.trim();

    let mut params = Vec::new();
    if !title.is_empty() {
        params.push(("track_name", title.to_string()));
        if !artist.is_empty() {
            params.push(("artist_name", artist.to_string()));
        }
        if !album.is_empty() {
            params.push(("album_name", album.to_string()));
        }
    } else {
        let free_text = [artist, album]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !free_text.is_empty() {
            params.push(("q", free_text));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(artist: &str, album: &str, title: &str) -> LyricsQuery {
        LyricsQuery {
            artist: artist.to_string(),
            album: album.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = LrclibClient::new(Duration::from_secs(5));
        assert_eq!(client.base_url, "https://lrclib.net/api");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = LrclibClient::with_base_url("http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("LyricMinder/"));
    }

    #[test]
    fn test_search_params_full_query() {
        let params = search_params(&query("The Beatles", "Abbey Road", "Something"));
        assert_eq!(
            params,
            vec![
                ("track_name", "Something".to_string()),
                ("artist_name", "The Beatles".to_string()),
                ("album_name", "Abbey Road".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params_without_title_uses_free_text() {
        let params = search_params(&query("The Beatles", "", " "));
        assert_eq!(params, vec![("q", "The Beatles".to_string())]);
    }

    #[test]
    fn test_search_params_empty_query() {
        assert!(search_params(&query("", "", "")).is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        // Unroutable base URL: a request would fail, an empty query must not send one
        let client = LrclibClient::with_base_url("http://127.0.0.1:9");
        let results = client.search(&query("", "", "")).await.unwrap();
        assert!(results.is_empty());
    }
}

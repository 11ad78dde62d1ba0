//! Provider seam for lyric searches.
//!
//! Each search task talks to providers only through [`LyricsProvider`], so
//! tests substitute the mocks in [`mocks`] for the HTTP clients.

use async_trait::async_trait;

use super::domain::{LyricsCandidate, LyricsQuery, ProviderError, ProviderKind};

/// A source of lyric candidates and lyric text.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Search for candidates matching the query, best first.
    async fn search(&self, query: &LyricsQuery) -> Result<Vec<LyricsCandidate>, ProviderError>;

    /// Fetch the full lyrics for a candidate this provider returned.
    ///
    /// The default returns the text the search response already carried.
    async fn fetch_lyrics(
        &self,
        candidate: &LyricsCandidate,
    ) -> Result<Option<String>, ProviderError> {
        Ok(candidate.lyrics.clone())
    }
}

#[async_trait]
impl LyricsProvider for super::lrclib::LrclibClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Lrclib
    }

    async fn search(&self, query: &LyricsQuery) -> Result<Vec<LyricsCandidate>, ProviderError> {
        self.search(query).await
    }

    async fn fetch_lyrics(
        &self,
        candidate: &LyricsCandidate,
    ) -> Result<Option<String>, ProviderError> {
        if candidate.lyrics.is_some() {
            return Ok(candidate.lyrics.clone());
        }
        match candidate.provider_id.as_deref() {
            Some(id) => self.get_lyrics(id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl LyricsProvider for super::lyricsovh::LyricsOvhClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LyricsOvh
    }

    async fn search(&self, query: &LyricsQuery) -> Result<Vec<LyricsCandidate>, ProviderError> {
        self.lookup(query).await
    }
}

//! Internal domain models for lyric searches.
//!
//! These types are OUR types - they don't change when a provider's API changes.
//! Provider responses get converted into these types by each provider's adapter.

/// A queued or in-flight lyric search.
///
/// Built by the dispatcher at submission time; `album` and `title` are
/// already normalized. Never mutated after it has been queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Ticket for correlating later outcomes, assigned by the dispatcher
    pub id: u64,
    /// Artist name, passed through verbatim
    pub artist: String,
    /// Normalized album title
    pub album: String,
    /// Normalized track title
    pub title: String,
}

impl SearchRequest {
    /// The provider-facing view of this request.
    pub fn query(&self) -> LyricsQuery {
        LyricsQuery {
            artist: self.artist.clone(),
            album: self.album.clone(),
            title: self.title.clone(),
        }
    }
}

/// Search keys handed to a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsQuery {
    pub artist: String,
    pub album: String,
    pub title: String,
}

/// Known lyric providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Lrclib,
    LyricsOvh,
}

impl ProviderKind {
    /// All providers, in default preference order.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Lrclib, ProviderKind::LyricsOvh];

    /// Stable key used in the config file.
    pub fn key(self) -> &'static str {
        match self {
            Self::Lrclib => "lrclib",
            Self::LyricsOvh => "lyricsovh",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lrclib => "LRCLIB",
            Self::LyricsOvh => "lyrics.ovh",
        }
    }

    /// Parse a config key, tolerating case and common spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "lrclib" | "lrc-lib" | "lrclib.net" => Some(Self::Lrclib),
            "lyricsovh" | "lyrics.ovh" | "lyrics-ovh" | "ovh" => Some(Self::LyricsOvh),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One ranked match returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsCandidate {
    /// Provider that produced this candidate
    pub provider: ProviderKind,
    /// Relevance assigned by the provider (higher is better, 0.0 to 1.0)
    pub score: f32,
    /// Track title as the provider knows it
    pub title: String,
    /// Artist name as the provider knows it
    pub artist: String,
    /// Album title, when the provider reports one
    pub album: Option<String>,
    /// Duration in seconds, when known
    pub duration_secs: Option<u32>,
    /// Provider-specific identifier used for follow-up fetches
    pub provider_id: Option<String>,
    /// Full lyrics text when the search response already carried it
    pub lyrics: Option<String>,
}

/// Milestones emitted by the dispatcher, both addressed to a request id.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The search phase completed; candidates are ranked best first.
    ResultsFound {
        id: u64,
        results: Vec<LyricsCandidate>,
    },
    /// The full lyrics text for the best candidate was located.
    LyricsReady { id: u64, lyrics: String },
}

impl SearchOutcome {
    /// Request id this outcome belongs to.
    pub fn id(&self) -> u64 {
        match self {
            Self::ResultsFound { id, .. } | Self::LyricsReady { id, .. } => *id,
        }
    }
}

/// Errors a provider can return. The search task absorbs all of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No lyrics found")]
    NotFound,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

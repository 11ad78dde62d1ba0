//! LRCLIB API Data Transfer Objects
//!
//! These types match what LRCLIB returns from `/api/search` and `/api/get/{id}`.
//! DO NOT use these types outside the lrclib module - convert to domain types.
//!
//! API Reference: https://lrclib.net/docs
//!
//! Example search entry:
//! ```json
//! {
//!   "id": 3396226,
//!   "trackName": "Something",
//!   "artistName": "The Beatles",
//!   "albumName": "Abbey Road",
//!   "duration": 182.0,
//!   "instrumental": false,
//!   "plainLyrics": "Something in the way she moves...",
//!   "syncedLyrics": "[00:05.12] Something in the way she moves..."
//! }
//! ```

use serde::{Deserialize, Serialize};

/// One lyrics record. `/api/search` returns an array of these.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsRecord {
    /// LRCLIB record id
    pub id: i64,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: Option<String>,
    /// Duration in seconds (float)
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub instrumental: bool,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    /// LRC-formatted lyrics with `[mm:ss.xx]` timestamps
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
}

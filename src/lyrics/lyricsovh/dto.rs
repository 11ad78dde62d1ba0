//! lyrics.ovh API Data Transfer Objects
//!
//! `GET /v1/{artist}/{title}` answers `{"lyrics": "..."}` on success and
//! `{"error": "No lyrics found"}` with a 404 otherwise.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyricsResponse {
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

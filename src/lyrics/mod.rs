//! Lyrics search module - finds lyrics for tracks through external services.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Requests, candidates and outcomes
//! - **Normalizer** (`normalize.rs`) - Cleans album and track titles before searching
//! - **Provider seam** (`traits.rs`) - The only way a search touches the network
//! - **API DTOs** (`lrclib/dto.rs`, `lyricsovh/dto.rs`) - Exact API response shapes
//! - **Clients** - HTTP clients for external APIs
//! - **SearchTask** (`task.rs`) - One cancellable search, reporting milestones
//! - **Dispatcher** (`dispatcher.rs`) - FIFO queue with at most five searches in flight
//!
//! # Usage
//!
//! ```ignore
//! use lyrics::{Dispatcher, SearchOutcome, build_providers};
//!
//! let config = config::load();
//! let mut dispatcher = Dispatcher::new(build_providers(&config.providers));
//! let id = dispatcher.submit("Pink Floyd", "The Wall (Deluxe Edition)", "Mother");
//!
//! while let Some(outcome) = dispatcher.next_outcome().await {
//!     if let SearchOutcome::LyricsReady { lyrics, .. } = outcome {
//!         println!("{lyrics}");
//!     }
//! }
//! ```

pub mod domain;
pub mod normalize;
pub mod traits;
pub mod task;
pub mod dispatcher;
pub mod lrclib;
pub mod lyricsovh;
pub mod providers;

pub use domain::{LyricsCandidate, ProviderError, ProviderKind, SearchOutcome, SearchRequest};
pub use dispatcher::{Dispatcher, DispatcherConfig, MAX_CONCURRENT};
pub use normalize::normalize;
pub use providers::{build_providers, enabled_kinds};
pub use traits::LyricsProvider;

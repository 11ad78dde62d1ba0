//! Provider construction from configuration.

use std::collections::HashSet;
use std::sync::Arc;

use super::domain::ProviderKind;
use super::lrclib::LrclibClient;
use super::lyricsovh::LyricsOvhClient;
use super::traits::LyricsProvider;
use crate::config::ProvidersConfig;

/// Resolve the enabled provider keys to kinds, in config order.
///
/// Unknown and repeated keys are skipped with a warning.
pub fn enabled_kinds(config: &ProvidersConfig) -> Vec<ProviderKind> {
    let mut seen = HashSet::new();
    let mut kinds = Vec::with_capacity(config.enabled.len());

    for key in &config.enabled {
        match ProviderKind::from_key(key) {
            Some(kind) if seen.insert(kind) => kinds.push(kind),
            Some(kind) => tracing::warn!("Provider {} listed more than once, ignoring", kind),
            None => tracing::warn!("Unknown lyrics provider {:?}, ignoring", key),
        }
    }

    if kinds.is_empty() {
        tracing::warn!("No lyrics providers enabled; every search will come back empty-handed");
    }
    kinds
}

/// Build a client for one provider.
pub fn build_provider(kind: ProviderKind, config: &ProvidersConfig) -> Arc<dyn LyricsProvider> {
    let timeout = config.request_timeout();
    match kind {
        ProviderKind::Lrclib => Arc::new(LrclibClient::new(timeout)),
        ProviderKind::LyricsOvh => Arc::new(LyricsOvhClient::new(timeout)),
    }
}

/// Build the enabled providers, in config order.
pub fn build_providers(config: &ProvidersConfig) -> Vec<Arc<dyn LyricsProvider>> {
    enabled_kinds(config)
        .into_iter()
        .map(|kind| build_provider(kind, config))
        .collect()
}

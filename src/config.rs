//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\lyric-minder\config.toml
//! - macOS: ~/Library/Application Support/lyric-minder/config.toml
//! - Linux: ~/.config/lyric-minder/config.toml
//!
//! The config file is human-readable and editable. A missing or broken file
//! never stops a search; defaults are used instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lyrics::DispatcherConfig;
use crate::lyrics::normalize::NoiseRules;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which providers to query and how
    pub providers: ProvidersConfig,

    /// Dispatcher and CLI timing
    pub search: SearchConfig,
}

/// Provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider keys in preference order ("lrclib", "lyricsovh")
    pub enabled: Vec<String>,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["lrclib".to_string(), "lyricsovh".to_string()],
            request_timeout_secs: 10,
        }
    }
}

impl ProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Search timing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cancel tasks running longer than this (unset = never)
    pub task_timeout_secs: Option<u64>,

    /// How long the CLI waits for outcomes before giving up
    pub wait_timeout_secs: u64,

    /// Extra noise-token regexes, applied after the built-in ones
    pub extra_noise_patterns: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: None,
            wait_timeout_secs: 30,
            extra_noise_patterns: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Dispatcher settings derived from this section.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            task_timeout: self
                .task_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Built-in noise rules plus any extra patterns.
    ///
    /// An invalid extra pattern is logged and the built-in table is used alone.
    pub fn noise_rules(&self) -> NoiseRules {
        match NoiseRules::default().extended(&self.extra_noise_patterns) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!("Ignoring extra_noise_patterns: {}", e);
                NoiseRules::default()
            }
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lyric-minder"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match read_config(path) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Save configuration to an explicit path
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[providers]"));
        assert!(toml.contains("[search]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[search]
task_timeout_secs = 20
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.search.task_timeout_secs, Some(20));
        assert_eq!(config.search.wait_timeout_secs, 30);
        assert_eq!(config.providers.enabled, vec!["lrclib", "lyricsovh"]);
        assert_eq!(config.providers.request_timeout_secs, 10);
    }

    #[test]
    fn test_dispatcher_config_from_search_section() {
        let mut search = SearchConfig::default();
        assert_eq!(search.dispatcher_config().task_timeout, None);

        search.task_timeout_secs = Some(15);
        assert_eq!(
            search.dispatcher_config().task_timeout,
            Some(Duration::from_secs(15))
        );

        // Zero means "off", not "cancel immediately"
        search.task_timeout_secs = Some(0);
        assert_eq!(search.dispatcher_config().task_timeout, None);
    }

    #[test]
    fn test_noise_rules_from_config() {
        let mut search = SearchConfig::default();
        let builtin = NoiseRules::default().len();
        assert_eq!(search.noise_rules().len(), builtin);

        search.extra_noise_patterns = vec![r"(?i)\s*\bdemo$".to_string()];
        let rules = search.noise_rules();
        assert_eq!(rules.len(), builtin + 1);
        assert_eq!(rules.normalize("Yesterday (Demo)"), "Yesterday");

        search.extra_noise_patterns = vec!["(broken".to_string()];
        assert_eq!(search.noise_rules().len(), builtin);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.providers.enabled = vec!["lyricsovh".to_string()];
        config.search.wait_timeout_secs = 5;

        save_to(&path, &config).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = load_from(&path);
        assert_eq!(loaded.providers.enabled, vec!["lyricsovh"]);
        assert_eq!(loaded.search.wait_timeout_secs, 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("absent.toml"));
        assert_eq!(config.search.wait_timeout_secs, 30);
    }

    #[test]
    fn test_load_broken_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[providers\nenabled = 3").unwrap();

        assert!(matches!(read_config(&path), Err(ConfigError::Parse(_, _))));
        let config = load_from(&path);
        assert_eq!(config.providers.enabled.len(), 2);
    }
}

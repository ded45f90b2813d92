//! Application-level configuration loading, including the scoring rules.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the library looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "FOOSBOT_CORE_CONFIG_PATH";

/// Thresholds gating a set-win declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScoringRules {
    /// Minimum score the leading team must reach.
    #[serde(default = "default_win_threshold")]
    pub win_threshold: u32,
    /// Minimum lead the leading team must hold.
    #[serde(default = "default_win_margin")]
    pub win_margin: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            win_threshold: default_win_threshold(),
            win_margin: default_win_margin(),
        }
    }
}

fn default_win_threshold() -> u32 {
    11
}

fn default_win_margin() -> u32 {
    2
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Rules consulted when a team declares a set win.
    pub scoring: ScoringRules,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        threshold = config.scoring.win_threshold,
                        margin = config.scoring.win_margin,
                        "loaded scoring rules from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    scoring: ScoringRules,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            scoring: value.scoring,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_win_by_two_at_eleven_rule() {
        let rules = ScoringRules::default();
        assert_eq!(rules.win_threshold, 11);
        assert_eq!(rules.win_margin, 2);
    }

    #[test]
    fn partial_config_fills_missing_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"scoring":{"win_threshold":7}}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.scoring.win_threshold, 7);
        assert_eq!(config.scoring.win_margin, 2);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.scoring, ScoringRules::default());
    }
}

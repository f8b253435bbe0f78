use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::health::HealthThresholds;
use super::hierarchy::DEFAULT_FALLBACK_LABEL;
use super::input::MAX_KEYWORDS;
use crate::error::{Result, SiteplanError};

/// Embedded default config, compiled from `config/default.json`.
/// Users override by placing a file at `$XDG_DATA_HOME/siteplan/config.json`
/// or `$SITEPLAN_CONFIG` env var, or passing `--config <path>`.
const EMBEDDED_DEFAULT: &str = include_str!("../../config/default.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    #[serde(default)]
    pub health: HealthThresholds,
}

/// `limits` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest keyword batch sent to the classifier.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_keywords: default_max_keywords(),
        }
    }
}

fn default_max_keywords() -> usize {
    MAX_KEYWORDS
}

/// `hierarchy` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Label for a blank theme or pillar.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            fallback_label: default_fallback_label(),
        }
    }
}

fn default_fallback_label() -> String {
    DEFAULT_FALLBACK_LABEL.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            hierarchy: HierarchyConfig::default(),
            health: HealthThresholds::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_keywords == 0 {
            return Err(SiteplanError::config("limits.max_keywords must be at least 1"));
        }
        if self.health.medium_min_pages > self.health.strong_min_pages {
            return Err(SiteplanError::config(
                "health.medium_min_pages must not exceed health.strong_min_pages",
            ));
        }
        if self.hierarchy.fallback_label.trim().is_empty() {
            return Err(SiteplanError::config("hierarchy.fallback_label must not be blank"));
        }
        Ok(())
    }
}

/// Load the default config using this resolution order:
///
/// 1. `$SITEPLAN_CONFIG` env var (path to JSON file)
/// 2. `$XDG_DATA_HOME/siteplan/config.json` (user override)
/// 3. `~/.local/share/siteplan/config.json` (fallback XDG path)
/// 4. Embedded compile-time default from `config/default.json`
///
/// Any resolution step that fails falls through to the next.
pub fn default_config() -> Config {
    if let Ok(path) = std::env::var("SITEPLAN_CONFIG") {
        match load_config(&path) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(%path, error = %e, "ignoring $SITEPLAN_CONFIG"),
        }
    }

    if let Some(path) = xdg_config_path() {
        if path.exists() {
            match load_config(&path.to_string_lossy()) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring user config"),
            }
        }
    }

    embedded_config()
}

/// Explicit path wins and must load; otherwise fall back to [`default_config`].
pub fn resolve_config(explicit: Option<&str>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => Ok(default_config()),
    }
}

/// The compiled-in default.
pub fn embedded_config() -> Config {
    parse_config(EMBEDDED_DEFAULT).unwrap_or_default()
}

/// Parse and validate a config from a JSON string.
pub fn parse_config(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json)
        .map_err(|e| SiteplanError::config(format!("failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load a config from a file path.
pub fn load_config(path: &str) -> Result<Config> {
    let json = std::fs::read_to_string(path).map_err(|e| SiteplanError::io(path, e))?;
    parse_config(&json)
}

fn xdg_config_path() -> Option<PathBuf> {
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local/share"))
        })?;
    Some(data_home.join("siteplan/config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_matches_code_defaults() {
        assert_eq!(embedded_config(), Config::default());
    }

    #[test]
    fn embedded_json_is_valid() {
        assert!(parse_config(EMBEDDED_DEFAULT).is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = parse_config(r#"{"limits": {"max_keywords": 250}}"#).unwrap();
        assert_eq!(config.limits.max_keywords, 250);
        assert_eq!(config.hierarchy.fallback_label, "General");
        assert_eq!(config.health, HealthThresholds::default());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = parse_config(
            r#"{"health": {"strong_min_pages": 2, "medium_min_pages": 4}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("medium_min_pages"));
    }

    #[test]
    fn rejects_zero_limit_and_blank_label() {
        assert!(parse_config(r#"{"limits": {"max_keywords": 0}}"#).is_err());
        assert!(parse_config(r#"{"hierarchy": {"fallback_label": " "}}"#).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = resolve_config(Some("/nonexistent/siteplan.json")).unwrap_err();
        assert!(matches!(err, SiteplanError::Io { .. }));
    }
}

//! Configuration handling for the TUI

use crate::state::forms::ValidationMode;
use crate::tax::DEFAULT_TAX_YEAR;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the backend base URL
pub const BACKEND_URL_ENV: &str = "TAXFILER_BACKEND_URL";
/// Environment override for the backend API key
pub const API_KEY_ENV: &str = "TAXFILER_API_KEY";

/// User configuration for the TUI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Backend base URL
    pub backend_url: Option<String>,
    /// Public API key sent with every backend request
    pub api_key: Option<String>,
    /// How strictly wizard steps are validated
    #[serde(default)]
    pub validation_mode: ValidationMode,
    /// Tax year preselected in the calculator and the filing wizard
    pub default_tax_year: Option<String>,
    /// Path of the last visited view, restored on start-up
    pub last_path: Option<String>,
    /// Email prefilled on the login form
    pub remember_email: Option<String>,
}

impl TuiConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("pk", "taxfiler", "taxfiler-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory holding the in-progress filing session
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: TuiConfig = serde_json::from_str(&content)?;
            return Ok(config);
        }
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Tax year to preselect, falling back to the current default
    pub fn tax_year(&self) -> &str {
        self.default_tax_year.as_deref().unwrap_or(DEFAULT_TAX_YEAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = TuiConfig::default();
        assert!(config.backend_url.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(config.validation_mode, ValidationMode::Lenient);
        assert!(config.last_path.is_none());
        assert_eq!(config.tax_year(), DEFAULT_TAX_YEAR);
    }

    #[test]
    fn test_serialization() {
        let config = TuiConfig {
            backend_url: Some("https://abc.example.co".to_string()),
            api_key: Some("anon".to_string()),
            validation_mode: ValidationMode::Strict,
            default_tax_year: Some("2025-2026".to_string()),
            last_path: Some("/tax-calculator".to_string()),
            remember_email: Some("user@example.pk".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"validation_mode\":\"strict\""));
        let parsed: TuiConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.tax_year(), "2025-2026");
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: TuiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, TuiConfig::default());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"last_path": "/dashboard", "unknown_field": "value"}"#;
        let parsed: TuiConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.last_path.as_deref(), Some("/dashboard"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = TuiConfig {
            last_path: Some("/personal-tax-filing".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(TuiConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TuiConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, TuiConfig::default());
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(TuiConfig::load_from(&path).is_err());
    }
}

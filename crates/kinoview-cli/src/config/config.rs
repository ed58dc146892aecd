//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use kinoview_core::player::SourceCatalog;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `identity.api_key`.
const IDENTITY_KEY_ENV: &str = "FIREBASE_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB request settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// Identity provider settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Player settings.
    #[serde(default)]
    pub player: PlayerConfig,
}

/// TMDB request settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TmdbConfig {
    /// Response language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Include adult titles in discover and search.
    #[serde(default)]
    pub include_adult: bool,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            include_adult: false,
        }
    }
}

fn default_language() -> String {
    String::from("ru-RU")
}

/// Identity provider settings.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Web API key of the identity provider project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Player settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Source catalog name (`multi`, `russian-voice`, `simple`).
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
        }
    }
}

fn default_catalog() -> String {
    String::from(SourceCatalog::default().as_str())
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Returns the configured player catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if `player.catalog` is not a known catalog name.
    pub fn player_catalog(&self) -> Result<SourceCatalog> {
        self.player
            .catalog
            .parse()
            .context("invalid player.catalog in config")
    }

    /// Returns the identity provider API key: `FIREBASE_API_KEY` first,
    /// then `identity.api_key`. Blank values count as unset.
    #[must_use]
    pub fn identity_api_key(&self) -> Option<String> {
        std::env::var(IDENTITY_KEY_ENV)
            .ok()
            .or_else(|| self.identity.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.tmdb.language, "ru-RU");
        assert!(!config.tmdb.include_adult);
        assert!(config.identity.api_key.is_none());
        assert_eq!(config.player_catalog().unwrap(), SourceCatalog::Multi);
    }

    #[test]
    fn test_parse_full_config() {
        // Arrange
        let content = r#"
            [tmdb]
            language = "en-US"
            include_adult = true

            [identity]
            api_key = "AIza-test"

            [player]
            catalog = "russian-voice"
        "#;

        // Act
        let config: AppConfig = toml::from_str(content).unwrap();

        // Assert
        assert_eq!(config.tmdb.language, "en-US");
        assert!(config.tmdb.include_adult);
        assert_eq!(config.identity.api_key.as_deref(), Some("AIza-test"));
        assert_eq!(config.player_catalog().unwrap(), SourceCatalog::RussianVoice);
    }

    #[test]
    fn test_unknown_catalog_is_an_error() {
        // Arrange
        let config: AppConfig = toml::from_str("[player]\ncatalog = \"vlc\"").unwrap();

        // Act
        let result = config.player_catalog();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            tmdb: TmdbConfig {
                language: String::from("de-DE"),
                include_adult: false,
            },
            identity: IdentityConfig {
                api_key: Some(String::from("key")),
            },
            player: PlayerConfig {
                catalog: String::from("simple"),
            },
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tmdb]\ninclude_adult = true\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.tmdb.language, "ru-RU");
        assert!(config.tmdb.include_adult);
        assert_eq!(config.player, PlayerConfig::default());
    }
}

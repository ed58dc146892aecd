//! Where kinoview keeps its files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR_NAME: &str = "kinoview";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "kinoview.db";
const LOG_FILE_NAME: &str = "kinoview.log";

/// Config and data directories.
///
/// An explicit `--dir` holds the config, database and log side by side.
/// Otherwise `$XDG_CONFIG_HOME/kinoview` and `$XDG_DATA_HOME/kinoview` are
/// used, defaulting to `~/.config/kinoview` and `~/.local/share/kinoview`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppDirs {
    /// Resolves the directories for an optional `--dir` override.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is `None` and `HOME` is not set.
    pub fn resolve(dir: Option<&PathBuf>) -> Result<Self> {
        if let Some(d) = dir {
            return Ok(Self::single(d));
        }

        let home = std::env::var_os("HOME").context("HOME environment variable is not set")?;
        Ok(Self::from_base_dirs(
            Path::new(&home),
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("XDG_DATA_HOME"),
        ))
    }

    /// Uses one directory for everything.
    #[must_use]
    pub fn single(dir: &Path) -> Self {
        Self {
            config_dir: dir.to_path_buf(),
            data_dir: dir.to_path_buf(),
        }
    }

    fn from_base_dirs(
        home: &Path,
        config_home: Option<OsString>,
        data_home: Option<OsString>,
    ) -> Self {
        let base = |value: Option<OsString>, fallback: PathBuf| {
            value
                .filter(|v| !v.is_empty())
                .map_or(fallback, PathBuf::from)
                .join(APP_DIR_NAME)
        };

        Self {
            config_dir: base(config_home, home.join(".config")),
            data_dir: base(data_home, home.join(".local").join("share")),
        }
    }

    /// `config.toml` in the config directory.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// `kinoview.db` in the data directory.
    #[must_use]
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// `kinoview.log` in the data directory.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

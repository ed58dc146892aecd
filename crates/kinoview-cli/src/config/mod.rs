//! Application configuration module.
//!
//! Manages the TOML config file holding TMDB, identity provider and player
//! settings.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;

//! Database connection management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::dirs::AppDirs;
use super::migrations::run_migrations;

/// Opens (or creates) the database and runs migrations.
///
/// The file is [`AppDirs::database_file`] for `dir`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = AppDirs::resolve(dir)?.database_file();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %db_path.display(), "database opened");

    Ok(conn)
}

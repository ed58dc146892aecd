//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 2;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }
    if version < 2 {
        migrate_v2(conn).context("migration to v2 failed")?;
    }

    if version != CURRENT_VERSION {
        tracing::info!(from = version, to = CURRENT_VERSION, "database schema migrated");
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create the `watchlist` table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS watchlist (
            owner          TEXT NOT NULL,
            media_id       INTEGER NOT NULL,
            media_type     TEXT NOT NULL,
            title          TEXT NOT NULL,
            poster_path    TEXT,
            backdrop_path  TEXT,
            vote_average   REAL NOT NULL DEFAULT 0,
            release_date   TEXT,
            overview       TEXT,
            adult          INTEGER NOT NULL DEFAULT 0,
            position       INTEGER NOT NULL,
            PRIMARY KEY (owner, media_id)
        );

        CREATE INDEX IF NOT EXISTS idx_watchlist_owner_position ON watchlist(owner, position);",
    )
    .context("failed to create watchlist table")?;

    Ok(())
}

/// Migration to v2: create the single-row `auth_session` table.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS auth_session (
            slot           INTEGER PRIMARY KEY CHECK (slot = 1),
            uid            TEXT NOT NULL,
            email          TEXT,
            display_name   TEXT,
            id_token       TEXT NOT NULL,
            refresh_token  TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );",
    )
    .context("failed to create auth_session table")?;

    Ok(())
}

//! Persisted identity-provider session (single row).

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

/// Persisted session of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSession {
    /// Provider user id.
    pub uid: String,
    /// Email address.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// ID token.
    pub id_token: String,
    /// Refresh token.
    pub refresh_token: String,
}

/// Stores `session`, replacing any previous one.
///
/// # Errors
///
/// Returns an error if the database operation fails.
#[allow(clippy::module_name_repetitions)]
pub fn save_session(conn: &Connection, session: &CachedSession) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO auth_session (slot, uid, email, display_name, id_token, refresh_token, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(slot) DO UPDATE SET
            uid           = excluded.uid,
            email         = excluded.email,
            display_name  = excluded.display_name,
            id_token      = excluded.id_token,
            refresh_token = excluded.refresh_token,
            updated_at    = excluded.updated_at",
        rusqlite::params![
            session.uid,
            session.email,
            session.display_name,
            session.id_token,
            session.refresh_token,
            now,
        ],
    )
    .context("failed to save auth session")?;

    Ok(())
}

/// Loads the stored session, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[allow(clippy::module_name_repetitions)]
pub fn load_session(conn: &Connection) -> Result<Option<CachedSession>> {
    conn.query_row(
        "SELECT uid, email, display_name, id_token, refresh_token
         FROM auth_session WHERE slot = 1",
        [],
        |row| {
            Ok(CachedSession {
                uid: row.get(0)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
                id_token: row.get(3)?,
                refresh_token: row.get(4)?,
            })
        },
    )
    .optional()
    .context("failed to load auth session")
}

/// Deletes the stored session.
///
/// # Errors
///
/// Returns an error if the database operation fails.
#[allow(clippy::module_name_repetitions)]
pub fn clear_session(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM auth_session", [])
        .context("failed to clear auth session")?;
    Ok(())
}

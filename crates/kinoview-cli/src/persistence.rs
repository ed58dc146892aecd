//! Glue between the stores and the `SQLite` cache.

use anyhow::{Context, Result};
use kinoview_api::identity::{FirebaseAuthClient, ProviderAccount, ProviderUser};
use kinoview_api::tmdb::{MediaId, MediaItem};
use kinoview_core::session::User;
use kinoview_core::watchlist::{WatchlistPersistence, WatchlistStore};
use kinoview_db::{
    CachedSession, CachedWatchlistItem, clear_session, delete_watchlist_item, load_session,
    load_watchlist, save_session, upsert_watchlist_item,
};
use rusqlite::Connection;

/// Watchlist backend storing one user's list in `SQLite`.
#[derive(Debug)]
pub struct SqliteWatchlist {
    conn: Connection,
    owner: String,
}

impl SqliteWatchlist {
    /// Creates a backend for `owner` (see [`owner_key`]).
    #[must_use]
    pub const fn new(conn: Connection, owner: String) -> Self {
        Self { conn, owner }
    }
}

impl WatchlistPersistence for SqliteWatchlist {
    fn load(&self) -> Result<Vec<MediaItem>> {
        let rows = load_watchlist(&self.conn, &self.owner)?;
        Ok(rows.into_iter().filter_map(from_cached).collect())
    }

    fn store(&self, item: &MediaItem) -> Result<()> {
        upsert_watchlist_item(&self.conn, &self.owner, &to_cached(item))
    }

    fn remove(&self, id: MediaId) -> Result<()> {
        delete_watchlist_item(&self.conn, &self.owner, id)
    }
}

/// Watchlist owner key: the email, or the provider uid for accounts without
/// one.
#[must_use]
pub fn owner_key(user: &ProviderUser) -> String {
    user.email
        .clone()
        .filter(|email| !email.is_empty())
        .unwrap_or_else(|| user.uid.clone())
}

fn to_cached(item: &MediaItem) -> CachedWatchlistItem {
    CachedWatchlistItem {
        media_id: item.id,
        media_type: String::from(item.media_type.as_str()),
        title: item.title.clone(),
        poster_path: item.poster_path.clone(),
        backdrop_path: item.backdrop_path.clone(),
        vote_average: item.vote_average,
        release_date: item.release_date.clone(),
        overview: item.overview.clone(),
        adult: item.adult,
    }
}

fn from_cached(row: CachedWatchlistItem) -> Option<MediaItem> {
    let media_type = match row.media_type.parse() {
        Ok(kind) => kind,
        Err(err) => {
            tracing::warn!(id = row.media_id, "skipping watchlist row: {err:#}");
            return None;
        }
    };

    Some(MediaItem {
        id: row.media_id,
        media_type,
        title: row.title,
        poster_path: row.poster_path,
        backdrop_path: row.backdrop_path,
        vote_average: row.vote_average,
        release_date: row.release_date,
        overview: row.overview,
        adult: row.adult,
    })
}

fn account_from_cached(session: CachedSession) -> ProviderAccount {
    ProviderAccount {
        user: ProviderUser {
            uid: session.uid,
            email: session.email,
            display_name: session.display_name,
        },
        id_token: session.id_token,
        refresh_token: session.refresh_token,
    }
}

fn account_to_cached(account: &ProviderAccount) -> CachedSession {
    CachedSession {
        uid: account.user.uid.clone(),
        email: account.user.email.clone(),
        display_name: account.user.display_name.clone(),
        id_token: account.id_token.clone(),
        refresh_token: account.refresh_token.clone(),
    }
}

/// Loads the persisted account, if any.
///
/// # Errors
///
/// Returns an error if the session table cannot be read.
pub fn load_account(conn: &Connection) -> Result<Option<ProviderAccount>> {
    Ok(load_session(conn)?.map(account_from_cached))
}

/// Opens the persisted user and their watchlist, or `None` when nobody is
/// signed in.
///
/// Reads the account straight from the database, so no identity provider key
/// is needed.
///
/// # Errors
///
/// Returns an error if the session table cannot be read.
pub fn open_signed_in(conn: Connection) -> Result<Option<(User, WatchlistStore)>> {
    let Some(account) = load_account(&conn).context("failed to load session")? else {
        return Ok(None);
    };

    let user = User::from_provider(&account.user);
    let owner = owner_key(&account.user);
    let store = WatchlistStore::with_persistence(Box::new(SqliteWatchlist::new(conn, owner)));
    Ok(Some((user, store)))
}

/// Seeds `client` with the persisted account. Emits the first auth-state
/// notification even when nobody is signed in.
///
/// # Errors
///
/// Returns an error if the session table cannot be read.
pub fn restore_session(conn: &Connection, client: &FirebaseAuthClient) -> Result<()> {
    let account = load_account(conn).context("failed to restore session")?;
    tracing::debug!(signed_in = account.is_some(), "session restored");
    client.restore(account);
    Ok(())
}

/// Writes the client's current account back, or clears it after sign-out.
///
/// # Errors
///
/// Returns an error if the session table cannot be written.
pub fn persist_session(conn: &Connection, client: &FirebaseAuthClient) -> Result<()> {
    match client.current_account() {
        Some(account) => save_session(conn, &account_to_cached(&account)),
        None => clear_session(conn),
    }
    .context("failed to persist session")
}

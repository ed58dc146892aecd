//! Database module for kinoview.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep per-user watchlists and the
//! persisted identity-provider session. [`AppDirs`] also locates the config
//! and log files so one `--dir` covers everything.

mod connection;
mod dirs;
mod migrations;
/// Persisted identity-provider session.
pub mod session;
/// Watchlist CRUD operations.
pub mod watchlist;

pub use connection::open_db;
pub use dirs::AppDirs;
#[allow(clippy::module_name_repetitions)]
pub use session::{CachedSession, clear_session, load_session, save_session};
#[allow(clippy::module_name_repetitions)]
pub use watchlist::{
    CachedWatchlistItem, delete_watchlist_item, load_watchlist, upsert_watchlist_item,
};

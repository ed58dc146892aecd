//! Watchlist CRUD operations, scoped by owner.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// A saved watchlist row.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedWatchlistItem {
    /// TMDB id.
    pub media_id: u64,
    /// `"movie"` or `"tv"`.
    pub media_type: String,
    /// Title.
    pub title: String,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
    /// Vote average.
    pub vote_average: f64,
    /// Release or first air date.
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Adult flag.
    pub adult: bool,
}

/// Inserts an item at the end of `owner`'s list, or replaces the attributes
/// of an existing row while keeping its position.
///
/// # Errors
///
/// Returns an error if the database operation fails.
#[allow(clippy::module_name_repetitions)]
pub fn upsert_watchlist_item(
    conn: &Connection,
    owner: &str,
    item: &CachedWatchlistItem,
) -> Result<()> {
    conn.execute(
        "INSERT INTO watchlist (
            owner, media_id, media_type, title, poster_path, backdrop_path,
            vote_average, release_date, overview, adult, position
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            (SELECT COALESCE(MAX(position), 0) + 1 FROM watchlist WHERE owner = ?1)
        )
        ON CONFLICT(owner, media_id) DO UPDATE SET
            media_type    = excluded.media_type,
            title         = excluded.title,
            poster_path   = excluded.poster_path,
            backdrop_path = excluded.backdrop_path,
            vote_average  = excluded.vote_average,
            release_date  = excluded.release_date,
            overview      = excluded.overview,
            adult         = excluded.adult",
        rusqlite::params![
            owner,
            item.media_id,
            item.media_type,
            item.title,
            item.poster_path,
            item.backdrop_path,
            item.vote_average,
            item.release_date,
            item.overview,
            item.adult,
        ],
    )
    .with_context(|| format!("failed to upsert watchlist item {}", item.media_id))?;

    Ok(())
}

/// Loads `owner`'s watchlist in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[allow(clippy::module_name_repetitions)]
pub fn load_watchlist(conn: &Connection, owner: &str) -> Result<Vec<CachedWatchlistItem>> {
    let mut stmt = conn
        .prepare(
            "SELECT media_id, media_type, title, poster_path, backdrop_path,
                    vote_average, release_date, overview, adult
             FROM watchlist WHERE owner = ?1 ORDER BY position",
        )
        .context("failed to prepare watchlist query")?;

    let rows = stmt
        .query_map([owner], |row| {
            Ok(CachedWatchlistItem {
                media_id: row.get(0)?,
                media_type: row.get(1)?,
                title: row.get(2)?,
                poster_path: row.get(3)?,
                backdrop_path: row.get(4)?,
                vote_average: row.get(5)?,
                release_date: row.get(6)?,
                overview: row.get(7)?,
                adult: row.get(8)?,
            })
        })
        .context("failed to query watchlist")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read watchlist rows")
}

/// Deletes one item from `owner`'s list. Deleting a missing row is a no-op.
///
/// # Errors
///
/// Returns an error if the database operation fails.
#[allow(clippy::module_name_repetitions)]
pub fn delete_watchlist_item(conn: &Connection, owner: &str, media_id: u64) -> Result<()> {
    conn.execute(
        "DELETE FROM watchlist WHERE owner = ?1 AND media_id = ?2",
        rusqlite::params![owner, media_id],
    )
    .with_context(|| format!("failed to delete watchlist item {media_id}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::open_db;

    fn setup() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(Some(&dir.path().to_path_buf())).unwrap();
        (dir, conn)
    }

    fn item(media_id: u64, title: &str) -> CachedWatchlistItem {
        CachedWatchlistItem {
            media_id,
            media_type: String::from("movie"),
            title: String::from(title),
            poster_path: Some(String::from("/poster.jpg")),
            backdrop_path: None,
            vote_average: 7.9,
            release_date: Some(String::from("1999-03-30")),
            overview: None,
            adult: false,
        }
    }

    #[test]
    fn test_upsert_and_load_in_order() {
        // Arrange
        let (_dir, conn) = setup();

        // Act
        upsert_watchlist_item(&conn, "a@example.com", &item(30, "C")).unwrap();
        upsert_watchlist_item(&conn, "a@example.com", &item(10, "A")).unwrap();
        upsert_watchlist_item(&conn, "a@example.com", &item(20, "B")).unwrap();

        // Assert
        let loaded = load_watchlist(&conn, "a@example.com").unwrap();
        let titles: Vec<&str> = loaded.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(loaded[0], item(30, "C"));
    }

    #[test]
    fn test_upsert_replaces_attributes_and_keeps_position() {
        // Arrange
        let (_dir, conn) = setup();
        upsert_watchlist_item(&conn, "a@example.com", &item(1, "A")).unwrap();
        upsert_watchlist_item(&conn, "a@example.com", &item(2, "X")).unwrap();

        // Act
        let mut updated = item(1, "B");
        updated.adult = true;
        upsert_watchlist_item(&conn, "a@example.com", &updated).unwrap();

        // Assert
        let loaded = load_watchlist(&conn, "a@example.com").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "B");
        assert!(loaded[0].adult);
        assert_eq!(loaded[1].title, "X");
    }

    #[test]
    fn test_owners_are_isolated() {
        // Arrange
        let (_dir, conn) = setup();
        upsert_watchlist_item(&conn, "a@example.com", &item(1, "A")).unwrap();

        // Act
        upsert_watchlist_item(&conn, "b@example.com", &item(2, "B")).unwrap();
        delete_watchlist_item(&conn, "b@example.com", 1).unwrap();

        // Assert
        assert_eq!(load_watchlist(&conn, "a@example.com").unwrap().len(), 1);
        assert_eq!(
            load_watchlist(&conn, "b@example.com").unwrap()[0].title,
            "B"
        );
    }

    #[test]
    fn test_delete_missing_is_noop() {
        // Arrange
        let (_dir, conn) = setup();
        upsert_watchlist_item(&conn, "a@example.com", &item(1, "A")).unwrap();

        // Act
        delete_watchlist_item(&conn, "a@example.com", 1).unwrap();
        delete_watchlist_item(&conn, "a@example.com", 1).unwrap();

        // Assert
        assert!(load_watchlist(&conn, "a@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_readded_item_goes_to_the_end() {
        // Arrange
        let (_dir, conn) = setup();
        upsert_watchlist_item(&conn, "a@example.com", &item(1, "A")).unwrap();
        upsert_watchlist_item(&conn, "a@example.com", &item(2, "B")).unwrap();

        // Act
        delete_watchlist_item(&conn, "a@example.com", 1).unwrap();
        upsert_watchlist_item(&conn, "a@example.com", &item(1, "A")).unwrap();

        // Assert
        let titles: Vec<String> = load_watchlist(&conn, "a@example.com")
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}

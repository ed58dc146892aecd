//! View data loaders.
//!
//! Each loader fetches what one view needs from the metadata client.
//! Failures are logged and collapsed into a [`ViewError`] carrying the
//! message the view shows. Nothing is retried.
#![allow(clippy::future_not_send)]

use std::fmt;

use kinoview_api::tmdb::{
    DiscoverParams, LocalTmdbApi, MediaId, MediaItem, MediaKind, MovieCategory,
    SearchMultiParams, TimeWindow, TmdbGenre, TmdbMediaDetails, TvCategory,
};
use tracing::instrument;

use crate::player::ExternalIds;

/// View-level load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// Home feed failed.
    Home,
    /// Browse list failed.
    Browse,
    /// Search failed.
    Search,
    /// Details or external ids failed.
    Details,
}

impl ViewError {
    /// Returns the user-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Home => "Не удалось загрузить данные",
            Self::Browse => "Ошибка загрузки",
            Self::Search => "Ошибка поиска",
            Self::Details => "Не удалось загрузить информацию",
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ViewError {}

/// A titled row of media items.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRow {
    /// Row title.
    pub title: &'static str,
    /// Items.
    pub items: Vec<MediaItem>,
}

/// Home view data.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeFeed {
    /// Hero banner item (first trending item).
    pub hero: Option<MediaItem>,
    /// Rows in display order.
    pub rows: Vec<MediaRow>,
}

/// Details view data.
#[derive(Debug, Clone)]
pub struct MediaDetailsView {
    /// List representation (for the watchlist).
    pub item: MediaItem,
    /// Full details.
    pub details: TmdbMediaDetails,
    /// Ids for the player selector.
    pub ids: ExternalIds,
}

impl MediaDetailsView {
    /// Returns genre names joined with commas.
    #[must_use]
    pub fn genre_names(&self) -> String {
        self.details
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the runtime (`2 ч 16 мин`) or the season count for series.
    #[must_use]
    pub fn length_label(&self) -> Option<String> {
        match self.item.media_type {
            MediaKind::Movie => self.details.runtime.filter(|m| *m > 0).map(|minutes| {
                let (hours, rest) = (minutes / 60, minutes % 60);
                if hours == 0 {
                    format!("{rest} мин")
                } else {
                    format!("{hours} ч {rest} мин")
                }
            }),
            MediaKind::Tv => self
                .details
                .number_of_seasons
                .map(|seasons| format!("Сезонов: {seasons}")),
        }
    }
}

/// Loads the home feed: four lists fetched concurrently.
///
/// # Errors
///
/// Returns `ViewError::Home` if any of the four requests fails.
#[instrument(skip_all)]
pub async fn load_home(api: &(impl LocalTmdbApi + Sync)) -> Result<HomeFeed, ViewError> {
    let (trending, popular_movies, top_rated, popular_tv) = futures::try_join!(
        api.trending(TimeWindow::Week),
        api.movies_by_category(MovieCategory::Popular, 1),
        api.movies_by_category(MovieCategory::TopRated, 1),
        api.tv_by_category(TvCategory::Popular, 1),
    )
    .map_err(|err| {
        tracing::error!("failed to load home feed: {err:#}");
        ViewError::Home
    })?;

    let hero = trending.results.first().cloned();
    tracing::debug!(
        trending = trending.results.len(),
        popular_movies = popular_movies.results.len(),
        top_rated = top_rated.results.len(),
        popular_tv = popular_tv.results.len(),
        "home feed loaded"
    );

    Ok(HomeFeed {
        hero,
        rows: vec![
            MediaRow {
                title: "Тренды недели",
                items: trending.results,
            },
            MediaRow {
                title: "Популярные фильмы",
                items: popular_movies.results,
            },
            MediaRow {
                title: "С высоким рейтингом",
                items: top_rated.results,
            },
            MediaRow {
                title: "Популярные сериалы",
                items: popular_tv.results,
            },
        ],
    })
}

/// Loads the browse list for `kind`, optionally filtered by genre.
///
/// # Errors
///
/// Returns `ViewError::Browse` if the request fails.
#[instrument(skip_all, fields(kind = %kind, genre_id = ?genre_id))]
pub async fn load_browse(
    api: &(impl LocalTmdbApi + Sync),
    kind: MediaKind,
    genre_id: Option<u32>,
    include_adult: bool,
) -> Result<Vec<MediaItem>, ViewError> {
    let params = DiscoverParams::default()
        .genre(genre_id)
        .include_adult(include_adult);

    api.discover(kind, &params)
        .await
        .map(|page| page.results)
        .map_err(|err| {
            tracing::error!("failed to load browse list: {err:#}");
            ViewError::Browse
        })
}

/// Loads the genre list for `kind`. Failures yield an empty list.
#[instrument(skip_all, fields(kind = %kind))]
pub async fn load_genres(api: &(impl LocalTmdbApi + Sync), kind: MediaKind) -> Vec<TmdbGenre> {
    match api.genres(kind).await {
        Ok(genres) => genres,
        Err(err) => {
            tracing::error!("failed to load genres: {err:#}");
            Vec::new()
        }
    }
}

/// Searches movies and series. A blank query returns nothing without a
/// request.
///
/// # Errors
///
/// Returns `ViewError::Search` if the request fails.
#[instrument(skip_all)]
pub async fn load_search(
    api: &(impl LocalTmdbApi + Sync),
    query: &str,
    include_adult: bool,
) -> Result<Vec<MediaItem>, ViewError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let params = SearchMultiParams::new(query).include_adult(include_adult);
    api.search_multi(&params)
        .await
        .map(|page| page.results)
        .map_err(|err| {
            tracing::error!(query, "search failed: {err:#}");
            ViewError::Search
        })
}

/// Loads details and external ids concurrently.
///
/// # Errors
///
/// Returns `ViewError::Details` if either request fails.
#[instrument(skip_all, fields(kind = %kind, id))]
pub async fn load_details(
    api: &(impl LocalTmdbApi + Sync),
    kind: MediaKind,
    id: MediaId,
) -> Result<MediaDetailsView, ViewError> {
    let (details, external) = futures::try_join!(api.details(kind, id), api.external_ids(kind, id))
        .map_err(|err| {
            tracing::error!("failed to load details: {err:#}");
            ViewError::Details
        })?;

    Ok(MediaDetailsView {
        item: details.to_media_item(kind),
        ids: ExternalIds::new(external.imdb_id, Some(details.id)),
        details,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;

    use anyhow::{Result, bail};
    use kinoview_api::tmdb::{MediaPage, TmdbExternalIds};

    use super::*;

    fn item(id: MediaId, title: &str, kind: MediaKind) -> MediaItem {
        MediaItem {
            id,
            media_type: kind,
            title: String::from(title),
            poster_path: None,
            backdrop_path: None,
            vote_average: 8.0,
            release_date: None,
            overview: None,
            adult: false,
        }
    }

    fn page(items: Vec<MediaItem>) -> MediaPage {
        MediaPage {
            page: 1,
            total_pages: 1,
            total_results: u32::try_from(items.len()).unwrap(),
            results: items,
        }
    }

    /// Mock API with per-endpoint failure switches and a call log.
    #[derive(Default)]
    struct MockTmdbApi {
        fail_top_rated: bool,
        fail_all: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockTmdbApi {
        fn record(&self, call: &str) -> Result<()> {
            self.calls.lock().unwrap().push(String::from(call));
            if self.fail_all {
                bail!("TMDB API error (HTTP 500 Internal Server Error)");
            }
            Ok(())
        }
    }

    impl LocalTmdbApi for MockTmdbApi {
        async fn trending(&self, _window: TimeWindow) -> Result<MediaPage> {
            self.record("trending")?;
            Ok(page(vec![
                item(1, "Hero", MediaKind::Movie),
                item(2, "Second", MediaKind::Tv),
            ]))
        }

        async fn movies_by_category(
            &self,
            category: MovieCategory,
            _page: u32,
        ) -> Result<MediaPage> {
            self.record(category.as_str())?;
            if category == MovieCategory::TopRated && self.fail_top_rated {
                bail!("TMDB API error (HTTP 503)");
            }
            Ok(page(vec![item(3, category.as_str(), MediaKind::Movie)]))
        }

        async fn tv_by_category(&self, _category: TvCategory, _page: u32) -> Result<MediaPage> {
            self.record("tv")?;
            Ok(page(vec![item(4, "Series", MediaKind::Tv)]))
        }

        async fn genres(&self, _kind: MediaKind) -> Result<Vec<TmdbGenre>> {
            self.record("genres")?;
            Ok(vec![TmdbGenre {
                id: 28,
                name: String::from("боевик"),
            }])
        }

        async fn discover(&self, kind: MediaKind, params: &DiscoverParams) -> Result<MediaPage> {
            self.record(&format!("discover {kind} {:?}", params.genre_id))?;
            Ok(page(vec![item(5, "Found", kind)]))
        }

        async fn search_multi(&self, params: &SearchMultiParams) -> Result<MediaPage> {
            self.record(&format!("search {}", params.query))?;
            Ok(page(vec![item(6, "Матрица", MediaKind::Movie)]))
        }

        async fn details(&self, kind: MediaKind, id: MediaId) -> Result<TmdbMediaDetails> {
            self.record("details")?;
            Ok(TmdbMediaDetails {
                id,
                name: Some(String::from("Игра престолов")),
                first_air_date: Some(String::from("2011-04-17")),
                number_of_seasons: Some(8),
                runtime: (kind == MediaKind::Movie).then_some(136),
                genres: vec![
                    TmdbGenre {
                        id: 18,
                        name: String::from("драма"),
                    },
                    TmdbGenre {
                        id: 10765,
                        name: String::from("фэнтези"),
                    },
                ],
                ..TmdbMediaDetails::default()
            })
        }

        async fn external_ids(&self, _kind: MediaKind, id: MediaId) -> Result<TmdbExternalIds> {
            self.record("external_ids")?;
            Ok(TmdbExternalIds {
                id,
                imdb_id: Some(String::new()),
            })
        }
    }

    #[tokio::test]
    async fn test_load_home_builds_rows_and_hero() {
        // Arrange
        let api = MockTmdbApi::default();

        // Act
        let feed = load_home(&api).await.unwrap();

        // Assert
        assert_eq!(feed.hero.unwrap().title, "Hero");
        let titles: Vec<&str> = feed.rows.iter().map(|r| r.title).collect();
        assert_eq!(
            titles,
            vec![
                "Тренды недели",
                "Популярные фильмы",
                "С высоким рейтингом",
                "Популярные сериалы"
            ]
        );
        assert_eq!(feed.rows[2].items[0].title, "top_rated");
    }

    #[tokio::test]
    async fn test_load_home_fails_as_a_whole() {
        // Arrange
        let api = MockTmdbApi {
            fail_top_rated: true,
            ..MockTmdbApi::default()
        };

        // Act
        let err = load_home(&api).await.unwrap_err();

        // Assert
        assert_eq!(err, ViewError::Home);
        assert_eq!(err.to_string(), "Не удалось загрузить данные");
    }

    #[tokio::test]
    async fn test_load_browse_passes_genre() {
        // Arrange
        let api = MockTmdbApi::default();

        // Act
        let items = load_browse(&api, MediaKind::Tv, Some(18), false)
            .await
            .unwrap();

        // Assert
        assert_eq!(items[0].media_type, MediaKind::Tv);
        assert_eq!(*api.calls.lock().unwrap(), vec!["discover tv Some(18)"]);
    }

    #[tokio::test]
    async fn test_load_browse_error_message() {
        // Arrange
        let api = MockTmdbApi {
            fail_all: true,
            ..MockTmdbApi::default()
        };

        // Act
        let err = load_browse(&api, MediaKind::Movie, None, false)
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.message(), "Ошибка загрузки");
    }

    #[tokio::test]
    async fn test_load_genres_failure_is_empty() {
        // Arrange
        let api = MockTmdbApi {
            fail_all: true,
            ..MockTmdbApi::default()
        };

        // Act
        let genres = load_genres(&api, MediaKind::Movie).await;

        // Assert
        assert!(genres.is_empty());
    }

    #[tokio::test]
    async fn test_blank_search_makes_no_request() {
        // Arrange
        let api = MockTmdbApi::default();

        // Act
        let results = load_search(&api, "   ", false).await.unwrap();

        // Assert
        assert!(results.is_empty());
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_error_message() {
        // Arrange
        let api = MockTmdbApi {
            fail_all: true,
            ..MockTmdbApi::default()
        };

        // Act
        let err = load_search(&api, "матрица", false).await.unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "Ошибка поиска");
    }

    #[tokio::test]
    async fn test_load_details_combines_ids() {
        // Arrange
        let api = MockTmdbApi::default();

        // Act
        let view = load_details(&api, MediaKind::Tv, 1399).await.unwrap();

        // Assert
        assert_eq!(view.item.title, "Игра престолов");
        assert_eq!(view.ids.tmdb_id, Some(1399));
        assert!(view.ids.imdb_id.is_none());
        assert_eq!(view.genre_names(), "драма, фэнтези");
        assert_eq!(view.length_label().as_deref(), Some("Сезонов: 8"));
    }

    #[tokio::test]
    async fn test_movie_length_label() {
        // Arrange
        let api = MockTmdbApi::default();

        // Act
        let view = load_details(&api, MediaKind::Movie, 603).await.unwrap();

        // Assert
        assert_eq!(view.length_label().as_deref(), Some("2 ч 16 мин"));
    }

    #[tokio::test]
    async fn test_details_error_message() {
        // Arrange
        let api = MockTmdbApi {
            fail_all: true,
            ..MockTmdbApi::default()
        };

        // Act
        let err = load_details(&api, MediaKind::Movie, 603).await.unwrap_err();

        // Assert
        assert_eq!(err.message(), "Не удалось загрузить информацию");
    }
}

//! TMDB API response types and request parameters.

use serde::Deserialize;

use super::media::{MediaId, MediaItem, MediaKind};

// --- Paged lists ---

/// Paged response shared by trending, category, discover and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbPage<T> {
    /// Current page number.
    pub page: u32,
    /// Results.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A raw list entry. Movie and TV results share this shape with
/// different field names, so everything except `id` is optional.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbMediaResult {
    /// TMDB id.
    pub id: MediaId,
    /// `"movie"`, `"tv"` or `"person"` (mixed endpoints only).
    pub media_type: Option<String>,
    /// Movie title.
    pub title: Option<String>,
    /// Series name.
    pub name: Option<String>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Movie release date.
    pub release_date: Option<String>,
    /// Series first air date.
    pub first_air_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
}

// --- Genres ---

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// Response from `genre/{kind}/list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbGenreList {
    /// Genres.
    pub genres: Vec<TmdbGenre>,
}

// --- Details ---

/// Response from `movie/{id}` or `tv/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMediaDetails {
    /// TMDB id.
    pub id: MediaId,
    /// Movie title.
    pub title: Option<String>,
    /// Series name.
    pub name: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Status (e.g., "Released", "Returning Series").
    pub status: Option<String>,
    /// Movie release date.
    pub release_date: Option<String>,
    /// Series first air date.
    pub first_air_date: Option<String>,
    /// Movie runtime in minutes.
    pub runtime: Option<u32>,
    /// Number of seasons (series only).
    pub number_of_seasons: Option<u32>,
    /// Number of episodes (series only).
    pub number_of_episodes: Option<u32>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
}

impl TmdbMediaDetails {
    /// Returns the localized title or series name.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// Builds the list representation of this entry.
    #[must_use]
    pub fn to_media_item(&self, kind: MediaKind) -> MediaItem {
        MediaItem {
            id: self.id,
            media_type: kind,
            title: String::from(self.display_title()),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: self.vote_average,
            release_date: self
                .release_date
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| self.first_air_date.clone())
                .filter(|d| !d.is_empty()),
            overview: self.overview.clone().filter(|o| !o.is_empty()),
            adult: self.adult,
        }
    }
}

/// Response from `{kind}/{id}/external_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TmdbExternalIds {
    /// TMDB id.
    #[serde(default)]
    pub id: MediaId,
    /// IMDb id (e.g. "tt0137523"). Empty or null when unknown.
    pub imdb_id: Option<String>,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

// --- Request parameters ---

/// Time window for `trending/all/{window}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
}

impl TimeWindow {
    /// Returns the path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// Movie list categories (`movie/{category}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieCategory {
    /// Popular movies.
    Popular,
    /// Top rated movies.
    TopRated,
    /// Movies now in theatres.
    NowPlaying,
    /// Upcoming movies.
    Upcoming,
}

impl MovieCategory {
    /// Returns the path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::NowPlaying => "now_playing",
            Self::Upcoming => "upcoming",
        }
    }
}

/// TV list categories (`tv/{category}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvCategory {
    /// Popular series.
    Popular,
    /// Top rated series.
    TopRated,
    /// Series with an episode airing in the next 7 days.
    OnTheAir,
    /// Series airing today.
    AiringToday,
}

impl TvCategory {
    /// Returns the path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::OnTheAir => "on_the_air",
            Self::AiringToday => "airing_today",
        }
    }
}

/// Parameters for `discover/{kind}`.
#[derive(Debug, Clone)]
pub struct DiscoverParams {
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Genre filter (`with_genres`).
    pub genre_id: Option<u32>,
    /// Sort order (default: "popularity.desc").
    pub sort_by: String,
    /// Include adult content.
    pub include_adult: bool,
}

impl Default for DiscoverParams {
    fn default() -> Self {
        Self {
            page: 1,
            genre_id: None,
            sort_by: String::from("popularity.desc"),
            include_adult: false,
        }
    }
}

impl DiscoverParams {
    /// Sets the genre filter.
    #[must_use]
    pub const fn genre(mut self, genre_id: Option<u32>) -> Self {
        self.genre_id = genre_id;
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the adult content flag.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }
}

/// Parameters for `search/multi`.
#[derive(Debug, Clone)]
pub struct SearchMultiParams {
    /// Search query (required).
    pub query: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMultiParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            include_adult: false,
        }
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the adult content flag.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }
}

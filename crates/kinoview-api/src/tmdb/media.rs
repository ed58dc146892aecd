//! Catalog media model shared by every list endpoint.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::types::{TmdbMediaResult, TmdbPage};

/// TMDB identifier of a movie or TV series.
pub type MediaId = u64;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film.
    Movie,
    /// TV series.
    Tv,
}

impl MediaKind {
    /// Returns the TMDB path segment (`"movie"` / `"tv"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Returns the opposite kind.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Movie => Self::Tv,
            Self::Tv => Self::Movie,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => bail!("unknown media type: {other}"),
        }
    }
}

/// A movie or TV series as shown in lists, the hero banner and the watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// TMDB id.
    pub id: MediaId,
    /// Movie or TV.
    pub media_type: MediaKind,
    /// Localized title (`title` for movies, `name` for series).
    pub title: String,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
    /// Vote average (0.0 - 10.0).
    pub vote_average: f64,
    /// Release or first air date (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Adult flag.
    pub adult: bool,
}

impl MediaItem {
    /// Returns the release year parsed from `release_date`.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// Returns `true` when the item has a non-zero rating.
    #[must_use]
    pub fn has_rating(&self) -> bool {
        self.vote_average > 0.0
    }
}

/// One page of media results.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPage {
    /// Current page number.
    pub page: u32,
    /// Results that map to a movie or series.
    pub results: Vec<MediaItem>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results reported by TMDB.
    pub total_results: u32,
}

impl TmdbMediaResult {
    /// Converts a raw result into a `MediaItem`.
    ///
    /// `fallback` is the kind implied by the endpoint (`None` for mixed
    /// endpoints). Returns `None` for non-media results such as people.
    pub(crate) fn into_media_item(self, fallback: Option<MediaKind>) -> Option<MediaItem> {
        let media_type = match self.media_type.as_deref() {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Tv,
            Some(_) => return None,
            None => fallback.unwrap_or(if self.title.is_some() {
                MediaKind::Movie
            } else {
                MediaKind::Tv
            }),
        };

        let title = self.title.or(self.name).unwrap_or_default();

        Some(MediaItem {
            id: self.id,
            media_type,
            title,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
            release_date: self
                .release_date
                .filter(|d| !d.is_empty())
                .or(self.first_air_date)
                .filter(|d| !d.is_empty()),
            overview: self.overview.filter(|o| !o.is_empty()),
            adult: self.adult,
        })
    }
}

impl TmdbPage<TmdbMediaResult> {
    /// Converts a raw page into a `MediaPage`, dropping non-media results.
    pub(crate) fn into_media_page(self, fallback: Option<MediaKind>) -> MediaPage {
        MediaPage {
            page: self.page,
            results: self
                .results
                .into_iter()
                .filter_map(|r| r.into_media_item(fallback))
                .collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

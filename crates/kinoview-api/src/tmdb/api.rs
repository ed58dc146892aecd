//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::media::{MediaId, MediaKind, MediaPage};
use super::types::{
    DiscoverParams, MovieCategory, SearchMultiParams, TimeWindow, TmdbExternalIds, TmdbGenre,
    TmdbMediaDetails, TvCategory,
};

/// TMDB API trait.
///
/// Abstracts the read-only catalog queries for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Fetches trending movies and series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn trending(&self, window: TimeWindow) -> Result<MediaPage>;

    /// Fetches a movie category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movies_by_category(&self, category: MovieCategory, page: u32) -> Result<MediaPage>;

    /// Fetches a TV category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_by_category(&self, category: TvCategory, page: u32) -> Result<MediaPage>;

    /// Fetches the genre list for a media kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn genres(&self, kind: MediaKind) -> Result<Vec<TmdbGenre>>;

    /// Discovers movies or series with optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn discover(&self, kind: MediaKind, params: &DiscoverParams) -> Result<MediaPage>;

    /// Searches movies and series at once. People are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_multi(&self, params: &SearchMultiParams) -> Result<MediaPage>;

    /// Fetches movie or series details.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn details(&self, kind: MediaKind, id: MediaId) -> Result<TmdbMediaDetails>;

    /// Fetches external ids (IMDb) for a movie or series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn external_ids(&self, kind: MediaKind, id: MediaId) -> Result<TmdbExternalIds>;
}

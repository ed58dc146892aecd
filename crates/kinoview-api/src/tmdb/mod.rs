//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints used by the catalog
//! views: trending lists, category lists, discover, multi-search, genres,
//! details and external ids.

mod api;
mod client;
mod image;
mod media;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use image::{IMAGE_BASE_URL, image_url};
pub use media::{MediaId, MediaItem, MediaKind, MediaPage};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    DiscoverParams, MovieCategory, SearchMultiParams, TimeWindow, TmdbExternalIds, TmdbGenre,
    TmdbMediaDetails, TvCategory,
};

//! Poster and backdrop URL helpers.

/// Base URL of the TMDB image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Builds an image URL for a poster/backdrop path at the given size
/// (e.g. `"w500"`, `"original"`). Returns `None` when the path is missing.
#[must_use]
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE_URL}{size}{p}"))
}

//! `TmdbClient` - TMDB API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalTmdbApi;
use super::media::{MediaId, MediaKind, MediaPage};
use super::types::{
    DiscoverParams, MovieCategory, SearchMultiParams, TimeWindow, TmdbErrorResponse,
    TmdbExternalIds, TmdbGenre, TmdbGenreList, TmdbMediaDetails, TmdbMediaResult, TmdbPage,
    TvCategory,
};
use crate::throttle::RequestThrottle;

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "ru-RU";

/// Default minimum interval between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Maximum number of retries for HTTP 429 responses.
const MAX_RETRIES: u32 = 3;

/// Backoff duration between retries.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Response language sent with every request.
    language: String,
    /// Request throttle.
    throttle: Arc<Mutex<RequestThrottle>>,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
    min_interval: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            language: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language (default: "ru-RU").
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the minimum request interval (default: 25ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_token = self.api_token.context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?
        };

        let throttle = RequestThrottle::new(self.min_interval.unwrap_or(DEFAULT_MIN_INTERVAL));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            throttle: Arc::new(Mutex::new(throttle)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Returns the configured response language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sends a GET request with Bearer auth, language, query params, and throttling.
    /// Retries up to `MAX_RETRIES` times on HTTP 429.
    #[instrument(skip_all, fields(path = path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.throttle.lock().await.acquire().await;

        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut retries = 0u32;
        loop {
            let request = self
                .http_client
                .get(url.clone())
                .bearer_auth(&self.api_token)
                .query(&[("language", self.language.as_str())])
                .query(query)
                .build()
                .with_context(|| format!("failed to build request: {path}"))?;

            tracing::debug!(url = %request.url(), "TMDB API request");

            let response = self
                .http_client
                .execute(request)
                .await
                .with_context(|| format!("request failed: {path}"))?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                retries = retries.saturating_add(1);
                if retries > MAX_RETRIES {
                    bail!("TMDB API rate limit exceeded after {MAX_RETRIES} retries: {path}");
                }
                tracing::warn!(
                    retry = retries,
                    max_retries = MAX_RETRIES,
                    "TMDB API rate limited (429). Retrying..."
                );
                tokio::time::sleep(RETRY_BACKOFF.saturating_mul(retries)).await;
                self.throttle.lock().await.acquire().await;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<failed to read body>"));
                if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                    bail!(
                        "TMDB API error (HTTP {}): code={}, message={}",
                        status,
                        error_response.status_code,
                        error_response.status_message,
                    );
                }
                bail!("TMDB API error (HTTP {status}): {body}");
            }

            let body = response
                .text()
                .await
                .with_context(|| format!("failed to read response body: {path}"))?;
            return serde_json::from_str(&body)
                .with_context(|| format!("failed to decode JSON response: {path}"));
        }
    }

    /// Fetches a paged media list and converts it.
    async fn get_media_page(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: Option<MediaKind>,
    ) -> Result<MediaPage> {
        let raw: TmdbPage<TmdbMediaResult> = self.get_json(path, query).await?;
        Ok(raw.into_media_page(fallback))
    }
}

impl LocalTmdbApi for TmdbClient {
    #[instrument(skip_all)]
    async fn trending(&self, window: TimeWindow) -> Result<MediaPage> {
        let path = format!("trending/all/{}", window.as_str());
        self.get_media_page(&path, &[], None).await
    }

    #[instrument(skip_all)]
    async fn movies_by_category(&self, category: MovieCategory, page: u32) -> Result<MediaPage> {
        let path = format!("movie/{}", category.as_str());
        let query = [("page", page.to_string())];
        self.get_media_page(&path, &query, Some(MediaKind::Movie))
            .await
    }

    #[instrument(skip_all)]
    async fn tv_by_category(&self, category: TvCategory, page: u32) -> Result<MediaPage> {
        let path = format!("tv/{}", category.as_str());
        let query = [("page", page.to_string())];
        self.get_media_page(&path, &query, Some(MediaKind::Tv)).await
    }

    #[instrument(skip_all)]
    async fn genres(&self, kind: MediaKind) -> Result<Vec<TmdbGenre>> {
        let path = format!("genre/{kind}/list");
        let list: TmdbGenreList = self.get_json(&path, &[]).await?;
        Ok(list.genres)
    }

    #[instrument(skip_all)]
    async fn discover(&self, kind: MediaKind, params: &DiscoverParams) -> Result<MediaPage> {
        let path = format!("discover/{kind}");
        let mut query: Vec<(&str, String)> = vec![
            ("page", params.page.to_string()),
            ("sort_by", params.sort_by.clone()),
            ("include_adult", params.include_adult.to_string()),
        ];
        if let Some(genre_id) = params.genre_id {
            query.push(("with_genres", genre_id.to_string()));
        }

        self.get_media_page(&path, &query, Some(kind)).await
    }

    #[instrument(skip_all)]
    async fn search_multi(&self, params: &SearchMultiParams) -> Result<MediaPage> {
        let query: Vec<(&str, String)> = vec![
            ("query", params.query.clone()),
            ("page", params.page.to_string()),
            ("include_adult", params.include_adult.to_string()),
        ];

        self.get_media_page("search/multi", &query, None).await
    }

    #[instrument(skip_all)]
    async fn details(&self, kind: MediaKind, id: MediaId) -> Result<TmdbMediaDetails> {
        let path = format!("{kind}/{id}");
        self.get_json(&path, &[]).await
    }

    #[instrument(skip_all)]
    async fn external_ids(&self, kind: MediaKind, id: MediaId) -> Result<TmdbExternalIds> {
        let path = format!("{kind}/{id}/external_ids");
        self.get_json(&path, &[]).await
    }
}

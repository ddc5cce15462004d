//! `TmdbClient` - TMDB API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalTmdbApi;
use super::error::CatalogError;
use super::params::{DiscoverParams, ListParams, SearchMovieParams, TrendingWindow};
use super::rate_limiter::RateLimiter;
use super::types::{
    Genre, GenreList, Movie, MovieDetails, MovieId, PagedResult, TmdbErrorResponse, VideoList,
};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

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
    /// API key sent as the `api_key` query parameter.
    api_key: Option<String>,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    min_interval: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key. Blank keys count as missing.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
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
    /// A missing API key does not fail the build: it is reported once here
    /// and every request then returns [`CatalogError::Misconfigured`].
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        if self.api_key.is_none() {
            tracing::error!(
                "TMDB API key is missing. Set TMDB_API_KEY or tmdb.api_key in config.toml"
            );
        }

        let rate_limiter = self
            .min_interval
            .map_or_else(RateLimiter::with_default_interval, RateLimiter::new);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_key: self.api_key,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Returns `true` if an API key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends an authenticated GET request and decodes the JSON body.
    ///
    /// Short-circuits with [`CatalogError::Misconfigured`] before any I/O
    /// when no API key is configured.
    #[instrument(skip_all, fields(path = %path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("TMDB request blocked: API key is not configured");
            return Err(CatalogError::Misconfigured);
        };

        self.fetch_json(path, api_key, query)
            .await
            .map_err(CatalogError::Unavailable)
    }

    /// Performs the request with rate limiting.
    /// Retries up to `MAX_RETRIES` times on HTTP 429.
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.lock().await.acquire().await;

        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut retries = 0u32;
        loop {
            let request = self
                .http_client
                .get(url.clone())
                .query(&[("api_key", api_key)])
                .query(query)
                .build()
                .with_context(|| format!("failed to build request: {path}"))?;

            // The full URL carries the API key; log only the path and parameters.
            tracing::debug!(path, ?query, "TMDB API request");

            let result = self.http_client.execute(request).await;
            let response = result.with_context(|| format!("request failed: {path}"))?;

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
                self.rate_limiter.lock().await.acquire().await;
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
            let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
            let parsed =
                raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
            return Ok(parsed);
        }
    }

    /// Fetches one of the fixed movie lists.
    async fn movie_list(
        &self,
        path: &str,
        params: &ListParams,
    ) -> Result<PagedResult<Movie>, CatalogError> {
        let query = [
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
        ];
        self.get_json(path, &query).await
    }
}

impl LocalTmdbApi for TmdbClient {
    #[instrument(skip_all)]
    async fn search_movie(
        &self,
        params: &SearchMovieParams,
    ) -> Result<PagedResult<Movie>, CatalogError> {
        let mut query: Vec<(&str, String)> = vec![
            ("query", params.query.clone()),
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
            ("include_adult", params.include_adult.to_string()),
        ];
        if let Some(year) = params.primary_release_year {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(year) = params.year {
            query.push(("year", year.to_string()));
        }
        if let Some(ref region) = params.region {
            query.push(("region", region.clone()));
        }

        self.get_json("search/movie", &query).await
    }

    #[instrument(skip_all)]
    async fn popular(&self, params: &ListParams) -> Result<PagedResult<Movie>, CatalogError> {
        self.movie_list("movie/popular", params).await
    }

    #[instrument(skip_all)]
    async fn top_rated(&self, params: &ListParams) -> Result<PagedResult<Movie>, CatalogError> {
        self.movie_list("movie/top_rated", params).await
    }

    #[instrument(skip_all)]
    async fn upcoming(&self, params: &ListParams) -> Result<PagedResult<Movie>, CatalogError> {
        self.movie_list("movie/upcoming", params).await
    }

    #[instrument(skip_all, fields(window = %window))]
    async fn trending(
        &self,
        window: TrendingWindow,
        params: &ListParams,
    ) -> Result<PagedResult<Movie>, CatalogError> {
        let path = format!("trending/movie/{}", window.as_str());
        self.movie_list(&path, params).await
    }

    #[instrument(skip_all)]
    async fn discover(&self, params: &DiscoverParams) -> Result<PagedResult<Movie>, CatalogError> {
        let query = params.to_query();
        self.get_json("discover/movie", &query).await
    }

    #[instrument(skip_all, fields(movie_id = id))]
    async fn movie_details(
        &self,
        id: MovieId,
        language: &str,
    ) -> Result<MovieDetails, CatalogError> {
        let path = format!("movie/{id}");
        let query = [("language", String::from(language))];
        self.get_json(&path, &query).await
    }

    #[instrument(skip_all, fields(movie_id = id))]
    async fn movie_videos(&self, id: MovieId, language: &str) -> Result<VideoList, CatalogError> {
        let path = format!("movie/{id}/videos");
        let query = [("language", String::from(language))];
        self.get_json(&path, &query).await
    }

    #[instrument(skip_all)]
    async fn genres(&self, language: &str) -> Result<Vec<Genre>, CatalogError> {
        let query = [("language", String::from(language))];
        let list: GenreList = self.get_json("genre/movie/list", &query).await?;
        Ok(list.genres)
    }
}

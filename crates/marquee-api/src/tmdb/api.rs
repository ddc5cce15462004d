//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::CatalogError;
use super::params::{DiscoverParams, ListParams, SearchMovieParams, TrendingWindow};
use super::types::{Genre, Movie, MovieDetails, MovieId, PagedResult, VideoList};

/// Result alias for catalog operations.
type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
///
/// Every method fails with [`CatalogError::Misconfigured`] when no API key
/// is configured, and with [`CatalogError::Unavailable`] on any transport,
/// service, or decoding failure.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Searches for movies by title.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn search_movie(&self, params: &SearchMovieParams) -> CatalogResult<PagedResult<Movie>>;

    /// Lists currently popular movies.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn popular(&self, params: &ListParams) -> CatalogResult<PagedResult<Movie>>;

    /// Lists top-rated movies.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn top_rated(&self, params: &ListParams) -> CatalogResult<PagedResult<Movie>>;

    /// Lists upcoming movies.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn upcoming(&self, params: &ListParams) -> CatalogResult<PagedResult<Movie>>;

    /// Lists trending movies for the given time window.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn trending(
        &self,
        window: TrendingWindow,
        params: &ListParams,
    ) -> CatalogResult<PagedResult<Movie>>;

    /// Lists movies matching genre, rating, and sort criteria.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn discover(&self, params: &DiscoverParams) -> CatalogResult<PagedResult<Movie>>;

    /// Fetches the full details of one movie.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn movie_details(&self, id: MovieId, language: &str) -> CatalogResult<MovieDetails>;

    /// Fetches the videos associated with one movie.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn movie_videos(&self, id: MovieId, language: &str) -> CatalogResult<VideoList>;

    /// Fetches the official movie genre list.
    ///
    /// # Errors
    ///
    /// See the trait-level error contract.
    async fn genres(&self, language: &str) -> CatalogResult<Vec<Genre>>;
}

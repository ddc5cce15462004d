//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints and
//! shapes search, listing, discovery, detail, and video lookups.

mod api;
mod client;
mod error;
mod images;
mod params;
mod rate_limiter;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use error::CatalogError;
pub use images::{ImageSize, PLACEHOLDER_IMAGE, image_url};
pub use params::{DiscoverParams, ListParams, SearchMovieParams, SortKey, TrendingWindow};
pub use types::{
    Genre, MAX_NAVIGABLE_PAGES, Movie, MovieDetails, MovieId, PagedResult, ProductionCompany,
    ProductionCountry, SpokenLanguage, Video, VideoKey, VideoList, clamp_total_pages,
};
pub use util::{degrade_to_empty, fetch_trailer_key, select_trailer};

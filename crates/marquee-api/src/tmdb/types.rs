//! TMDB API response types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// TMDB movie ID. Stable across requests and the sole watchlist key.
pub type MovieId = u64;

/// Highest page number TMDB serves for list endpoints.
pub const MAX_NAVIGABLE_PAGES: u32 = 500;

/// Clamps a reported `total_pages` to the range a caller can navigate.
///
/// TMDB reports page counts far beyond what it will serve; anything past
/// page 500 returns an error. A report of zero pages is treated as one.
#[must_use]
pub fn clamp_total_pages(total_pages: u32) -> u32 {
    total_pages.clamp(1, MAX_NAVIGABLE_PAGES)
}

// --- Paged envelope ---

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagedResult<T> {
    /// Current page number (1-based).
    pub page: u32,
    /// Results on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Total number of pages as reported by the service.
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

const fn default_total_pages() -> u32 {
    1
}

impl<T> PagedResult<T> {
    /// An empty first page, used when a request degrades.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 1,
            total_results: 0,
        }
    }

    /// Number of pages a caller may offer for navigation.
    #[must_use]
    pub fn navigable_pages(&self) -> u32 {
        clamp_total_pages(self.total_pages)
    }

    /// Returns `true` if this page has no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// --- Movie ---

/// A movie record as returned by search and list endpoints.
///
/// Only `id` carries meaning for identity; every other field is
/// display data and defaults when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: MovieId,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Original title.
    #[serde(default)]
    pub original_title: String,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
    /// Video flag.
    #[serde(default)]
    pub video: bool,
}

impl Movie {
    /// Creates a movie record with only an ID and title set.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            genre_ids: Vec::new(),
            adult: false,
            original_language: String::new(),
            original_title: String::new(),
            popularity: 0.0,
            video: false,
        }
    }

    /// Year of the release date, if one is present and well-formed.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

// --- Movie Details ---

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    /// Common movie fields.
    #[serde(flatten)]
    pub movie: Movie,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Production companies.
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    /// Production countries.
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    /// Spoken languages.
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    /// Release status (e.g., "Released").
    pub status: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Budget in USD.
    #[serde(default)]
    pub budget: u64,
    /// Revenue in USD.
    #[serde(default)]
    pub revenue: u64,
    /// IMDb ID.
    pub imdb_id: Option<String>,
}

impl From<MovieDetails> for Movie {
    /// Detail responses carry `genres` instead of `genre_ids`.
    fn from(details: MovieDetails) -> Self {
        let mut movie = details.movie;
        if movie.genre_ids.is_empty() {
            movie.genre_ids = details.genres.iter().map(|g| g.id).collect();
        }
        movie
    }
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// Response from `genre/movie/list` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenreList {
    pub genres: Vec<Genre>,
}

/// Production company entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductionCompany {
    /// Company ID.
    pub id: u64,
    /// Company name.
    pub name: String,
    /// Logo image path.
    pub logo_path: Option<String>,
    /// Origin country (ISO 3166-1).
    #[serde(default)]
    pub origin_country: String,
}

/// Production country entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductionCountry {
    /// Country code (ISO 3166-1).
    pub iso_3166_1: String,
    /// Country name.
    pub name: String,
}

/// Spoken language entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpokenLanguage {
    /// Language code (ISO 639-1).
    pub iso_639_1: String,
    /// Language name.
    pub name: String,
}

// --- Videos ---

/// Response from `movie/{movie_id}/videos` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoList {
    /// TMDB movie ID.
    pub id: MovieId,
    /// Associated videos.
    #[serde(default)]
    pub results: Vec<Video>,
}

/// A single video associated with a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// TMDB video ID.
    pub id: String,
    /// Key on the hosting site.
    pub key: String,
    /// Video name.
    pub name: String,
    /// Hosting site (e.g., "YouTube").
    pub site: String,
    /// Video type (e.g., "Trailer", "Teaser").
    #[serde(rename = "type")]
    pub kind: String,
}

/// Reference to a trailer on the video host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoKey(String);

impl VideoKey {
    /// Wraps a video host key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Autoplaying embed URL.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.0)
    }

    /// Watch page URL.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
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

//! TMDB request parameter types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// Parameters for `search/movie` endpoint.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Filter by primary release year.
    pub primary_release_year: Option<u32>,
    /// Filter by year.
    pub year: Option<u32>,
    /// Region filter (ISO 3166-1).
    pub region: Option<String>,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from(DEFAULT_LANGUAGE),
            page: 1,
            primary_release_year: None,
            year: None,
            region: None,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the result page. Page 0 is treated as 1.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the region filter.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Parameters for the fixed movie lists (`popular`, `top_rated`, `upcoming`, `trending`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Response language (default: "en-US").
    pub language: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            language: String::from(DEFAULT_LANGUAGE),
        }
    }
}

impl ListParams {
    /// Creates list params for the given page.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Time window for `trending/movie/{time_window}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingWindow {
    /// Trending over the last day.
    Day,
    /// Trending over the last week.
    #[default]
    Week,
}

impl TrendingWindow {
    /// Path segment used by TMDB.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl fmt::Display for TrendingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendingWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => bail!("unknown trending window: {other} (expected day or week)"),
        }
    }
}

/// Sort order for `discover/movie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// `popularity.asc`
    PopularityAsc,
    /// `popularity.desc`
    #[default]
    PopularityDesc,
    /// `release_date.asc`
    ReleaseDateAsc,
    /// `release_date.desc`
    ReleaseDateDesc,
    /// `vote_average.asc`
    RatingAsc,
    /// `vote_average.desc`
    RatingDesc,
}

impl SortKey {
    /// All sort keys in display order.
    pub const ALL: [Self; 6] = [
        Self::PopularityDesc,
        Self::PopularityAsc,
        Self::ReleaseDateDesc,
        Self::ReleaseDateAsc,
        Self::RatingDesc,
        Self::RatingAsc,
    ];

    /// Value of the `sort_by` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PopularityAsc => "popularity.asc",
            Self::PopularityDesc => "popularity.desc",
            Self::ReleaseDateAsc => "release_date.asc",
            Self::ReleaseDateDesc => "release_date.desc",
            Self::RatingAsc => "vote_average.asc",
            Self::RatingDesc => "vote_average.desc",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PopularityAsc => "Popularity Ascending",
            Self::PopularityDesc => "Popularity Descending",
            Self::ReleaseDateAsc => "Release Date Ascending",
            Self::ReleaseDateDesc => "Release Date Descending",
            Self::RatingAsc => "Rating Ascending",
            Self::RatingDesc => "Rating Descending",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown sort key: {s}"))
    }
}

/// Parameters for `discover/movie` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverParams {
    /// Genre IDs that must all match (empty = any genre).
    pub genres: BTreeSet<u32>,
    /// Minimum vote average (0-10).
    pub min_rating: f64,
    /// Sort order.
    pub sort: SortKey,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Response language (default: "en-US").
    pub language: String,
}

impl Default for DiscoverParams {
    fn default() -> Self {
        Self {
            genres: BTreeSet::new(),
            min_rating: 0.0,
            sort: SortKey::default(),
            page: 1,
            language: String::from(DEFAULT_LANGUAGE),
        }
    }
}

impl DiscoverParams {
    /// Creates discover params with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the genre filter.
    #[must_use]
    pub fn genres(mut self, genres: impl IntoIterator<Item = u32>) -> Self {
        self.genres = genres.into_iter().collect();
        self
    }

    /// Sets the minimum rating, clamped into `[0, 10]`.
    #[must_use]
    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = if rating.is_nan() {
            0.0
        } else {
            rating.clamp(0.0, 10.0)
        };
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the result page. Page 0 is treated as 1.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Builds the query pairs for the request.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = vec![
            ("language", self.language.clone()),
            ("page", self.page.to_string()),
            ("sort_by", String::from(self.sort.as_str())),
            ("include_adult", String::from("false")),
        ];
        if !self.genres.is_empty() {
            let joined = self
                .genres
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("with_genres", joined));
        }
        if self.min_rating > 0.0 {
            query.push(("vote_average.gte", self.min_rating.to_string()));
        }
        query
    }
}

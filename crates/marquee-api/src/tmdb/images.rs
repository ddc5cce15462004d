//! Image URL construction.

use std::fmt;

/// Image host prefix for TMDB assets.
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Local asset shown when a record has no image path.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-movie.jpg";

/// Size token inserted between the image host and the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    /// `w92`
    W92,
    /// `w185`
    W185,
    /// `w342`
    W342,
    /// `w500`
    #[default]
    W500,
    /// `w780`
    W780,
    /// `original`
    Original,
}

impl ImageSize {
    /// Size token as used in the URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W185 => "w185",
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::Original => "original",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a loadable image URL from a partial path.
///
/// Falls back to [`PLACEHOLDER_IMAGE`] when `path` is absent or empty.
#[must_use]
pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
    match path.map(str::trim) {
        Some(p) if !p.is_empty() => {
            let p = p.strip_prefix('/').unwrap_or(p);
            format!("{IMAGE_BASE_URL}{size}/{p}")
        }
        _ => String::from(PLACEHOLDER_IMAGE),
    }
}

//! Catalog error kinds.

use thiserror::Error;

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No API key is configured; no request was sent.
    #[error("TMDB API key is not configured (set TMDB_API_KEY or tmdb.api_key in config.toml)")]
    Misconfigured,

    /// Network, timeout, service, or decoding failure.
    #[error("TMDB request failed: {0:#}")]
    Unavailable(anyhow::Error),
}

impl CatalogError {
    /// Returns `true` for [`CatalogError::Misconfigured`].
    #[must_use]
    pub const fn is_misconfigured(&self) -> bool {
        matches!(self, Self::Misconfigured)
    }
}

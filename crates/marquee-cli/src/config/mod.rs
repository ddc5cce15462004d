//! Application configuration module.
//!
//! Manages the TOML config file holding TMDB access settings.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TmdbConfig};

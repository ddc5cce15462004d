//! `AppConfig` struct and TOML loading.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Per-application directory under the XDG config home.
const APP_DIR: &str = "marquee";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB access settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// TMDB access configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key. `TMDB_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Response language.
    pub language: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// API base URL override.
    pub base_url: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: String::from("en-US"),
            timeout_secs: 10,
            base_url: None,
        }
    }
}

impl TmdbConfig {
    /// Picks the API key: a non-blank `env_key` wins over the file value.
    #[must_use]
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Resolves the config file path.
    ///
    /// `{dir}/config.toml` when `dir` is given, otherwise
    /// `$XDG_CONFIG_HOME/marquee/config.toml`, falling back to
    /// `~/.config/marquee/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable.
    pub fn path(dir: Option<&Path>) -> Result<PathBuf> {
        Self::path_from(
            dir,
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
        )
    }

    /// Relative or empty `XDG_CONFIG_HOME` values are ignored.
    fn path_from(
        dir: Option<&Path>,
        xdg_config_home: Option<OsString>,
        home: Option<OsString>,
    ) -> Result<PathBuf> {
        if let Some(d) = dir {
            return Ok(d.join(CONFIG_FILE));
        }
        let base = match xdg_config_home
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
        {
            Some(xdg) => xdg,
            None => home
                .filter(|h| !h.is_empty())
                .map(PathBuf::from)
                .context("neither XDG_CONFIG_HOME nor HOME is set")?
                .join(".config"),
        };
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

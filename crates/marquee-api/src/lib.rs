//! Catalog client library for marquee.
//!
//! Provides a client for the TMDB movie catalog. [`debounce`] is a hook for
//! interactive front ends that issue a search per keystroke; the one-shot
//! `marquee` CLI does not use it.

/// Debouncing and stale-response detection for search-as-you-type front ends.
pub mod debounce;

/// TMDB API client.
pub mod tmdb;

//! Helpers layered on top of the `TmdbApi` trait.

use tracing::instrument;

use super::api::LocalTmdbApi;
use super::error::CatalogError;
use super::types::{MovieId, PagedResult, Video, VideoKey};

/// Site name of the designated video host.
const TRAILER_SITE: &str = "YouTube";

/// Video type that marks a trailer.
const TRAILER_KIND: &str = "Trailer";

/// Selects the first video hosted on YouTube whose type is `Trailer`.
#[must_use]
pub fn select_trailer(videos: &[Video]) -> Option<VideoKey> {
    videos
        .iter()
        .find(|v| v.site == TRAILER_SITE && v.kind == TRAILER_KIND)
        .map(|v| VideoKey::new(v.key.clone()))
}

/// Fetches a movie's videos and selects its trailer.
///
/// Returns `Ok(None)` when the movie has no matching trailer.
///
/// # Errors
///
/// Returns the underlying [`CatalogError`] if the videos request fails.
#[instrument(skip_all, fields(movie_id = id))]
pub async fn fetch_trailer_key(
    api: &(impl LocalTmdbApi + Sync),
    id: MovieId,
    language: &str,
) -> Result<Option<VideoKey>, CatalogError> {
    let videos = api.movie_videos(id, language).await?;
    let trailer = select_trailer(&videos.results);
    tracing::debug!(
        videos = videos.results.len(),
        found = trailer.is_some(),
        "Trailer lookup complete"
    );
    Ok(trailer)
}

/// Converts a failed list request into an empty page plus a diagnostic.
///
/// Callers that render lists use this so a catalog failure shows as an
/// empty list rather than an error.
pub fn degrade_to_empty<T>(
    result: Result<PagedResult<T>, CatalogError>,
    operation: &str,
) -> PagedResult<T> {
    match result {
        Ok(page) => page,
        Err(err @ CatalogError::Misconfigured) => {
            tracing::error!(operation, error = %err, "Catalog request not sent, showing empty list");
            PagedResult::empty()
        }
        Err(err) => {
            tracing::warn!(operation, error = %err, "Catalog request failed, showing empty list");
            PagedResult::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tmdb::{Movie, TmdbClient, VideoList};

    fn video(key: &str, site: &str, kind: &str) -> Video {
        Video {
            id: format!("id-{key}"),
            key: String::from(key),
            name: format!("{kind} on {site}"),
            site: String::from(site),
            kind: String::from(kind),
        }
    }

    #[test]
    fn test_select_trailer_picks_first_youtube_trailer() {
        // Arrange
        let videos = vec![
            video("teaser", "YouTube", "Teaser"),
            video("vimeo", "Vimeo", "Trailer"),
            video("first", "YouTube", "Trailer"),
            video("second", "YouTube", "Trailer"),
        ];

        // Act
        let key = select_trailer(&videos);

        // Assert
        assert_eq!(key, Some(VideoKey::new("first")));
    }

    #[test]
    fn test_select_trailer_none_when_no_match() {
        // Arrange
        let videos = vec![
            video("teaser", "YouTube", "Teaser"),
            video("vimeo", "Vimeo", "Trailer"),
        ];

        // Act & Assert
        assert_eq!(select_trailer(&videos), None);
        assert_eq!(select_trailer(&[]), None);
    }

    #[test]
    fn test_select_trailer_from_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_videos_27205.json");
        let videos: VideoList = serde_json::from_str(json).unwrap();

        // Act
        let key = select_trailer(&videos.results);

        // Assert
        assert_eq!(key.unwrap().as_str(), "YoHD9XEInc0");
    }

    #[tokio::test]
    async fn test_fetch_trailer_key_via_http() {
        // Arrange
        let mock_server = MockServer::start().await;
        let with_trailer = include_str!("../../../../fixtures/tmdb/movie_videos_27205.json");
        let without_trailer = include_str!("../../../../fixtures/tmdb/movie_videos_no_trailer.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/27205/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(with_trailer))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/64956/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(without_trailer))
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .build()
            .unwrap();

        // Act
        let found = fetch_trailer_key(&client, 27_205, "en-US").await.unwrap();
        let missing = fetch_trailer_key(&client, 64_956, "en-US").await.unwrap();

        // Assert
        assert_eq!(found, Some(VideoKey::new("YoHD9XEInc0")));
        assert_eq!(missing, None);
    }

    #[test]
    fn test_degrade_passes_success_through() {
        // Arrange
        let mut page: PagedResult<Movie> = PagedResult::empty();
        page.results.push(Movie::new(27_205, "Inception"));

        // Act
        let result = degrade_to_empty(Ok(page.clone()), "popular");

        // Assert
        assert_eq!(result, page);
    }

    #[test]
    fn test_degrade_failure_yields_empty_and_warns() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let failure: Result<PagedResult<Movie>, CatalogError> =
            Err(CatalogError::Unavailable(anyhow::anyhow!("connection refused")));

        // Act
        let result = with_default(subscriber, || degrade_to_empty(failure, "search"));

        // Assert
        assert!(result.is_empty());
        assert_eq!(result.navigable_pages(), 1);
        handle.assert_finished();
    }

    #[test]
    fn test_degrade_misconfigured_logs_error() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::ERROR))
            .only()
            .run_with_handle();

        // Act
        let result: PagedResult<Movie> = with_default(subscriber, || {
            degrade_to_empty(Err(CatalogError::Misconfigured), "popular")
        });

        // Assert
        assert!(result.is_empty());
        handle.assert_finished();
    }
}

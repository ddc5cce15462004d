//! Text formatting for CLI output.

use marquee_api::tmdb::{Genre, ImageSize, Movie, MovieDetails, PagedResult, image_url};

/// Shown in place of a missing release year.
const UNKNOWN_YEAR: &str = "TBA";

/// Header matching [`movie_row`].
pub const MOVIE_HEADER: &str = "ID\tYear\tRating\tTitle";

/// One tab-separated line per movie.
pub fn movie_row(movie: &Movie) -> String {
    format!(
        "{}\t{}\t{:.1}\t{}",
        movie.id,
        release_year(movie),
        movie.vote_average,
        movie.title
    )
}

fn release_year(movie: &Movie) -> String {
    movie
        .release_year()
        .map_or_else(|| String::from(UNKNOWN_YEAR), |y| y.to_string())
}

/// Pagination summary using the navigable page count.
pub fn page_footer<T>(page: &PagedResult<T>) -> String {
    format!(
        "Page {} of {} ({} results)",
        page.page,
        page.navigable_pages(),
        page.total_results
    )
}

/// Genre names joined for display, or `-` if none.
fn genre_names(genres: &[Genre]) -> String {
    if genres.is_empty() {
        return String::from("-");
    }
    genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Detail view lines for a single movie.
pub fn details_lines(details: &MovieDetails) -> Vec<String> {
    let movie = &details.movie;
    let mut lines = vec![
        format!("ID: {}", movie.id),
        format!("Title: {} ({})", movie.title, release_year(movie)),
    ];
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("Tagline: {tagline}"));
    }
    lines.push(format!(
        "Runtime: {}",
        details
            .runtime
            .map_or_else(|| String::from("-"), |r| format!("{r} min"))
    ));
    lines.push(format!("Genres: {}", genre_names(&details.genres)));
    lines.push(format!(
        "Rating: {:.1} ({} votes)",
        movie.vote_average, movie.vote_count
    ));
    lines.push(format!(
        "Status: {}",
        details.status.as_deref().unwrap_or("-")
    ));
    if !details.production_companies.is_empty() {
        let companies: Vec<&str> = details
            .production_companies
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        lines.push(format!("Companies: {}", companies.join(", ")));
    }
    if let Some(imdb_id) = details.imdb_id.as_deref() {
        lines.push(format!("IMDb: https://www.imdb.com/title/{imdb_id}/"));
    }
    if let Some(homepage) = details.homepage.as_deref().filter(|h| !h.is_empty()) {
        lines.push(format!("Homepage: {homepage}"));
    }
    lines.push(format!(
        "Poster: {}",
        image_url(movie.poster_path.as_deref(), ImageSize::W500)
    ));
    lines.push(format!(
        "Backdrop: {}",
        image_url(movie.backdrop_path.as_deref(), ImageSize::W780)
    ));
    lines.push(String::from("---"));
    lines.push(if movie.overview.is_empty() {
        String::from("No overview available.")
    } else {
        movie.overview.clone()
    });
    lines
}

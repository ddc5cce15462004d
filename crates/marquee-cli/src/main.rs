//! marquee - movie discovery and watchlist CLI.

/// Application configuration (TOML).
mod config;
/// Text formatting for command output.
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, TmdbConfig};
use crate::render::{MOVIE_HEADER, details_lines, movie_row, page_footer};
use marquee_api::tmdb::{
    CatalogError, DiscoverParams, ListParams, LocalTmdbApi, Movie, MovieId, PagedResult,
    SearchMovieParams, SortKey, TmdbClient, TrendingWindow, degrade_to_empty, fetch_trailer_key,
};
use marquee_store::{SqliteStorage, WatchlistStore};

/// Environment variable holding the TMDB API key.
const API_KEY_ENV: &str = "TMDB_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "marquee", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search movies by title.
    Search(SearchArgs),
    /// Show one of the curated movie lists.
    List(ListArgs),
    /// Show trending movies.
    Trending(TrendingArgs),
    /// Filter movies by genre and rating.
    Discover(DiscoverArgs),
    /// Show full details of a movie.
    Details(IdArgs),
    /// Show the trailer link of a movie.
    Trailer(TrailerArgs),
    /// List movie genres.
    Genres,
    /// Manage the local watchlist.
    Watchlist(WatchlistCommand),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Page selection shared by list commands.
#[derive(clap::Args)]
struct PageArgs {
    /// Result page (1-500).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=500))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "Inception").
    #[arg(long, required = true)]
    query: String,
    /// Filter by release year.
    #[arg(long)]
    year: Option<u32>,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Curated movie lists.
#[derive(Clone, Copy, ValueEnum)]
enum MovieListKind {
    /// Currently popular movies.
    Popular,
    /// Highest rated movies.
    TopRated,
    /// Movies releasing soon.
    Upcoming,
}

/// Arguments for the `list` subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Which list to show.
    #[arg(value_enum)]
    kind: MovieListKind,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Time window: day or week.
    #[arg(long, default_value_t = TrendingWindow::Week)]
    window: TrendingWindow,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Arguments for the `discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Comma-separated genre IDs that must all match (e.g. "28,12").
    #[arg(long, value_delimiter = ',')]
    genres: Vec<u32>,
    /// Minimum vote average (0-10).
    #[arg(long, default_value_t = 0.0, value_parser = parse_rating)]
    min_rating: f64,
    /// Sort order (e.g. "vote_average.desc").
    #[arg(long, default_value_t = SortKey::PopularityDesc)]
    sort_by: SortKey,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Arguments naming a single movie.
#[derive(clap::Args)]
struct IdArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
}

/// Arguments for the `trailer` subcommand.
#[derive(clap::Args)]
struct TrailerArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
    /// Open the trailer in the default browser.
    #[arg(long)]
    open: bool,
}

/// Arguments for the `watchlist` subcommand.
#[derive(clap::Args)]
struct WatchlistCommand {
    /// Watchlist subcommand to run.
    #[command(subcommand)]
    command: WatchlistSubcommands,
}

/// Available watchlist subcommands.
#[derive(Subcommand)]
enum WatchlistSubcommands {
    /// List saved movies.
    List,
    /// Fetch a movie and add it to the watchlist.
    Add(IdArgs),
    /// Remove a movie from the watchlist.
    Remove(IdArgs),
    /// Remove every movie from the watchlist.
    Clear,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: Shell,
}

/// Parses a minimum rating in `[0, 10]`.
fn parse_rating(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=10.0).contains(&value) {
        Ok(value)
    } else {
        Err(String::from("rating must be between 0 and 10"))
    }
}

/// Catalog client plus the configured response language.
struct Catalog {
    client: TmdbClient,
    language: String,
}

/// Loads the config and builds the TMDB client.
///
/// A missing API key does not fail here; requests report it instead.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the client fails to build.
#[instrument(skip_all)]
fn build_catalog(dir: Option<&PathBuf>) -> Result<Catalog> {
    let config_path =
        AppConfig::path(dir.map(PathBuf::as_path)).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let client = build_tmdb_client(&config.tmdb)?;
    Ok(Catalog {
        client,
        language: config.tmdb.language,
    })
}

/// Builds the TMDB client from config and the `TMDB_API_KEY` environment variable.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
fn build_tmdb_client(config: &TmdbConfig) -> Result<TmdbClient> {
    let mut builder = TmdbClient::builder()
        .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout());

    if let Some(key) = config.resolve_api_key(std::env::var(API_KEY_ENV).ok()) {
        builder = builder.api_key(key);
    }
    if let Some(base_url) = config.base_url.as_deref() {
        let url = base_url
            .parse()
            .with_context(|| format!("invalid tmdb.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }

    builder.build().context("failed to build TMDB client")
}

/// Degrades a failed list request to an empty page, except for a missing
/// API key, which fails the command.
///
/// # Errors
///
/// Returns [`CatalogError::Misconfigured`] unchanged.
fn degrade_list<T>(
    result: Result<PagedResult<T>, CatalogError>,
    operation: &str,
) -> Result<PagedResult<T>> {
    match result {
        Err(err @ CatalogError::Misconfigured) => Err(err.into()),
        other => Ok(degrade_to_empty(other, operation)),
    }
}

/// Same policy as [`degrade_list`] for single-item requests.
///
/// # Errors
///
/// Returns [`CatalogError::Misconfigured`] unchanged.
fn degrade_item<T>(result: Result<T, CatalogError>, operation: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ CatalogError::Misconfigured) => Err(err.into()),
        Err(err) => {
            tracing::warn!(operation, error = %err, "Catalog request failed");
            Ok(None)
        }
    }
}

/// Logs a page of movies with its pagination footer.
fn print_movie_page(page: &PagedResult<Movie>) {
    if page.is_empty() {
        tracing::info!("No movies found.");
        return;
    }
    tracing::info!("{MOVIE_HEADER}");
    for movie in &page.results {
        tracing::info!("{}", movie_row(movie));
    }
    tracing::info!("{}", page_footer(page));
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;

    let mut params = SearchMovieParams::new(&args.query)
        .language(&catalog.language)
        .page(args.page.page);
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let page = degrade_list(catalog.client.search_movie(&params).await, "search")?;
    print_movie_page(&page);
    Ok(())
}

/// Runs the `list` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_list(args: &ListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;
    let params = ListParams::page(args.page.page).language(&catalog.language);

    let (result, operation) = match args.kind {
        MovieListKind::Popular => (catalog.client.popular(&params).await, "popular"),
        MovieListKind::TopRated => (catalog.client.top_rated(&params).await, "top_rated"),
        MovieListKind::Upcoming => (catalog.client.upcoming(&params).await, "upcoming"),
    };

    let page = degrade_list(result, operation)?;
    print_movie_page(&page);
    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_trending(args: &TrendingArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;
    let params = ListParams::page(args.page.page).language(&catalog.language);

    let page = degrade_list(
        catalog.client.trending(args.window, &params).await,
        "trending",
    )?;
    tracing::info!("Trending this {}:", args.window);
    print_movie_page(&page);
    Ok(())
}

/// Runs the `discover` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_discover(args: &DiscoverArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;
    let params = DiscoverParams::new()
        .genres(args.genres.iter().copied())
        .min_rating(args.min_rating)
        .sort(args.sort_by)
        .page(args.page.page)
        .language(&catalog.language);

    let page = degrade_list(catalog.client.discover(&params).await, "discover")?;
    tracing::info!("Sorted by {}", args.sort_by.label());
    print_movie_page(&page);
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_details(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;

    let Some(details) = degrade_item(
        catalog
            .client
            .movie_details(args.id, &catalog.language)
            .await,
        "movie_details",
    )?
    else {
        tracing::info!("Movie {} is not available.", args.id);
        return Ok(());
    };

    for line in details_lines(&details) {
        tracing::info!("{line}");
    }
    Ok(())
}

/// Runs the `trailer` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_trailer(args: &TrailerArgs, dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;

    let trailer = degrade_item(
        fetch_trailer_key(&catalog.client, args.id, &catalog.language).await,
        "trailer",
    )?
    .flatten();

    let Some(key) = trailer else {
        tracing::info!("No trailer available for movie {}.", args.id);
        return Ok(());
    };

    tracing::info!("Trailer: {}", key.watch_url());
    tracing::info!("Embed: {}", key.embed_url());
    if args.open
        && let Err(err) = open::that(key.watch_url())
    {
        tracing::warn!(error = %err, "Failed to open browser");
    }
    Ok(())
}

/// Runs the `genres` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or no API key is configured.
#[instrument(skip_all)]
async fn run_genres(dir: Option<&PathBuf>) -> Result<()> {
    let catalog = build_catalog(dir)?;

    let genres = degrade_item(catalog.client.genres(&catalog.language).await, "genres")?
        .unwrap_or_default();

    if genres.is_empty() {
        tracing::info!("No genres found.");
        return Ok(());
    }
    tracing::info!("ID\tName");
    for genre in &genres {
        tracing::info!("{}\t{}", genre.id, genre.name);
    }
    Ok(())
}

/// Opens the watchlist store in the data directory.
///
/// # Errors
///
/// Returns an error if the database path cannot be resolved.
fn open_watchlist(dir: Option<&PathBuf>) -> Result<WatchlistStore<SqliteStorage>> {
    let storage = SqliteStorage::in_dir(dir).context("failed to resolve database path")?;
    tracing::debug!(path = %storage.path().display(), "Using watchlist database");
    let store = WatchlistStore::new(storage);
    store.subscribe(|| tracing::debug!("Watchlist changed"));
    Ok(store)
}

/// Hint appended to watchlist read failures.
const MALFORMED_HINT: &str = "failed to read watchlist (run `marquee watchlist clear` to reset it)";

/// Runs the `watchlist list` subcommand.
///
/// # Errors
///
/// Returns an error if the persisted watchlist is malformed.
#[instrument(skip_all)]
fn run_watchlist_list(dir: Option<&PathBuf>) -> Result<()> {
    let store = open_watchlist(dir)?;
    let movies = store.all().context(MALFORMED_HINT)?;

    if movies.is_empty() {
        tracing::info!("Watchlist is empty.");
        return Ok(());
    }
    tracing::info!("{MOVIE_HEADER}");
    for movie in &movies {
        tracing::info!("{}", movie_row(movie));
    }
    tracing::info!("Total: {} movies", movies.len());
    Ok(())
}

/// Runs the `watchlist add` subcommand.
///
/// Movies already on the watchlist are not fetched again.
///
/// # Errors
///
/// Returns an error if no API key is configured or the watchlist is malformed.
#[instrument(skip_all)]
async fn run_watchlist_add(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_watchlist(dir)?;
    if store.contains(args.id).context(MALFORMED_HINT)? {
        tracing::info!("Movie {} is already on the watchlist.", args.id);
        return Ok(());
    }

    let catalog = build_catalog(dir)?;
    let Some(details) = degrade_item(
        catalog
            .client
            .movie_details(args.id, &catalog.language)
            .await,
        "movie_details",
    )?
    else {
        tracing::info!("Movie {} is not available, nothing added.", args.id);
        return Ok(());
    };

    let movie = Movie::from(details);
    let title = movie.title.clone();
    store.add(movie).context(MALFORMED_HINT)?;
    tracing::info!(
        "Added {} ({}). Watchlist has {} movies.",
        title,
        args.id,
        store.len().context(MALFORMED_HINT)?
    );
    Ok(())
}

/// Runs the `watchlist remove` subcommand.
///
/// # Errors
///
/// Returns an error if the watchlist is malformed.
#[instrument(skip_all)]
fn run_watchlist_remove(args: &IdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_watchlist(dir)?;
    if !store.contains(args.id).context(MALFORMED_HINT)? {
        tracing::info!("Movie {} is not on the watchlist.", args.id);
        return Ok(());
    }
    store.remove(args.id).context(MALFORMED_HINT)?;
    tracing::info!("Removed movie {}.", args.id);
    Ok(())
}

/// Runs the `watchlist clear` subcommand.
///
/// # Errors
///
/// Returns an error if the database path cannot be resolved.
#[instrument(skip_all)]
fn run_watchlist_clear(dir: Option<&PathBuf>) -> Result<()> {
    let store = open_watchlist(dir)?;
    store.clear();
    tracing::info!("Watchlist cleared.");
    Ok(())
}

/// Writes shell completions to stdout.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "marquee", &mut std::io::stdout());
}

/// Initializes the tracing subscriber.
fn init_tracing() {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        run_completions(args);
        return Ok(());
    }

    init_tracing();

    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::List(args) => run_list(&args, dir).await,
        Commands::Trending(args) => run_trending(&args, dir).await,
        Commands::Discover(args) => run_discover(&args, dir).await,
        Commands::Details(args) => run_details(&args, dir).await,
        Commands::Trailer(args) => run_trailer(&args, dir).await,
        Commands::Genres => run_genres(dir).await,
        Commands::Watchlist(cmd) => match cmd.command {
            WatchlistSubcommands::List => run_watchlist_list(dir),
            WatchlistSubcommands::Add(args) => run_watchlist_add(&args, dir).await,
            WatchlistSubcommands::Remove(args) => run_watchlist_remove(&args, dir),
            WatchlistSubcommands::Clear => run_watchlist_clear(dir),
        },
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        // Arrange & Act & Assert
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rating_bounds() {
        // Arrange & Act & Assert
        assert!(parse_rating("0").is_ok());
        assert!(parse_rating("7.5").is_ok());
        assert!(parse_rating("10").is_ok());
        assert!(parse_rating("-0.1").is_err());
        assert!(parse_rating("10.5").is_err());
        assert!(parse_rating("NaN").is_err());
        assert!(parse_rating("high").is_err());
    }

    #[test]
    fn test_degrade_list_keeps_misconfigured_fatal() {
        // Arrange
        let misconfigured: Result<PagedResult<Movie>, CatalogError> =
            Err(CatalogError::Misconfigured);
        let unavailable: Result<PagedResult<Movie>, CatalogError> =
            Err(CatalogError::Unavailable(anyhow::anyhow!("timed out")));

        // Act
        let fatal = degrade_list(misconfigured, "popular");
        let degraded = degrade_list(unavailable, "popular").unwrap();

        // Assert
        assert!(fatal.is_err());
        assert!(degraded.is_empty());
    }

    #[test]
    fn test_degrade_item_unavailable_is_none() {
        // Arrange
        let unavailable: Result<u32, CatalogError> =
            Err(CatalogError::Unavailable(anyhow::anyhow!("503")));

        // Act
        let result = degrade_item(unavailable, "genres").unwrap();

        // Assert
        assert!(result.is_none());
    }
}

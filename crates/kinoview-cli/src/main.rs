//! kinoview - movie and TV catalog in the terminal.

/// Application configuration (TOML).
mod config;
/// Log sinks.
mod logging;
/// `SQLite` persistence for the session and watchlist.
mod persistence;
/// Terminal UI components.
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use kinoview_api::identity::FirebaseAuthClient;
use kinoview_api::tmdb::{
    DiscoverParams, LocalTmdbApi, MediaId, MediaItem, MediaKind, MovieCategory, TimeWindow,
    TmdbClient, TvCategory, image_url,
};
use kinoview_core::catalog::{load_details, load_genres, load_search};
use kinoview_core::player::{PlayerSelection, SourceCatalog, imdb_page_url};
use kinoview_core::session::{AuthOutcome, SessionStatus, SessionStore};
use kinoview_core::watchlist::WatchlistStore;
use kinoview_db::{AppDirs, open_db};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::logging::LogSink;
use crate::persistence::{open_signed_in, persist_session};
use crate::tui::{Browser, run_browser};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (rev:", env!("GIT_HASH"), ")");

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version = APP_VERSION)]
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
    /// Browse the catalog in the terminal UI.
    Browse,
    /// Manage the signed-in account.
    Auth(AuthCommand),
    /// Query TMDB API.
    Tmdb(TmdbCommand),
    /// Manage the signed-in user's watchlist.
    Watchlist(WatchlistCommand),
    /// List embed player sources.
    Player(PlayerCommand),
}

/// Movie or TV series.
#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Feature film.
    Movie,
    /// TV series.
    Tv,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => Self::Movie,
            KindArg::Tv => Self::Tv,
        }
    }
}

/// Trending time window.
#[derive(Clone, Copy, ValueEnum)]
enum WindowArg {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
}

impl From<WindowArg> for TimeWindow {
    fn from(window: WindowArg) -> Self {
        match window {
            WindowArg::Day => Self::Day,
            WindowArg::Week => Self::Week,
        }
    }
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Create an account.
    Signup(SignupArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Send a password reset email.
    ResetPassword(ResetPasswordArgs),
    /// Show the signed-in user.
    Status,
}

/// Arguments for the `auth login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Account password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `auth signup` subcommand.
#[derive(clap::Args)]
struct SignupArgs {
    /// Display name (optional).
    #[arg(long, default_value = "")]
    name: String,
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Account password (at least 6 characters).
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `auth reset-password` subcommand.
#[derive(clap::Args)]
struct ResetPasswordArgs {
    /// Account email.
    #[arg(long, required = true)]
    email: String,
}

/// Arguments for the `tmdb` subcommand.
#[derive(clap::Args)]
struct TmdbCommand {
    /// TMDB subcommand to run.
    #[command(subcommand)]
    command: TmdbSubcommands,
}

/// Available TMDB subcommands.
#[derive(Subcommand)]
enum TmdbSubcommands {
    /// Trending movies and series.
    Trending(TrendingArgs),
    /// Popular movies or series.
    Popular(PopularArgs),
    /// Search movies and series.
    Search(SearchArgs),
    /// List genres.
    Genres(GenresArgs),
    /// Discover movies or series by genre.
    Discover(DiscoverArgs),
    /// Show details and external ids.
    Details(ItemArgs),
}

/// Arguments for the `tmdb trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Time window.
    #[arg(long, value_enum, default_value = "week")]
    window: WindowArg,
}

/// Arguments for the `tmdb popular` subcommand.
#[derive(clap::Args)]
struct PopularArgs {
    /// Media kind.
    #[arg(long, value_enum, default_value = "movie")]
    kind: KindArg,
    /// Result page.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `tmdb search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "Матрица").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `tmdb genres` subcommand.
#[derive(clap::Args)]
struct GenresArgs {
    /// Media kind.
    #[arg(long, value_enum, default_value = "movie")]
    kind: KindArg,
}

/// Arguments for the `tmdb discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Media kind.
    #[arg(long, value_enum, default_value = "movie")]
    kind: KindArg,
    /// TMDB genre id (see `tmdb genres`). All genres if omitted.
    #[arg(long)]
    genre: Option<u32>,
    /// Result page.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Identifies one movie or series.
#[derive(clap::Args)]
struct ItemArgs {
    /// Media kind.
    #[arg(long, value_enum, required = true)]
    kind: KindArg,
    /// TMDB id.
    #[arg(long, required = true)]
    id: MediaId,
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
    /// List saved items.
    List,
    /// Save a movie or series.
    Add(ItemArgs),
    /// Remove a saved item.
    Remove(RemoveArgs),
}

/// Arguments for the `watchlist remove` subcommand.
#[derive(clap::Args)]
struct RemoveArgs {
    /// TMDB id.
    #[arg(long, required = true)]
    id: MediaId,
}

/// Arguments for the `player` subcommand.
#[derive(clap::Args)]
struct PlayerCommand {
    /// Player subcommand to run.
    #[command(subcommand)]
    command: PlayerSubcommands,
}

/// Available player subcommands.
#[derive(Subcommand)]
enum PlayerSubcommands {
    /// List available sources for a movie or series.
    Sources(SourcesArgs),
    /// Show or set the default source catalog.
    Catalog(CatalogArgs),
}

/// Arguments for the `player catalog` subcommand.
#[derive(clap::Args)]
struct CatalogArgs {
    /// New default catalog (`multi`, `russian-voice`, `simple`). Shows the
    /// current one if omitted.
    name: Option<SourceCatalog>,
}

/// Arguments for the `player sources` subcommand.
#[derive(clap::Args)]
struct SourcesArgs {
    /// Item to play.
    #[command(flatten)]
    item: ItemArgs,
    /// Source catalog (`multi`, `russian-voice`, `simple`). Falls back to config.
    #[arg(long)]
    catalog: Option<SourceCatalog>,
    /// Open source N (1-based) in the browser.
    #[arg(long)]
    open: Option<usize>,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = AppDirs::resolve(dir)
        .context("failed to resolve config path")?
        .config_file();
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    TmdbClient::builder()
        .api_token(api_token)
        .language(config.tmdb.language.clone())
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build TMDB client")
}

/// Builds the identity provider client.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_identity_client(config: &AppConfig) -> Result<FirebaseAuthClient> {
    let api_key = config.identity_api_key().context(
        "FIREBASE_API_KEY environment variable or identity.api_key in config is required",
    )?;

    FirebaseAuthClient::builder()
        .api_key(api_key)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build identity provider client")
}

/// Formats one list row.
fn media_line(item: &MediaItem) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}{}",
        item.id,
        item.media_type,
        item.release_year()
            .map_or_else(|| String::from("----"), |y| y.to_string()),
        if item.has_rating() {
            format!("{:.1}", item.vote_average)
        } else {
            String::from("-")
        },
        item.title,
        if item.adult { " [18+]" } else { "" },
    )
}

fn log_media(items: &[MediaItem]) {
    tracing::info!("ID\tType\tYear\tRating\tTitle");
    for item in items {
        tracing::info!("{}", media_line(item));
    }
}

/// Turns an auth outcome into a command result.
fn ensure_success(outcome: AuthOutcome) -> Result<()> {
    match outcome.error() {
        Some(kind) => Err(kind.into()),
        None => Ok(()),
    }
}

/// Runs the `auth` subcommands.
///
/// Restores the stored session first and writes the resulting session back
/// afterwards, whatever the outcome.
///
/// # Errors
///
/// Returns an error if the identity provider is not configured, the database
/// fails, or the provider rejects the operation.
#[instrument(skip_all)]
async fn run_auth(cmd: &AuthSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = Arc::new(build_identity_client(&config)?);
    let conn = open_db(dir).context("failed to open database")?;
    persistence::restore_session(&conn, &client)?;
    let session = SessionStore::new(Arc::clone(&client));

    let outcome = match cmd {
        AuthSubcommands::Login(args) => session.login(&args.email, &args.password).await,
        AuthSubcommands::Signup(args) => {
            session
                .signup(&args.name, &args.email, &args.password)
                .await
        }
        AuthSubcommands::Logout => {
            session.logout().await;
            AuthOutcome::Success
        }
        AuthSubcommands::ResetPassword(args) => session.reset_password(&args.email).await,
        AuthSubcommands::Status => AuthOutcome::Success,
    };

    persist_session(&conn, &client)?;
    ensure_success(outcome)?;

    match (cmd, session.status()) {
        (AuthSubcommands::ResetPassword(args), _) => {
            tracing::info!("Password reset email sent to {}", args.email);
        }
        (_, SessionStatus::SignedIn(user)) => {
            tracing::info!("Signed in as {} <{}>", user.name, user.email);
        }
        (_, SessionStatus::SignedOut | SessionStatus::Loading) => {
            tracing::info!("Not signed in");
        }
    }

    Ok(())
}

/// Runs the `tmdb` subcommands.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb(cmd: &TmdbSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    let include_adult = config.tmdb.include_adult;

    match cmd {
        TmdbSubcommands::Trending(args) => {
            let page = client
                .trending(args.window.into())
                .await
                .context("TMDB trending request failed")?;
            log_media(&page.results);
        }
        TmdbSubcommands::Popular(args) => {
            let page = match MediaKind::from(args.kind) {
                MediaKind::Movie => client
                    .movies_by_category(MovieCategory::Popular, args.page)
                    .await
                    .context("TMDB movie/popular request failed")?,
                MediaKind::Tv => client
                    .tv_by_category(TvCategory::Popular, args.page)
                    .await
                    .context("TMDB tv/popular request failed")?,
            };
            tracing::info!("Page {} / {}", page.page, page.total_pages);
            log_media(&page.results);
        }
        TmdbSubcommands::Search(args) => {
            let results = load_search(&client, &args.query, include_adult).await?;
            log_media(&results);
            tracing::info!("Total: {} results", results.len());
        }
        TmdbSubcommands::Genres(args) => {
            let genres = load_genres(&client, args.kind.into()).await;
            tracing::info!("ID\tName");
            for genre in &genres {
                tracing::info!("{}\t{}", genre.id, genre.name);
            }
        }
        TmdbSubcommands::Discover(args) => {
            let params = DiscoverParams::default()
                .genre(args.genre)
                .page(args.page)
                .include_adult(include_adult);
            let page = client
                .discover(args.kind.into(), &params)
                .await
                .context("TMDB discover request failed")?;
            tracing::info!("Page {} / {}", page.page, page.total_pages);
            log_media(&page.results);
        }
        TmdbSubcommands::Details(args) => {
            let view = load_details(&client, args.kind.into(), args.id).await?;
            tracing::info!("ID: {}", view.item.id);
            tracing::info!("Title: {}", view.item.title);
            let year = view
                .item
                .release_year()
                .map_or_else(|| String::from("-"), |y| y.to_string());
            tracing::info!("Year: {year}");
            tracing::info!("Rating: {:.1} / 10", view.item.vote_average);
            tracing::info!("Genres: {}", view.genre_names());
            tracing::info!(
                "Length: {}",
                view.length_label().unwrap_or_else(|| String::from("-"))
            );
            tracing::info!("Status: {}", view.details.status.as_deref().unwrap_or("-"));
            tracing::info!("IMDb: {}", view.ids.imdb_id.as_deref().unwrap_or("-"));
            if let Some(poster) = image_url(view.item.poster_path.as_deref(), "w500") {
                tracing::info!("Poster: {poster}");
            }
            tracing::info!("Adult: {}", view.item.adult);
            if let Some(overview) = &view.item.overview {
                tracing::info!("---");
                tracing::info!("{overview}");
            }
        }
    }

    Ok(())
}

/// Opens the signed-in user's watchlist from the stored session.
///
/// # Errors
///
/// Returns an error if the database fails or nobody is signed in.
fn open_user_watchlist(dir: Option<&PathBuf>) -> Result<WatchlistStore> {
    let conn = open_db(dir).context("failed to open database")?;
    let Some((_, store)) = open_signed_in(conn)? else {
        bail!("{}", tui::state::SIGNED_OUT_NOTICE);
    };
    Ok(store)
}

/// Runs the `watchlist` subcommands.
///
/// # Errors
///
/// Returns an error if nobody is signed in, or the database or TMDB request
/// fails.
#[instrument(skip_all)]
async fn run_watchlist(cmd: &WatchlistSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let mut store = open_user_watchlist(dir)?;

    match cmd {
        WatchlistSubcommands::List => {
            if store.is_empty() {
                tracing::info!("{}", tui::state::EMPTY_LIST_NOTICE);
                return Ok(());
            }
            let items: Vec<MediaItem> = store.items().cloned().collect();
            log_media(&items);
            tracing::info!("Total: {} items", items.len());
        }
        WatchlistSubcommands::Add(args) => {
            let config = load_config(dir)?;
            let client = build_tmdb_client(&config)?;
            let kind = MediaKind::from(args.kind);
            let details = client
                .details(kind, args.id)
                .await
                .context("TMDB details request failed")?;
            let item = details.to_media_item(kind);
            tracing::info!("Added: {}", media_line(&item));
            store.add_to_watchlist(item);
        }
        WatchlistSubcommands::Remove(args) => {
            if store.is_in_watchlist(args.id) {
                store.remove_from_watchlist(args.id);
                tracing::info!("Removed {}", args.id);
            } else {
                tracing::info!("{} is not in the watchlist", args.id);
            }
        }
    }

    Ok(())
}

/// Runs the `player sources` subcommand.
///
/// # Errors
///
/// Returns an error if the catalog is invalid, the details request fails,
/// no source is available for `--open`, or the browser cannot be launched.
#[instrument(skip_all)]
async fn run_player_sources(args: &SourcesArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let catalog = match args.catalog {
        Some(catalog) => catalog,
        None => config.player_catalog()?,
    };
    let client = build_tmdb_client(&config)?;
    let kind = MediaKind::from(args.item.kind);

    let view = load_details(&client, kind, args.item.id).await?;
    tracing::info!("{} ({})", view.item.title, catalog);
    if let Some(imdb) = imdb_page_url(&view.ids) {
        tracing::info!("IMDb: {imdb}");
    }

    let PlayerSelection::Ready(mut selector) = catalog.select(&view.ids, kind) else {
        bail!("{}", tui::state::PLAYERS_UNAVAILABLE_NOTICE);
    };

    for (i, available) in selector.sources().iter().enumerate() {
        tracing::info!(
            "{:>2}. {} {}\t{}\t{}",
            i.saturating_add(1),
            available.source.icon,
            available.source.name,
            available.source.description,
            available.url,
        );
    }

    if let Some(n) = args.open {
        if !n.checked_sub(1).is_some_and(|index| selector.select(index)) {
            bail!("no source #{n}; {} available", selector.sources().len());
        }
        if let Some(active) = selector.active() {
            tracing::info!("Opening {} ...", active.source.name);
            open::that(&active.url)
                .with_context(|| format!("failed to open {}", active.url))?;
        }
    }

    Ok(())
}

/// Runs the `player catalog` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be read or written.
#[instrument(skip_all)]
fn run_player_catalog(args: &CatalogArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = AppDirs::resolve(dir)
        .context("failed to resolve config path")?
        .config_file();
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;

    let Some(catalog) = args.name else {
        let current = config.player_catalog()?;
        for candidate in SourceCatalog::ALL {
            let marker = if candidate == current { "*" } else { " " };
            tracing::info!("{marker} {candidate}\t{} sources", candidate.sources().len());
        }
        return Ok(());
    };

    config.player.catalog = catalog.to_string();
    config
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!(
        "Default catalog set to {catalog} in {}",
        config_path.display()
    );
    Ok(())
}

/// Runs the `browse` subcommand.
///
/// The signed-in user comes from the persisted session, the same one the
/// `watchlist` commands use. Without one the browser runs signed out and
/// "My list" shows the sign-in notice.
///
/// # Errors
///
/// Returns an error if the TMDB client, database or TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let catalog = config.player_catalog()?;
    let client = build_tmdb_client(&config)?;
    let conn = open_db(dir).context("failed to open database")?;

    let (user, watchlist) = match open_signed_in(conn)? {
        Some((user, store)) => {
            tracing::info!("Signed in as {}", user.name);
            (Some(user), store)
        }
        None => (None, WatchlistStore::new()),
    };

    run_browser(
        &client,
        Browser {
            user,
            watchlist,
            catalog,
            include_adult: config.tmdb.include_adult,
        },
    )
    .await
    .context("catalog browser TUI failed")
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    // The browser draws on stdout.
    let sink = if matches!(cli.command, Commands::Browse) {
        let dirs = AppDirs::resolve(dir).context("failed to resolve log path")?;
        LogSink::file(&dirs.log_file())?
    } else {
        LogSink::stdout()
    };

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(sink.ansi)
            .with_writer(sink.writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(sink.ansi)
            .with_writer(sink.writer);

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

    match cli.command {
        Commands::Browse => run_browse(dir).await,
        Commands::Auth(auth) => run_auth(&auth.command, dir).await,
        Commands::Tmdb(tmdb) => run_tmdb(&tmdb.command, dir).await,
        Commands::Watchlist(watchlist) => run_watchlist(&watchlist.command, dir).await,
        Commands::Player(player) => match player.command {
            PlayerSubcommands::Sources(args) => run_player_sources(&args, dir).await,
            PlayerSubcommands::Catalog(args) => run_player_catalog(&args, dir),
        },
    }
}

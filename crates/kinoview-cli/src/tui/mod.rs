//! Catalog browser TUI.
//!
//! Uses `ratatui` + `crossterm` for rendering. Loads run inline on the
//! event loop; the footer shows a loading notice while they are pending.
#![allow(clippy::future_not_send)]

/// Browser state types.
pub mod state;
mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use kinoview_api::tmdb::{LocalTmdbApi, MediaItem};
use kinoview_core::catalog::{load_browse, load_details, load_genres, load_home, load_search};
use kinoview_core::player::SourceCatalog;
use kinoview_core::session::User;
use kinoview_core::watchlist::WatchlistStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use self::state::{Action, BrowserState, GenreFilter, InputMode, PlayerOverlay, Tab, tmdb_page_url};
use self::ui::FrameContext;

/// Footer text shown while a request is pending.
const LOADING_STATUS: &str = "Загрузка...";

/// What the browser works with.
#[derive(Debug)]
pub struct Browser {
    /// Signed-in user, if any. "My list" needs one.
    pub user: Option<User>,
    /// Watchlist, persisted for signed-in users.
    pub watchlist: WatchlistStore,
    /// Player source catalog.
    pub catalog: SourceCatalog,
    /// Include adult titles in discover and search.
    pub include_adult: bool,
}

/// Runs the catalog browser until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser(api: &(impl LocalTmdbApi + Sync), browser: Browser) -> Result<()> {
    tracing::info!("Loading catalog...");
    let home = load_home(api).await;
    let mut app = App {
        api,
        state: BrowserState::new(home),
        browser,
    };
    app.reload_genres().await;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<T: LocalTmdbApi + Sync>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<'_, T>,
) -> Result<()> {
    loop {
        app.draw(terminal)?;

        if event::poll(std::time::Duration::from_millis(100)).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            let len = app.list_len();
            let action = if app.state.input_mode == InputMode::Search {
                handle_search_input(&mut app.state, key.code)
            } else if app.state.overlay.is_some() {
                handle_overlay_input(&mut app.state, key.code)
            } else {
                handle_normal_input(&mut app.state, key.code, key.modifiers, len)
            };

            match action {
                Some(Action::Quit) => return Ok(()),
                Some(action) => {
                    if needs_request(action) {
                        app.state.status = Some(String::from(LOADING_STATUS));
                        app.draw(terminal)?;
                    }
                    app.perform(action).await;
                }
                None => {}
            }
        }
    }
}

const fn needs_request(action: Action) -> bool {
    matches!(
        action,
        Action::ReloadGenres | Action::ReloadBrowse | Action::RunSearch | Action::OpenDetails
    )
}

/// Handles key input in search mode.
fn handle_search_input(state: &mut BrowserState, key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            state.input_mode = InputMode::Normal;
            return Some(Action::RunSearch);
        }
        KeyCode::Backspace => {
            state.query.pop();
        }
        KeyCode::Char(c) => {
            state.query.push(c);
        }
        _ => {}
    }
    None
}

/// Handles key input while the player overlay is open.
fn handle_overlay_input(state: &mut BrowserState, key: KeyCode) -> Option<Action> {
    let overlay = state.overlay.as_mut()?;
    match key {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.overlay = None;
            state.status = None;
        }
        KeyCode::Up | KeyCode::Char('k') => overlay.previous_source(),
        KeyCode::Down | KeyCode::Char('j') => overlay.next_source(),
        KeyCode::Enter => return Some(Action::OpenPlayer),
        KeyCode::Char('i') => return Some(Action::OpenImdbPage),
        _ => {}
    }
    None
}

/// Handles key input in normal mode. `len` is the current list length.
fn handle_normal_input(
    state: &mut BrowserState,
    key: KeyCode,
    modifiers: KeyModifiers,
    len: usize,
) -> Option<Action> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Quit);
        }
        KeyCode::Tab => state.switch_tab(state.tab.next()),
        KeyCode::BackTab => state.switch_tab(state.tab.previous()),
        KeyCode::Char('1') => state.switch_tab(Tab::Home),
        KeyCode::Char('2') => state.switch_tab(Tab::Browse),
        KeyCode::Char('3') => state.switch_tab(Tab::Search),
        KeyCode::Char('4') => state.switch_tab(Tab::MyList),
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(len),
        KeyCode::Left | KeyCode::Char('h') => match state.tab {
            Tab::Home => state.previous_row(),
            Tab::Browse => {
                state.genres.previous();
                return Some(Action::ReloadBrowse);
            }
            Tab::Search | Tab::MyList => {}
        },
        KeyCode::Right | KeyCode::Char('l') => match state.tab {
            Tab::Home => state.next_row(),
            Tab::Browse => {
                state.genres.next();
                return Some(Action::ReloadBrowse);
            }
            Tab::Search | Tab::MyList => {}
        },
        KeyCode::Char('t') if state.tab == Tab::Browse => {
            state.browse_kind = state.browse_kind.toggled();
            return Some(Action::ReloadGenres);
        }
        KeyCode::Char('/') => {
            state.switch_tab(Tab::Search);
            state.input_mode = InputMode::Search;
        }
        KeyCode::Enter if len > 0 => return Some(Action::OpenDetails),
        KeyCode::Char('w') if len > 0 => return Some(Action::ToggleWatchlist),
        KeyCode::Char('o') if len > 0 => return Some(Action::OpenTmdbPage),
        _ => {}
    }
    None
}

struct App<'a, T> {
    api: &'a T,
    state: BrowserState,
    browser: Browser,
}

impl<T: LocalTmdbApi + Sync> App<'_, T> {
    fn draw(&self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let ctx = FrameContext {
            watchlist: &self.browser.watchlist,
            user: self.browser.user.as_ref(),
            catalog: self.browser.catalog.as_str(),
        };
        terminal
            .draw(|frame| ui::draw(frame, &self.state, &ctx))
            .context("failed to draw TUI")?;
        Ok(())
    }

    const fn signed_in(&self) -> bool {
        self.browser.user.is_some()
    }

    fn list_len(&self) -> usize {
        self.state
            .items(&self.browser.watchlist, self.signed_in())
            .len()
    }

    fn selected(&self) -> Option<MediaItem> {
        self.state
            .selected(&self.browser.watchlist, self.signed_in())
    }

    async fn perform(&mut self, action: Action) {
        self.state.status = None;
        match action {
            Action::Quit => {}
            Action::ReloadGenres => self.reload_genres().await,
            Action::ReloadBrowse => self.reload_browse().await,
            Action::RunSearch => {
                let results = load_search(self.api, &self.state.query, self.browser.include_adult)
                    .await;
                self.state.search = Some(results);
                self.state.cursor = 0;
            }
            Action::ToggleWatchlist => self.toggle_watchlist(),
            Action::OpenDetails => self.open_details().await,
            Action::OpenTmdbPage => {
                if let Some(item) = self.selected() {
                    self.state.status = open_in_browser(&tmdb_page_url(&item));
                }
            }
            Action::OpenPlayer => {
                let url = self
                    .state
                    .overlay
                    .as_ref()
                    .and_then(|o| o.active_url().map(String::from));
                if let Some(url) = url {
                    self.state.status = open_in_browser(&url);
                }
            }
            Action::OpenImdbPage => {
                if let Some(url) = self.state.overlay.as_ref().and_then(PlayerOverlay::imdb_url) {
                    self.state.status = open_in_browser(&url);
                }
            }
        }
    }

    async fn reload_genres(&mut self) {
        let genres = load_genres(self.api, self.state.browse_kind).await;
        self.state.genres = GenreFilter::new(genres);
        self.reload_browse().await;
    }

    async fn reload_browse(&mut self) {
        self.state.browse = load_browse(
            self.api,
            self.state.browse_kind,
            self.state.genres.genre_id(),
            self.browser.include_adult,
        )
        .await;
        self.state.cursor = 0;
    }

    fn toggle_watchlist(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let saved = self.browser.watchlist.toggle(&item);
        tracing::debug!(id = item.id, saved, "watchlist toggled");
        self.state.status = Some(String::from(if saved {
            "Добавлено в список"
        } else {
            "Удалено из списка"
        }));
        let len = self.list_len();
        self.state.clamp_cursor(len);
    }

    async fn open_details(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        match load_details(self.api, item.media_type, item.id).await {
            Ok(view) => {
                let selection = self.browser.catalog.select(&view.ids, item.media_type);
                self.state.overlay = Some(PlayerOverlay { view, selection });
            }
            Err(err) => self.state.status = Some(err.to_string()),
        }
    }
}

/// Opens `url` in the default browser. Returns a status message on failure.
fn open_in_browser(url: &str) -> Option<String> {
    match open::that(url) {
        Ok(()) => {
            tracing::debug!(url, "opened in browser");
            None
        }
        Err(err) => {
            tracing::warn!(url, "failed to open browser: {err}");
            Some(format!("Не удалось открыть {url}"))
        }
    }
}

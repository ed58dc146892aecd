//! Catalog browser state management.

use kinoview_api::tmdb::{MediaItem, MediaKind, TmdbGenre};
use kinoview_core::catalog::{HomeFeed, MediaDetailsView, ViewError};
use kinoview_core::player::{PlayerSelection, imdb_page_url};
use kinoview_core::watchlist::WatchlistStore;

/// Shown on "My list" when nobody is signed in.
pub const SIGNED_OUT_NOTICE: &str = "Войдите, чтобы просмотреть свой список";
/// Shown on "My list" when the list is empty.
pub const EMPTY_LIST_NOTICE: &str = "Ваш список пуст";
/// Shown when a search or browse list has no results.
pub const NOTHING_FOUND_NOTICE: &str = "Ничего не найдено";
/// Shown in the player overlay when no source can be built.
pub const PLAYERS_UNAVAILABLE_NOTICE: &str = "Плееры недоступны";
/// Label of the "no genre filter" option.
pub const ALL_GENRES_LABEL: &str = "Все";

/// Top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Hero and the four home rows.
    Home,
    /// Discover by kind and genre.
    Browse,
    /// Multi-search.
    Search,
    /// The signed-in user's watchlist.
    MyList,
}

impl Tab {
    /// Tabs in display order.
    pub const ALL: [Self; 4] = [Self::Home, Self::Browse, Self::Search, Self::MyList];

    /// Returns the tab label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Главная",
            Self::Browse => "Каталог",
            Self::Search => "Поиск",
            Self::MyList => "Мой список",
        }
    }

    /// Returns the position in [`Tab::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Browse => 1,
            Self::Search => 2,
            Self::MyList => 3,
        }
    }

    /// Returns the next tab, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Home => Self::Browse,
            Self::Browse => Self::Search,
            Self::Search => Self::MyList,
            Self::MyList => Self::Home,
        }
    }

    /// Returns the previous tab, wrapping around.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Home => Self::MyList,
            Self::Browse => Self::Home,
            Self::Search => Self::Browse,
            Self::MyList => Self::Search,
        }
    }
}

/// Input mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Search query input mode.
    Search,
}

/// Work the event loop has to perform after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the browser.
    Quit,
    /// Reload the genre list, then the browse list.
    ReloadGenres,
    /// Reload the browse list.
    ReloadBrowse,
    /// Run the typed search query.
    RunSearch,
    /// Toggle watchlist membership of the selected item.
    ToggleWatchlist,
    /// Load details and open the player overlay.
    OpenDetails,
    /// Open the selected item's TMDB page.
    OpenTmdbPage,
    /// Open the active player source.
    OpenPlayer,
    /// Open the IMDb page of the overlay item.
    OpenImdbPage,
}

/// Genre filter of the browse tab. `None` selects every genre.
#[derive(Debug, Clone, Default)]
pub struct GenreFilter {
    genres: Vec<TmdbGenre>,
    selected: Option<usize>,
}

impl GenreFilter {
    /// Creates a filter with "all genres" selected.
    #[must_use]
    pub const fn new(genres: Vec<TmdbGenre>) -> Self {
        Self {
            genres,
            selected: None,
        }
    }

    /// Returns the label of the current option.
    #[must_use]
    pub fn label(&self) -> &str {
        self.current().map_or(ALL_GENRES_LABEL, |g| g.name.as_str())
    }

    /// Returns the TMDB genre id to filter by.
    #[must_use]
    pub fn genre_id(&self) -> Option<u32> {
        self.current().map(|g| g.id)
    }

    /// Selects the next option: all, first, ..., last, all.
    pub fn next(&mut self) {
        self.selected = match self.selected {
            None if self.genres.is_empty() => None,
            None => Some(0),
            Some(i) => i.checked_add(1).filter(|n| *n < self.genres.len()),
        };
    }

    /// Selects the previous option.
    pub fn previous(&mut self) {
        self.selected = match self.selected {
            None => self.genres.len().checked_sub(1),
            Some(i) => i.checked_sub(1),
        };
    }

    fn current(&self) -> Option<&TmdbGenre> {
        self.selected.and_then(|i| self.genres.get(i))
    }
}

/// Details of one item with its player sources.
#[derive(Debug, Clone)]
pub struct PlayerOverlay {
    /// Loaded details.
    pub view: MediaDetailsView,
    /// Available sources.
    pub selection: PlayerSelection,
}

impl PlayerOverlay {
    /// Moves to the next source.
    pub fn next_source(&mut self) {
        if let PlayerSelection::Ready(selector) = &mut self.selection {
            selector.next();
        }
    }

    /// Moves to the previous source.
    pub fn previous_source(&mut self) {
        if let PlayerSelection::Ready(selector) = &mut self.selection {
            selector.previous();
        }
    }

    /// Returns the URL of the active source.
    #[must_use]
    pub fn active_url(&self) -> Option<&str> {
        match &self.selection {
            PlayerSelection::Ready(selector) => selector.active().map(|s| s.url.as_str()),
            PlayerSelection::Unavailable => None,
        }
    }

    /// Returns the IMDb page of the item.
    #[must_use]
    pub fn imdb_url(&self) -> Option<String> {
        imdb_page_url(&self.view.ids)
    }
}

/// State for the catalog browser TUI.
#[derive(Debug)]
pub struct BrowserState {
    /// Active tab.
    pub tab: Tab,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Home feed.
    pub home: Result<HomeFeed, ViewError>,
    /// Selected home row.
    pub home_row: usize,
    /// Kind shown on the browse tab.
    pub browse_kind: MediaKind,
    /// Genre filter of the browse tab.
    pub genres: GenreFilter,
    /// Browse results.
    pub browse: Result<Vec<MediaItem>, ViewError>,
    /// Search query text.
    pub query: String,
    /// Search results; `None` before the first search.
    pub search: Option<Result<Vec<MediaItem>, ViewError>>,
    /// Cursor in the current list.
    pub cursor: usize,
    /// Open player overlay.
    pub overlay: Option<PlayerOverlay>,
    /// One-line status message.
    pub status: Option<String>,
}

impl BrowserState {
    /// Creates the state around a loaded home feed.
    #[must_use]
    pub fn new(home: Result<HomeFeed, ViewError>) -> Self {
        Self {
            tab: Tab::Home,
            input_mode: InputMode::Normal,
            home,
            home_row: 0,
            browse_kind: MediaKind::Movie,
            genres: GenreFilter::default(),
            browse: Ok(Vec::new()),
            query: String::new(),
            search: None,
            cursor: 0,
            overlay: None,
            status: None,
        }
    }

    /// Returns the items of the current list.
    #[must_use]
    pub fn items<'a>(&'a self, watchlist: &'a WatchlistStore, signed_in: bool) -> Vec<&'a MediaItem> {
        match self.tab {
            Tab::Home => self
                .home
                .as_ref()
                .ok()
                .and_then(|feed| feed.rows.get(self.home_row))
                .map(|row| row.items.iter().collect())
                .unwrap_or_default(),
            Tab::Browse => self
                .browse
                .as_ref()
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
            Tab::Search => match &self.search {
                Some(Ok(items)) => items.iter().collect(),
                Some(Err(_)) | None => Vec::new(),
            },
            Tab::MyList if signed_in => watchlist.items().collect(),
            Tab::MyList => Vec::new(),
        }
    }

    /// Returns the selected item.
    #[must_use]
    pub fn selected(&self, watchlist: &WatchlistStore, signed_in: bool) -> Option<MediaItem> {
        self.items(watchlist, signed_in)
            .get(self.cursor)
            .map(|item| (*item).clone())
    }

    /// Returns the notice that replaces the current list, if any.
    #[must_use]
    pub fn notice(&self, watchlist: &WatchlistStore, signed_in: bool) -> Option<&'static str> {
        match self.tab {
            Tab::Home => self.home.as_ref().err().map(|e| e.message()),
            Tab::Browse => match &self.browse {
                Err(e) => Some(e.message()),
                Ok(items) if items.is_empty() => Some(NOTHING_FOUND_NOTICE),
                Ok(_) => None,
            },
            Tab::Search => match &self.search {
                Some(Err(e)) => Some(e.message()),
                Some(Ok(items)) if items.is_empty() => Some(NOTHING_FOUND_NOTICE),
                Some(Ok(_)) | None => None,
            },
            Tab::MyList if !signed_in => Some(SIGNED_OUT_NOTICE),
            Tab::MyList if watchlist.is_empty() => Some(EMPTY_LIST_NOTICE),
            Tab::MyList => None,
        }
    }

    /// Switches to `tab` and resets the cursor.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.cursor = 0;
        self.status = None;
    }

    /// Moves the cursor up.
    pub const fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor down within a list of `len` items.
    pub fn move_down(&mut self, len: usize) {
        if let Some(next) = self.cursor.checked_add(1).filter(|n| *n < len) {
            self.cursor = next;
        }
    }

    /// Keeps the cursor inside a list of `len` items.
    pub const fn clamp_cursor(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Selects the next home row, wrapping around.
    pub fn next_row(&mut self) {
        let rows = self.home_row_count();
        if rows > 0 {
            self.home_row = self
                .home_row
                .checked_add(1)
                .filter(|n| *n < rows)
                .unwrap_or(0);
            self.cursor = 0;
        }
    }

    /// Selects the previous home row, wrapping around.
    pub fn previous_row(&mut self) {
        let rows = self.home_row_count();
        if rows > 0 {
            self.home_row = self
                .home_row
                .checked_sub(1)
                .unwrap_or_else(|| rows.saturating_sub(1));
            self.cursor = 0;
        }
    }

    fn home_row_count(&self) -> usize {
        self.home.as_ref().map_or(0, |feed| feed.rows.len())
    }
}

/// Returns the TMDB web page of `item`.
#[must_use]
pub fn tmdb_page_url(item: &MediaItem) -> String {
    format!(
        "https://www.themoviedb.org/{}/{}",
        item.media_type.as_str(),
        item.id
    )
}

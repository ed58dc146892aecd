//! TUI rendering logic for the catalog browser.

use kinoview_api::tmdb::{MediaItem, MediaKind};
use kinoview_core::player::PlayerSelection;
use kinoview_core::session::User;
use kinoview_core::watchlist::WatchlistStore;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, TableState, Tabs, Wrap,
};

use super::state::{BrowserState, InputMode, PLAYERS_UNAVAILABLE_NOTICE, PlayerOverlay, Tab};

/// Everything a frame needs besides the browser state.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// Saved items.
    pub watchlist: &'a WatchlistStore,
    /// Signed-in user.
    pub user: Option<&'a User>,
    /// Name of the player catalog in use.
    pub catalog: &'a str,
}

impl FrameContext<'_> {
    const fn signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &BrowserState, ctx: &FrameContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(5),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_tabs(frame, chunks[0], state, ctx);
    match state.tab {
        Tab::Home => draw_home(frame, chunks[1], state, ctx),
        Tab::Browse => draw_browse(frame, chunks[1], state, ctx),
        Tab::Search => draw_search(frame, chunks[1], state, ctx),
        Tab::MyList => draw_list(frame, chunks[1], state, ctx, " Мой список "),
    }
    draw_footer(frame, chunks[2], state);

    if let Some(overlay) = &state.overlay {
        draw_overlay(frame, overlay, ctx);
    }
}

/// Draws the tab bar with the signed-in user on the right.
#[allow(clippy::indexing_slicing)]
fn draw_tabs(frame: &mut Frame, area: Rect, state: &BrowserState, ctx: &FrameContext<'_>) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(state.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title(" kinoview "));
    frame.render_widget(tabs, header_chunks[0]);

    let user_text = ctx
        .user
        .map_or_else(|| String::from("Гость"), |u| u.name.clone());
    let user = Paragraph::new(user_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(user, header_chunks[1]);
}

/// Draws the hero panel and the selected home row.
#[allow(clippy::indexing_slicing)]
fn draw_home(frame: &mut Frame, area: Rect, state: &BrowserState, ctx: &FrameContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let hero = state.home.as_ref().ok().and_then(|feed| feed.hero.as_ref());
    if let Some(item) = hero {
        draw_hero(frame, chunks[0], item, ctx.watchlist.is_in_watchlist(item.id));
    }

    let row_title = state
        .home
        .as_ref()
        .ok()
        .and_then(|feed| feed.rows.get(state.home_row))
        .map_or_else(String::new, |row| format!(" \u{2190} {} \u{2192} ", row.title));
    let list_area = if hero.is_some() { chunks[1] } else { area };
    draw_list(frame, list_area, state, ctx, &row_title);
}

/// Draws the hero banner.
fn draw_hero(frame: &mut Frame, area: Rect, item: &MediaItem, saved: bool) {
    let mut meta = Vec::new();
    if let Some(rating) = rating_label(item) {
        meta.push(Span::styled(rating, Style::default().fg(Color::Yellow)));
        meta.push(Span::raw("  "));
    }
    if let Some(year) = item.release_year() {
        meta.push(Span::raw(year.to_string()));
        meta.push(Span::raw("  "));
    }
    if item.adult {
        meta.push(Span::styled("18+", Style::default().fg(Color::Red)));
        meta.push(Span::raw("  "));
    }
    meta.push(Span::raw(watchlist_label(saved)));

    let text = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
        Line::from(item.overview.clone().unwrap_or_default()),
    ];

    let hero = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(hero, area);
}

/// Draws the kind and genre selector and the browse list.
#[allow(clippy::indexing_slicing)]
fn draw_browse(frame: &mut Frame, area: Rect, state: &BrowserState, ctx: &FrameContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let filter = Line::from(vec![
        kind_span(MediaKind::Movie, state.browse_kind),
        Span::raw(" | "),
        kind_span(MediaKind::Tv, state.browse_kind),
        Span::raw("    Жанры: "),
        Span::styled(
            state.genres.label().to_owned(),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let filter = Paragraph::new(filter).block(Block::default().borders(Borders::ALL));
    frame.render_widget(filter, chunks[0]);

    draw_list(frame, chunks[1], state, ctx, " Каталог ");
}

fn kind_span(kind: MediaKind, active: MediaKind) -> Span<'static> {
    let style = if kind == active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Span::styled(kind_label(kind), style)
}

/// Draws the query input and the search results.
#[allow(clippy::indexing_slicing)]
fn draw_search(frame: &mut Frame, area: Rect, state: &BrowserState, ctx: &FrameContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input_style = if state.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(state.query.clone())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Поиск: / "));
    frame.render_widget(input, chunks[0]);

    draw_list(frame, chunks[1], state, ctx, " Результаты поиска ");
}

/// Draws the current list, or its notice.
fn draw_list(
    frame: &mut Frame,
    area: Rect,
    state: &BrowserState,
    ctx: &FrameContext<'_>,
    title: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title.to_owned());

    if let Some(notice) = state.notice(ctx.watchlist, ctx.signed_in()) {
        let paragraph = Paragraph::new(notice)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["", "Название", "Год", "Рейтинг", "Тип"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .items(ctx.watchlist, ctx.signed_in())
        .into_iter()
        .map(|item| {
            let saved = ctx.watchlist.is_in_watchlist(item.id);
            let style = if saved {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            let title = if item.adult {
                format!("{} [18+]", item.title)
            } else {
                item.title.clone()
            };

            Row::new(vec![
                String::from(if saved { "\u{2713}" } else { " " }),
                title,
                item.release_year()
                    .map_or_else(|| String::from("--"), |y| y.to_string()),
                rating_label(item).unwrap_or_else(|| String::from("--")),
                String::from(kind_label(item.media_type)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut table_state = TableState::default().with_selected(Some(state.cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Draws the details and player overlay.
#[allow(clippy::indexing_slicing)]
fn draw_overlay(frame: &mut Frame, overlay: &PlayerOverlay, ctx: &FrameContext<'_>) {
    let area = centered(frame.area(), 80, 80);
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let view = &overlay.view;
    let mut meta = Vec::new();
    if let Some(rating) = rating_label(&view.item) {
        meta.push(rating);
    }
    if let Some(year) = view.item.release_year() {
        meta.push(year.to_string());
    }
    if let Some(length) = view.length_label() {
        meta.push(length);
    }
    if view.item.adult {
        meta.push(String::from("18+"));
    }

    let mut text = vec![
        Line::from(Span::styled(
            view.item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(meta.join("  ")),
        Line::from(view.genre_names()),
    ];
    if let Some(tagline) = view.details.tagline.as_deref().filter(|t| !t.is_empty()) {
        text.push(Line::from(Span::styled(
            tagline.to_owned(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    text.push(Line::from(view.item.overview.clone().unwrap_or_default()));

    let info = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Подробнее "));
    frame.render_widget(info, chunks[0]);

    let title = format!(" Плееры ({}) ", ctx.catalog);
    match &overlay.selection {
        PlayerSelection::Unavailable => {
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(
                    PLAYERS_UNAVAILABLE_NOTICE,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(
                    "Для этого контента отсутствуют необходимые идентификаторы (IMDB или TMDB).",
                ),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(notice, chunks[1]);
        }
        PlayerSelection::Ready(selector) => {
            let items: Vec<ListItem> = selector
                .sources()
                .iter()
                .enumerate()
                .map(|(i, available)| {
                    let active = i == selector.active_index();
                    let marker = if active { "\u{25b8} " } else { "  " };
                    let style = if active {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(String::from(marker)),
                        Span::styled(
                            format!(
                                "{} {}  {}",
                                available.source.icon,
                                available.source.name,
                                available.source.description
                            ),
                            style,
                        ),
                    ]))
                })
                .collect();

            let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(list, chunks[1]);
        }
    }
}

/// Draws the footer with the status message or key hints.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let help_text = if let Some(status) = &state.status {
        status.as_str()
    } else if state.overlay.is_some() {
        "\u{2191}\u{2193}/j/k: source  Enter: open in browser  i: IMDb  Esc: close"
    } else if state.input_mode == InputMode::Search {
        "Type a query | Enter: search | Esc: cancel"
    } else {
        match state.tab {
            Tab::Home => {
                "Tab: switch tab  \u{2190}\u{2192}: row  \u{2191}\u{2193}/j/k: move  Enter: details  w: watchlist  o: TMDB  /: search  q: quit"
            }
            Tab::Browse => {
                "Tab: switch tab  t: movies/series  \u{2190}\u{2192}: genre  \u{2191}\u{2193}/j/k: move  Enter: details  w: watchlist  o: TMDB  q: quit"
            }
            Tab::Search | Tab::MyList => {
                "Tab: switch tab  \u{2191}\u{2193}/j/k: move  Enter: details  w: watchlist  o: TMDB  /: search  q: quit"
            }
        }
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Returns a rect of `percent_x` x `percent_y` centered in `area`.
#[allow(clippy::indexing_slicing)]
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let margin_y = 100_u16.saturating_sub(percent_y) / 2;
    let margin_x = 100_u16.saturating_sub(percent_x) / 2;
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(margin_y),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(margin_y),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(margin_x),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(margin_x),
        ])
        .split(vertical[1])[1]
}

/// Formats a rating as `x.x / 10`. Unrated items have none.
fn rating_label(item: &MediaItem) -> Option<String> {
    item.has_rating()
        .then(|| format!("{:.1} / 10", item.vote_average))
}

const fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "Фильмы",
        MediaKind::Tv => "Сериалы",
    }
}

const fn watchlist_label(saved: bool) -> &'static str {
    if saved {
        "\u{2713} В списке"
    } else {
        "+ Мой список"
    }
}

//! Multi-source embed player selector.
//!
//! Each catalog is a static list of URL templates keyed by external ids.
//! A selector keeps the sources that can build a URL for the given ids and
//! tracks which one is active. Switching is always a user action.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use kinoview_api::tmdb::{MediaId, MediaKind};

/// External identifiers of a movie or series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIds {
    /// IMDb id (`tt...`).
    pub imdb_id: Option<String>,
    /// TMDB id.
    pub tmdb_id: Option<MediaId>,
}

impl ExternalIds {
    /// Creates ids, treating an empty IMDb id as absent.
    #[must_use]
    pub fn new(imdb_id: Option<String>, tmdb_id: Option<MediaId>) -> Self {
        Self {
            imdb_id: imdb_id.filter(|id| !id.trim().is_empty()),
            tmdb_id,
        }
    }

    fn imdb(&self) -> Option<&str> {
        self.imdb_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// URL builder of one source. Returns `None` when the ids are insufficient.
type UrlTemplate = fn(&ExternalIds, MediaKind) -> Option<String>;

/// A third-party embed player.
#[derive(Clone, Copy)]
pub struct EmbedSource {
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Icon shown next to the name.
    pub icon: &'static str,
    template: UrlTemplate,
}

impl EmbedSource {
    /// Builds the player URL for `ids`, if possible.
    #[must_use]
    pub fn url(&self, ids: &ExternalIds, kind: MediaKind) -> Option<String> {
        (self.template)(ids, kind)
    }
}

impl fmt::Debug for EmbedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// --- Multi: IMDb first, TMDB fallback ---

const MULTI_SOURCES: &[EmbedSource] = &[
    EmbedSource {
        name: "VidSrc",
        description: "Большая база фильмов и сериалов",
        icon: "🎬",
        template: |ids, kind| match (ids.imdb(), ids.tmdb_id) {
            (Some(imdb), _) => Some(format!("https://vidsrc.xyz/embed/{kind}/{imdb}")),
            (None, Some(tmdb)) => Some(format!("https://vidsrc.xyz/embed/{kind}?tmdb={tmdb}")),
            (None, None) => None,
        },
    },
    EmbedSource {
        name: "VidSrc.to",
        description: "HD качество, быстрая загрузка",
        icon: "⚡",
        template: |ids, kind| match (ids.imdb(), ids.tmdb_id) {
            (Some(imdb), _) => Some(format!("https://vidsrc.to/embed/{kind}/{imdb}")),
            (None, Some(tmdb)) => Some(format!("https://vidsrc.to/embed/{kind}/{tmdb}")),
            (None, None) => None,
        },
    },
    EmbedSource {
        name: "2Embed",
        description: "Надёжный источник",
        icon: "🎥",
        template: |ids, _| match (ids.imdb(), ids.tmdb_id) {
            (Some(imdb), _) => Some(format!("https://www.2embed.cc/embed/{imdb}")),
            (None, Some(tmdb)) => Some(format!("https://www.2embed.cc/embedtv/{tmdb}")),
            (None, None) => None,
        },
    },
    EmbedSource {
        name: "SuperEmbed",
        description: "Множество серверов",
        icon: "🌐",
        template: |ids, kind| match (ids.imdb(), ids.tmdb_id) {
            (Some(imdb), _) => Some(format!(
                "https://multiembed.mov/?video_id={imdb}&tmdb=1&{}=1",
                kind.as_str()
            )),
            (None, Some(tmdb)) => Some(format!(
                "https://multiembed.mov/directstream.php?video_id={tmdb}&tmdb=1"
            )),
            (None, None) => None,
        },
    },
    EmbedSource {
        name: "Embedder",
        description: "Классический плеер",
        icon: "📺",
        template: |ids, _| {
            ids.imdb()
                .map(|imdb| format!("https://embedder.net/e/{imdb}"))
        },
    },
    EmbedSource {
        name: "NontonGo",
        description: "Азиатский контент, аниме",
        icon: "🎌",
        template: |ids, kind| match (ids.imdb(), ids.tmdb_id) {
            (Some(imdb), _) => Some(format!("https://www.NontonGo.win/embed/imdb/{imdb}")),
            (None, Some(tmdb)) => Some(format!(
                "https://www.NontonGo.win/embed/tmdb/{kind}/{tmdb}"
            )),
            (None, None) => None,
        },
    },
];

// --- Russian voice-over: TMDB only ---

const RUSSIAN_VOICE_SOURCES: &[EmbedSource] = &[
    EmbedSource {
        name: "VidSrc (RU)",
        description: "Русская озвучка и субтитры",
        icon: "🇷🇺",
        template: |ids, kind| {
            ids.tmdb_id.map(|tmdb| {
                format!("https://vidsrc.me/embed/{kind}?tmdb={tmdb}&ds_lang=ru")
            })
        },
    },
    EmbedSource {
        name: "VidSrc.net (RU)",
        description: "Множество озвучек",
        icon: "🎬",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://vidsrc.net/embed/{kind}/{tmdb}?lang=ru"))
        },
    },
    EmbedSource {
        name: "Embed.su (RU)",
        description: "Стабильный источник",
        icon: "📺",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://embed.su/embed/{kind}/{tmdb}?lang=ru"))
        },
    },
    EmbedSource {
        name: "2Embed (RU)",
        description: "Надежный плеер",
        icon: "🎥",
        template: |ids, kind| {
            let path = match kind {
                MediaKind::Movie => "embed",
                MediaKind::Tv => "embedtv",
            };
            ids.tmdb_id
                .map(|tmdb| format!("https://www.2embed.cc/{path}/{tmdb}?lang=ru"))
        },
    },
    EmbedSource {
        name: "VidSrc.xyz (RU)",
        description: "Быстрая загрузка",
        icon: "⚡",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://vidsrc.xyz/embed/{kind}?tmdb={tmdb}&lang=ru"))
        },
    },
    EmbedSource {
        name: "MultiEmbed (RU)",
        description: "Множество серверов с озвучкой",
        icon: "🌐",
        template: |ids, kind| {
            ids.tmdb_id.map(|tmdb| {
                format!(
                    "https://multiembed.mov/?video_id={tmdb}&tmdb=1&{}=1&lang=ru",
                    kind.as_str()
                )
            })
        },
    },
];

// --- Simple: TMDB only ---

const SIMPLE_SOURCES: &[EmbedSource] = &[
    EmbedSource {
        name: "VidSrc Primary",
        description: "Основной источник с русской озвучкой",
        icon: "🎬",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://vidsrc.me/embed/{kind}?tmdb={tmdb}"))
        },
    },
    EmbedSource {
        name: "VidSrc XYZ",
        description: "Альтернативный VidSrc",
        icon: "⚡",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://vidsrc.xyz/embed/{kind}?tmdb={tmdb}"))
        },
    },
    EmbedSource {
        name: "VidSrc.to",
        description: "Быстрый сервер",
        icon: "🚀",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://vidsrc.to/embed/{kind}/{tmdb}"))
        },
    },
    EmbedSource {
        name: "2Embed",
        description: "Надежный источник",
        icon: "📺",
        template: |ids, kind| {
            ids.tmdb_id.map(|tmdb| match kind {
                MediaKind::Movie => format!("https://www.2embed.cc/embed/{tmdb}"),
                MediaKind::Tv => format!("https://www.2embed.cc/embedtv/{tmdb}"),
            })
        },
    },
    EmbedSource {
        name: "Embed.su",
        description: "Стабильная работа",
        icon: "🎥",
        template: |ids, kind| {
            ids.tmdb_id
                .map(|tmdb| format!("https://embed.su/embed/{kind}/{tmdb}"))
        },
    },
    EmbedSource {
        name: "MultiEmbed",
        description: "Множество серверов",
        icon: "🌐",
        template: |ids, _| {
            ids.tmdb_id
                .map(|tmdb| format!("https://multiembed.mov/?video_id={tmdb}&tmdb=1"))
        },
    },
];

/// Static source catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceCatalog {
    /// International sources, IMDb id preferred.
    #[default]
    Multi,
    /// Russian voice-over sources (TMDB id).
    RussianVoice,
    /// Basic TMDB-only sources.
    Simple,
}

impl SourceCatalog {
    /// Every catalog, in display order.
    pub const ALL: [Self; 3] = [Self::Multi, Self::RussianVoice, Self::Simple];

    /// Returns every source of the catalog.
    #[must_use]
    pub const fn sources(self) -> &'static [EmbedSource] {
        match self {
            Self::Multi => MULTI_SOURCES,
            Self::RussianVoice => RUSSIAN_VOICE_SOURCES,
            Self::Simple => SIMPLE_SOURCES,
        }
    }

    /// Returns the config name (`multi`, `russian-voice`, `simple`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multi => "multi",
            Self::RussianVoice => "russian-voice",
            Self::Simple => "simple",
        }
    }

    /// Builds a selector over the sources that can serve `ids`.
    #[must_use]
    pub fn select(self, ids: &ExternalIds, kind: MediaKind) -> PlayerSelection {
        let available: Vec<AvailableSource> = self
            .sources()
            .iter()
            .filter_map(|source| {
                source.url(ids, kind).map(|url| AvailableSource {
                    source: *source,
                    url,
                })
            })
            .collect();

        if available.is_empty() {
            tracing::debug!(catalog = self.as_str(), "no player source for ids");
            return PlayerSelection::Unavailable;
        }

        PlayerSelection::Ready(PlayerSelector {
            sources: available,
            active: 0,
        })
    }
}

impl fmt::Display for SourceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceCatalog {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "multi" => Ok(Self::Multi),
            "russian-voice" => Ok(Self::RussianVoice),
            "simple" => Ok(Self::Simple),
            other => bail!("unknown player catalog: {other}"),
        }
    }
}

/// A source with the URL built for the current item.
#[derive(Debug, Clone)]
pub struct AvailableSource {
    /// The source.
    pub source: EmbedSource,
    /// Player URL.
    pub url: String,
}

/// Result of building a selector.
#[derive(Debug, Clone)]
pub enum PlayerSelection {
    /// No source can build a URL from the known ids.
    Unavailable,
    /// At least one source is available.
    Ready(PlayerSelector),
}

/// Non-empty list of available sources with one active.
#[derive(Debug, Clone)]
pub struct PlayerSelector {
    sources: Vec<AvailableSource>,
    active: usize,
}

impl PlayerSelector {
    /// Returns the available sources.
    #[must_use]
    pub fn sources(&self) -> &[AvailableSource] {
        &self.sources
    }

    /// Returns the index of the active source.
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    /// Returns the active source.
    #[must_use]
    pub fn active(&self) -> Option<&AvailableSource> {
        self.sources.get(self.active)
    }

    /// Makes `index` active. Returns `false` when out of range.
    pub const fn select(&mut self, index: usize) -> bool {
        if index < self.sources.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Activates the next source, wrapping around.
    pub fn next(&mut self) {
        self.active = self
            .active
            .checked_add(1)
            .filter(|i| *i < self.sources.len())
            .unwrap_or(0);
    }

    /// Activates the previous source, wrapping around.
    pub fn previous(&mut self) {
        self.active = self
            .active
            .checked_sub(1)
            .unwrap_or_else(|| self.sources.len().saturating_sub(1));
    }
}

/// Returns the IMDb title page for `ids`, if an IMDb id is known.
#[must_use]
pub fn imdb_page_url(ids: &ExternalIds) -> Option<String> {
    ids.imdb()
        .map(|imdb| format!("https://www.imdb.com/title/{imdb}"))
}

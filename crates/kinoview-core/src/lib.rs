//! Application core for kinoview.
//!
//! State containers (session, watchlist), the multi-source player selector
//! and the view data loaders. Views render what these modules return.

/// Catalog view data loaders.
pub mod catalog;

/// Multi-source embed player selector.
pub mod player;

/// Session store backed by an identity provider.
pub mod session;

/// Watchlist store with pluggable persistence.
pub mod watchlist;

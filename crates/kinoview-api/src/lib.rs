//! API client library for kinoview.
//!
//! Provides the TMDB metadata client and the Firebase Authentication
//! identity-provider client.

/// Identity provider client and auth-state notifications.
pub mod identity;

/// TMDB API client.
pub mod tmdb;

mod throttle;

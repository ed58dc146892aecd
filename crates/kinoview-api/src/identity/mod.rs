//! Identity provider client.
//!
//! Exposes the six operations the session store consumes behind the
//! `IdentityProvider` trait, plus the Firebase Authentication REST client.

mod api;
mod client;
mod error;
mod listeners;
mod types;

pub use api::{IdentityProvider, LocalIdentityProvider};
pub use client::{FirebaseAuthClient, FirebaseAuthClientBuilder};
pub use error::{ProviderError, code_from_rest_message, codes};
pub use listeners::{AuthStateCallback, AuthStateListeners, Subscription};
pub use types::{ProviderAccount, ProviderUser};

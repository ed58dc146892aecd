//! `IdentityProvider` trait definition.
#![allow(clippy::future_not_send)]

use super::error::ProviderError;
use super::listeners::{AuthStateCallback, Subscription};
use super::types::ProviderUser;

/// Identity provider operations consumed by the session store.
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Auth` when the provider rejects the
    /// credentials, `ProviderError::Transport` otherwise.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Creates a new account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Auth` when the provider rejects the
    /// request, `ProviderError::Transport` otherwise.
    async fn create_user_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Signs the current user out.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to end the session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Sends a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Auth` when the provider rejects the
    /// email, `ProviderError::Transport` otherwise.
    async fn send_password_reset_email(&self, email: &str) -> Result<(), ProviderError>;

    /// Sets the display name of the current user.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Auth` with `auth/no-current-user` when
    /// nobody is signed in, or any provider/transport failure.
    async fn update_display_name(&self, display_name: &str) -> Result<(), ProviderError>;

    /// Registers an auth-state callback.
    ///
    /// The callback is invoked with the current user once the state is
    /// known and after every change. Dropping the returned `Subscription`
    /// unregisters it.
    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription;
}

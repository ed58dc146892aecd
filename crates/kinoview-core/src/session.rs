//! Session store.
//!
//! Tracks the authenticated user as a projection of the identity provider's
//! auth state and mediates the login, signup, logout and password reset
//! flows. Auth operations never return `Err`: provider failures become
//! [`AuthOutcome::Failure`] with a closed [`AuthErrorKind`].
#![allow(clippy::future_not_send)]

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kinoview_api::identity::{
    LocalIdentityProvider, ProviderError, ProviderUser, Subscription, codes,
};
use tracing::instrument;

/// Fallback display name when neither a display name nor an email exists.
const DEFAULT_USER_NAME: &str = "User";

/// Signed-in user as shown by the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Email address (empty when the provider has none).
    pub email: String,
    /// Display name, email local part, or `"User"`.
    pub name: String,
}

impl User {
    /// Projects a provider user.
    #[must_use]
    pub fn from_provider(user: &ProviderUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        let name = user
            .display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                let local = email
                    .split_once('@')
                    .map_or(email.as_str(), |(local, _)| local);
                (!local.is_empty()).then_some(local)
            })
            .unwrap_or(DEFAULT_USER_NAME)
            .to_owned();

        Self { email, name }
    }
}

/// Session status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No auth-state notification received yet.
    Loading,
    /// Nobody is signed in.
    SignedOut,
    /// A user is signed in.
    SignedIn(User),
}

/// Closed set of auth failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// `auth/invalid-email`.
    InvalidEmail,
    /// `auth/user-not-found`.
    UserNotFound,
    /// `auth/wrong-password`.
    WrongPassword,
    /// `auth/email-already-in-use`.
    EmailAlreadyInUse,
    /// `auth/weak-password`.
    WeakPassword,
    /// `auth/too-many-requests`.
    TooManyRequests,
    /// Any other code, or a transport failure.
    Other,
}

impl AuthErrorKind {
    /// Classifies a provider error code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            codes::INVALID_EMAIL => Self::InvalidEmail,
            codes::USER_NOT_FOUND => Self::UserNotFound,
            codes::WRONG_PASSWORD => Self::WrongPassword,
            codes::EMAIL_ALREADY_IN_USE => Self::EmailAlreadyInUse,
            codes::WEAK_PASSWORD => Self::WeakPassword,
            codes::TOO_MANY_REQUESTS => Self::TooManyRequests,
            _ => Self::Other,
        }
    }

    /// Returns the user-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidEmail => "Неверный email",
            Self::UserNotFound => "Пользователь не найден",
            Self::WrongPassword => "Неверный пароль",
            Self::EmailAlreadyInUse => "Этот email уже зарегистрирован",
            Self::WeakPassword => "Слишком простой пароль (минимум 6 символов)",
            Self::TooManyRequests => "Слишком много попыток, попробуйте позже",
            Self::Other => "Ошибка авторизации",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthErrorKind {}

/// Result of an auth operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Failure(AuthErrorKind),
}

impl AuthOutcome {
    /// Returns `true` on success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure kind, if any.
    #[must_use]
    pub const fn error(self) -> Option<AuthErrorKind> {
        match self {
            Self::Success => None,
            Self::Failure(kind) => Some(kind),
        }
    }
}

fn lock(state: &Mutex<SessionStatus>) -> MutexGuard<'_, SessionStatus> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Converts a provider result into an outcome, logging failures.
fn outcome<T>(operation: &str, result: Result<T, ProviderError>) -> AuthOutcome {
    match result {
        Ok(_) => AuthOutcome::Success,
        Err(ProviderError::Auth { code }) => {
            tracing::warn!(operation, code = %code, "auth operation rejected");
            AuthOutcome::Failure(AuthErrorKind::from_code(&code))
        }
        Err(ProviderError::Transport(err)) => {
            tracing::error!(operation, "auth operation failed: {err:#}");
            AuthOutcome::Failure(AuthErrorKind::Other)
        }
    }
}

/// Session store.
///
/// Subscribes to the provider's auth-state notifications at construction
/// and unsubscribes when dropped.
pub struct SessionStore<P> {
    provider: Arc<P>,
    state: Arc<Mutex<SessionStatus>>,
    _subscription: Subscription,
}

impl<P: LocalIdentityProvider> SessionStore<P> {
    /// Creates the store and subscribes to auth-state changes.
    pub fn new(provider: Arc<P>) -> Self {
        let state = Arc::new(Mutex::new(SessionStatus::Loading));
        let sink = Arc::clone(&state);
        let subscription = provider.on_auth_state_changed(Box::new(move |user| {
            let next = user.map_or(SessionStatus::SignedOut, |u| {
                SessionStatus::SignedIn(User::from_provider(u))
            });
            *lock(&sink) = next;
        }));

        Self {
            provider,
            state,
            _subscription: subscription,
        }
    }

    /// Signs in with email and password.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        outcome(
            "login",
            self.provider.sign_in_with_password(email, password).await,
        )
    }

    /// Creates an account and, when `name` is not blank, sets it (trimmed) as
    /// the display name.
    #[instrument(skip_all)]
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let created = self
            .provider
            .create_user_with_password(email, password)
            .await;
        if created.is_err() || name.trim().is_empty() {
            return outcome("signup", created);
        }

        outcome(
            "signup",
            self.provider.update_display_name(name.trim()).await,
        )
    }

    /// Signs out. Provider failures are logged and the local user cleared
    /// anyway.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        if let Err(err) = self.provider.sign_out().await {
            tracing::warn!("sign-out failed, clearing local session: {err:#}");
        }
        *lock(&self.state) = SessionStatus::SignedOut;
    }

    /// Sends a password reset email.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, email: &str) -> AuthOutcome {
        outcome(
            "reset_password",
            self.provider.send_password_reset_email(email).await,
        )
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        lock(&self.state).clone()
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        match &*lock(&self.state) {
            SessionStatus::SignedIn(user) => Some(user.clone()),
            SessionStatus::Loading | SessionStatus::SignedOut => None,
        }
    }

    /// Returns `true` until the first auth-state notification.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*lock(&self.state), SessionStatus::Loading)
    }
}

impl<P> fmt::Debug for SessionStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*lock(&self.state))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use kinoview_api::identity::{AuthStateCallback, AuthStateListeners};

    use super::*;

    /// In-memory provider with scripted failures.
    #[derive(Default)]
    struct MockProvider {
        listeners: AuthStateListeners,
        current: Mutex<Option<ProviderUser>>,
        fail_with: Option<&'static str>,
        fail_transport: bool,
        fail_sign_out: bool,
        display_name_calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn failing(code: &'static str) -> Self {
            Self {
                fail_with: Some(code),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), ProviderError> {
            if let Some(code) = self.fail_with {
                return Err(ProviderError::auth(code));
            }
            if self.fail_transport {
                return Err(anyhow::anyhow!("connection refused").into());
            }
            Ok(())
        }

        fn sign_in_as(&self, email: &str) -> ProviderUser {
            let user = ProviderUser {
                uid: String::from("uid-1"),
                email: Some(String::from(email)),
                display_name: None,
            };
            *self.current.lock().unwrap() = Some(user.clone());
            self.listeners.notify(Some(user.clone()));
            user
        }
    }

    impl LocalIdentityProvider for MockProvider {
        async fn sign_in_with_password(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<ProviderUser, ProviderError> {
            self.check()?;
            Ok(self.sign_in_as(email))
        }

        async fn create_user_with_password(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<ProviderUser, ProviderError> {
            self.check()?;
            Ok(self.sign_in_as(email))
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            if self.fail_sign_out {
                return Err(anyhow::anyhow!("network down").into());
            }
            *self.current.lock().unwrap() = None;
            self.listeners.notify(None);
            Ok(())
        }

        async fn send_password_reset_email(&self, _email: &str) -> Result<(), ProviderError> {
            self.check()
        }

        async fn update_display_name(&self, display_name: &str) -> Result<(), ProviderError> {
            self.display_name_calls
                .lock()
                .unwrap()
                .push(String::from(display_name));
            let mut current = self.current.lock().unwrap();
            let user = current.as_mut().unwrap();
            user.display_name = Some(String::from(display_name));
            let user = user.clone();
            drop(current);
            self.listeners.notify(Some(user));
            Ok(())
        }

        fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription {
            self.listeners.subscribe(callback)
        }
    }

    #[test]
    fn test_user_name_fallbacks() {
        // Arrange
        let mut provider_user = ProviderUser {
            uid: String::from("u"),
            email: Some(String::from("anna@example.com")),
            display_name: Some(String::from("Анна")),
        };

        // Act & Assert
        assert_eq!(User::from_provider(&provider_user).name, "Анна");

        provider_user.display_name = Some(String::new());
        assert_eq!(User::from_provider(&provider_user).name, "anna");

        provider_user.email = None;
        provider_user.display_name = None;
        let user = User::from_provider(&provider_user);
        assert_eq!(user.name, "User");
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_error_kind_messages() {
        // Arrange
        let cases = [
            ("auth/invalid-email", "Неверный email"),
            ("auth/user-not-found", "Пользователь не найден"),
            ("auth/wrong-password", "Неверный пароль"),
            ("auth/email-already-in-use", "Этот email уже зарегистрирован"),
            (
                "auth/weak-password",
                "Слишком простой пароль (минимум 6 символов)",
            ),
            (
                "auth/too-many-requests",
                "Слишком много попыток, попробуйте позже",
            ),
            ("auth/invalid-login-credentials", "Ошибка авторизации"),
            ("", "Ошибка авторизации"),
        ];

        // Act & Assert
        for (code, message) in cases {
            assert_eq!(AuthErrorKind::from_code(code).to_string(), message, "{code}");
        }
    }

    #[test]
    fn test_status_is_loading_until_first_notification() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(Arc::clone(&provider));

        // Act & Assert
        assert!(store.is_loading());
        assert_eq!(store.status(), SessionStatus::Loading);

        provider.listeners.notify(None);
        assert!(!store.is_loading());
        assert_eq!(store.status(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_login_success_sets_user() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(provider);

        // Act
        let outcome = store.login("anna@example.com", "secret1").await;

        // Assert
        assert!(outcome.is_success());
        let user = store.user().unwrap();
        assert_eq!(user.email, "anna@example.com");
        assert_eq!(user.name, "anna");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        // Arrange
        let provider = Arc::new(MockProvider::failing(codes::WRONG_PASSWORD));
        let store = SessionStore::new(provider);

        // Act
        let outcome = store.login("anna@example.com", "wrong").await;

        // Assert
        assert_eq!(outcome, AuthOutcome::Failure(AuthErrorKind::WrongPassword));
        assert_eq!(outcome.error().unwrap().message(), "Неверный пароль");
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        // Arrange
        let provider = Arc::new(MockProvider {
            fail_transport: true,
            ..MockProvider::default()
        });
        let store = SessionStore::new(provider);

        // Act
        let outcome = store.reset_password("anna@example.com").await;

        // Assert
        assert_eq!(outcome.error(), Some(AuthErrorKind::Other));
    }

    #[tokio::test]
    async fn test_signup_with_name_sets_display_name() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(Arc::clone(&provider));

        // Act
        let outcome = store.signup("Анна", "anna@example.com", "secret1").await;

        // Assert
        assert!(outcome.is_success());
        assert_eq!(store.user().unwrap().name, "Анна");
        assert_eq!(*provider.display_name_calls.lock().unwrap(), vec!["Анна"]);
    }

    #[tokio::test]
    async fn test_signup_without_name_uses_email_local_part() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(Arc::clone(&provider));

        // Act
        let outcome = store.signup("  ", "boris@example.com", "secret1").await;

        // Assert
        assert!(outcome.is_success());
        assert_eq!(store.user().unwrap().name, "boris");
        assert!(provider.display_name_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_trims_display_name() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(Arc::clone(&provider));

        // Act
        let outcome = store.signup("  Анна ", "anna@example.com", "secret1").await;

        // Assert
        assert!(outcome.is_success());
        assert_eq!(store.user().unwrap().name, "Анна");
        assert_eq!(*provider.display_name_calls.lock().unwrap(), vec!["Анна"]);
    }

    #[tokio::test]
    async fn test_signup_email_in_use() {
        // Arrange
        let provider = Arc::new(MockProvider::failing(codes::EMAIL_ALREADY_IN_USE));
        let store = SessionStore::new(provider);

        // Act
        let outcome = store.signup("Анна", "anna@example.com", "secret1").await;

        // Assert
        assert_eq!(outcome.error(), Some(AuthErrorKind::EmailAlreadyInUse));
    }

    #[tokio::test]
    async fn test_logout_clears_user_even_when_provider_fails() {
        // Arrange
        let provider = Arc::new(MockProvider {
            fail_sign_out: true,
            ..MockProvider::default()
        });
        let store = SessionStore::new(Arc::clone(&provider));
        store.login("anna@example.com", "secret1").await;

        // Act
        store.logout().await;

        // Assert
        assert_eq!(store.status(), SessionStatus::SignedOut);
    }

    #[test]
    fn test_drop_unsubscribes() {
        // Arrange
        let provider = Arc::new(MockProvider::default());
        let store = SessionStore::new(Arc::clone(&provider));
        assert_eq!(provider.listeners.subscriber_count(), 1);

        // Act
        drop(store);

        // Assert
        assert_eq!(provider.listeners.subscriber_count(), 0);
    }
}

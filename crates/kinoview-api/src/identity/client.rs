//! `FirebaseAuthClient` - Identity Toolkit REST client.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, anyhow};
use reqwest::Client;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::instrument;
use url::Url;

use super::api::LocalIdentityProvider;
use super::error::{ProviderError, code_from_rest_message, codes};
use super::listeners::{AuthStateCallback, AuthStateListeners, Subscription};
use super::types::{
    AccountResponse, OobCodeRequest, PasswordRequest, ProviderAccount, ProviderUser,
    RestErrorResponse, UpdateProfileRequest,
};

/// Default base URL for the Identity Toolkit API v1.
const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Firebase Authentication client (email/password flows).
#[derive(Debug)]
pub struct FirebaseAuthClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Web API key.
    api_key: String,
    /// Signed-in account, if any.
    account: Mutex<Option<ProviderAccount>>,
    /// Auth-state subscribers.
    listeners: AuthStateListeners,
}

/// Builder for `FirebaseAuthClient`.
#[derive(Debug)]
pub struct FirebaseAuthClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl FirebaseAuthClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the web API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<FirebaseAuthClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .build()
            .context("failed to build HTTP client")?;

        Ok(FirebaseAuthClient {
            http_client,
            base_url,
            api_key,
            account: Mutex::new(None),
            listeners: AuthStateListeners::new(),
        })
    }
}

impl FirebaseAuthClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> FirebaseAuthClientBuilder {
        FirebaseAuthClientBuilder::new()
    }

    /// Seeds the signed-in account from persisted data and emits the first
    /// auth-state notification.
    pub fn restore(&self, account: Option<ProviderAccount>) {
        let user = account.as_ref().map(|a| a.user.clone());
        *self.lock_account() = account;
        self.listeners.notify(user);
    }

    /// Returns the signed-in account, if any.
    #[must_use]
    pub fn current_account(&self) -> Option<ProviderAccount> {
        self.lock_account().clone()
    }

    fn lock_account(&self) -> MutexGuard<'_, Option<ProviderAccount>> {
        self.account.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the account and notifies subscribers.
    fn set_account(&self, account: Option<ProviderAccount>) {
        self.restore(account);
    }

    /// POSTs a JSON body to `accounts:{method}`.
    #[instrument(skip_all, fields(method = method))]
    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = self
            .base_url
            .join(&format!("./accounts:{method}"))
            .with_context(|| format!("failed to join URL path: accounts:{method}"))?;

        tracing::debug!(method, "identity provider request");

        let response = self
            .http_client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .with_context(|| format!("request failed: accounts:{method}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: accounts:{method}"))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<RestErrorResponse>(&text) {
                let code = code_from_rest_message(&error.error.message);
                tracing::debug!(%status, code = %code, "identity provider rejected request");
                return Err(ProviderError::Auth { code });
            }
            return Err(anyhow!("identity provider error (HTTP {status}): {text}").into());
        }

        serde_json::from_str(&text)
            .with_context(|| format!("failed to decode JSON response: accounts:{method}"))
            .map_err(ProviderError::from)
    }

    /// Runs a password flow and stores the resulting account.
    async fn password_flow(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: AccountResponse = self.post(method, &request).await?;

        let user = response.to_user();
        let account = ProviderAccount {
            user: user.clone(),
            id_token: response.id_token.unwrap_or_default(),
            refresh_token: response.refresh_token.unwrap_or_default(),
        };
        self.set_account(Some(account));

        Ok(user)
    }
}

impl LocalIdentityProvider for FirebaseAuthClient {
    #[instrument(skip_all)]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        self.password_flow("signInWithPassword", email, password)
            .await
    }

    #[instrument(skip_all)]
    async fn create_user_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        self.password_flow("signUp", email, password).await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.set_account(None);
        Ok(())
    }

    #[instrument(skip_all)]
    async fn send_password_reset_email(&self, email: &str) -> Result<(), ProviderError> {
        let request = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: IgnoredAny = self.post("sendOobCode", &request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn update_display_name(&self, display_name: &str) -> Result<(), ProviderError> {
        let Some(mut account) = self.current_account() else {
            return Err(ProviderError::auth(codes::NO_CURRENT_USER));
        };

        let request = UpdateProfileRequest {
            id_token: &account.id_token,
            display_name,
            return_secure_token: true,
        };
        let response: AccountResponse = self.post("update", &request).await?;

        account.user.display_name = response.to_user().display_name;
        if let Some(id_token) = response.id_token {
            account.id_token = id_token;
        }
        if let Some(refresh_token) = response.refresh_token {
            account.refresh_token = refresh_token;
        }
        self.set_account(Some(account));

        Ok(())
    }

    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use super::*;

    fn client_for(mock_server: &wiremock::MockServer) -> FirebaseAuthClient {
        let base_url = format!("{}/v1/", mock_server.uri());
        FirebaseAuthClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    fn error_body(message: &str) -> String {
        format!(r#"{{"error":{{"code":400,"message":"{message}","errors":[]}}}}"#)
    }

    async fn mount_sign_in(mock_server: &wiremock::MockServer) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/accounts:signInWithPassword"))
            .and(wiremock::matchers::query_param("key", "test-key"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "email": "anna@example.com",
                "returnSecureToken": true,
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "localId": "uid-1",
                    "email": "anna@example.com",
                    "displayName": "Анна",
                    "idToken": "id-1",
                    "refreshToken": "refresh-1",
                    "registered": true,
                }),
            ))
            .mount(mock_server)
            .await;
    }

    #[test]
    fn test_builder_requires_api_key() {
        // Arrange & Act
        let result = FirebaseAuthClient::builder()
            .user_agent("test/0.0.0")
            .build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("api_key is required")
        );
    }

    #[tokio::test]
    async fn test_sign_in_stores_account_and_notifies() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        mount_sign_in(&mock_server).await;
        let client = client_for(&mock_server);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = Arc::clone(&seen);
        let _sub = client.on_auth_state_changed(Box::new(move |u| {
            seen_in_cb
                .lock()
                .unwrap()
                .push(u.map(|u| u.uid.clone()));
        }));

        // Act
        let user = client
            .sign_in_with_password("anna@example.com", "secret1")
            .await
            .unwrap();

        // Assert
        assert_eq!(user.uid, "uid-1");
        assert_eq!(user.display_name.as_deref(), Some("Анна"));
        let account = client.current_account().unwrap();
        assert_eq!(account.id_token, "id-1");
        assert_eq!(account.refresh_token, "refresh-1");
        assert_eq!(*seen.lock().unwrap(), vec![Some(String::from("uid-1"))]);
    }

    #[tokio::test]
    async fn test_sign_in_rest_error_maps_to_code() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/accounts:signInWithPassword"))
            .respond_with(
                wiremock::ResponseTemplate::new(400).set_body_string(error_body("INVALID_PASSWORD")),
            )
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let err = client
            .sign_in_with_password("anna@example.com", "wrong")
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.code(), Some(codes::WRONG_PASSWORD));
        assert!(client.current_account().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_weak_password() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/accounts:signUp"))
            .respond_with(wiremock::ResponseTemplate::new(400).set_body_string(error_body(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            )))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let err = client
            .create_user_with_password("anna@example.com", "123")
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.code(), Some(codes::WEAK_PASSWORD));
    }

    #[tokio::test]
    async fn test_non_json_error_is_transport() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let err = client
            .sign_in_with_password("anna@example.com", "secret1")
            .await
            .unwrap_err();

        // Assert
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[tokio::test]
    async fn test_update_display_name_sends_id_token() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        mount_sign_in(&mock_server).await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/accounts:update"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "idToken": "id-1",
                "displayName": "Аня",
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "localId": "uid-1",
                    "email": "anna@example.com",
                    "displayName": "Аня",
                }),
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);
        client
            .sign_in_with_password("anna@example.com", "secret1")
            .await
            .unwrap();

        // Act
        client.update_display_name("Аня").await.unwrap();

        // Assert
        let account = client.current_account().unwrap();
        assert_eq!(account.user.display_name.as_deref(), Some("Аня"));
        assert_eq!(account.id_token, "id-1");
    }

    #[tokio::test]
    async fn test_update_display_name_without_user() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let client = client_for(&mock_server);

        // Act
        let err = client.update_display_name("Аня").await.unwrap_err();

        // Assert
        assert_eq!(err.code(), Some(codes::NO_CURRENT_USER));
    }

    #[tokio::test]
    async fn test_password_reset_request_type() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/accounts:sendOobCode"))
            .and(wiremock::matchers::body_json(serde_json::json!({
                "requestType": "PASSWORD_RESET",
                "email": "anna@example.com",
            })))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"email": "anna@example.com"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act & Assert (mock expect(1) verifies the body)
        client
            .send_password_reset_email("anna@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_out_clears_account_and_notifies() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let client = client_for(&mock_server);
        client.restore(Some(ProviderAccount {
            user: ProviderUser {
                uid: String::from("uid-1"),
                email: None,
                display_name: None,
            },
            id_token: String::from("id-1"),
            refresh_token: String::from("refresh-1"),
        }));
        let last = Arc::new(Mutex::new(Some(Some(String::new()))));
        let last_in_cb = Arc::clone(&last);
        let _sub = client.on_auth_state_changed(Box::new(move |u| {
            *last_in_cb.lock().unwrap() = Some(u.map(|u| u.uid.clone()));
        }));

        // Act
        client.sign_out().await.unwrap();

        // Assert
        assert!(client.current_account().is_none());
        assert_eq!(*last.lock().unwrap(), Some(None));
    }
}

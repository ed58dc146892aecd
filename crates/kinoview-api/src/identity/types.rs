//! Identity provider user types and REST payloads.

use serde::{Deserialize, Serialize};

/// Authenticated provider user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Provider-assigned user id.
    pub uid: String,
    /// Email address.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
}

/// Provider user together with the tokens needed to act on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccount {
    /// The user.
    pub user: ProviderUser,
    /// Short-lived ID token.
    pub id_token: String,
    /// Refresh token.
    pub refresh_token: String,
}

// --- REST payloads ---

/// Body for `accounts:signInWithPassword` and `accounts:signUp`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Body for `accounts:update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

/// Body for `accounts:sendOobCode`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OobCodeRequest<'a> {
    pub request_type: &'a str,
    pub email: &'a str,
}

/// Response of sign-in, sign-up and profile update calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountResponse {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AccountResponse {
    /// Builds the provider user, treating an empty display name as absent.
    pub fn to_user(&self) -> ProviderUser {
        ProviderUser {
            uid: self.local_id.clone(),
            email: self.email.clone().filter(|e| !e.is_empty()),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
        }
    }
}

/// Error envelope: `{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RestErrorResponse {
    pub error: RestErrorBody,
}

/// Error body.
#[derive(Debug, Deserialize)]
pub(crate) struct RestErrorBody {
    pub message: String,
}

//! Identity provider errors and REST error-code translation.

/// Provider error codes in the `auth/...` form.
pub mod codes {
    /// Malformed email address.
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    /// No account for the email.
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    /// Password does not match.
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    /// Email already registered.
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    /// Password rejected as too weak.
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    /// Too many attempts.
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    /// An operation needed a signed-in user and there was none.
    pub const NO_CURRENT_USER: &str = "auth/no-current-user";
}

/// Identity provider failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected the request with an error code.
    #[error("identity provider rejected the request: {code}")]
    Auth {
        /// Error code, e.g. `auth/wrong-password`.
        code: String,
    },
    /// Network, decoding or any other non-provider failure.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ProviderError {
    /// Creates an `Auth` error with the given code.
    pub fn auth(code: impl Into<String>) -> Self {
        Self::Auth { code: code.into() }
    }

    /// Returns the provider error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auth { code } => Some(code),
            Self::Transport(_) => None,
        }
    }
}

/// Translates an Identity Toolkit REST error message into an `auth/...` code.
///
/// Messages may carry a detail suffix (`"WEAK_PASSWORD : Password should be
/// at least 6 characters"`); only the leading token is used.
#[must_use]
pub fn code_from_rest_message(message: &str) -> String {
    let token = message
        .split_once(':')
        .map_or(message, |(head, _)| head)
        .trim();

    let known = match token {
        "INVALID_EMAIL" => Some(codes::INVALID_EMAIL),
        "EMAIL_NOT_FOUND" => Some(codes::USER_NOT_FOUND),
        "INVALID_PASSWORD" => Some(codes::WRONG_PASSWORD),
        "EMAIL_EXISTS" => Some(codes::EMAIL_ALREADY_IN_USE),
        "WEAK_PASSWORD" => Some(codes::WEAK_PASSWORD),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => Some(codes::TOO_MANY_REQUESTS),
        _ => None,
    };

    known.map_or_else(
        || format!("auth/{}", token.to_lowercase().replace('_', "-")),
        String::from,
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_known_messages_map_to_codes() {
        // Arrange
        let cases = [
            ("INVALID_EMAIL", codes::INVALID_EMAIL),
            ("EMAIL_NOT_FOUND", codes::USER_NOT_FOUND),
            ("INVALID_PASSWORD", codes::WRONG_PASSWORD),
            ("EMAIL_EXISTS", codes::EMAIL_ALREADY_IN_USE),
            ("TOO_MANY_ATTEMPTS_TRY_LATER", codes::TOO_MANY_REQUESTS),
        ];

        // Act & Assert
        for (message, expected) in cases {
            assert_eq!(code_from_rest_message(message), expected, "{message}");
        }
    }

    #[test]
    fn test_weak_password_with_detail_suffix() {
        // Arrange
        let message = "WEAK_PASSWORD : Password should be at least 6 characters";

        // Act
        let code = code_from_rest_message(message);

        // Assert
        assert_eq!(code, codes::WEAK_PASSWORD);
    }

    #[test]
    fn test_unknown_message_is_kebab_cased() {
        // Arrange & Act & Assert
        assert_eq!(
            code_from_rest_message("USER_DISABLED"),
            "auth/user-disabled"
        );
        assert_eq!(
            code_from_rest_message("INVALID_LOGIN_CREDENTIALS"),
            "auth/invalid-login-credentials"
        );
    }

    #[test]
    fn test_code_accessor() {
        // Arrange
        let auth = ProviderError::auth(codes::WRONG_PASSWORD);
        let transport = ProviderError::from(anyhow::anyhow!("connection reset"));

        // Act & Assert
        assert_eq!(auth.code(), Some("auth/wrong-password"));
        assert!(transport.code().is_none());
        assert_eq!(transport.to_string(), "connection reset");
    }
}

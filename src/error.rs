//! Error types for AdsCampaign.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Signup error: {0}")]
    Signup(#[from] SignupError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the hosted authentication service.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The service answered and refused the request. The message is shown
    /// to the user verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a usable answer (network, TLS, timeout).
    #[error("Auth request failed: {0}")]
    Transport(String),

    #[error("Invalid response from auth service: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

impl AuthError {
    /// Message suitable for the page's error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::NotAuthenticated => self.to_string(),
            Self::Transport(_) | Self::InvalidResponse(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Banner text for failures the user cannot act on.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Signup wizard transition errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    /// A required Step 1 field is empty.
    #[error("{0}")]
    Validation(String),

    /// Account creation failed; message passed through from the auth service.
    #[error("{0}")]
    Remote(String),

    #[error("Account creation already in progress")]
    InProgress,
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_auth_error_passes_message_through() {
        let err = AuthError::Rejected {
            status: 422,
            message: "User already registered".into(),
        };
        assert_eq!(err.user_message(), "User already registered");
        assert_eq!(err.to_string(), "User already registered");
    }

    #[test]
    fn transport_errors_get_generic_message() {
        let err = AuthError::Transport("connection refused".into());
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);

        let err = AuthError::InvalidResponse("missing user".into());
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn signup_error_displays_bare_message() {
        let err = SignupError::Validation("Email and password are required".into());
        assert_eq!(err.to_string(), "Email and password are required");
    }
}

//! Authentication — account creation, sign-in and sign-out against the
//! hosted auth service.
//!
//! `AuthProvider` is the seam to the remote service (`HostedAuthClient` in
//! production, stubs in tests). `AuthContext` wraps a provider with the
//! per-client session state pages read: `is_authenticated` and `loading`.

pub mod context;
pub mod hosted;
pub mod login;

pub use context::{AuthContext, AuthState};
pub use hosted::HostedAuthClient;
pub use login::LoginForm;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AuthError;

/// A user record as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Bearer credentials for a signed-in user.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a successful sign-up or sign-in.
///
/// `tokens` is `None` when the service created the account but holds the
/// session back until the email address is confirmed.
#[derive(Debug)]
pub struct Session {
    pub user: AuthUser,
    pub tokens: Option<SessionTokens>,
}

impl Session {
    /// Whether this session carries usable credentials.
    pub fn is_active(&self) -> bool {
        self.tokens.is_some()
    }
}

/// Tokens a returning client kept from an earlier session.
#[derive(Debug, Deserialize)]
pub struct StoredTokens {
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_token: SecretString,
    #[serde(deserialize_with = "deserialize_secret")]
    pub refresh_token: SecretString,
}

/// Business details stored with the new account as user metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub business_name: String,
    pub owner_name: String,
    pub industry: String,
    pub phone: String,
    pub promo_code: String,
}

/// Remote authentication operations.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Session, AuthError>;

    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;

    /// Revoke a session.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    /// Look up the user an access token belongs to. Fails once the token
    /// has been revoked or has expired.
    async fn get_user(&self, access_token: &SecretString) -> Result<AuthUser, AuthError>;
}

/// Deserialize a plain JSON string straight into a `SecretString`.
pub(crate) fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

//! Hosted auth service client.
//!
//! Speaks the GoTrue-style REST API exposed by the backend platform:
//! `/auth/v1/signup`, `/auth/v1/token?grant_type=password`,
//! `/auth/v1/logout` and `/auth/v1/user`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{AuthProvider, AuthUser, Session, SessionTokens, SignUpMetadata};
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Auth client for the hosted backend.
pub struct HostedAuthClient {
    base_url: String,
    anon_key: SecretString,
    client: reqwest::Client,
}

impl HostedAuthClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// POST a JSON body with the project key attached.
    async fn post_json(
        &self,
        path: &str,
        bearer: &SecretString,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        debug!(path = path, "Auth request");
        let resp = self
            .client
            .post(self.endpoint(path))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        Err(AuthError::Rejected {
            status,
            message: extract_error_message(status, &text),
        })
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Session, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
            "data": metadata,
        });
        let resp = self.post_json("signup", &self.anon_key, &body).await?;
        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        parse_sign_up_response(value)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let resp = self
            .post_json("token?grant_type=password", &self.anon_key, &body)
            .await?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(token.into_session())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let Some(tokens) = &session.tokens else {
            return Ok(());
        };
        self.post_json("logout", &tokens.access_token, &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &SecretString) -> Result<AuthUser, AuthError> {
        debug!(path = "user", "Auth request");
        let resp = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status,
                message: extract_error_message(status, &text),
            });
        }
        resp.json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

/// Session payload returned by token-issuing endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        Session {
            user: self.user,
            tokens: Some(SessionTokens {
                access_token: SecretString::from(self.access_token),
                refresh_token: SecretString::from(self.refresh_token),
                expires_at,
            }),
        }
    }
}

/// Sign-up answers with a full session when email confirmation is off and
/// with the bare user object when it is on.
fn parse_sign_up_response(value: serde_json::Value) -> Result<Session, AuthError> {
    if value.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(value)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        return Ok(token.into_session());
    }

    let user_value = value.get("user").cloned().unwrap_or(value);
    let user: AuthUser = serde_json::from_value(user_value)
        .map_err(|e| AuthError::InvalidResponse(format!("missing user in sign-up response: {e}")))?;
    Ok(Session { user, tokens: None })
}

/// Pull the human-readable message out of an error body.
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!("Auth request failed with status {status}")
}

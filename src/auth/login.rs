//! Login form controller.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::AuthContext;
use super::deserialize_secret;
use crate::navigation::Page;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

/// Credentials posted from the login page.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub password: SecretString,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl LoginForm {
    /// Sign in and return the page to land on.
    ///
    /// Errors are the banner text for the form.
    pub async fn submit(&self, auth: &AuthContext) -> Result<Page, String> {
        if self.email.trim().is_empty() || self.password.expose_secret().is_empty() {
            return Err(MISSING_FIELDS_MESSAGE.to_string());
        }

        match auth.sign_in(self.email.trim(), &self.password).await {
            Ok(_) => Ok(Page::Dashboard),
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                Err(e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::context::test_support::StubAuth;
    use crate::error::{AuthError, UNEXPECTED_ERROR_MESSAGE};

    fn form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn empty_fields_rejected_without_remote_call() {
        let stub = Arc::new(StubAuth::failing_with(AuthError::Transport("unreachable".into())));
        let ctx = AuthContext::signed_out(stub);

        assert_eq!(form("", "pw").submit(&ctx).await.unwrap_err(), MISSING_FIELDS_MESSAGE);
        assert_eq!(form("joe@x.com", "").submit(&ctx).await.unwrap_err(), MISSING_FIELDS_MESSAGE);
        assert!(!ctx.is_authenticated().await);
    }

    #[tokio::test]
    async fn success_lands_on_dashboard() {
        let ctx = AuthContext::signed_out(Arc::new(StubAuth::default()));
        let page = form("joe@x.com", "secret123").submit(&ctx).await.unwrap();
        assert_eq!(page, Page::Dashboard);
        assert!(ctx.is_authenticated().await);
    }

    #[tokio::test]
    async fn rejected_credentials_pass_message_through() {
        let stub = StubAuth::default();
        *stub.password.lock().unwrap() = Some("right".into());
        let ctx = AuthContext::signed_out(Arc::new(stub));
        let err = form("joe@x.com", "wrong").submit(&ctx).await.unwrap_err();
        assert_eq!(err, "Invalid login credentials");
    }

    #[tokio::test]
    async fn transport_failure_gets_generic_message() {
        let stub = StubAuth::failing_with(AuthError::Transport("timeout".into()));
        let ctx = AuthContext::signed_out(Arc::new(stub));
        let err = form("joe@x.com", "pw").submit(&ctx).await.unwrap_err();
        assert_eq!(err, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn deserializes_from_json() {
        let form: LoginForm =
            serde_json::from_str(r#"{"email": "joe@x.com", "password": "pw"}"#).unwrap();
        assert_eq!(form.email, "joe@x.com");
        assert_eq!(form.password.expose_secret(), "pw");

        let form: LoginForm = serde_json::from_str(r#"{}"#).unwrap();
        assert!(form.email.is_empty());
    }
}

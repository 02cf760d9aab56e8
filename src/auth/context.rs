//! Per-client authentication state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{AuthProvider, AuthUser, Session, SessionTokens, SignUpMetadata, StoredTokens};
use crate::error::AuthError;

/// Snapshot of a client's auth state, as pages see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    pub is_authenticated: bool,
    /// True until the initial session check has resolved.
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
}

/// Authentication state provider handed to pages and the signup wizard.
///
/// Holds the current session (if any) and forwards sign-in, sign-up and
/// sign-out to the remote provider, updating the session on success.
pub struct AuthContext {
    provider: Arc<dyn AuthProvider>,
    session: RwLock<Option<Arc<Session>>>,
    loading: AtomicBool,
}

impl AuthContext {
    /// Context whose initial session check is still pending.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: RwLock::new(None),
            loading: AtomicBool::new(true),
        }
    }

    /// Context for a client known to have no stored session.
    pub fn signed_out(provider: Arc<dyn AuthProvider>) -> Self {
        let ctx = Self::new(provider);
        ctx.loading.store(false, Ordering::SeqCst);
        ctx
    }

    /// Resolve the initial session check with whatever session was found.
    pub async fn restore(&self, session: Option<Session>) {
        *self.session.write().await = session.filter(Session::is_active).map(Arc::new);
        self.loading.store(false, Ordering::SeqCst);
    }

    /// Resolve the initial session check from stored tokens. Tokens the
    /// service no longer accepts leave the client signed out.
    pub async fn resume(&self, tokens: StoredTokens) {
        let session = match self.provider.get_user(&tokens.access_token).await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                Some(Session {
                    user,
                    tokens: Some(SessionTokens {
                        access_token: tokens.access_token,
                        refresh_token: tokens.refresh_token,
                        expires_at: None,
                    }),
                })
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected");
                None
            }
        };
        self.restore(session).await;
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn current_session(&self) -> Option<Arc<Session>> {
        self.session.read().await.clone()
    }

    /// ID of the signed-in user.
    pub async fn user_id(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.user.id.clone())
    }

    pub async fn state(&self) -> AuthState {
        let session = self.session.read().await;
        AuthState {
            is_authenticated: session.is_some(),
            loading: self.loading(),
            user: session.as_ref().map(|s| s.user.clone()),
        }
    }

    /// Create an account. An active session returned by the service
    /// becomes the current session.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Arc<Session>, AuthError> {
        let session = Arc::new(self.provider.sign_up(email, password, metadata).await?);
        info!(
            user_id = %session.user.id,
            confirmed = session.is_active(),
            "Account created"
        );
        if session.is_active() {
            *self.session.write().await = Some(Arc::clone(&session));
        }
        Ok(session)
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Arc<Session>, AuthError> {
        let session = Arc::new(self.provider.sign_in(email, password).await?);
        if !session.is_active() {
            return Err(AuthError::InvalidResponse(
                "sign-in returned no session".into(),
            ));
        }
        info!(user_id = %session.user.id, "Signed in");
        *self.session.write().await = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drop the local session and revoke it remotely.
    ///
    /// The local session is cleared even when revocation fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };
        info!(user_id = %session.user.id, "Signing out");
        if let Err(e) = self.provider.sign_out(&session).await {
            warn!(user_id = %session.user.id, error = %e, "Remote sign-out failed");
            return Err(e);
        }
        Ok(())
    }
}

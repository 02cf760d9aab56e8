//! Client sessions — one auth context and at most one signup wizard per
//! browser session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{AuthContext, AuthProvider, StoredTokens};
use crate::signup::SignupWizard;

/// State held for one client.
pub struct ClientSession {
    pub id: Uuid,
    pub auth: Arc<AuthContext>,
    pub created_at: DateTime<Utc>,
    wizard: RwLock<Option<Arc<Mutex<SignupWizard>>>>,
}

impl ClientSession {
    fn new(auth: AuthContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            auth: Arc::new(auth),
            created_at: Utc::now(),
            wizard: RwLock::new(None),
        }
    }

    /// Open a fresh wizard, discarding any previous one.
    pub async fn start_signup(&self) -> Arc<Mutex<SignupWizard>> {
        let wizard = Arc::new(Mutex::new(SignupWizard::new(Arc::clone(&self.auth))));
        *self.wizard.write().await = Some(Arc::clone(&wizard));
        debug!(session_id = %self.id, "Signup wizard started");
        wizard
    }

    /// The open wizard, if any.
    pub async fn signup(&self) -> Option<Arc<Mutex<SignupWizard>>> {
        self.wizard.read().await.clone()
    }

    /// Discard the open wizard. Returns whether one was open.
    pub async fn end_signup(&self) -> bool {
        let had = self.wizard.write().await.take().is_some();
        if had {
            debug!(session_id = %self.id, "Signup wizard discarded");
        }
        had
    }
}

/// All live client sessions.
pub struct SessionRegistry {
    provider: Arc<dyn AuthProvider>,
    sessions: RwLock<HashMap<Uuid, Arc<ClientSession>>>,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new, signed-out session.
    pub async fn create(&self) -> Arc<ClientSession> {
        let auth = AuthContext::signed_out(Arc::clone(&self.provider));
        self.register(auth).await
    }

    /// Register a session for a returning client. The session starts out
    /// loading and resolves in the background once the stored tokens have
    /// been checked with the auth service.
    pub async fn resume(&self, tokens: StoredTokens) -> Arc<ClientSession> {
        let session = self
            .register(AuthContext::new(Arc::clone(&self.provider)))
            .await;
        let auth = Arc::clone(&session.auth);
        tokio::spawn(async move { auth.resume(tokens).await });
        session
    }

    async fn register(&self, auth: AuthContext) -> Arc<ClientSession> {
        let session = Arc::new(ClientSession::new(auth));
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::clone(&session));
        info!(session_id = %session.id, "Client session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ClientSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

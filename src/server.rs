//! HTTP surface: shared state, session-level routes, and router composition.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::error;
use uuid::Uuid;

use crate::auth::login::MISSING_FIELDS_MESSAGE;
use crate::auth::{AuthProvider, LoginForm, StoredTokens};
use crate::dashboard::DashboardService;
use crate::error::AuthError;
use crate::navigation::{Page, PageAccess, guard};
use crate::profile::{
    PROFILE_SAVE_FAILED_MESSAGE, PROFILE_SAVED_MESSAGE, ProfileForm, ProfileService,
};
use crate::session::{ClientSession, SessionRegistry};
use crate::signup::{SignupRouteState, signup_routes};
use crate::store::Database;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub profiles: Arc<ProfileService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(provider: Arc<dyn AuthProvider>, db: Arc<dyn Database>) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(provider)),
            profiles: Arc::new(ProfileService::new(Arc::clone(&db))),
            dashboard: Arc::new(DashboardService::new(db)),
        }
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let signup_state = SignupRouteState {
        sessions: Arc::clone(&state.sessions),
        profiles: Arc::clone(&state.profiles),
    };

    Router::new()
        .route("/health", get(health))
        .merge(session_routes(state))
        .merge(signup_routes(signup_state))
        .layer(CorsLayer::permissive())
}

fn session_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", delete(delete_session))
        .route("/api/sessions/{id}/auth", get(get_auth))
        .route("/api/sessions/{id}/login", post(login))
        .route("/api/sessions/{id}/logout", post(logout))
        .route("/api/sessions/{id}/pages/{page}", get(open_page))
        .route("/api/sessions/{id}/profile", get(get_profile).put(save_profile))
        .route("/api/sessions/{id}/dashboard", get(get_dashboard))
        .with_state(state)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<ClientSession>, Response> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Session not found"))
}

/// Signed-in user's (id, email) for a protected page, or the rejection.
async fn require_user(session: &ClientSession, page: Page) -> Result<(String, String), Response> {
    let auth = session.auth.state().await;
    let access = guard(page, &auth);
    match (access, auth.user) {
        (PageAccess::Render, Some(user)) => Ok((user.id, user.email.unwrap_or_default())),
        (access, _) => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": AuthError::NotAuthenticated.to_string(),
                "access": access,
            })),
        )
            .into_response()),
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "adscampaign"
    }))
}

// ── Sessions & auth ─────────────────────────────────────────────────────

/// POST /api/sessions
///
/// An empty body opens a signed-out session. A body of
/// `{"access_token": .., "refresh_token": ..}` resumes an earlier one; its
/// auth state reports `loading` until the tokens have been checked.
async fn create_session(State(state): State<AppState>, body: Bytes) -> Response {
    let session = if body.is_empty() {
        state.sessions.create().await
    } else {
        match serde_json::from_slice::<StoredTokens>(&body) {
            Ok(tokens) => state.sessions.resume(tokens).await,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        }
    };
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_id": session.id,
            "auth": session.auth.state().await,
        })),
    )
        .into_response()
}

/// DELETE /api/sessions/{id}
async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Session not found")
    }
}

/// GET /api/sessions/{id}/auth
async fn get_auth(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match find_session(&state, id).await {
        Ok(session) => Json(session.auth.state().await).into_response(),
        Err(resp) => resp,
    }
}

/// POST /api/sessions/{id}/login
async fn login(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<LoginForm>,
) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match form.submit(&session.auth).await {
        Ok(page) => Json(serde_json::json!({
            "redirect": page.path(),
            "auth": session.auth.state().await,
        }))
        .into_response(),
        Err(message) if message == MISSING_FIELDS_MESSAGE => {
            error_response(StatusCode::BAD_REQUEST, &message)
        }
        Err(message) => error_response(StatusCode::UNAUTHORIZED, &message),
    }
}

/// POST /api/sessions/{id}/logout
///
/// The local session is cleared even when remote revocation fails.
async fn logout(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    // Failure is already logged by the auth context
    let _ = session.auth.sign_out().await;
    session.end_signup().await;

    Json(serde_json::json!({
        "redirect": Page::Home.path(),
        "auth": session.auth.state().await,
    }))
    .into_response()
}

/// GET /api/sessions/{id}/pages/{page}
async fn open_page(
    State(state): State<AppState>,
    Path((id, page)): Path<(Uuid, String)>,
) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let page: Page = match page.parse() {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::NOT_FOUND, &e),
    };
    Json(guard(page, &session.auth.state().await)).into_response()
}

// ── Profile ─────────────────────────────────────────────────────────────

/// GET /api/sessions/{id}/profile
async fn get_profile(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (user_id, email) = match require_user(&session, Page::Profile).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match state.profiles.load_form(&user_id, &email).await {
        Ok(form) => Json(form).into_response(),
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to load profile");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile")
        }
    }
}

/// PUT /api/sessions/{id}/profile
async fn save_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ProfileForm>,
) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (user_id, email) = match require_user(&session, Page::Profile).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match state.profiles.save_form(&user_id, &form).await {
        Ok(saved) => Json(serde_json::json!({
            "message": PROFILE_SAVED_MESSAGE,
            "profile": ProfileForm::from_profile(&saved, &email),
        }))
        .into_response(),
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to save profile");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, PROFILE_SAVE_FAILED_MESSAGE)
        }
    }
}

// ── Dashboard ───────────────────────────────────────────────────────────

/// GET /api/sessions/{id}/dashboard
async fn get_dashboard(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let session = match find_session(&state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (user_id, _) = match require_user(&session, Page::Dashboard).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match state.dashboard.summary(&user_id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to load dashboard");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load dashboard")
        }
    }
}

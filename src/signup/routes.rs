//! REST endpoints for the signup wizard.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::model::{BusinessGoal, FieldUpdate, TargetAudience, catalog};
use super::wizard::SignupWizard;
use crate::error::SignupError;
use crate::navigation::{Page, PageAccess, guard};
use crate::profile::ProfileService;
use crate::session::{ClientSession, SessionRegistry};

/// Shared state for signup routes.
#[derive(Clone)]
pub struct SignupRouteState {
    pub sessions: Arc<SessionRegistry>,
    pub profiles: Arc<ProfileService>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

impl SignupRouteState {
    async fn session(&self, id: Uuid) -> Result<Arc<ClientSession>, Response> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Session not found"))
    }

    async fn wizard(&self, id: Uuid) -> Result<Arc<Mutex<SignupWizard>>, Response> {
        self.session(id)
            .await?
            .signup()
            .await
            .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "No signup in progress"))
    }
}

/// POST /api/sessions/{id}/signup
///
/// Open a fresh wizard. Signed-in clients are sent to the dashboard instead.
async fn start_signup(
    State(state): State<SignupRouteState>,
    Path(id): Path<Uuid>,
) -> Response {
    let session = match state.session(id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let access = guard(Page::Signup, &session.auth.state().await);
    if let PageAccess::Redirect { .. } = access {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "Already signed in", "access": access})),
        )
            .into_response();
    }

    let wizard = session.start_signup().await;
    let view = wizard.lock().await.view();
    (StatusCode::CREATED, Json(view)).into_response()
}

/// GET /api/sessions/{id}/signup
async fn get_signup(State(state): State<SignupRouteState>, Path(id): Path<Uuid>) -> Response {
    match state.wizard(id).await {
        Ok(wizard) => Json(wizard.lock().await.view()).into_response(),
        Err(resp) => resp,
    }
}

/// DELETE /api/sessions/{id}/signup
async fn cancel_signup(State(state): State<SignupRouteState>, Path(id): Path<Uuid>) -> Response {
    match state.session(id).await {
        Ok(session) if session.end_signup().await => StatusCode::NO_CONTENT.into_response(),
        Ok(_) => error_response(StatusCode::NOT_FOUND, "No signup in progress"),
        Err(resp) => resp,
    }
}

/// PATCH /api/sessions/{id}/signup/fields
///
/// Body: `{"field": "business_name", "value": "Joe's Pizza"}`.
async fn update_field(
    State(state): State<SignupRouteState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Response {
    let wizard = match state.wizard(id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let mut wizard = wizard.lock().await;
    let applied = wizard.update_field(update);
    Json(serde_json::json!({"applied": applied, "wizard": wizard.view()})).into_response()
}

#[derive(Deserialize)]
struct GoalToggle {
    goal: BusinessGoal,
}

#[derive(Deserialize)]
struct AudienceToggle {
    audience: TargetAudience,
}

/// POST /api/sessions/{id}/signup/goals
async fn toggle_goal(
    State(state): State<SignupRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GoalToggle>,
) -> Response {
    let wizard = match state.wizard(id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let mut wizard = wizard.lock().await;
    let selected = wizard.toggle_business_goal(body.goal);
    Json(serde_json::json!({"selected": selected, "wizard": wizard.view()})).into_response()
}

/// POST /api/sessions/{id}/signup/audiences
async fn toggle_audience(
    State(state): State<SignupRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AudienceToggle>,
) -> Response {
    let wizard = match state.wizard(id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let mut wizard = wizard.lock().await;
    let selected = wizard.toggle_target_audience(body.audience);
    Json(serde_json::json!({"selected": selected, "wizard": wizard.view()})).into_response()
}

/// POST /api/sessions/{id}/signup/advance
///
/// Validation and account-creation failures answer 422 with the banner text
/// and the wizard (still on its step). A second advance while account
/// creation is in flight answers 409.
async fn advance(State(state): State<SignupRouteState>, Path(id): Path<Uuid>) -> Response {
    let wizard = match state.wizard(id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };

    match SignupWizard::advance_shared(&wizard).await {
        Ok(advanced) => {
            if let Some(created) = advanced.created {
                if let Err(e) = state
                    .profiles
                    .seed_from_signup(&created.user_id, &created.metadata)
                    .await
                {
                    warn!(user_id = %created.user_id, error = %e, "Failed to seed profile");
                }
            }
            Json(wizard.lock().await.view()).into_response()
        }
        Err(e @ SignupError::InProgress) => error_response(StatusCode::CONFLICT, &e.to_string()),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": e.to_string(),
                "wizard": wizard.lock().await.view(),
            })),
        )
            .into_response(),
    }
}

/// POST /api/sessions/{id}/signup/retreat
async fn retreat(State(state): State<SignupRouteState>, Path(id): Path<Uuid>) -> Response {
    let wizard = match state.wizard(id).await {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let mut wizard = wizard.lock().await;
    wizard.retreat();
    Json(wizard.view()).into_response()
}

/// GET /api/signup/catalog
async fn get_catalog() -> impl IntoResponse {
    Json(catalog())
}

/// Build the signup REST routes.
pub fn signup_routes(state: SignupRouteState) -> Router {
    Router::new()
        .route("/api/signup/catalog", get(get_catalog))
        .route(
            "/api/sessions/{id}/signup",
            post(start_signup).get(get_signup).delete(cancel_signup),
        )
        .route("/api/sessions/{id}/signup/fields", patch(update_field))
        .route("/api/sessions/{id}/signup/goals", post(toggle_goal))
        .route("/api/sessions/{id}/signup/audiences", post(toggle_audience))
        .route("/api/sessions/{id}/signup/advance", post(advance))
        .route("/api/sessions/{id}/signup/retreat", post(retreat))
        .with_state(state)
}

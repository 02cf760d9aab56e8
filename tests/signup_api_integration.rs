//! Integration tests for the signup, auth, profile and dashboard REST API.
//!
//! Each test spins up the full router on a random port with an in-memory
//! database and a stub auth provider, then drives it over HTTP with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use adscampaign::auth::{AuthProvider, AuthUser, Session, SessionTokens, SignUpMetadata};
use adscampaign::error::AuthError;
use adscampaign::server::{AppState, build_router};
use adscampaign::store::LibSqlBackend;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub auth service: rejects one known email, accepts password "secret123".
#[derive(Default)]
struct StubAuth {
    sign_up_calls: AtomicUsize,
}

fn session_for(email: &str) -> Session {
    Session {
        user: AuthUser {
            id: format!("user-{email}"),
            email: Some(email.to_string()),
            user_metadata: json!({}),
        },
        tokens: Some(SessionTokens {
            access_token: SecretString::from("access"),
            refresh_token: SecretString::from("refresh"),
            expires_at: None,
        }),
    }
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn sign_up(
        &self,
        email: &str,
        _password: &SecretString,
        _metadata: &SignUpMetadata,
    ) -> Result<Session, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        if email == "taken@x.com" {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".into(),
            });
        }
        Ok(session_for(email))
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        if password.expose_secret() != "secret123" {
            return Err(AuthError::Rejected {
                status: 400,
                message: "Invalid login credentials".into(),
            });
        }
        Ok(session_for(email))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }

    async fn get_user(&self, _access_token: &SecretString) -> Result<AuthUser, AuthError> {
        Err(AuthError::NotAuthenticated)
    }
}

/// Start the API on a random port, return (base url, stub).
async fn start_server() -> (String, Arc<StubAuth>) {
    let auth = Arc::new(StubAuth::default());
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let app = build_router(AppState::new(auth.clone(), db));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), auth)
}

/// Thin helper around one client session.
struct Client {
    http: reqwest::Client,
    base: String,
    session: String,
}

impl Client {
    async fn new(base: &str) -> Self {
        let http = reqwest::Client::new();
        let resp = http.post(format!("{base}/api/sessions")).send().await.unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        Self {
            http,
            base: base.to_string(),
            session: body["session_id"].as_str().unwrap().to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/sessions/{}{path}", self.base, self.session)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.http.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.http.put(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn set(&self, field: &str, value: Value) -> Value {
        let resp = self
            .http
            .patch(self.url("/signup/fields"))
            .json(&json!({"field": field, "value": value}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn fill_account(&self, email: &str) {
        self.set("business_name", json!("Joe's Pizza")).await;
        self.set("owner_name", json!("Joe")).await;
        self.set("email", json!(email)).await;
        self.set("password", json!("secret123")).await;
        self.set("industry", json!("restaurant")).await;
    }
}

// ── Signup wizard ────────────────────────────────────────────────────

#[tokio::test]
async fn full_signup_walk() {
    timeout(TEST_TIMEOUT, async {
        let (base, stub) = start_server().await;
        let client = Client::new(&base).await;

        let (status, view) = client.post("/signup", json!({})).await;
        assert_eq!(status, 201);
        assert_eq!(view["step"], "account");
        assert_eq!(view["indicator"][0]["reached"], true);
        assert_eq!(view["indicator"][1]["reached"], false);

        client.fill_account("joe@x.com").await;
        let (status, view) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(view["step_number"], 2);
        assert_eq!(view["plan"]["name"], "Platform Access");
        assert!(view["error"].is_null());
        assert_eq!(stub.sign_up_calls.load(Ordering::SeqCst), 1);

        let (_, view) = client.post("/signup/advance", json!({})).await;
        assert_eq!(view["step"], "profile");

        let (_, toggled) = client
            .post("/signup/goals", json!({"goal": "Increase phone calls"}))
            .await;
        assert_eq!(toggled["selected"], true);
        let updated = client.set("target_age", json!([60, 30])).await;
        assert_eq!(updated["wizard"]["profile"]["target_age"], json!([30, 60]));

        let (_, view) = client.post("/signup/advance", json!({})).await;
        assert_eq!(view["step"], "welcome");
        assert_eq!(view["can_advance"], false);

        let (_, view) = client.post("/signup/retreat", json!({})).await;
        assert_eq!(view["step_number"], 3);
        assert_eq!(
            view["profile"]["business_goals"],
            json!(["Increase phone calls"])
        );

        // Account creation signed the client in and seeded the profile
        let (_, auth) = client.get("/auth").await;
        assert_eq!(auth["is_authenticated"], true);
        let (status, profile) = client.get("/profile").await;
        assert_eq!(status, 200);
        assert_eq!(profile["business_name"], "Joe's Pizza");
        assert_eq!(profile["industry"], "restaurant");
        assert_eq!(profile["email"], "joe@x.com");

        // A signed-in client cannot restart signup
        let (status, body) = client.post("/signup", json!({})).await;
        assert_eq!(status, 409);
        assert_eq!(body["access"]["path"], "/dashboard");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_fields_keep_step_one() {
    timeout(TEST_TIMEOUT, async {
        let (base, stub) = start_server().await;
        let client = Client::new(&base).await;
        client.post("/signup", json!({})).await;
        client.set("business_name", json!("Joe's Pizza")).await;

        let (status, body) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "Email and password are required");
        assert_eq!(body["wizard"]["step"], "account");
        assert_eq!(body["wizard"]["error"], "Email and password are required");

        client.set("email", json!("joe@x.com")).await;
        client.set("password", json!("secret123")).await;
        let (status, body) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "Business name and owner name are required");
        assert_eq!(stub.sign_up_calls.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rejected_account_creation_can_be_retried() {
    timeout(TEST_TIMEOUT, async {
        let (base, stub) = start_server().await;
        let client = Client::new(&base).await;
        client.post("/signup", json!({})).await;
        client.fill_account("taken@x.com").await;

        let (status, body) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "User already registered");
        assert_eq!(body["wizard"]["step_number"], 1);
        assert_eq!(body["wizard"]["submitting"], false);

        client.set("email", json!("joe@x.com")).await;
        let (status, view) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(view["step_number"], 2);
        assert!(view["error"].is_null());
        assert_eq!(stub.sign_up_calls.load(Ordering::SeqCst), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn retreat_and_readvance_skips_account_creation() {
    timeout(TEST_TIMEOUT, async {
        let (base, stub) = start_server().await;
        let client = Client::new(&base).await;
        client.post("/signup", json!({})).await;
        client.fill_account("joe@x.com").await;
        client.post("/signup/advance", json!({})).await;

        let (_, view) = client.post("/signup/retreat", json!({})).await;
        assert_eq!(view["step"], "account");
        assert_eq!(view["account_created"], true);

        let ignored = client.set("email", json!("other@x.com")).await;
        assert_eq!(ignored["applied"], false);

        let (_, view) = client.post("/signup/advance", json!({})).await;
        assert_eq!(view["step"], "subscription");
        assert_eq!(stub.sign_up_calls.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn signup_endpoints_need_open_wizard() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = Client::new(&base).await;

        let (status, body) = client.post("/signup/advance", json!({})).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "No signup in progress");

        client.post("/signup", json!({})).await;
        let resp = client
            .http
            .delete(client.url("/signup"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
        let (status, _) = client.get("/signup").await;
        assert_eq!(status, 404);
    })
    .await
    .expect("test timed out");
}

// ── Login, guard, logout ─────────────────────────────────────────────

#[tokio::test]
async fn login_guard_logout_cycle() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = Client::new(&base).await;

        let (_, access) = client.get("/pages/profile").await;
        assert_eq!(access["action"], "redirect");
        assert_eq!(access["to"], "login");

        let (status, body) = client
            .post("/login", json!({"email": "joe@x.com", "password": "wrong"}))
            .await;
        assert_eq!(status, 401);
        assert_eq!(body["error"], "Invalid login credentials");

        let (status, body) = client
            .post("/login", json!({"email": "joe@x.com", "password": "secret123"}))
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["redirect"], "/dashboard");
        assert_eq!(body["auth"]["is_authenticated"], true);

        let (_, access) = client.get("/pages/login").await;
        assert_eq!(access["path"], "/dashboard");
        let (_, access) = client.get("/pages/dashboard").await;
        assert_eq!(access["action"], "render");

        let (status, dashboard) = client.get("/dashboard").await;
        assert_eq!(status, 200);
        assert_eq!(dashboard["next_steps"].as_array().unwrap().len(), 3);

        let (_, body) = client.post("/logout", json!({})).await;
        assert_eq!(body["redirect"], "/");
        assert_eq!(body["auth"]["is_authenticated"], false);

        let (status, _) = client.get("/dashboard").await;
        assert_eq!(status, 401);
    })
    .await
    .expect("test timed out");
}

// ── Profile ──────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_edit_splits_goals() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = Client::new(&base).await;
        client
            .post("/login", json!({"email": "ann@x.com", "password": "secret123"}))
            .await;

        let (status, form) = client.get("/profile").await;
        assert_eq!(status, 200);
        assert_eq!(form["email"], "ann@x.com");
        assert_eq!(form["business_name"], "");

        let (status, body) = client
            .put(
                "/profile",
                json!({
                    "owner_name": "Ann",
                    "business_name": "Ann's Law",
                    "industry": "Legal Services",
                    "business_goals": "Get more appointments, , Build brand awareness ",
                }),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Profile updated successfully!");
        assert_eq!(
            body["profile"]["business_goals"],
            "Get more appointments, Build brand awareness"
        );

        let (_, form) = client.get("/profile").await;
        assert_eq!(form["owner_name"], "Ann");
    })
    .await
    .expect("test timed out");
}

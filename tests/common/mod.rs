#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use ers_session::Session;
use ers_session::api::ApiClient;
use ers_session::auth::{
    AuthorizationGate, Credential, PermissionSets, Role, SessionController, TokenStore,
    UserRecord,
};
use ers_session::clock::{Clock, SystemClock};
use ers_session::jwt::SessionValidator;
use ers_session::storage::{FileStorage, Storage, VersionedStore};
use jsonwebtoken::{EncodingKey, Header};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Mint an HS256 token with the given claims.
pub fn mint(claims: Value) -> Credential {
    let key = EncodingKey::from_secret(b"mock-backend-secret");
    Credential::new(jsonwebtoken::encode(&Header::default(), &claims, &key).unwrap())
}

/// Token for `email` expiring `ttl_secs` from now (negative for the past).
pub fn token_for(email: &str, ttl_secs: i64) -> Credential {
    let exp = now_secs() as i64 + ttl_secs;
    mint(json!({"sub": email, "iat": now_secs(), "exp": exp}))
}

pub fn user(id: i64, email: &str, role: Role) -> UserRecord {
    UserRecord {
        id,
        email: email.to_string(),
        role,
        permissions: BTreeSet::from(["LOGOUT".to_string()]),
    }
}

/// Directory under the system temp dir, removed on drop.
pub struct TempDir {
    pub path: PathBuf,
}

impl TempDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("ers-test-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    /// Number of regular files currently in the directory.
    pub fn file_count(&self) -> usize {
        match std::fs::read_dir(&self.path) {
            Ok(entries) => entries.filter_map(Result::ok).count(),
            Err(_) => 0,
        }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail_logout: Arc<AtomicBool>,
}

/// In-process stand-in for the reimbursement backend.
pub struct MockBackend {
    pub base_url: Url,
    state: MockState,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = MockState::default();

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/logout", post(logout))
            .route("/users", get(list_users))
            .route("/users/upgrade", post(upgrade))
            .route("/users/{id}", axum::routing::delete(delete_user))
            .route("/reimbursements", get(list_all).post(create_reimbursement))
            .route("/reimbursements/self", get(list_mine))
            .route("/reimbursements/{id}", get(get_reimbursement).put(update_reimbursement))
            .route("/reimbursements/{id}/resolve", put(resolve_reimbursement))
            .with_state(state.clone());

        let app = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(state.clone(), record_call));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{}/api", addr)).unwrap(),
            state,
        }
    }

    /// Make the logout endpoint answer 500.
    pub fn fail_logout(&self) {
        self.state.fail_logout.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == format!("/api/{}", path))
            .collect()
    }

    pub fn api_client(&self) -> ApiClient {
        api_client(self.base_url.clone())
    }
}

/// Client that never goes through a proxy.
pub fn api_client(base: Url) -> ApiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ApiClient::with_client(base, http)
}

/// A session over `dir` talking to `base`.
pub fn session_in(dir: &TempDir, base: Url) -> Session {
    session_with(
        Arc::new(FileStorage::new(dir.path.clone())),
        Arc::new(SystemClock),
        base,
    )
}

pub fn session_with(backend: Arc<dyn Storage>, clock: Arc<dyn Clock>, base: Url) -> Session {
    let store = TokenStore::new(VersionedStore::new(backend, clock.clone()));
    let controller =
        SessionController::new(store, SessionValidator::new(clock), api_client(base));
    let gate = AuthorizationGate::new(controller.view());
    Session {
        controller,
        gate,
        permissions: PermissionSets::default(),
    }
}

/// Token store over the same directory a session uses.
pub fn token_store_in(dir: &TempDir) -> TokenStore {
    TokenStore::new(VersionedStore::new(
        Arc::new(FileStorage::new(dir.path.clone())),
        Arc::new(SystemClock),
    ))
}

/// URL nothing listens on.
pub fn unreachable_url() -> Url {
    Url::parse("http://127.0.0.1:9/api").unwrap()
}

async fn record_call(State(state): State<MockState>, req: Request, next: Next) -> Response {
    let call = RecordedCall {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.calls.lock().unwrap().push(call);
    next.run(req).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": message, "status": status.as_u16()})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

fn role_for(email: &str) -> &'static str {
    match email.split('@').next().unwrap_or("") {
        "manager" => "MANAGER",
        "restricted" => "RESTRICTED",
        "guest" => "GUEST",
        "auditor" => "AUDITOR",
        _ => "EMPLOYEE",
    }
}

fn grant(id: i64, email: &str, role: &str) -> Value {
    json!({
        "token": token_for(email, 3600).as_str(),
        "role": role,
        "userId": id,
        "email": email,
        "permissions": ["LOGOUT"],
    })
}

async fn login(Json(body): Json<CredentialsBody>) -> Response {
    if body.password == "wrong" {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    if body.password == "silent" {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(grant(1, &body.email, role_for(&body.email))).into_response()
}

async fn register(Json(body): Json<CredentialsBody>) -> Response {
    if body.email.starts_with("taken") {
        return error(StatusCode::CONFLICT, "User with this email already exists");
    }
    if body.password.len() < 8 {
        return error(StatusCode::BAD_REQUEST, "Invalid password format");
    }
    Json(grant(2, &body.email, "RESTRICTED")).into_response()
}

async fn logout(State(state): State<MockState>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed");
    }
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeBody {
    user_account_id: i64,
}

async fn upgrade(Json(body): Json<UpgradeBody>) -> Response {
    if body.user_account_id == 99 {
        return error(StatusCode::BAD_REQUEST, "User is already an employee");
    }
    Json(json!({
        "userAccountId": body.user_account_id,
        "email": "restricted@x.com",
        "role": "EMPLOYEE",
        "permissions": ["LOGOUT", "CREATE_REIMBURSEMENT"],
    }))
    .into_response()
}

async fn list_users() -> Json<Value> {
    Json(json!([
        {"userAccountId": 1, "email": "manager@x.com", "role": "MANAGER", "permissions": []},
        {"userAccountId": 3, "email": "employee@x.com", "role": "EMPLOYEE", "permissions": []},
    ]))
}

async fn delete_user(Path(id): Path<i64>) -> Response {
    if id == 1 {
        return error(StatusCode::BAD_REQUEST, "Cannot delete own account");
    }
    StatusCode::NO_CONTENT.into_response()
}

fn reimbursement(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "userId": 3,
        "userEmail": "employee@x.com",
        "description": "Client dinner",
        "type": "FOOD",
        "status": status,
    })
}

async fn list_mine(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let status = params.get("status").map(String::as_str).unwrap_or("PENDING");
    Json(json!([reimbursement(1, status)]))
}

async fn list_all(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let status = params.get("status").map(String::as_str).unwrap_or("PENDING");
    Json(json!([reimbursement(1, status), reimbursement(2, status)]))
}

async fn create_reimbursement(Json(body): Json<Value>) -> Response {
    let mut created = reimbursement(10, "PENDING");
    created["description"] = body["description"].clone();
    created["type"] = body["type"].clone();
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_reimbursement(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(reimbursement(id, "PENDING")).into_response()
}

async fn update_reimbursement(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if id == 2 {
        return error(
            StatusCode::BAD_REQUEST,
            "Reimbursement is no longer pending",
        );
    }
    let mut updated = reimbursement(id, "PENDING");
    updated["description"] = body["description"].clone();
    Json(updated).into_response()
}

async fn resolve_reimbursement(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if id == 2 {
        return error(StatusCode::FORBIDDEN, "Only managers may resolve");
    }
    let status = body["status"].as_str().unwrap_or("PENDING");
    Json(reimbursement(id, status)).into_response()
}

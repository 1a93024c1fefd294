//! rolebits REST API server
//!
//! Run with: cargo run --features server --bin rolebits-server
//!
//! The caller identity (`sender`) is taken from the request body and is
//! expected to have been authenticated by whatever sits in front of this
//! server.
//!
//! Endpoints:
//!   GET  /status            - Initialization state
//!   POST /initialize        - One-shot initialization
//!   GET  /role/{operator}   - Role mask of an operator
//!   POST /role              - Update an operator's role
//!   POST /role/check        - Check an operator's role
//!   GET  /features          - Global feature mask
//!   POST /features          - Update the feature mask
//!   POST /features/check    - Check features
//!   POST /require           - Guard check for a sender

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rolebits::{caps_to_names, AccessControl, Config, Error, InitState, Mask, OperatorId};

type AppState = Arc<AccessControl>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct InitializeReq {
    deployer: OperatorId,
    owner: OperatorId,
    #[serde(default)]
    features: Mask,
}

#[derive(Deserialize)]
struct UpdateRoleReq {
    sender: OperatorId,
    operator: OperatorId,
    requested: Mask,
}

#[derive(Deserialize)]
struct CheckRoleReq {
    operator: OperatorId,
    required: Mask,
}

#[derive(Deserialize)]
struct UpdateFeaturesReq {
    sender: OperatorId,
    requested: Mask,
}

#[derive(Deserialize)]
struct CheckFeaturesReq {
    required: Mask,
}

#[derive(Deserialize)]
struct RequireReq {
    sender: OperatorId,
    required: Mask,
}

#[derive(Serialize)]
struct StatusRes {
    initialized: bool,
    version: Option<u64>,
    instance: OperatorId,
}

#[derive(Serialize)]
struct MaskRes {
    mask: Mask,
    names: Vec<&'static str>,
}

impl From<Mask> for MaskRes {
    fn from(mask: Mask) -> Self {
        MaskRes { mask, names: caps_to_names(mask) }
    }
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    code: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, code: None }
    }

    fn err(e: &Error) -> Self {
        Self { success: false, data: None, error: Some(e.to_string()), code: Some(e.code()) }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn reply<T>(r: rolebits::Result<T>) -> Reply<T> {
    match r {
        Ok(v) => (StatusCode::OK, Json(ApiResponse::ok(v))),
        Err(e) => {
            let status = match &e {
                Error::AccessDenied => StatusCode::FORBIDDEN,
                Error::AlreadyInitialized => StatusCode::CONFLICT,
                Error::Decode(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ApiResponse::err(&e)))
        }
    }
}

/// Body extraction failures become `Decode` errors so they share the envelope.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> rolebits::Result<T> {
    payload.map(|Json(req)| req).map_err(|e| Error::Decode(e.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_status(State(ac): State<AppState>) -> Reply<StatusRes> {
    reply(ac.state().map(|s| StatusRes {
        initialized: s.is_initialized(),
        version: match s {
            InitState::Initialized { version } => Some(version),
            InitState::Uninitialized => None,
        },
        instance: ac.instance(),
    }))
}

async fn post_initialize(
    State(ac): State<AppState>,
    payload: Result<Json<InitializeReq>, JsonRejection>,
) -> Reply<()> {
    reply(body(payload).and_then(|req| ac.post_construct(req.deployer, req.owner, req.features)))
}

async fn get_role(State(ac): State<AppState>, Path(operator): Path<String>) -> Reply<MaskRes> {
    reply(
        operator
            .parse::<OperatorId>()
            .and_then(|op| ac.get_role(op))
            .map(MaskRes::from),
    )
}

async fn post_role(
    State(ac): State<AppState>,
    payload: Result<Json<UpdateRoleReq>, JsonRejection>,
) -> Reply<MaskRes> {
    reply(
        body(payload)
            .and_then(|req| ac.update_role(req.sender, req.operator, req.requested))
            .map(MaskRes::from),
    )
}

async fn post_role_check(
    State(ac): State<AppState>,
    payload: Result<Json<CheckRoleReq>, JsonRejection>,
) -> Reply<bool> {
    reply(body(payload).and_then(|req| ac.is_operator_in_role(req.operator, req.required)))
}

async fn get_features(State(ac): State<AppState>) -> Reply<MaskRes> {
    reply(ac.features().map(MaskRes::from))
}

async fn post_features(
    State(ac): State<AppState>,
    payload: Result<Json<UpdateFeaturesReq>, JsonRejection>,
) -> Reply<MaskRes> {
    reply(
        body(payload)
            .and_then(|req| ac.update_features(req.sender, req.requested))
            .map(MaskRes::from),
    )
}

async fn post_features_check(
    State(ac): State<AppState>,
    payload: Result<Json<CheckFeaturesReq>, JsonRejection>,
) -> Reply<bool> {
    reply(body(payload).and_then(|req| ac.is_feature_enabled(req.required)))
}

async fn post_require(
    State(ac): State<AppState>,
    payload: Result<Json<RequireReq>, JsonRejection>,
) -> Reply<()> {
    reply(body(payload).and_then(|req| ac.require_sender_in_role(req.sender, req.required)))
}

fn router(ac: AppState) -> Router {
    // CORS for local tooling
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(get_status))
        .route("/initialize", post(post_initialize))
        .route("/role", post(post_role))
        .route("/role/check", post(post_role_check))
        .route("/role/:operator", get(get_role))
        .route("/features", get(get_features).post(post_features))
        .route("/features/check", post(post_features_check))
        .route("/require", post(post_require))
        .layer(cors)
        .with_state(ac)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(path = %config.db_path.display(), "opening storage");
    let app = router(Arc::new(AccessControl::from_config(&config)?));

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(addr = %config.listen, "rolebits server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

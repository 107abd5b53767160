use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use nibble_core::day::parse_date_label;
use nibble_core::models::{DailySummary, FoodEntry, validate_entry_input};
use nibble_core::service::NibbleService;

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<NibbleService>>,
    api_key: Option<String>,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct CreateEntryRequest {
    name: String,
    calories: i64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                eprintln!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn create_entry(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<FoodEntry>), ApiError> {
    let name = validate_entry_input(&req.name, req.calories)
        .map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let svc = state
        .svc
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let entry = svc
        .create_entry(&name, req.calories)
        .context("failed to insert food entry")?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_entries_by_date(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<Vec<FoodEntry>>, ApiError> {
    let date = parse_date_label(&date_str).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let svc = state
        .svc
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let entries = svc.entries_for(date).context("database error")?;
    Ok(Json(entries))
}

async fn get_daily_summary(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = parse_date_label(&date_str).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let svc = state
        .svc
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let summary = svc.summary_for(date).context("database error")?;
    Ok(Json(summary))
}

async fn get_today_summary(
    State(state): State<AppState>,
) -> Result<Json<DailySummary>, ApiError> {
    let svc = state
        .svc
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let summary = svc.today_summary().context("database error")?;
    Ok(Json(summary))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/entries", post(create_entry))
        .route("/api/entries/{date}", get(get_entries_by_date))
        .route("/api/summary/today", get(get_today_summary))
        .route("/api/summary/{date}", get(get_daily_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

/// Abbreviate a key for log output. Keys are normally 64 hex chars, but the
/// api_key file can be hand-edited to anything non-empty, so short keys must
/// not panic (and must not be echoed in full).
fn key_fingerprint(key: &str) -> String {
    let count = key.chars().count();
    if count < 8 {
        return "****".to_string();
    }
    let prefix: String = key.chars().take(4).collect();
    let suffix: String = key.chars().skip(count - 4).collect();
    format!("{prefix}...{suffix}")
}

pub async fn start_server(
    svc: NibbleService,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {} (see api_key file in data directory)",
            key_fingerprint(key)
        );
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

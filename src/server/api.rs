use axum::{
    extract::{ Path, State },
    http::{ HeaderMap, StatusCode },
    response::{ IntoResponse, Response },
    routing::{ delete, post },
    Json,
    Router,
};
use chrono::{ NaiveDate, Utc };
use log::{ error, info };
use serde::{ Deserialize, Serialize };
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{ Any, CorsLayer };

use super::{ ServerError, SessionRegistry };
use crate::models::health::HealthSnapshot;
use crate::models::insight::{ DailyInsight, HealthAssistantResponse };
use crate::storage::StorageError;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
struct AppState {
    registry: Arc<SessionRegistry>,
    api_key: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub snapshot: HealthSnapshot,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub snapshot: HealthSnapshot,
    #[serde(default)]
    pub recent_insights: Vec<String>,
}

#[derive(Deserialize)]
pub struct DailyRequest {
    #[serde(default)]
    pub snapshot: HealthSnapshot,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid or missing API key")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.api_key.as_deref().filter(|k| !k.is_empty()) else {
        return Ok(());
    };
    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(provided) if provided == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn validate_user(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user id must not be empty".into()));
    }
    Ok(())
}

pub fn router(registry: Arc<SessionRegistry>, api_key: Option<String>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/users/{user_id}/chat", post(chat_handler))
        .route("/api/users/{user_id}/insights", post(insights_handler))
        .route("/api/users/{user_id}/daily", post(daily_handler))
        .route("/api/users/{user_id}/memory", delete(reset_handler))
        .layer(cors)
        .with_state(AppState { registry, api_key })
}

pub async fn start_http_server(
    addr: &str,
    registry: Arc<SessionRegistry>,
    api_key: Option<String>
) -> Result<(), ServerError> {
    let addr = addr
        .parse::<SocketAddr>()
        .map_err(|e| ServerError::InvalidAddress(addr.to_string(), e))?;
    let app = router(registry, api_key);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}", addr, e);
        e
    })?;
    info!("HTTP API listening on: http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>
) -> Result<Json<ChatResponse>, ApiError> {
    authorize(&state, &headers)?;
    validate_user(&user_id)?;
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }
    let assistant = state.registry.session(&user_id).await;
    let reply = assistant.converse(&req.message, &req.snapshot).await;
    Ok(Json(ChatResponse { reply }))
}

async fn insights_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<InsightsRequest>
) -> Result<Json<HealthAssistantResponse>, ApiError> {
    authorize(&state, &headers)?;
    validate_user(&user_id)?;
    let assistant = state.registry.session(&user_id).await;
    Ok(Json(assistant.generate_insights(&req.snapshot, &req.recent_insights).await))
}

async fn daily_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<DailyRequest>
) -> Result<Json<Vec<DailyInsight>>, ApiError> {
    authorize(&state, &headers)?;
    validate_user(&user_id)?;
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let assistant = state.registry.session(&user_id).await;
    Ok(Json(assistant.generate_daily_recommendations(&req.snapshot, date).await))
}

async fn reset_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    validate_user(&user_id)?;
    let assistant = state.registry.session(&user_id).await;
    assistant.reset_memory().await?;
    Ok(StatusCode::NO_CONTENT)
}

// Axum API Server Module
//
// Purpose: JSON API for the agricultural advisory site
// Routes: crop recommendation (ML proxy + query log), reference data,
// NPK advisor, contact form, health/readiness

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::advisory::{advise, Advice, NutrientLevels};
use crate::config::Config;
use crate::models::{ContactMessage, CropReference};
use crate::prediction::{HttpPredictionClient, PredictionClient};
use crate::recommendation::{recommend, RecommendError, Recommendation};
use crate::reference::{self, Disease, Scheme, Technique};
use crate::store::{MemoryStore, MongoStore, Store, StoreError};

// ============================================================================
// Application State
// ============================================================================

/// Everything a handler needs, built once in `main` and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub predictor: Arc<dyn PredictionClient>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.mongo_uri {
            Some(uri) => {
                tracing::info!("Connecting to document store (database: {})...", config.mongo_db);
                let store = MongoStore::connect(uri, &config.mongo_db).await?;
                // Unreachable store is not fatal: reads/writes will fail per request
                // and /api/ready reports it.
                match store.ping().await {
                    Ok(()) => tracing::info!("Document store connected"),
                    Err(e) => tracing::warn!("Document store not reachable yet: {}", error_chain(&e)),
                }
                Arc::new(store)
            }
            None => {
                tracing::warn!("MONGO_URI not set, using in-memory store (data is lost on restart)");
                Arc::new(MemoryStore::new())
            }
        };

        tracing::info!("Prediction endpoint: {}", config.prediction_url);
        let predictor = Arc::new(HttpPredictionClient::new(
            &config.prediction_url,
            config.prediction_timeout,
        )?);

        Ok(Self::from_parts(store, predictor))
    }

    pub fn from_parts(store: Arc<dyn Store>, predictor: Arc<dyn PredictionClient>) -> Self {
        Self { store, predictor }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness / readiness
        .route("/api/health", get(health_check))
        .route("/api/ready", get(readiness_check))

        // Crop recommendation (external ML service + query log)
        .route("/api/recommend", post(recommend_crop))

        // Reference data
        .route("/api/crops", get(list_crops))
        .route("/api/techniques", get(list_techniques))
        .route("/api/schemes", get(list_schemes))
        .route("/api/diseases", get(list_diseases))

        // Advisors and forms
        .route("/api/npk-advisor", post(npk_advisor))
        .route("/api/contact", post(submit_contact))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::very_permissive()) // Mirror any origin, allow credentials
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request Bodies
// ============================================================================

/// Inbound JSON body, read the way the site's forms have always been read.
///
/// Only `application/json` bodies are parsed. Any other content type, or an
/// empty body, yields `{}` so handlers see every field as missing. A JSON body
/// that does not parse, or whose top level is a bare scalar, is a 400.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[axum::async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = is_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::MalformedBody(e.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Map::new())));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(JsonBody(value)),
            Ok(_) => Err(AppError::MalformedBody("top-level value must be an object or array".to_string())),
            Err(e) => Err(AppError::MalformedBody(e.to_string())),
        }
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "message": "API running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn readiness_check(State(state): State<AppState>) -> Response {
    let backend = state.store.backend_tag();
    match state.store.ping().await {
        Ok(()) => Json(serde_json::json!({ "ready": true, "backend": backend })).into_response(),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", error_chain(&e));
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "ready": false,
                    "backend": backend,
                    "msg": "Store unavailable"
                })),
            )
                .into_response()
        }
    }
}

async fn recommend_crop(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> Result<Json<Recommendation>, AppError> {
    let result = recommend(state.predictor.as_ref(), state.store.as_ref(), &payload).await?;
    Ok(Json(result))
}

async fn list_crops(
    State(state): State<AppState>,
) -> Result<Json<Vec<CropReference>>, AppError> {
    let stored = state.store.list_crops().await.map_err(AppError::Crops)?;

    if stored.is_empty() {
        tracing::debug!("No stored crops, serving defaults");
    }

    Ok(Json(reference::crops_or_default(stored)))
}

async fn list_techniques() -> Json<&'static [Technique]> {
    Json(reference::techniques())
}

async fn list_schemes() -> Json<&'static [Scheme]> {
    Json(reference::schemes())
}

async fn list_diseases() -> Json<&'static [Disease]> {
    Json(reference::diseases())
}

async fn npk_advisor(JsonBody(payload): JsonBody) -> Json<Advice> {
    let levels = NutrientLevels::from_payload(&payload);
    Json(advise(&levels))
}

async fn submit_contact(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> Result<Json<Value>, AppError> {
    let message = ContactMessage::from_payload(&payload)
        .map_err(|e| AppError::Contact(StoreError::from(e)))?;
    state
        .store
        .insert_contact(&message)
        .await
        .map_err(AppError::Contact)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "msg": "Message saved!"
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

/// Handler failures. The display text is the generic message sent to
/// clients; the wrapped cause is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Prediction failed")]
    Recommend(#[from] RecommendError),

    #[error("Failed to load crops")]
    Crops(#[source] StoreError),

    #[error("Failed to save message")]
    Contact(#[source] StoreError),

    #[error("Malformed JSON body")]
    MalformedBody(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Recommend(cause) => tracing::error!("Prediction API call failed: {}", error_chain(cause)),
            AppError::Crops(cause) => tracing::error!("Crop lookup failed: {}", error_chain(cause)),
            AppError::Contact(cause) => tracing::error!("Contact message not saved: {}", error_chain(cause)),
            AppError::MalformedBody(reason) => tracing::warn!("Rejected request body: {}", reason),
        }

        let (status, body) = match &self {
            AppError::Contact(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "success": false, "msg": self.to_string() }),
            ),
            AppError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "msg": self.to_string() }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "msg": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// `err` and every cause under it, outermost first, joined by ": "
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

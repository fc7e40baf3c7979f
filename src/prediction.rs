//! Prediction Client
//!
//! One outbound call per recommendation: the inbound readings are POSTed
//! unmodified to the ML scoring service and the reply must carry a `crop`
//! name. No retry; the only time bound is the optional configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest slice of an error body kept for logging
const MAX_LOGGED_BODY: usize = 512;

/// Why a prediction could not be used. Callers log the variant; clients only
/// ever see a generic failure.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("prediction service unreachable")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("prediction response is not a JSON object: {0}")]
    Decode(String),

    #[error("prediction response has no crop")]
    MissingCrop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub crop: String,
    /// Remaining response fields, kept only for logging
    pub extra: Map<String, Value>,
}

impl Prediction {
    /// Validate a decoded response body: an object with a non-empty string `crop`
    pub fn from_value(value: Value) -> Result<Self, PredictionError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(PredictionError::Decode(format!("expected object, got {}", kind_of(&other))));
            }
        };

        match fields.remove("crop") {
            Some(Value::String(crop)) if !crop.trim().is_empty() => Ok(Self { crop, extra: fields }),
            _ => Err(PredictionError::MissingCrop),
        }
    }
}

#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, readings: &Value) -> Result<Prediction, PredictionError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

pub struct HttpPredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, PredictionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, readings: &Value) -> Result<Prediction, PredictionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(readings)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&String::from_utf8_lossy(&body)),
            });
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| PredictionError::Decode(e.to_string()))?;

        let prediction = Prediction::from_value(value)?;
        tracing::debug!("Prediction service chose {} (extra: {:?})", prediction.crop, prediction.extra);
        Ok(prediction)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate_for_log(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_response() {
        let prediction = Prediction::from_value(json!({ "crop": "Rice", "confidence": 0.93 })).unwrap();
        assert_eq!(prediction.crop, "Rice");
        assert_eq!(prediction.extra["confidence"], json!(0.93));
        assert!(!prediction.extra.contains_key("crop"));
    }

    #[test]
    fn test_error_payload_rejected() {
        let err = Prediction::from_value(json!({ "error": "model not loaded" })).unwrap_err();
        assert!(matches!(err, PredictionError::MissingCrop));

        let err = Prediction::from_value(json!({ "crop": "" })).unwrap_err();
        assert!(matches!(err, PredictionError::MissingCrop));

        let err = Prediction::from_value(json!({ "crop": ["Rice"] })).unwrap_err();
        assert!(matches!(err, PredictionError::MissingCrop));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = Prediction::from_value(json!(["Rice"])).unwrap_err();
        assert!(matches!(err, PredictionError::Decode(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_truncate_for_log() {
        let long = "x".repeat(MAX_LOGGED_BODY + 10);
        let cut = truncate_for_log(&long);
        assert_eq!(cut.len(), MAX_LOGGED_BODY + 3);
        assert_eq!(truncate_for_log("short"), "short");
    }

    // ------------------------------------------------------------------------
    // Against a local stand-in for the scoring service
    // ------------------------------------------------------------------------

    async fn spawn_scoring_stub() -> String {
        use axum::{
            http::{header, HeaderMap, StatusCode},
            response::{Html, IntoResponse},
            routing::post,
            Json, Router,
        };

        async fn echo(headers: HeaderMap, body: String) -> Json<Value> {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "crop": "Rice", "raw": body, "content_type": content_type }))
        }

        let app = Router::new()
            .route("/predict", post(echo))
            .route("/down", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model warming up").into_response() }))
            .route("/html", post(|| async { Html("<html>maintenance</html>") }))
            .route("/nocrop", post(|| async { Json(json!({ "error": "model not loaded" })) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_posts_readings_unmodified() {
        let base = spawn_scoring_stub().await;
        let client = HttpPredictionClient::new(&format!("{}/predict", base), Some(Duration::from_secs(5))).unwrap();

        let readings = json!({ "N": 90, "P": 42, "K": 43, "temperature": 20.5, "farm": "north" });
        let prediction = client.predict(&readings).await.unwrap();

        assert_eq!(prediction.crop, "Rice");
        assert_eq!(prediction.extra["content_type"], "application/json");
        // Body bytes keep the caller's key order and unknown keys
        assert_eq!(
            prediction.extra["raw"],
            r#"{"N":90,"P":42,"K":43,"temperature":20.5,"farm":"north"}"#
        );
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let base = spawn_scoring_stub().await;
        let client = HttpPredictionClient::new(&format!("{}/down", base), None).unwrap();

        match client.predict(&json!({ "N": 1 })).await.unwrap_err() {
            PredictionError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model warming up");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_decode_error() {
        let base = spawn_scoring_stub().await;
        let client = HttpPredictionClient::new(&format!("{}/html", base), None).unwrap();

        let err = client.predict(&json!({ "N": 1 })).await.unwrap_err();
        assert!(matches!(err, PredictionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_reply_has_no_crop() {
        let base = spawn_scoring_stub().await;
        let client = HttpPredictionClient::new(&format!("{}/nocrop", base), None).unwrap();

        let err = client.predict(&json!({ "N": 1 })).await.unwrap_err();
        assert!(matches!(err, PredictionError::MissingCrop));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let client = HttpPredictionClient::new("http://127.0.0.1:9/predict", Some(Duration::from_secs(2))).unwrap();
        let err = client.predict(&json!({ "N": 1 })).await.unwrap_err();
        assert!(matches!(err, PredictionError::Transport(_)));
    }
}

//! Crop Recommendation Flow
//!
//! predict → log → respond. A query log is written only once the prediction
//! has come back with a usable crop; nothing is written for a failed call.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::QueryLog;
use crate::prediction::{PredictionClient, PredictionError};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("failed to save query log")]
    Persist(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recommended: Vec<String>,
}

pub async fn recommend(
    predictor: &dyn PredictionClient,
    store: &dyn Store,
    payload: &Value,
) -> Result<Recommendation, RecommendError> {
    let prediction = predictor.predict(payload).await?;
    let recommended = vec![prediction.crop];

    let log = QueryLog::from_payload(payload, recommended.clone()).map_err(StoreError::from)?;
    store.insert_query_log(&log).await?;

    tracing::info!("Recommended {:?} ({} backend)", recommended, store.backend_tag());
    Ok(Recommendation { recommended })
}

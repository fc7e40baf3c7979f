//! Agricultural Advisory API
//!
//! Backend for a crop advisory site:
//! - `models`: stored record types and payload casting
//! - `reference`: fixed techniques / schemes / diseases and default crops
//! - `advisory`: NPK fertilizer thresholds
//! - `config`: environment settings
//! - `store`, `prediction`, `recommendation`, `api_server`: the HTTP service
//!   (behind the `api` feature, on by default)

pub mod models;
pub mod reference;
pub mod advisory;
pub mod config;

#[cfg(feature = "api")]
pub mod store;
#[cfg(feature = "api")]
pub mod prediction;
#[cfg(feature = "api")]
pub mod recommendation;
#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use models::{CastError, ContactMessage, CropReference, QueryLog};
pub use advisory::{advise, Advice, NutrientLevels};
pub use config::{Config, ConfigError};

#[cfg(feature = "api")]
pub use api_server::{AppState, AppError, JsonBody, create_router, error_chain};
#[cfg(feature = "api")]
pub use store::{MemoryStore, MongoStore, Store, StoreError};
#[cfg(feature = "api")]
pub use prediction::{HttpPredictionClient, Prediction, PredictionClient, PredictionError};

pub mod app_config;
pub mod config;
pub mod reference;
pub mod reviews;

pub use app_config::{AppConfig, BackendKind, DelayRange, Environment};
pub use config::{load_app_config, load_app_config_from_env, MAX_PAGES_LIMIT};
pub use reference::{resolve, Domain, ProductReference, ReferenceError};
pub use reviews::{
    mean_rating, round_one_decimal, ExtractionResult, OutputRow, ProductAggregate, ReviewRecord,
    Sentiment, StopReason, NO_REVIEWS_CONTENT,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

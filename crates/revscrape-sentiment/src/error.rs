use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("polarity model produced a non-finite score: {0}")]
    NonFinite(f32),

    #[error("polarity model failed: {0}")]
    Model(String),
}

//! Sentiment labelling for extracted customer reviews.
//!
//! A lexical polarity model scores review text in `[-1.0, 1.0]`, and
//! [`SentimentClassifier`] turns that score into a coarse three-way label.

pub mod classifier;
pub mod error;
pub mod scorer;

pub use classifier::{
    label_for_polarity, LexiconModel, PolarityModel, SentimentClassifier, NEGATIVE_THRESHOLD,
    POSITIVE_THRESHOLD,
};
pub use error::SentimentError;
pub use scorer::lexicon_score;

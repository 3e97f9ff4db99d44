//! Three-way sentiment labelling on top of a polarity model.

use revscrape_core::Sentiment;

use crate::error::SentimentError;
use crate::scorer::lexicon_score;

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f32 = 0.1;

/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f32 = -0.1;

/// Texts shorter than this (after trimming) are always neutral.
const MIN_TEXT_CHARS: usize = 3;

/// Produces a polarity score in `[-1.0, 1.0]` for a text.
pub trait PolarityModel: Send + Sync {
    /// # Errors
    ///
    /// Implementations report scoring failures as [`SentimentError`]; the
    /// classifier maps every failure to [`Sentiment::Neutral`].
    fn polarity(&self, text: &str) -> Result<f32, SentimentError>;
}

/// The built-in review lexicon from [`crate::scorer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconModel;

impl PolarityModel for LexiconModel {
    fn polarity(&self, text: &str) -> Result<f32, SentimentError> {
        Ok(lexicon_score(text))
    }
}

/// Maps a polarity score to a label using the fixed thresholds.
#[must_use]
pub fn label_for_polarity(score: f32) -> Sentiment {
    if score > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Labels review text. Never fails: short text, model errors and
/// non-finite scores all come out as [`Sentiment::Neutral`].
pub struct SentimentClassifier {
    model: Box<dyn PolarityModel>,
}

impl SentimentClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_model(LexiconModel)
    }

    #[must_use]
    pub fn with_model(model: impl PolarityModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    #[must_use]
    pub fn classify(&self, text: &str) -> Sentiment {
        let text = text.trim();
        if text.chars().count() < MIN_TEXT_CHARS {
            return Sentiment::Neutral;
        }

        let score = self.model.polarity(text).and_then(|score| {
            if score.is_finite() {
                Ok(score)
            } else {
                Err(SentimentError::NonFinite(score))
            }
        });

        match score {
            Ok(score) => label_for_polarity(score),
            Err(e) => {
                tracing::debug!(error = %e, "polarity scoring failed; labelling neutral");
                Sentiment::Neutral
            }
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier").finish_non_exhaustive()
    }
}

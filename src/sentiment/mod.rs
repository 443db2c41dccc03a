//! Sentiment scoring
//!
//! The model itself is an external collaborator reached through the
//! [`SentimentScorer`] trait. This module owns:
//! - Normalization of `(label, confidence)` into a score in [0, 1]
//! - The initialize-once [`ScorerHandle`] passed into the orchestrator
//! - The neutral fallback used whenever the model cannot answer

pub mod inference;

pub use inference::InferenceScorer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::ScorerConfig;

/// Score used when the model is unavailable
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Weight applied to confidence for neutral labels
const NEUTRAL_CONFIDENCE_WEIGHT: f64 = 0.1;

/// Coarse label vocabulary of sentiment models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a raw model label. Models disagree on casing and prefixes,
    /// so matching is case-insensitive and by substring.
    pub fn parse(label: &str) -> Self {
        let label = label.to_uppercase();
        if label.contains("POSITIVE") {
            SentimentLabel::Positive
        } else if label.contains("NEGATIVE") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Raw classifier output
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSentiment {
    pub label: String,
    #[serde(rename = "score")]
    pub confidence: f64,
}

/// Normalized result attached to a check-in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReading {
    /// 0.0 = most negative, 1.0 = most positive
    pub score: f64,
    /// Model certainty
    pub intensity: f64,
}

impl SentimentReading {
    /// Reading used when the model is unavailable or failed
    pub fn neutral_fallback() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            intensity: 0.0,
        }
    }
}

/// Map a model label and confidence onto the [0, 1] sentiment scale.
///
/// Neutral labels land slightly above the midpoint, at most 0.6.
pub fn normalize(label: &str, confidence: f64) -> SentimentReading {
    let confidence = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let score = match SentimentLabel::parse(label) {
        SentimentLabel::Positive => confidence,
        SentimentLabel::Negative => 1.0 - confidence,
        SentimentLabel::Neutral => NEUTRAL_SCORE + confidence * NEUTRAL_CONFIDENCE_WEIGHT,
    };

    SentimentReading {
        score,
        intensity: confidence,
    }
}

#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("Sentiment model is not configured")]
    Unavailable,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// Text classifier returning a label and confidence
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn classify(&self, text: &str) -> Result<RawSentiment, ScorerError>;

    /// Model identifier for logs and health output
    fn model(&self) -> &str;
}

/// Scorer created once at startup and shared by every request
#[derive(Clone)]
pub struct ScorerHandle {
    scorer: Option<Arc<dyn SentimentScorer>>,
}

impl ScorerHandle {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            scorer: Some(scorer),
        }
    }

    /// Handle with no model behind it; every reading is neutral
    pub fn unavailable() -> Self {
        Self { scorer: None }
    }

    /// Build the HTTP inference scorer described by the config.
    ///
    /// A client that cannot be built leaves the handle unavailable, the same
    /// as having no endpoint configured.
    pub fn from_config(config: &ScorerConfig) -> Self {
        let Some(endpoint) = config.resolved_endpoint() else {
            return Self::unavailable();
        };

        Self::from_built(InferenceScorer::new(
            endpoint,
            config.model.clone(),
            config.api_token.clone(),
            config.timeout_secs,
        ))
    }

    fn from_built(built: Result<InferenceScorer, ScorerError>) -> Self {
        match built {
            Ok(scorer) => Self::new(Arc::new(scorer)),
            Err(e) => {
                warn!(error = %e, "Failed to build sentiment client; check-ins will score neutral");
                Self::unavailable()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.scorer.as_ref().map(|s| s.model())
    }

    /// Score text, degrading to the neutral fallback on any scorer failure
    pub async fn analyze(&self, text: &str) -> SentimentReading {
        let Some(scorer) = &self.scorer else {
            return SentimentReading::neutral_fallback();
        };

        match scorer.classify(text).await {
            Ok(raw) => normalize(&raw.label, raw.confidence),
            Err(e) => {
                warn!(model = scorer.model(), error = %e, "Sentiment scoring failed, using neutral fallback");
                SentimentReading::neutral_fallback()
            }
        }
    }
}

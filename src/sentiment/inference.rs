//! HTTP text-classification scorer
//!
//! Talks to a Hugging Face style inference endpoint:
//! `POST {"inputs": text}` answered by `[{"label", "score"}, ...]`, or the same
//! list wrapped once more for batch-shaped servers.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RawSentiment, ScorerError, SentimentScorer};

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<RawSentiment>>),
    Single(Vec<RawSentiment>),
}

impl ClassificationResponse {
    /// Highest-confidence label of the first input
    fn top_label(self) -> Option<RawSentiment> {
        let candidates = match self {
            ClassificationResponse::Batched(batch) => batch.into_iter().next()?,
            ClassificationResponse::Single(list) => list,
        };

        candidates
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

/// Scorer backed by a remote inference endpoint
pub struct InferenceScorer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: Option<String>,
}

impl InferenceScorer {
    pub fn new(
        endpoint: String,
        model: String,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ScorerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            model,
            api_token,
        })
    }
}

#[async_trait]
impl SentimentScorer for InferenceScorer {
    async fn classify(&self, text: &str) -> Result<RawSentiment, ScorerError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ClassificationRequest { inputs: text });

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScorerError::Status(response.status().as_u16()));
        }

        let body: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::InvalidResponse(e.to_string()))?;

        let top = body
            .top_label()
            .ok_or_else(|| ScorerError::InvalidResponse("no labels returned".to_string()))?;

        debug!(label = %top.label, confidence = top.confidence, "Classified check-in text");
        Ok(top)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

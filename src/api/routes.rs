//! API handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SharedState;
use crate::checkin::CheckinOutcome;
use crate::error::CheckinError;
use crate::store::{CheckEntry, TimelineOrder};

/// POST /checkin body
#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub user_text: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// A check-in as returned by the API
#[derive(Debug, Serialize)]
pub struct CheckinResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment_score: f64,
    pub intensity: f64,
    pub anomaly_flag: bool,
    /// Only present on the response to a new check-in
    pub support_message: Option<&'static str>,
    pub user_text: String,
}

impl From<CheckEntry> for CheckinResponse {
    fn from(entry: CheckEntry) -> Self {
        Self {
            id: entry.id,
            timestamp: entry.timestamp,
            sentiment_score: entry.sentiment_score,
            intensity: entry.intensity,
            anomaly_flag: entry.anomaly_flag,
            support_message: None,
            user_text: entry.user_text,
        }
    }
}

impl From<CheckinOutcome> for CheckinResponse {
    fn from(outcome: CheckinOutcome) -> Self {
        Self {
            support_message: Some(outcome.message.text()),
            ..Self::from(outcome.entry)
        }
    }
}

/// POST /checkin
pub async fn submit_checkin(
    State(state): State<SharedState>,
    req: Result<Json<CheckinRequest>, JsonRejection>,
) -> Result<Json<CheckinResponse>, CheckinError> {
    let Json(req) = req?;
    let outcome = state
        .service
        .submit(req.scope.as_deref(), &req.user_text)
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /timeline query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub scope: Option<String>,
    #[serde(default)]
    pub order: TimelineOrder,
    pub limit: Option<usize>,
}

/// GET /timeline
pub async fn timeline(
    State(state): State<SharedState>,
    query: Result<Query<TimelineQuery>, QueryRejection>,
) -> Result<Json<Vec<CheckinResponse>>, CheckinError> {
    let Query(query) = query?;
    let entries = state
        .service
        .timeline(query.scope.as_deref(), query.order, query.limit)
        .await?;
    Ok(Json(entries.into_iter().map(CheckinResponse::from).collect()))
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub scorer: &'static str,
    pub model: Option<String>,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let scorer = state.service.scorer();

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        scorer: if scorer.is_ready() { "ready" } else { "unavailable" },
        model: scorer.model().map(str::to_string),
    })
}

//! Check-in history records

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Scope used when a request does not name one
pub const DEFAULT_SCOPE: &str = "default";

/// A persisted check-in. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckEntry {
    pub id: String,
    pub scope: String,
    pub timestamp: DateTime<Utc>,
    pub user_text: String,
    pub sentiment_score: f64,
    pub intensity: f64,
    pub anomaly_flag: bool,
}

/// Fields supplied by the orchestrator when appending
#[derive(Debug, Clone, Copy)]
pub struct NewCheckEntry<'a> {
    pub scope: &'a str,
    pub user_text: &'a str,
    pub sentiment_score: f64,
    pub intensity: f64,
    pub anomaly_flag: bool,
}

/// Timeline sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineOrder {
    #[default]
    Asc,
    Desc,
}

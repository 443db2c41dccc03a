//! Check-in orchestration
//!
//! One linear pass per request:
//! 1. Validate text
//! 2. Score sentiment (never fails; degrades to neutral)
//! 3. Read the bounded baseline for the scope
//! 4. Evaluate the anomaly rule
//! 5. Select the support message
//! 6. Append the entry
//!
//! Steps 3-6 run under the store lock, so concurrent check-ins are
//! serialized and each decision sees every previously committed entry.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::detector::{AnomalyDetector, AnomalyVerdict, MIN_BASELINE};
use crate::error::CheckinError;
use crate::sentiment::ScorerHandle;
use crate::store::{CheckEntry, CheckinStore, NewCheckEntry, TimelineOrder, DEFAULT_SCOPE};
use crate::support::SupportMessage;

/// Longest accepted scope name
const MAX_SCOPE_LEN: usize = 128;

/// Result of a successful check-in
#[derive(Debug, Clone)]
pub struct CheckinOutcome {
    pub entry: CheckEntry,
    pub message: SupportMessage,
    pub verdict: AnomalyVerdict,
}

/// Sequences scorer, store, detector and message policy
pub struct CheckinService {
    scorer: ScorerHandle,
    store: Arc<Mutex<CheckinStore>>,
    detector: AnomalyDetector,
    baseline_window: usize,
    max_text_chars: usize,
}

impl CheckinService {
    pub fn new(scorer: ScorerHandle, store: CheckinStore) -> Self {
        let defaults = Config::default();
        Self {
            scorer,
            store: Arc::new(Mutex::new(store)),
            detector: AnomalyDetector::new(),
            baseline_window: defaults.detection.baseline_window,
            max_text_chars: defaults.server.max_text_chars,
        }
    }

    pub fn from_config(scorer: ScorerHandle, store: CheckinStore, config: &Config) -> Self {
        Self::new(scorer, store)
            .with_baseline_window(config.detection.baseline_window)
            .with_max_text_chars(config.server.max_text_chars)
    }

    pub fn with_baseline_window(mut self, window: usize) -> Self {
        if window < MIN_BASELINE {
            warn!(
                window,
                required = MIN_BASELINE,
                "Baseline window shorter than the minimum baseline; anomaly detection is disabled"
            );
        }
        self.baseline_window = window;
        self
    }

    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    pub fn scorer(&self) -> &ScorerHandle {
        &self.scorer
    }

    /// Score, evaluate and persist a check-in
    pub async fn submit(
        &self,
        scope: Option<&str>,
        text: &str,
    ) -> Result<CheckinOutcome, CheckinError> {
        let scope = resolve_scope(scope)?;
        self.validate_text(text)?;

        let reading = self.scorer.analyze(text).await;

        let store = self.store.lock().await;
        let history = store.recent_scores(scope, self.baseline_window)?;
        let verdict = self.detector.evaluate(&history, reading.score);
        let message = SupportMessage::select(reading.score, verdict.anomalous);

        let entry = store.append(NewCheckEntry {
            scope,
            user_text: text,
            sentiment_score: reading.score,
            intensity: reading.intensity,
            anomaly_flag: verdict.anomalous,
        })?;
        drop(store);

        info!(
            id = %entry.id,
            scope,
            score = entry.sentiment_score,
            anomaly = entry.anomaly_flag,
            baseline_size = verdict.baseline_size,
            "Check-in recorded"
        );

        Ok(CheckinOutcome {
            entry,
            message,
            verdict,
        })
    }

    /// Stored entries for a scope ordered by time
    pub async fn timeline(
        &self,
        scope: Option<&str>,
        order: TimelineOrder,
        limit: Option<usize>,
    ) -> Result<Vec<CheckEntry>, CheckinError> {
        let scope = resolve_scope(scope)?;
        if limit == Some(0) {
            return Err(CheckinError::InvalidInput("limit must be positive".to_string()));
        }

        let store = self.store.lock().await;
        store.timeline(scope, order, limit)
    }

    fn validate_text(&self, text: &str) -> Result<(), CheckinError> {
        if text.trim().is_empty() {
            return Err(CheckinError::InvalidInput("user_text must not be empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > self.max_text_chars {
            return Err(CheckinError::InvalidInput(format!(
                "user_text is {} characters, limit is {}",
                chars, self.max_text_chars
            )));
        }
        Ok(())
    }
}

fn resolve_scope(scope: Option<&str>) -> Result<&str, CheckinError> {
    match scope.map(str::trim) {
        None | Some("") => Ok(DEFAULT_SCOPE),
        Some(s) if s.len() > MAX_SCOPE_LEN => Err(CheckinError::InvalidInput(format!(
            "scope longer than {} bytes",
            MAX_SCOPE_LEN
        ))),
        Some(s) => Ok(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_scope() {
        assert_eq!(resolve_scope(None).unwrap(), DEFAULT_SCOPE);
        assert_eq!(resolve_scope(Some("  ")).unwrap(), DEFAULT_SCOPE);
        assert_eq!(resolve_scope(Some(" alice ")).unwrap(), "alice");
        assert!(resolve_scope(Some(&"x".repeat(MAX_SCOPE_LEN + 1))).is_err());
    }

    #[tokio::test]
    async fn test_blank_text_rejected_without_storing() {
        let service = CheckinService::new(
            ScorerHandle::unavailable(),
            CheckinStore::open_in_memory().unwrap(),
        );

        let err = service.submit(None, "   \n").await.unwrap_err();
        assert!(matches!(err, CheckinError::InvalidInput(_)));
        assert!(service.timeline(None, TimelineOrder::Asc, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_text_rejected() {
        let service = CheckinService::new(
            ScorerHandle::unavailable(),
            CheckinStore::open_in_memory().unwrap(),
        )
        .with_max_text_chars(10);

        assert!(service.submit(None, "short").await.is_ok());
        assert!(matches!(
            service.submit(None, "this is far too long").await,
            Err(CheckinError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_scorer_records_neutral_entry() {
        let service = CheckinService::new(
            ScorerHandle::unavailable(),
            CheckinStore::open_in_memory().unwrap(),
        );

        let outcome = service.submit(None, "just a day").await.unwrap();
        assert_eq!(outcome.entry.sentiment_score, 0.5);
        assert_eq!(outcome.entry.intensity, 0.0);
        assert!(!outcome.entry.anomaly_flag);
        assert_eq!(outcome.message, SupportMessage::Steady);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let service = CheckinService::new(
            ScorerHandle::unavailable(),
            CheckinStore::open_in_memory().unwrap(),
        );
        assert!(service.timeline(None, TimelineOrder::Desc, Some(0)).await.is_err());
    }
}

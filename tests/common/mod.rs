//! Shared test fixtures

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wellshift::sentiment::ScorerError;
use wellshift::{RawSentiment, ScorerHandle, SentimentScorer};

/// Scorer that replays a fixed list of classifier outputs
pub struct ScriptedScorer {
    outputs: Mutex<VecDeque<RawSentiment>>,
}

impl ScriptedScorer {
    pub fn new(outputs: Vec<RawSentiment>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
        }
    }

    /// Outputs that normalize to exactly `scores` via positive labels
    pub fn positive(scores: &[f64]) -> Self {
        Self::new(scores.iter().map(|&s| raw("positive", s)).collect())
    }
}

#[async_trait]
impl SentimentScorer for ScriptedScorer {
    async fn classify(&self, _text: &str) -> Result<RawSentiment, ScorerError> {
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ScorerError::Unavailable)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

pub fn raw(label: &str, confidence: f64) -> RawSentiment {
    RawSentiment {
        label: label.to_string(),
        confidence,
    }
}

pub fn handle(scorer: ScriptedScorer) -> ScorerHandle {
    ScorerHandle::new(Arc::new(scorer))
}

/// Make every later insert into the check-in table fail, as a full or
/// read-only disk would
pub fn reject_inserts(db_path: &Path) {
    let db = rusqlite::Connection::open(db_path).unwrap();
    db.execute_batch(
        "CREATE TRIGGER reject_checkins BEFORE INSERT ON checkins
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .unwrap();
}

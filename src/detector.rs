//! Anomaly detection against a personal baseline
//!
//! A new score is anomalous when it falls strictly below
//! `Q1 - 1.5 * IQR` of the prior scores. Quartiles use linear interpolation
//! between order statistics, so results match common dataframe libraries.

use tracing::{debug, warn};

/// Prior scores required before the rule is applied
pub const MIN_BASELINE: usize = 4;

/// Tukey fence multiplier
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Outcome of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyVerdict {
    pub anomalous: bool,
    /// Fence the score was compared against; `None` when the baseline was too short
    pub lower_bound: Option<f64>,
    pub baseline_size: usize,
}

/// Quartile summary of a baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub q1: f64,
    pub q3: f64,
}

impl Baseline {
    /// Summarize prior scores. Returns `None` for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn lower_bound(&self) -> f64 {
        self.q1 - IQR_MULTIPLIER * self.iqr()
    }
}

/// q-quantile of an ascending, non-empty slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;

    match sorted.get(lower + 1) {
        Some(upper) => sorted[lower] + fraction * (upper - sorted[lower]),
        None => sorted[lower],
    }
}

/// Stateless IQR detector
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    min_baseline: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            min_baseline: MIN_BASELINE,
        }
    }
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `score` against `history`, which must not contain `score`'s own entry
    pub fn evaluate(&self, history: &[f64], score: f64) -> AnomalyVerdict {
        if history.len() < self.min_baseline {
            debug!(
                baseline_size = history.len(),
                required = self.min_baseline,
                "Baseline too short, skipping anomaly check"
            );
            return AnomalyVerdict {
                anomalous: false,
                lower_bound: None,
                baseline_size: history.len(),
            };
        }

        let Some(baseline) = Baseline::from_scores(history) else {
            return AnomalyVerdict {
                anomalous: false,
                lower_bound: None,
                baseline_size: history.len(),
            };
        };

        let lower_bound = baseline.lower_bound();
        let anomalous = score < lower_bound;

        if anomalous {
            warn!(
                score,
                lower_bound,
                q1 = baseline.q1,
                q3 = baseline.q3,
                "Anomaly detected: score below baseline fence"
            );
        }

        AnomalyVerdict {
            anomalous,
            lower_bound: Some(lower_bound),
            baseline_size: history.len(),
        }
    }
}

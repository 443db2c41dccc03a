//! Wellshift - mood check-in service
//!
//! Accepts free-text check-ins, scores them with a sentiment model, and flags
//! entries that fall unusually far below the writer's own baseline.
//!
//! ## Request flow
//!
//! ```text
//! text ─► SentimentScorer ─► normalize ─► score, intensity
//!                                            │
//!            CheckinStore::recent_scores ◄───┤
//!                         │                  │
//!                         ▼                  ▼
//!                  AnomalyDetector ─► SupportMessage::select
//!                                            │
//!                                            ▼
//!                                  CheckinStore::append ─► response
//! ```
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/wellshift/
//! ├── checkins.db            # SQLite history (WAL mode)
//! └── config.toml            # Configuration
//! ```

pub mod api;
pub mod checkin;
pub mod config;
pub mod detector;
pub mod error;
pub mod sentiment;
pub mod store;
pub mod support;

// Re-exports
pub use checkin::{CheckinOutcome, CheckinService};
pub use config::Config;
pub use detector::{AnomalyDetector, AnomalyVerdict};
pub use error::CheckinError;
pub use sentiment::{InferenceScorer, RawSentiment, ScorerHandle, SentimentReading, SentimentScorer};
pub use store::{CheckEntry, CheckinStore, TimelineOrder, DEFAULT_SCOPE};
pub use support::SupportMessage;

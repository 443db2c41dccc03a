//! Supportive message selection

/// Scores below this are treated as a low mood
pub const LOW_MOOD_THRESHOLD: f64 = 0.3;

/// Scores below this (and not low) are treated as a steady day
pub const STEADY_THRESHOLD: f64 = 0.6;

/// One of the fixed replies returned with a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportMessage {
    /// Significant dip below the personal baseline
    SignificantChange,
    LowMood,
    Steady,
    Positive,
}

impl SupportMessage {
    /// Pick the message for a score. An anomaly overrides the score buckets.
    pub fn select(score: f64, anomalous: bool) -> Self {
        if anomalous {
            SupportMessage::SignificantChange
        } else if score < LOW_MOOD_THRESHOLD {
            SupportMessage::LowMood
        } else if score < STEADY_THRESHOLD {
            SupportMessage::Steady
        } else {
            SupportMessage::Positive
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            SupportMessage::SignificantChange => {
                "⚠️ Significant Change Detected. Your recent entries show a notable dip below your typical baseline. \
                 Please reach out to a support professional or review your coping strategies. \
                 Remember: small steps are still progress."
            }
            SupportMessage::LowMood => {
                "🫂 It sounds like you are going through a difficult time. \
                 It's okay to feel overwhelmed. Focus on one small, manageable task today."
            }
            SupportMessage::Steady => {
                "⚖️ A steady day is still a good day. If you feel stuck, try a short break or a mindfulness exercise. \
                 Keep an eye on how you feel tomorrow."
            }
            SupportMessage::Positive => {
                "✨ Great job! Your reflection shows a positive mindset. \
                 Take a moment to recognize what made today successful and carry that momentum forward."
            }
        }
    }
}

//! Core types for word practice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Word learning status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    New,
    Learning,
    Mastered,
}

impl Default for WordStatus {
    fn default() -> Self {
        Self::New
    }
}

impl WordStatus {
    /// Get the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
        }
    }

    /// Whether a word with this status is practiced in a session.
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::New | Self::Learning)
    }
}

/// A vocabulary word tracked for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub text: String,
    pub status: WordStatus,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub first_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tested: Option<DateTime<Utc>>,
}

impl Word {
    /// Create a new word. The text is stored trimmed and lowercased.
    pub fn new(learner_id: Uuid, text: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            learner_id,
            text: canonical_text(text),
            status: WordStatus::New,
            correct_count: 0,
            incorrect_count: 0,
            first_seen: now,
            last_seen: None,
            last_tested: None,
        }
    }

    /// Apply one verdict to the persistent counters and status.
    pub fn record_verdict(
        &mut self,
        correct: bool,
        mastery_threshold: u32,
        demote_on_miss: bool,
        now: DateTime<Utc>,
    ) {
        if correct {
            self.correct_count += 1;
            if self.correct_count >= mastery_threshold {
                self.status = WordStatus::Mastered;
            } else if self.status == WordStatus::New {
                self.status = WordStatus::Learning;
            }
        } else {
            self.incorrect_count += 1;
            if self.status == WordStatus::Mastered && demote_on_miss {
                self.status = WordStatus::Learning;
            }
        }
        self.last_seen = Some(now);
        self.last_tested = Some(now);
    }
}

/// Canonical display form of a word: trimmed and lowercased.
pub fn canonical_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Session-scoped progress for one word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWordProgress {
    /// Correct answers this session. Not reset by a miss.
    pub correct: u32,
    pub attempts: u32,
}

/// Result of evaluating one transcript against a target word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub transcript: String,
    /// Collaborator-supplied, informational only.
    pub confidence: f32,
    pub is_match: bool,
}

/// Per-learner practice settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerSettings {
    pub mastery_threshold: u32,
    pub timer_ticks: u32,
    pub demote_on_miss: bool,
    pub feedback_ticks_correct: u32,
    pub feedback_ticks_incorrect: u32,
}

impl Default for LearnerSettings {
    fn default() -> Self {
        Self {
            mastery_threshold: 3,
            timer_ticks: 7,
            demote_on_miss: false,
            feedback_ticks_correct: 1,
            feedback_ticks_incorrect: 3,
        }
    }
}

impl LearnerSettings {
    /// Clamp values into their usable ranges.
    pub fn sanitized(self) -> Self {
        Self {
            mastery_threshold: self.mastery_threshold.max(1),
            timer_ticks: self.timer_ticks.max(1),
            ..self
        }
    }
}

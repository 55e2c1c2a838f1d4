//! API request and response types

use serde::{Deserialize, Serialize};

// Re-export shared types from practice-core
pub use practice_core::{
    LearnerSettings, MatchResult, MatchVerdict, SessionEvent, SessionSnapshot, Word, WordStatus,
};

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub speech_recognition: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchRequest {
    pub spoken: String,
    pub target: String,
}

// Word types
#[derive(Debug, Serialize, Deserialize)]
pub struct AddWordsRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddWordsResponse {
    pub added: Vec<Word>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordListResponse {
    pub words: Vec<Word>,
}

// Settings types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub mastery_threshold: Option<u32>,
    pub timer_ticks: Option<u32>,
    pub demote_on_miss: Option<bool>,
    pub feedback_ticks_correct: Option<u32>,
    pub feedback_ticks_incorrect: Option<u32>,
}

impl UpdateSettingsRequest {
    /// Apply the provided fields on top of `current`.
    pub fn apply(&self, current: LearnerSettings) -> LearnerSettings {
        LearnerSettings {
            mastery_threshold: self.mastery_threshold.unwrap_or(current.mastery_threshold),
            timer_ticks: self.timer_ticks.unwrap_or(current.timer_ticks),
            demote_on_miss: self.demote_on_miss.unwrap_or(current.demote_on_miss),
            feedback_ticks_correct: self
                .feedback_ticks_correct
                .unwrap_or(current.feedback_ticks_correct),
            feedback_ticks_incorrect: self
                .feedback_ticks_incorrect
                .unwrap_or(current.feedback_ticks_incorrect),
        }
        .sanitized()
    }
}

// Session types
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub snapshot: SessionSnapshot,
    /// What happened as a result of the request.
    pub events: Vec<SessionEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerdictRequest {
    pub correct: bool,
    /// Presentation the verdict belongs to; defaults to the current one.
    pub presentation: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptRequest {
    pub text: String,
    pub confidence: Option<f32>,
    pub presentation: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    /// Absent when no word is being presented.
    pub verdict: Option<MatchVerdict>,
    pub session: SessionResponse,
}

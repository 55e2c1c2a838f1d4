//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

use word_practice_backend::models::LearnerSettings;

/// Default settings with the given mastery threshold.
pub fn settings(mastery_threshold: u32) -> LearnerSettings {
    LearnerSettings {
        mastery_threshold,
        ..Default::default()
    }
}

/// Request body for adding words.
pub fn add_words_request(words: &[&str]) -> Value {
    json!({ "words": words })
}

/// Request body for a manual verdict.
pub fn verdict_request(correct: bool, presentation: Option<u64>) -> Value {
    match presentation {
        Some(p) => json!({ "correct": correct, "presentation": p }),
        None => json!({ "correct": correct }),
    }
}

/// Request body for a speech transcript.
pub fn transcript_request(text: &str) -> Value {
    json!({ "text": text, "confidence": 0.9 })
}

/// Current word text from a session response.
pub fn current_word(body: &Value) -> Option<String> {
    body["snapshot"]["current_word"]["text"]
        .as_str()
        .map(str::to_string)
}

/// Event names from a session response, in order.
pub fn event_names(body: &Value) -> Vec<String> {
    body["events"]
        .as_array()
        .map(|events| {
            events
                .iter()
                .filter_map(|e| e["event"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

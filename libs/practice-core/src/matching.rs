//! Spoken and typed answer matching.
//!
//! A transcript counts as a correct reading of the target when any of these
//! rules holds, tried in order:
//! 1. exact match after normalization
//! 2. the transcript is a homophone of the target
//! 3. one whitespace-separated token equals the target
//! 4. one token is a homophone of the target
//! 5. Levenshtein distance within `max(1, floor(len * 0.35))`

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::homophones::HomophoneTable;
use crate::types::MatchVerdict;

/// Characters removed before comparing.
const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', '\'', '"'];

/// Tolerated edits per target character, in percent.
const FUZZY_TOLERANCE_PERCENT: usize = 35;

/// Rule that accepted a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchRule {
    Exact,
    Homophone,
    Token,
    TokenHomophone,
    Fuzzy { distance: usize },
}

/// Result of comparing a transcript to a target word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the transcript is accepted.
    pub is_match: bool,
    /// The rule that accepted it, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<MatchRule>,
    /// Normalized transcript (for display).
    pub spoken_normalized: String,
    /// Normalized target (for display).
    pub target_normalized: String,
}

/// Decides whether a transcript is a reading of a target word.
#[derive(Debug, Clone, Default)]
pub struct MatchEvaluator {
    homophones: HomophoneTable,
}

impl MatchEvaluator {
    pub fn new(homophones: HomophoneTable) -> Self {
        Self { homophones }
    }

    /// Evaluator with the built-in homophone table.
    pub fn builtin() -> Self {
        Self::new(HomophoneTable::builtin())
    }

    /// Process-wide evaluator, built on first use.
    pub fn shared() -> &'static MatchEvaluator {
        static SHARED: OnceLock<MatchEvaluator> = OnceLock::new();
        SHARED.get_or_init(MatchEvaluator::builtin)
    }

    pub fn homophones(&self) -> &HomophoneTable {
        &self.homophones
    }

    /// Whether `spoken` counts as a reading of `target`.
    pub fn evaluate(&self, spoken: &str, target: &str) -> bool {
        self.evaluate_detailed(spoken, target).is_match
    }

    /// Evaluate and report which rule matched.
    pub fn evaluate_detailed(&self, spoken: &str, target: &str) -> MatchResult {
        let spoken_normalized = normalize(spoken);
        let target_normalized = normalize(target);
        let rule = self.find_rule(&spoken_normalized, &target_normalized);

        MatchResult {
            is_match: rule.is_some(),
            rule,
            spoken_normalized,
            target_normalized,
        }
    }

    /// Package a collaborator transcript as a verdict.
    pub fn verdict(&self, transcript: &str, target: &str, confidence: f32) -> MatchVerdict {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        MatchVerdict {
            transcript: transcript.to_string(),
            confidence,
            is_match: self.evaluate(transcript, target),
        }
    }

    fn find_rule(&self, spoken: &str, target: &str) -> Option<MatchRule> {
        if spoken == target {
            return Some(MatchRule::Exact);
        }
        if self.homophones.are_normalized_homophones(spoken, target) {
            return Some(MatchRule::Homophone);
        }
        if spoken.split_whitespace().any(|token| token == target) {
            return Some(MatchRule::Token);
        }
        if spoken
            .split_whitespace()
            .any(|token| self.homophones.are_normalized_homophones(token, target))
        {
            return Some(MatchRule::TokenHomophone);
        }

        let distance = levenshtein_distance(spoken, target);
        if distance <= max_edit_distance(target) {
            return Some(MatchRule::Fuzzy { distance });
        }
        None
    }
}

/// Evaluate with the shared built-in evaluator.
pub fn evaluate(spoken: &str, target: &str) -> bool {
    MatchEvaluator::shared().evaluate(spoken, target)
}

/// Strip punctuation, trim and lowercase.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Edits tolerated for a target; never zero.
pub fn max_edit_distance(target: &str) -> usize {
    let len = target.chars().count();
    (len * FUZZY_TOLERANCE_PERCENT / 100).max(1)
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

//! Practice session scheduler.
//!
//! A session owns the queue of words still to be practiced and moves through
//! these states:
//! - Presenting: the head of the queue is shown and its countdown runs
//! - Feedback: a verdict was recorded; the queue advances once the feedback
//!   delay elapses or [`Session::advance`] is called
//! - Paused: countdown and feedback delay are frozen
//! - Complete: every word reached the mastery threshold this session
//!
//! Time is measured in logical ticks supplied by the host through
//! [`Session::tick`]. Input arriving outside Presenting, or for a presentation
//! that is no longer current, is dropped without changing anything.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{LearnerSettings, SessionWordProgress, Word};

/// Furthest queue position a requeued word is inserted at.
const REINSERT_OFFSET: usize = 3;

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SessionState {
    Presenting,
    Feedback { correct: bool },
    Paused,
    Complete,
}

/// Something the host has to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SessionEvent {
    /// A new word is current. The host speaks it once.
    WordPresented {
        presentation: u64,
        word_id: Uuid,
        text: String,
    },
    /// A verdict changed a word's persistent counters. The host saves `word`.
    VerdictRecorded {
        word: Word,
        correct: bool,
        timed_out: bool,
    },
    /// The word reached the mastery threshold within this session.
    WordMastered { word_id: Uuid },
    QueueReshuffled,
    Completed { mastered: usize, total: usize },
    Paused,
    Resumed,
    Restarted,
}

/// Word currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWord {
    pub id: Uuid,
    pub text: String,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    pub presentation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_word: Option<CurrentWord>,
    pub time_remaining: u32,
    pub mastered_count: usize,
    pub total_count: usize,
    pub queue_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Presenting,
    Feedback { correct: bool, ticks_left: u32 },
    Complete,
}

/// One learner's active practice session.
pub struct Session<R: Rng = StdRng> {
    settings: LearnerSettings,
    words: HashMap<Uuid, Word>,
    eligible: Vec<Uuid>,
    progress: HashMap<Uuid, SessionWordProgress>,
    queue: VecDeque<Uuid>,
    mastered: HashSet<Uuid>,
    phase: Phase,
    paused: bool,
    time_remaining: u32,
    presentation: u64,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// Start a session over the eligible words (status new or learning).
    ///
    /// Returns the session together with the events of the first
    /// presentation, or [`EngineError::EmptySession`] when nothing is left
    /// to practice.
    pub fn start(
        words: Vec<Word>,
        settings: LearnerSettings,
        rng: R,
    ) -> Result<(Self, Vec<SessionEvent>), EngineError> {
        let settings = settings.sanitized();
        let mut eligible = Vec::new();
        let mut by_id = HashMap::new();
        for word in words.into_iter().filter(|w| w.status.is_eligible()) {
            if by_id.contains_key(&word.id) {
                continue;
            }
            eligible.push(word.id);
            by_id.insert(word.id, word);
        }

        if eligible.is_empty() {
            return Err(EngineError::EmptySession);
        }

        let mut session = Self {
            settings,
            words: by_id,
            eligible,
            progress: HashMap::new(),
            queue: VecDeque::new(),
            mastered: HashSet::new(),
            phase: Phase::Presenting,
            paused: false,
            time_remaining: settings.timer_ticks,
            presentation: 0,
            rng,
        };
        session.reset_round();
        info!(words = session.eligible.len(), "practice session started");

        let events = session.present();
        Ok((session, events))
    }

    /// Submit a verdict for the word currently presented.
    pub fn submit_verdict(&mut self, correct: bool, now: DateTime<Utc>) -> Vec<SessionEvent> {
        self.submit_verdict_for(self.presentation, correct, now)
    }

    /// Submit a verdict that originated from a specific presentation.
    ///
    /// Verdicts for an earlier presentation, or arriving while not
    /// presenting, are dropped.
    pub fn submit_verdict_for(
        &mut self,
        presentation: u64,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Vec<SessionEvent> {
        if self.paused || self.phase != Phase::Presenting || presentation != self.presentation {
            debug!(
                presentation,
                current = self.presentation,
                "dropping stale verdict"
            );
            return Vec::new();
        }
        self.record(correct, false, now)
    }

    /// Advance time by one tick.
    ///
    /// While presenting this runs the countdown, and expiry counts as an
    /// incorrect answer. During feedback it runs the feedback delay.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<SessionEvent> {
        if self.paused {
            return Vec::new();
        }
        match self.phase {
            Phase::Presenting => {
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.time_remaining == 0 {
                    debug!(presentation = self.presentation, "countdown expired");
                    self.record(false, true, now)
                } else {
                    Vec::new()
                }
            }
            Phase::Feedback { correct, ticks_left } => {
                let ticks_left = ticks_left.saturating_sub(1);
                if ticks_left == 0 {
                    self.finish_feedback()
                } else {
                    self.phase = Phase::Feedback {
                        correct,
                        ticks_left,
                    };
                    Vec::new()
                }
            }
            Phase::Complete => Vec::new(),
        }
    }

    /// Skip the rest of the feedback delay.
    pub fn advance(&mut self) -> Vec<SessionEvent> {
        if self.paused || !matches!(self.phase, Phase::Feedback { .. }) {
            return Vec::new();
        }
        self.finish_feedback()
    }

    pub fn pause(&mut self) -> Vec<SessionEvent> {
        if self.paused || self.phase == Phase::Complete {
            return Vec::new();
        }
        self.paused = true;
        debug!(time_remaining = self.time_remaining, "session paused");
        vec![SessionEvent::Paused]
    }

    pub fn resume(&mut self) -> Vec<SessionEvent> {
        if !self.paused {
            return Vec::new();
        }
        self.paused = false;
        debug!(time_remaining = self.time_remaining, "session resumed");
        vec![SessionEvent::Resumed]
    }

    /// Practice the same words again after completion.
    ///
    /// Session counts start over; the words' persistent counters are kept.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        if self.phase != Phase::Complete {
            return Vec::new();
        }
        self.paused = false;
        self.reset_round();
        info!(words = self.eligible.len(), "practice session restarted");

        let mut events = vec![SessionEvent::Restarted];
        events.extend(self.present());
        events
    }

    pub fn state(&self) -> SessionState {
        if self.paused {
            return SessionState::Paused;
        }
        match self.phase {
            Phase::Presenting => SessionState::Presenting,
            Phase::Feedback { correct, .. } => SessionState::Feedback { correct },
            Phase::Complete => SessionState::Complete,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            presentation: self.presentation,
            current_word: self.current_word(),
            time_remaining: self.time_remaining,
            mastered_count: self.mastered.len(),
            total_count: self.eligible.len(),
            queue_len: self.queue.len(),
        }
    }

    pub fn current_word(&self) -> Option<CurrentWord> {
        if self.phase == Phase::Complete {
            return None;
        }
        let id = self.queue.front()?;
        self.words.get(id).map(|w| CurrentWord {
            id: w.id,
            text: w.text.clone(),
        })
    }

    pub fn presentation(&self) -> u64 {
        self.presentation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn settings(&self) -> &LearnerSettings {
        &self.settings
    }

    /// Working copy of a word, including counters updated this session.
    pub fn word(&self, id: Uuid) -> Option<&Word> {
        self.words.get(&id)
    }

    pub fn progress(&self, id: Uuid) -> Option<SessionWordProgress> {
        self.progress.get(&id).copied()
    }

    /// Word ids awaiting presentation, head first.
    pub fn queue(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.queue.iter().copied()
    }

    pub fn is_mastered_this_session(&self, id: Uuid) -> bool {
        self.mastered.contains(&id)
    }

    fn reset_round(&mut self) {
        self.mastered.clear();
        self.progress = self
            .eligible
            .iter()
            .map(|id| (*id, SessionWordProgress::default()))
            .collect();
        let mut order = self.eligible.clone();
        order.shuffle(&mut self.rng);
        self.queue = order.into();
    }

    fn present(&mut self) -> Vec<SessionEvent> {
        self.phase = Phase::Presenting;
        self.time_remaining = self.settings.timer_ticks;
        self.presentation += 1;

        let Some(word) = self.queue.front().and_then(|id| self.words.get(id)) else {
            return Vec::new();
        };
        debug!(presentation = self.presentation, word = %word.text, "presenting word");
        vec![SessionEvent::WordPresented {
            presentation: self.presentation,
            word_id: word.id,
            text: word.text.clone(),
        }]
    }

    fn record(&mut self, correct: bool, timed_out: bool, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let Some(id) = self.queue.front().copied() else {
            return Vec::new();
        };

        let progress = self.progress.entry(id).or_default();
        progress.attempts += 1;
        if correct {
            progress.correct += 1;
        }

        let Some(word) = self.words.get_mut(&id) else {
            return Vec::new();
        };
        word.record_verdict(
            correct,
            self.settings.mastery_threshold,
            self.settings.demote_on_miss,
            now,
        );
        debug!(word = %word.text, correct, timed_out, status = word.status.as_str(), "verdict recorded");

        let ticks_left = if correct {
            self.settings.feedback_ticks_correct
        } else {
            self.settings.feedback_ticks_incorrect
        };
        self.phase = Phase::Feedback {
            correct,
            ticks_left,
        };

        let mut events = vec![SessionEvent::VerdictRecorded {
            word: word.clone(),
            correct,
            timed_out,
        }];
        if ticks_left == 0 {
            events.extend(self.finish_feedback());
        }
        events
    }

    fn finish_feedback(&mut self) -> Vec<SessionEvent> {
        let Some(id) = self.queue.pop_front() else {
            return Vec::new();
        };
        let mut events = Vec::new();

        let session_correct = self.progress.get(&id).map_or(0, |p| p.correct);
        if session_correct >= self.settings.mastery_threshold {
            self.mastered.insert(id);
            events.push(SessionEvent::WordMastered { word_id: id });

            if self.mastered.len() == self.eligible.len() {
                self.phase = Phase::Complete;
                self.queue.clear();
                info!(mastered = self.mastered.len(), "practice session complete");
                events.push(SessionEvent::Completed {
                    mastered: self.mastered.len(),
                    total: self.eligible.len(),
                });
                return events;
            }

            if self.queue.is_empty() {
                let mut remaining: Vec<Uuid> = self
                    .eligible
                    .iter()
                    .copied()
                    .filter(|id| !self.mastered.contains(id))
                    .collect();
                remaining.shuffle(&mut self.rng);
                self.queue = remaining.into();
                events.push(SessionEvent::QueueReshuffled);
            } else {
                self.queue.retain(|queued| *queued != id);
            }
        } else {
            let position = self.queue.len().min(REINSERT_OFFSET);
            self.queue.insert(position, id);
        }

        events.extend(self.present());
        events
    }
}

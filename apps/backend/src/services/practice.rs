//! Practice session hosting.
//!
//! Each learner has at most one active session. A background ticker maps one
//! logical tick to the configured wall-clock interval; every request and tick
//! writes verdicts back to the word store, marks presented words as seen and
//! speaks them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use practice_core::{
    LearnerSettings, MatchEvaluator, Session, SessionEvent, SpeechSynthesizer, StoreError,
    WordStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{SessionResponse, TranscriptResponse};

type SharedSession = Arc<Mutex<Session>>;

/// A learner's session and the task ticking it.
struct ActiveSession {
    session: SharedSession,
    ticker: JoinHandle<()>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

/// Hosts practice sessions for all learners.
pub struct PracticeService {
    store: Arc<dyn WordStore>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    evaluator: Arc<MatchEvaluator>,
    tick_interval: Duration,
    settings: RwLock<HashMap<Uuid, LearnerSettings>>,
    sessions: Mutex<HashMap<Uuid, ActiveSession>>,
}

impl PracticeService {
    pub fn new(
        store: Arc<dyn WordStore>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        evaluator: Arc<MatchEvaluator>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            synthesizer,
            evaluator,
            tick_interval,
            settings: RwLock::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn settings(&self, learner_id: Uuid) -> LearnerSettings {
        self.settings
            .read()
            .await
            .get(&learner_id)
            .copied()
            .unwrap_or_default()
    }

    /// Replace a learner's settings. Applies to the next session.
    pub async fn save_settings(&self, learner_id: Uuid, settings: LearnerSettings) -> LearnerSettings {
        let settings = settings.sanitized();
        self.settings.write().await.insert(learner_id, settings);
        settings
    }

    /// Start a new session, replacing any active one.
    pub async fn start(&self, learner_id: Uuid) -> Result<SessionResponse> {
        let words = self.store.load_eligible_words(learner_id)?;
        let settings = self.settings(learner_id).await;

        let (session, events) = Session::start(words, settings, StdRng::from_entropy())?;
        self.apply_events(&events)?;

        let session = Arc::new(Mutex::new(session));
        let ticker = self.spawn_ticker(learner_id, session.clone());
        let snapshot = session.lock().await.snapshot();

        let previous = self
            .sessions
            .lock()
            .await
            .insert(learner_id, ActiveSession { session, ticker });
        if previous.is_some() {
            tracing::info!("Replaced active session for learner {}", learner_id);
        }

        Ok(SessionResponse { snapshot, events })
    }

    /// End the learner's session.
    pub async fn end(&self, learner_id: Uuid) -> Result<()> {
        self.sessions
            .lock()
            .await
            .remove(&learner_id)
            .map(|_| ())
            .ok_or_else(|| no_session(learner_id))
    }

    pub async fn snapshot(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, |_| Vec::new()).await
    }

    pub async fn verdict(
        &self,
        learner_id: Uuid,
        correct: bool,
        presentation: Option<u64>,
    ) -> Result<SessionResponse> {
        self.with_session(learner_id, |session| {
            let presentation = presentation.unwrap_or_else(|| session.presentation());
            session.submit_verdict_for(presentation, correct, Utc::now())
        })
        .await
    }

    /// Evaluate a transcript against the current word. A match counts as a
    /// correct verdict; a miss leaves the session untouched.
    pub async fn transcript(
        &self,
        learner_id: Uuid,
        text: &str,
        confidence: f32,
        presentation: Option<u64>,
    ) -> Result<TranscriptResponse> {
        let mut verdict = None;
        let session = self
            .with_session(learner_id, |session| {
                let Some(current) = session.current_word() else {
                    return Vec::new();
                };
                let result = self.evaluator.verdict(text, &current.text, confidence);
                let is_match = result.is_match;
                verdict = Some(result);
                if !is_match {
                    return Vec::new();
                }
                let presentation = presentation.unwrap_or_else(|| session.presentation());
                session.submit_verdict_for(presentation, true, Utc::now())
            })
            .await?;

        Ok(TranscriptResponse { verdict, session })
    }

    pub async fn tick(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, |session| session.tick(Utc::now()))
            .await
    }

    pub async fn advance(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, Session::advance).await
    }

    pub async fn pause(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, Session::pause).await
    }

    pub async fn resume(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, Session::resume).await
    }

    pub async fn restart(&self, learner_id: Uuid) -> Result<SessionResponse> {
        self.with_session(learner_id, Session::restart).await
    }

    async fn with_session<F>(&self, learner_id: Uuid, f: F) -> Result<SessionResponse>
    where
        F: FnOnce(&mut Session) -> Vec<SessionEvent>,
    {
        let shared = self
            .sessions
            .lock()
            .await
            .get(&learner_id)
            .map(|active| active.session.clone())
            .ok_or_else(|| no_session(learner_id))?;

        let mut session = shared.lock().await;
        let events = f(&mut *session);
        self.apply_events(&events)?;

        Ok(SessionResponse {
            snapshot: session.snapshot(),
            events,
        })
    }

    fn apply_events(&self, events: &[SessionEvent]) -> std::result::Result<(), StoreError> {
        apply_events(events, self.store.as_ref(), self.synthesizer.as_ref())
    }

    fn spawn_ticker(&self, learner_id: Uuid, session: SharedSession) -> JoinHandle<()> {
        let store = self.store.clone();
        let synthesizer = self.synthesizer.clone();
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let events = session.lock().await.tick(Utc::now());
                if apply_events(&events, store.as_ref(), synthesizer.as_ref()).is_err() {
                    tracing::warn!("Tick for learner {} was not fully persisted", learner_id);
                }
            }
        })
    }
}

/// Persist recorded verdicts, mark and speak presented words.
///
/// Every event is applied even when a write fails; the first failure is
/// returned afterwards.
fn apply_events(
    events: &[SessionEvent],
    store: &dyn WordStore,
    synthesizer: &dyn SpeechSynthesizer,
) -> std::result::Result<(), StoreError> {
    let now = Utc::now();
    let mut first_error = None;

    for event in events {
        let result = match event {
            SessionEvent::VerdictRecorded { word, .. } => store.save_word(word),
            SessionEvent::WordPresented { word_id, text, .. } => {
                synthesizer.speak(text);
                store.mark_seen(*word_id, now)
            }
            SessionEvent::Completed { mastered, total } => {
                tracing::info!("Session complete: {}/{} words mastered", mastered, total);
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist session event: {}", e);
            first_error.get_or_insert(e);
        }
    }

    first_error.map_or(Ok(()), Err)
}

fn no_session(learner_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("No active session for learner {}", learner_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use practice_core::{MemoryWordStore, Word, WordStatus};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSynthesizer {
        spoken: StdMutex<Vec<String>>,
    }

    impl SpeechSynthesizer for RecordingSynthesizer {
        fn speak(&self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    /// Serves a fixed word list and refuses every write.
    struct ReadOnlyStore {
        words: Vec<Word>,
    }

    impl WordStore for ReadOnlyStore {
        fn load_eligible_words(&self, _learner_id: Uuid) -> std::result::Result<Vec<Word>, StoreError> {
            Ok(self.words.clone())
        }

        fn save_word(&self, _word: &Word) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("read only".to_string()))
        }

        fn mark_seen(&self, _word_id: Uuid, _at: chrono::DateTime<Utc>) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    fn service(store: Arc<dyn WordStore>, synthesizer: Arc<RecordingSynthesizer>) -> PracticeService {
        PracticeService::new(
            store,
            synthesizer,
            Arc::new(MatchEvaluator::builtin()),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn start_without_words_reports_empty_session() {
        let service = service(Arc::new(MemoryWordStore::new()), Arc::default());
        let result = service.start(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::EmptySession)));
    }

    #[tokio::test]
    async fn presented_words_are_spoken_and_verdicts_saved() {
        let store = Arc::new(MemoryWordStore::new());
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let learner = Uuid::new_v4();
        store.add_words(learner, ["cat"], Utc::now()).unwrap();
        let service = service(store.clone(), synthesizer.clone());
        service
            .save_settings(
                learner,
                LearnerSettings {
                    mastery_threshold: 1,
                    ..Default::default()
                },
            )
            .await;

        service.start(learner).await.unwrap();
        assert_eq!(*synthesizer.spoken.lock().unwrap(), vec!["cat".to_string()]);

        let response = service.transcript(learner, "the cat", 0.8, None).await.unwrap();
        assert!(response.verdict.unwrap().is_match);

        let words = store.list_words(learner).unwrap();
        assert_eq!(words[0].correct_count, 1);
        assert_eq!(words[0].status, WordStatus::Mastered);
    }

    #[tokio::test]
    async fn unmatched_transcript_changes_nothing() {
        let store = Arc::new(MemoryWordStore::new());
        let learner = Uuid::new_v4();
        store.add_words(learner, ["cat"], Utc::now()).unwrap();
        let service = service(store.clone(), Arc::default());
        service.start(learner).await.unwrap();

        let response = service.transcript(learner, "dog", 0.8, None).await.unwrap();
        assert!(!response.verdict.unwrap().is_match);
        assert!(response.session.events.is_empty());
        assert_eq!(store.list_words(learner).unwrap()[0].incorrect_count, 0);
    }

    #[tokio::test]
    async fn presented_word_is_marked_seen_without_an_answer() {
        let store = Arc::new(MemoryWordStore::new());
        let learner = Uuid::new_v4();
        let added_at = Utc::now() - ChronoDuration::hours(1);
        store.add_words(learner, ["cat"], added_at).unwrap();
        let service = service(store.clone(), Arc::default());

        service.start(learner).await.unwrap();
        service.pause(learner).await.unwrap();
        service.end(learner).await.unwrap();

        let word = &store.list_words(learner).unwrap()[0];
        assert!(word.last_seen.is_some_and(|seen| seen > added_at));
        assert_eq!(word.last_tested, None);
    }

    #[tokio::test]
    async fn failed_save_still_speaks_next_word() {
        let learner = Uuid::new_v4();
        let words = vec![
            Word::new(learner, "cat", Utc::now()),
            Word::new(learner, "dog", Utc::now()),
        ];
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let service = service(Arc::new(ReadOnlyStore { words }), synthesizer.clone());
        service
            .save_settings(
                learner,
                LearnerSettings {
                    mastery_threshold: 1,
                    feedback_ticks_correct: 0,
                    ..Default::default()
                },
            )
            .await;
        service.start(learner).await.unwrap();

        let result = service.verdict(learner, true, None).await;

        assert!(matches!(result, Err(ApiError::Store(StoreError::Unavailable(_)))));
        assert_eq!(synthesizer.spoken.lock().unwrap().len(), 2);
        let snapshot = service.snapshot(learner).await.unwrap().snapshot;
        assert_eq!(snapshot.presentation, 2);
        assert_eq!(snapshot.mastered_count, 1);
    }

    #[tokio::test]
    async fn ending_a_session_twice_is_not_found() {
        let store = Arc::new(MemoryWordStore::new());
        let learner = Uuid::new_v4();
        store.add_words(learner, ["cat"], Utc::now()).unwrap();
        let service = service(store, Arc::default());
        service.start(learner).await.unwrap();

        tokio_test::assert_ok!(service.end(learner).await);
        assert!(matches!(service.end(learner).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.snapshot(learner).await, Err(ApiError::NotFound(_))));
    }
}

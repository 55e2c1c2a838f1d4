//! Adaptive word-practice engine.
//!
//! Provides:
//! - Spoken/typed answer matching (normalization, homophones, edit distance)
//! - Practice session scheduler with promotion, demotion and requeueing
//! - Word-progress store contract with an in-memory implementation
//! - Speech collaborator contracts and a supervised listener task
//! - Shared types (Word, WordStatus, LearnerSettings, etc.)

pub mod error;
pub mod homophones;
pub mod matching;
pub mod session;
pub mod speech;
pub mod store;
pub mod types;

pub use error::{EngineError, StoreError};
pub use homophones::HomophoneTable;
pub use matching::{evaluate, levenshtein_distance, normalize, MatchEvaluator, MatchResult, MatchRule};
pub use session::{CurrentWord, Session, SessionEvent, SessionSnapshot, SessionState};
pub use speech::{
    spawn_listener, ListenTarget, ListenerEvent, ListenerHandle, RecognitionEvent,
    SpeechRecognizer, SpeechSynthesizer,
};
pub use store::{MemoryWordStore, WordStore};
pub use types::{LearnerSettings, MatchVerdict, SessionWordProgress, Word, WordStatus};

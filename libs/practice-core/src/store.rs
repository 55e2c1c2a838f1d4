//! Word-progress store contract.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{canonical_text, Word};

/// Persistent home of a learner's words.
pub trait WordStore: Send + Sync {
    /// Words with status new or learning.
    fn load_eligible_words(&self, learner_id: Uuid) -> Result<Vec<Word>, StoreError>;

    /// Insert or replace a word by id.
    fn save_word(&self, word: &Word) -> Result<(), StoreError>;

    /// Record that a word was shown to the learner.
    fn mark_seen(&self, word_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// In-memory store, keyed by word id.
#[derive(Debug, Default)]
pub struct MemoryWordStore {
    words: Mutex<HashMap<Uuid, Word>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add words for a learner, skipping blanks and texts the learner already has.
    ///
    /// Returns the words actually added.
    pub fn add_words<I, S>(
        &self,
        learner_id: Uuid,
        texts: I,
        now: DateTime<Utc>,
    ) -> Result<Vec<Word>, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = self.lock()?;
        let mut added = Vec::new();
        for text in texts {
            let text = canonical_text(text.as_ref());
            if text.is_empty() {
                continue;
            }
            let exists = words
                .values()
                .any(|w| w.learner_id == learner_id && w.text == text);
            if exists {
                continue;
            }
            let word = Word::new(learner_id, &text, now);
            words.insert(word.id, word.clone());
            added.push(word);
        }
        Ok(added)
    }

    /// All of a learner's words, ordered by text.
    pub fn list_words(&self, learner_id: Uuid) -> Result<Vec<Word>, StoreError> {
        let words = self.lock()?;
        let mut list: Vec<Word> = words
            .values()
            .filter(|w| w.learner_id == learner_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.text.cmp(&b.text));
        Ok(list)
    }

    pub fn get_word(&self, id: Uuid) -> Result<Word, StoreError> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or(StoreError::WordNotFound(id))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Word>>, StoreError> {
        self.words
            .lock()
            .map_err(|_| StoreError::Unavailable("word store lock poisoned".to_string()))
    }
}

impl WordStore for MemoryWordStore {
    fn load_eligible_words(&self, learner_id: Uuid) -> Result<Vec<Word>, StoreError> {
        Ok(self
            .list_words(learner_id)?
            .into_iter()
            .filter(|w| w.status.is_eligible())
            .collect())
    }

    fn save_word(&self, word: &Word) -> Result<(), StoreError> {
        self.lock()?.insert(word.id, word.clone());
        Ok(())
    }

    fn mark_seen(&self, word_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut words = self.lock()?;
        let word = words
            .get_mut(&word_id)
            .ok_or(StoreError::WordNotFound(word_id))?;
        word.last_seen = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_words_skips_duplicates_and_blanks() {
        let store = MemoryWordStore::new();
        let learner = Uuid::new_v4();
        let added = store
            .add_words(learner, ["Cat", "dog", " cat ", ""], Utc::now())
            .unwrap();
        assert_eq!(added.len(), 2);

        let texts: Vec<String> = store
            .list_words(learner)
            .unwrap()
            .into_iter()
            .map(|w| w.text)
            .collect();
        assert_eq!(texts, vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn learners_are_isolated() {
        let store = MemoryWordStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.add_words(a, ["cat"], Utc::now()).unwrap();
        store.add_words(b, ["cat"], Utc::now()).unwrap();
        assert_eq!(store.list_words(a).unwrap().len(), 1);
        assert_eq!(store.load_eligible_words(b).unwrap().len(), 1);
    }

    #[test]
    fn mastered_words_are_not_eligible() {
        let store = MemoryWordStore::new();
        let learner = Uuid::new_v4();
        let mut added = store.add_words(learner, ["cat", "dog"], Utc::now()).unwrap();
        added[0].status = WordStatus::Mastered;
        store.save_word(&added[0]).unwrap();

        let eligible = store.load_eligible_words(learner).unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, added[1].id);
        assert_eq!(store.get_word(added[0].id).unwrap().status, WordStatus::Mastered);
    }

    #[test]
    fn mark_seen_stamps_only_last_seen() {
        let store = MemoryWordStore::new();
        let learner = Uuid::new_v4();
        let added = store.add_words(learner, ["cat"], Utc::now()).unwrap();
        let seen_at = Utc::now();

        store.mark_seen(added[0].id, seen_at).unwrap();

        let word = store.get_word(added[0].id).unwrap();
        assert_eq!(word.last_seen, Some(seen_at));
        assert_eq!(word.last_tested, None);
        assert_eq!(word.status, WordStatus::New);
        assert!(matches!(
            store.mark_seen(Uuid::new_v4(), seen_at),
            Err(StoreError::WordNotFound(_))
        ));
    }

    #[test]
    fn missing_word_is_reported() {
        let store = MemoryWordStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get_word(id), Err(StoreError::WordNotFound(missing)) if missing == id));
    }
}

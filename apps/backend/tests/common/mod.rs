//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wrapping an in-memory application and test server
//! - Helper functions for creating learners and words
//! - Path helpers for learner routes

#![allow(dead_code)]

pub mod fixtures;

use std::time::Duration;

use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use word_practice_backend::config::Config;
use word_practice_backend::models::{LearnerSettings, Word};
use word_practice_backend::{build_router, AppState};

/// Test context containing application state and test server.
///
/// The session ticker is set to an hour so tests drive time through the
/// tick endpoint.
pub struct TestContext {
    pub state: AppState,
    pub server: TestServer,
}

impl TestContext {
    /// Create a new test context with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config {
            tick_interval: Duration::from_secs(3600),
            ..Config::default()
        })
    }

    /// Create a new test context with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config);
        let server = TestServer::new(build_router(state.clone())).expect("Failed to build test server");
        Self { state, server }
    }

    /// Create a learner with the given words and settings.
    pub async fn create_learner(&self, words: &[&str], settings: LearnerSettings) -> Uuid {
        let learner_id = Uuid::new_v4();
        self.add_words(learner_id, words);
        self.state.practice.save_settings(learner_id, settings).await;
        learner_id
    }

    /// Add words directly to the store.
    pub fn add_words(&self, learner_id: Uuid, words: &[&str]) -> Vec<Word> {
        self.state
            .store
            .add_words(learner_id, words.iter().copied(), Utc::now())
            .expect("Failed to add words")
    }

    /// Read a learner's words directly from the store.
    pub fn words(&self, learner_id: Uuid) -> Vec<Word> {
        self.state
            .store
            .list_words(learner_id)
            .expect("Failed to list words")
    }

    /// Path for a learner route, e.g. `learner_path(id, "session/tick")`.
    pub fn learner_path(learner_id: Uuid, rest: &str) -> String {
        format!("/api/learners/{}/{}", learner_id, rest)
    }
}

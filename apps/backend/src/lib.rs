pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use practice_core::{MatchEvaluator, MemoryWordStore};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::practice::PracticeService;
use crate::services::speech::LogSynthesizer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<MemoryWordStore>,
    pub evaluator: Arc<MatchEvaluator>,
    pub practice: Arc<PracticeService>,
}

impl AppState {
    /// Build the state with an empty in-memory word store.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryWordStore::new());
        let evaluator = Arc::new(MatchEvaluator::builtin());
        let practice = PracticeService::new(
            store.clone(),
            Arc::new(LogSynthesizer),
            evaluator.clone(),
            config.tick_interval,
        );

        Self {
            config: Arc::new(config),
            store,
            evaluator,
            practice: Arc::new(practice),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Tick interval {:?}, speech recognition {}",
        config.tick_interval,
        if config.speech_recognition { "enabled" } else { "disabled" }
    );

    let addr = config.addr();
    let app = build_router(AppState::new(config));

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/capabilities", get(routes::matching::capabilities))
        .route("/api/match", post(routes::matching::evaluate))
        // Learner routes
        .route(
            "/api/learners/:learner_id/words",
            get(routes::words::list).post(routes::words::add),
        )
        .route(
            "/api/learners/:learner_id/settings",
            get(routes::settings::get).put(routes::settings::update),
        )
        // Session routes
        .route(
            "/api/learners/:learner_id/session",
            post(routes::session::start)
                .get(routes::session::snapshot)
                .delete(routes::session::end),
        )
        .route("/api/learners/:learner_id/session/verdict", post(routes::session::verdict))
        .route("/api/learners/:learner_id/session/transcript", post(routes::session::transcript))
        .route("/api/learners/:learner_id/session/tick", post(routes::session::tick))
        .route("/api/learners/:learner_id/session/advance", post(routes::session::advance))
        .route("/api/learners/:learner_id/session/pause", post(routes::session::pause))
        .route("/api/learners/:learner_id/session/resume", post(routes::session::resume))
        .route("/api/learners/:learner_id/session/restart", post(routes::session::restart))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

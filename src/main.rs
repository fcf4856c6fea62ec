//! NetShield Firewall Decision Service
//!
//! Evaluates network connections against user-defined security policies and
//! falls back to an anomaly-score heuristic when no policy gives a terminal
//! answer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      NETSHIELD SERVER                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │  API      │   │  Decision    │   │  Anomaly       │  │
//! │  │  (Axum)   │──▶│  Engine      │──▶│  Scorer        │  │
//! │  └───────────┘   └──────┬───────┘   └────────────────┘  │
//! │                         ▼                                │
//! │        ┌──────────────┐   ┌────────────────┐            │
//! │        │ Policy Store │   │ Connection Log │            │
//! │        └──────────────┘   └────────────────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod handlers;
mod models;
mod store;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::scorer::{HeuristicScorer, Scorer};
use store::{ConnectionLog, PolicyStore};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netshield_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("NetShield server starting...");
    if config.is_production() {
        tracing::info!("Running in production mode");
    }
    tracing::info!(
        "Thresholds: block > {}, alert >= {}",
        config.block_threshold,
        config.alert_threshold
    );

    let state = AppState {
        policies: Arc::new(PolicyStore::new()),
        connections: Arc::new(ConnectionLog::new()),
        scorer: Arc::new(HeuristicScorer::new()),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub policies: Arc<PolicyStore>,
    pub connections: Arc<ConnectionLog>,
    pub scorer: Arc<dyn Scorer>,
    pub config: config::Config,
}

#[cfg(test)]
impl AppState {
    /// State with empty stores and a fixed low-score stub scorer.
    pub fn for_tests() -> Self {
        Self::for_tests_with_scorer(Arc::new(engine::scorer::StubScorer(0.1)))
    }

    pub fn for_tests_with_scorer(scorer: Arc<dyn Scorer>) -> Self {
        Self {
            policies: Arc::new(PolicyStore::new()),
            connections: Arc::new(ConnectionLog::new()),
            scorer,
            config: config::Config::default(),
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        // Policies
        .route("/api/v1/policies", get(handlers::policies::list))
        .route("/api/v1/policies", post(handlers::policies::create))
        .route("/api/v1/policies/:id", get(handlers::policies::get))
        .route("/api/v1/policies/:id", put(handlers::policies::update))
        .route("/api/v1/policies/:id", delete(handlers::policies::delete))
        // Connections
        .route("/api/v1/connections", post(handlers::connections::submit))
        .route("/api/v1/connections/:id", get(handlers::connections::get))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

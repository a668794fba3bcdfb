//! HTTP server for the presubmit delta bot.
//!
//! This module implements the HTTP server that:
//! - Accepts GitHub webhook deliveries and processes pull request events
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::pipeline::PipelineConfig;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration for the event pipeline.
    pipeline: PipelineConfig,

    /// Serializes event processing: the scratch space is shared, so one
    /// event is fully processed before the next starts.
    event_lock: Mutex<()>,
}

impl AppState {
    /// Creates a new `AppState` with the given pipeline configuration.
    pub fn new(pipeline: PipelineConfig) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                pipeline,
                event_lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the pipeline configuration.
    pub fn pipeline(&self) -> &PipelineConfig {
        &self.inner.pipeline
    }

    /// Acquires the event-processing lock.
    pub async fn lock_events(&self) -> MutexGuard<'_, ()> {
        self.inner.event_lock.lock().await
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

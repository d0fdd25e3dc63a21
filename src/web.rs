use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;

use crate::job::{self, JobOutcome};
use crate::storage::ObjectStore;

pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct TriggerState<S> {
    pub store: Arc<S>,
    pub env: EnvLookup,
}

impl<S> Clone for TriggerState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            env: Arc::clone(&self.env),
        }
    }
}

impl<S> TriggerState<S> {
    /// State reading the live process environment on every request
    pub fn from_process_env(store: S) -> Self {
        Self {
            store: Arc::new(store),
            env: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }
}

pub fn router<S>(state: TriggerState<S>) -> Router
where
    S: ObjectStore + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(trigger::<S>).post(trigger::<S>))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn trigger<S>(State(state): State<TriggerState<S>>) -> (StatusCode, Json<JobOutcome>)
where
    S: ObjectStore + Send + Sync + 'static,
{
    let env = Arc::clone(&state.env);
    let outcome = job::handle_trigger(move |name: &str| env(name), state.store.as_ref()).await;
    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn run<S>(port: u16, state: TriggerState<S>) -> Result<()>
where
    S: ObjectStore + Send + Sync + 'static,
{
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Trigger server running at http://localhost:{}", port);
    axum::serve(listener, router(state))
        .await
        .context("Trigger server stopped")?;
    Ok(())
}

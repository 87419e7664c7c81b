pub mod comments;
pub mod convert;
pub mod error;
pub mod extract;
pub mod likes;
pub mod posts;
pub mod routes;
pub mod tips;
pub mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::error;

use plaza_db::{Database, Inserted};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

/// 201 for a new row, 200 when the event had already been ingested.
pub(crate) fn ingest_status(outcome: &Inserted) -> StatusCode {
    if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

use std::sync::Arc;

use axum::{extract::State as Extract, http::Uri, Json};
use tracing::debug;

use super::{error::AppError, state::State};
use crate::visitors::VisitorsResponse;

pub async fn visitors_get_handler(Extract(state): Extract<Arc<State>>) -> Json<VisitorsResponse> {
    let snapshot = state.visitors.read_and_maybe_reset(state.clock.now());
    debug!(count = snapshot.count, "visitor count read");

    Json(snapshot.into())
}

pub async fn visitors_post_handler(Extract(state): Extract<Arc<State>>) -> Json<VisitorsResponse> {
    let snapshot = state.visitors.increment_and_maybe_reset(state.clock.now());
    debug!(count = snapshot.count, "visitor counted");

    Json(snapshot.into())
}

pub async fn fallback_handler(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

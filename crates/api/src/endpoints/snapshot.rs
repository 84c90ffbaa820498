//! Snapshot trigger endpoint.

use axum::{Json, Router, extract::State, routing::post};
use tierboard_common::AppResult;
use tierboard_core::SnapshotSummary;

use crate::middleware::AppState;

/// Create the cron router.
pub fn router() -> Router<AppState> {
    Router::new().route("/snapshot", post(run_snapshot))
}

/// Freeze the previous day's standings for every active poll.
///
/// Idempotent: re-running replaces the same rows with the same values.
async fn run_snapshot(State(state): State<AppState>) -> AppResult<Json<SnapshotSummary>> {
    let summary = state.snapshot_service.run().await?;
    Ok(Json(summary))
}

//! API endpoints.

mod ballot;
mod leaderboard;
mod snapshot;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(ballot::router())
        .merge(leaderboard::router())
        .nest("/cron", snapshot::router())
}

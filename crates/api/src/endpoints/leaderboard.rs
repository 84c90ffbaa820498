//! Leaderboard endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tierboard_common::AppResult;
use tierboard_core::Leaderboard;

use crate::middleware::AppState;

/// Leaderboard query parameters.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// ISO date (`YYYY-MM-DD`) in the poll's timezone. Today when absent.
    pub date: Option<NaiveDate>,
}

/// Create the leaderboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/polls/{slug}/leaderboard", get(get_leaderboard))
        .route("/polls/{slug}/today", get(get_today))
}

/// Standings for a poll on a given day.
async fn get_leaderboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Leaderboard>> {
    let board = state.leaderboard_service.get(&slug, query.date).await?;
    Ok(Json(board))
}

/// Today's live standings for a poll.
async fn get_today(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Leaderboard>> {
    let board = state.leaderboard_service.get_today(&slug).await?;
    Ok(Json(board))
}

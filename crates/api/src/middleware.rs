//! Shared application state.

use tierboard_common::VotingConfig;
use tierboard_core::{BallotService, LeaderboardService, SnapshotService};

use crate::rate_limit::RateLimiter;
use crate::streaming::Broadcaster;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub ballot_service: BallotService,
    pub leaderboard_service: LeaderboardService,
    pub snapshot_service: SnapshotService,
    pub rate_limiter: RateLimiter,
    pub broadcaster: Broadcaster,
    pub voting: VotingConfig,
}

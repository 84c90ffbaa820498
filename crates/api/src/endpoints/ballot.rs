//! Ballot submission endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tierboard_common::{AppResult, VoterIdentity};
use tierboard_core::{BallotSubmission, TierBallot};
use validator::Validate;

use crate::{
    extractors::ClientInfo,
    middleware::AppState,
    rate_limit::RateLimitQuota,
};

/// Ballot submission request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBallotRequest {
    pub poll_slug: String,
    pub tiers: TierBallot,
    pub challenge_token: Option<String>,
    /// Client-generated identifier used as the preferred rate-limit key.
    #[validate(length(min = 8, max = 128))]
    pub device_id: Option<String>,
}

/// Ballot submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBallotResponse {
    pub ok: bool,
    /// Poll-local calendar day the ballot was counted towards.
    pub vote_day: chrono::NaiveDate,
}

/// Create the ballot router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ballots", post(submit_ballot))
}

/// Accept one tier ballot.
async fn submit_ballot(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<SubmitBallotRequest>,
) -> AppResult<Json<SubmitBallotResponse>> {
    req.validate()?;

    let identity = VoterIdentity {
        device_id: req.device_id.clone(),
        ip: client.ip.clone(),
        user_agent: client.user_agent.clone(),
    };
    let voter_key = identity.voter_key();

    // The quota is charged up front: a ballot that later fails validation
    // still spends budget
    let limits = &state.voting.rate_limit;
    let (action, quota) = if state.voting.strict_polls.iter().any(|s| s == &req.poll_slug) {
        (
            "ballot-strict",
            RateLimitQuota::new(limits.strict_max, limits.strict_window_secs),
        )
    } else {
        (
            "ballot",
            RateLimitQuota::new(limits.ballot_max, limits.ballot_window_secs),
        )
    };
    state.rate_limiter.check(action, &voter_key, quota).await?;

    let receipt = state
        .ballot_service
        .submit(BallotSubmission {
            poll_slug: req.poll_slug,
            ballot: req.tiers,
            challenge_token: req.challenge_token,
            remote_ip: client.ip,
        })
        .await?;

    Ok(Json(SubmitBallotResponse {
        ok: true,
        vote_day: receipt.day,
    }))
}

//! Daily rank snapshot job.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tierboard_db::{
    entities::poll,
    repositories::{
        CandidateRepository, DailyRankRepository, DailyScoreRepository, PollRepository, RankEntry,
    },
};
use tierboard_common::{AppResult, parse_timezone, previous_local_day};

use super::events::{EventPublisher, LeaderboardEvent};
use super::ranking::{Tally, rank};

/// Outcome of one snapshot pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub snapshotted: usize,
    pub failed: usize,
}

/// Freezes yesterday's standings for every active poll.
#[derive(Clone)]
pub struct SnapshotService {
    poll_repo: PollRepository,
    candidate_repo: CandidateRepository,
    score_repo: DailyScoreRepository,
    rank_repo: DailyRankRepository,
    publisher: Arc<dyn EventPublisher>,
}

impl SnapshotService {
    /// Create a new snapshot service.
    #[must_use]
    pub fn new(
        poll_repo: PollRepository,
        candidate_repo: CandidateRepository,
        score_repo: DailyScoreRepository,
        rank_repo: DailyRankRepository,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            poll_repo,
            candidate_repo,
            score_repo,
            rank_repo,
            publisher,
        }
    }

    /// Snapshot the previous local day of every active poll.
    ///
    /// One failing poll never blocks the others, it is logged and counted.
    /// The rank upsert is idempotent so overlapping runs converge.
    pub async fn run(&self) -> AppResult<SnapshotSummary> {
        let polls = self.poll_repo.find_active().await?;
        let mut summary = SnapshotSummary::default();

        for poll in polls {
            match self.snapshot_poll(&poll).await {
                Ok(entries) => {
                    tracing::info!(poll = %poll.slug, entries, "froze daily standings");
                    summary.snapshotted += 1;
                }
                Err(e) => {
                    tracing::warn!(poll = %poll.slug, error = %e, "snapshot failed");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn snapshot_poll(&self, poll: &poll::Model) -> AppResult<usize> {
        let tz = parse_timezone(&poll.timezone)?;
        let now = Utc::now();
        let day = previous_local_day(tz, now);

        let candidates = self.candidate_repo.find_by_poll(&poll.id).await?;
        let scores = self
            .score_repo
            .find_by_poll_and_day(&poll.id, day.into())
            .await?;

        let by_candidate: HashMap<String, (i32, i32)> = scores
            .into_iter()
            .map(|s| (s.candidate_id, (s.votes, s.score)))
            .collect();

        // Every candidate gets a rank, including those nobody voted for
        let tallies = candidates
            .into_iter()
            .map(|c| {
                let (votes, score) = by_candidate.get(&c.id).copied().unwrap_or((0, 0));
                Tally {
                    candidate_id: c.id,
                    votes,
                    score,
                }
            })
            .collect();

        let entries: Vec<RankEntry> = rank(tallies)
            .into_iter()
            .map(|s| RankEntry {
                candidate_id: s.candidate_id,
                rank: s.rank,
                votes: s.votes,
                score: s.score,
            })
            .collect();

        self.rank_repo
            .upsert_day(&poll.id, day.into(), &entries)
            .await?;

        let event = LeaderboardEvent::SnapshotFrozen {
            poll_slug: poll.slug.clone(),
            day: day.with_timezone(&tz).date_naive(),
            entries: entries.len(),
        };
        if let Err(e) = self.publisher.publish(&event).await {
            tracing::warn!(poll = %poll.slug, error = %e, "failed to publish snapshot event");
        }

        Ok(entries.len())
    }
}

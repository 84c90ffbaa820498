//! Leaderboard reads, live and historical.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tierboard_common::{AppError, AppResult, local_day_for_date, parse_timezone};
use tierboard_db::{
    entities::candidate,
    repositories::{
        CandidateRepository, DailyRankRepository, DailyScoreRepository, PollRepository,
    },
};

use super::ranking::{Tally, rank};

/// One row of a leaderboard, candidate metadata included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub candidate_id: String,
    pub name: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub rank: i32,
    pub votes: i32,
    pub score: i32,
}

/// A full leaderboard for one poll day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub poll_slug: String,
    pub day: NaiveDate,
    /// Whether the rows come from a frozen snapshot.
    pub frozen: bool,
    pub rows: Vec<LeaderboardRow>,
}

/// Leaderboard read service.
#[derive(Clone)]
pub struct LeaderboardService {
    poll_repo: PollRepository,
    candidate_repo: CandidateRepository,
    score_repo: DailyScoreRepository,
    rank_repo: DailyRankRepository,
    storage_timeout_secs: u64,
}

impl LeaderboardService {
    /// Create a new leaderboard service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        candidate_repo: CandidateRepository,
        score_repo: DailyScoreRepository,
        rank_repo: DailyRankRepository,
        storage_timeout_secs: u64,
    ) -> Self {
        Self {
            poll_repo,
            candidate_repo,
            score_repo,
            rank_repo,
            storage_timeout_secs,
        }
    }

    /// Today's live standings for a poll.
    pub async fn get_today(&self, slug: &str) -> AppResult<Leaderboard> {
        self.get(slug, None).await
    }

    /// Standings for a poll on a given date, today when `date` is `None`.
    ///
    /// Past days are served from the frozen snapshot when one exists and
    /// recomputed from accumulated scores otherwise. An unknown slug yields
    /// an empty board rather than an error.
    pub async fn get(&self, slug: &str, date: Option<NaiveDate>) -> AppResult<Leaderboard> {
        let Some(poll) = self.with_timeout(self.poll_repo.find_by_slug(slug)).await? else {
            return Ok(Leaderboard {
                poll_slug: slug.to_string(),
                day: date.unwrap_or_else(|| Utc::now().date_naive()),
                frozen: false,
                rows: vec![],
            });
        };

        let tz = parse_timezone(&poll.timezone)?;
        let today = Utc::now().with_timezone(&tz).date_naive();
        let target = date.unwrap_or(today);

        if target < today {
            let day = local_day_for_date(tz, target);
            let ranks = self
                .with_timeout(self.rank_repo.find_by_poll_and_day(&poll.id, day.into()))
                .await?;
            if !ranks.is_empty() {
                let meta = self.candidate_metadata(&poll.id).await?;
                let rows = ranks
                    .into_iter()
                    .map(|r| {
                        let (name, title, image_url, category) = meta
                            .get(&r.candidate_id)
                            .cloned()
                            .unwrap_or_else(|| (r.candidate_id.clone(), None, None, String::new()));
                        LeaderboardRow {
                            candidate_id: r.candidate_id,
                            name,
                            title,
                            image_url,
                            category,
                            rank: r.rank,
                            votes: r.votes,
                            score: r.score,
                        }
                    })
                    .collect();
                return Ok(Leaderboard {
                    poll_slug: poll.slug,
                    day: target,
                    frozen: true,
                    rows,
                });
            }
        }

        // Live path: recompute from accumulated scores, zero-filling
        // candidates that have not received a vote yet
        let day = local_day_for_date(tz, target);
        let scores = self
            .with_timeout(self.score_repo.find_by_poll_and_day(&poll.id, day.into()))
            .await?;
        let candidates = self
            .with_timeout(self.candidate_repo.find_by_poll(&poll.id))
            .await?;

        let by_candidate: HashMap<String, (i32, i32)> = scores
            .into_iter()
            .map(|s| (s.candidate_id, (s.votes, s.score)))
            .collect();

        let tallies = candidates
            .iter()
            .map(|c| {
                let (votes, score) = by_candidate.get(&c.id).copied().unwrap_or((0, 0));
                Tally {
                    candidate_id: c.id.clone(),
                    votes,
                    score,
                }
            })
            .collect();

        let meta: HashMap<&str, &candidate::Model> =
            candidates.iter().map(|c| (c.id.as_str(), c)).collect();

        let rows = rank(tallies)
            .into_iter()
            .filter_map(|s| {
                meta.get(s.candidate_id.as_str()).map(|c| LeaderboardRow {
                    candidate_id: s.candidate_id.clone(),
                    name: c.name.clone(),
                    title: c.title.clone(),
                    image_url: c.image_url.clone(),
                    category: c.category.clone(),
                    rank: s.rank,
                    votes: s.votes,
                    score: s.score,
                })
            })
            .collect();

        Ok(Leaderboard {
            poll_slug: poll.slug,
            day: target,
            frozen: false,
            rows,
        })
    }

    async fn candidate_metadata(
        &self,
        poll_id: &str,
    ) -> AppResult<HashMap<String, (String, Option<String>, Option<String>, String)>> {
        let candidates = self
            .with_timeout(self.candidate_repo.find_by_poll(poll_id))
            .await?;
        Ok(candidates
            .into_iter()
            .map(|c| (c.id, (c.name, c.title, c.image_url, c.category)))
            .collect())
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        let limit = Duration::from_secs(self.storage_timeout_secs);
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StorageUnavailable(
                "storage operation timed out".to_string(),
            )),
        }
    }
}

//! Tier ballot validation and submission.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tierboard_common::{AppError, AppResult, VotingConfig, local_day, parse_timezone};
use tierboard_db::{
    entities::{candidate, poll},
    repositories::{CandidateRepository, DailyScoreRepository, PollRepository, ScoreDelta},
};

use super::challenge::ChallengeVerifier;
use super::events::{EventDelta, EventPublisher, LeaderboardEvent};

/// A tier a candidate can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Tier {
    pub const ALL: [Self; 6] = [Self::S, Self::A, Self::B, Self::C, Self::D, Self::F];

    /// Base score every placement in this tier earns.
    #[must_use]
    pub const fn minimum(self) -> i32 {
        match self {
            Self::S => 50,
            Self::A => 40,
            Self::B => 30,
            Self::C => 20,
            Self::D => 10,
            Self::F => 0,
        }
    }

    /// Extra score for the leading positions within the tier.
    #[must_use]
    pub fn position_bonus(self, position: usize) -> i32 {
        let table: &[i32] = match self {
            Self::S => &[5, 3, 1],
            Self::A => &[4, 2, 1],
            Self::B => &[3, 2, 1],
            Self::C => &[2, 1, 0],
            Self::D => &[1],
            Self::F => &[],
        };
        table.get(position).copied().unwrap_or(0)
    }

    /// Total score a placement at `position` in this tier earns.
    #[must_use]
    pub fn weight(self, position: usize) -> i32 {
        self.minimum() + self.position_bonus(position)
    }
}

/// One voter's complete tier assignment.
///
/// Keys are tier letters, values are candidate IDs ordered best-first
/// within the tier. Absent tiers are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierBallot {
    #[serde(default, rename = "S")]
    pub s: Vec<String>,
    #[serde(default, rename = "A")]
    pub a: Vec<String>,
    #[serde(default, rename = "B")]
    pub b: Vec<String>,
    #[serde(default, rename = "C")]
    pub c: Vec<String>,
    #[serde(default, rename = "D")]
    pub d: Vec<String>,
    #[serde(default, rename = "F")]
    pub f: Vec<String>,
}

impl TierBallot {
    /// Tier rows in scoring order.
    #[must_use]
    pub fn rows(&self) -> [(Tier, &[String]); 6] {
        [
            (Tier::S, self.s.as_slice()),
            (Tier::A, self.a.as_slice()),
            (Tier::B, self.b.as_slice()),
            (Tier::C, self.c.as_slice()),
            (Tier::D, self.d.as_slice()),
            (Tier::F, self.f.as_slice()),
        ]
    }

    /// Total number of candidates placed.
    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.rows().iter().map(|(_, ids)| ids.len()).sum()
    }
}

/// Validate a ballot against its poll and produce the score deltas to apply.
///
/// Rejects ballots for inactive polls, empty ballots, unknown candidates,
/// candidates placed more than once, and ballots below the minimum
/// selection count.
pub fn validate_ballot(
    poll: &poll::Model,
    candidates: &[candidate::Model],
    ballot: &TierBallot,
    min_selections: usize,
) -> AppResult<Vec<ScoreDelta>> {
    if !poll.is_active {
        return Err(AppError::PollInactive);
    }

    // Empty ballots are rejected even when min_selections is zero
    if ballot.selection_count() == 0 {
        return Err(AppError::InvalidBallot("Ballot is empty".to_string()));
    }

    let known: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut deltas = Vec::with_capacity(ballot.selection_count());

    for (tier, ids) in ballot.rows() {
        for (position, candidate_id) in ids.iter().enumerate() {
            if !known.contains(candidate_id.as_str()) {
                return Err(AppError::InvalidBallot(format!(
                    "Unknown candidate: {candidate_id}"
                )));
            }
            if !seen.insert(candidate_id.as_str()) {
                return Err(AppError::InvalidBallot(format!(
                    "Candidate placed more than once: {candidate_id}"
                )));
            }
            deltas.push(ScoreDelta {
                candidate_id: candidate_id.clone(),
                votes: 1,
                score: tier.weight(position),
            });
        }
    }

    if deltas.len() < min_selections {
        return Err(AppError::InvalidBallot(format!(
            "Ballot must place at least {min_selections} candidates"
        )));
    }

    Ok(deltas)
}

/// A ballot submission as it arrives from a client.
#[derive(Debug, Clone)]
pub struct BallotSubmission {
    pub poll_slug: String,
    pub ballot: TierBallot,
    pub challenge_token: Option<String>,
    pub remote_ip: Option<String>,
}

/// Confirmation returned for an accepted ballot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotReceipt {
    pub poll_slug: String,
    /// The poll-local calendar day the ballot was counted towards.
    pub day: NaiveDate,
}

/// Ballot submission service.
#[derive(Clone)]
pub struct BallotService {
    poll_repo: PollRepository,
    candidate_repo: CandidateRepository,
    score_repo: DailyScoreRepository,
    verifier: Arc<dyn ChallengeVerifier>,
    publisher: Arc<dyn EventPublisher>,
    voting: VotingConfig,
}

impl BallotService {
    /// Create a new ballot service.
    #[must_use]
    pub fn new(
        poll_repo: PollRepository,
        candidate_repo: CandidateRepository,
        score_repo: DailyScoreRepository,
        verifier: Arc<dyn ChallengeVerifier>,
        publisher: Arc<dyn EventPublisher>,
        voting: VotingConfig,
    ) -> Self {
        Self {
            poll_repo,
            candidate_repo,
            score_repo,
            verifier,
            publisher,
            voting,
        }
    }

    /// Accept, validate and apply one ballot.
    ///
    /// The vote day is computed once from the poll's timezone, so a ballot
    /// arriving near local midnight lands entirely on a single day.
    pub async fn submit(&self, submission: BallotSubmission) -> AppResult<BallotReceipt> {
        let poll = self
            .with_timeout(self.poll_repo.get_by_slug(&submission.poll_slug))
            .await?;

        if self.voting.challenge_required {
            let passed = self
                .verifier
                .verify(
                    submission.challenge_token.as_deref(),
                    submission.remote_ip.as_deref(),
                )
                .await?;
            if !passed {
                return Err(AppError::ChallengeFailed);
            }
        }

        let candidates = self
            .with_timeout(self.candidate_repo.find_by_poll(&poll.id))
            .await?;
        let deltas = validate_ballot(
            &poll,
            &candidates,
            &submission.ballot,
            self.min_selections_for(&poll.slug),
        )?;

        let tz = parse_timezone(&poll.timezone)?;
        let now = Utc::now();
        let day = local_day(tz, now);

        self.with_timeout(self.score_repo.apply_ballot(&poll.id, day.into(), &deltas))
            .await?;

        let local_date = now.with_timezone(&tz).date_naive();
        let event = LeaderboardEvent::BallotApplied {
            poll_slug: poll.slug.clone(),
            day: local_date,
            deltas: deltas
                .iter()
                .map(|d| EventDelta {
                    candidate_id: d.candidate_id.clone(),
                    votes: d.votes,
                    score: d.score,
                })
                .collect(),
        };
        if let Err(e) = self.publisher.publish(&event).await {
            tracing::warn!(poll = %poll.slug, error = %e, "failed to publish ballot event");
        }

        Ok(BallotReceipt {
            poll_slug: poll.slug,
            day: local_date,
        })
    }

    /// Strict polls accept single-candidate ballots.
    fn min_selections_for(&self, slug: &str) -> usize {
        if self.voting.strict_polls.iter().any(|s| s == slug) {
            1
        } else {
            self.voting.min_selections
        }
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        let limit = Duration::from_secs(self.voting.storage_timeout_secs);
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StorageUnavailable(
                "storage operation timed out".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc as StdArc;

    use super::super::challenge::StaticVerifier;
    use super::super::events::NoopPublisher;

    fn test_poll(active: bool) -> poll::Model {
        poll::Model {
            id: "p1".to_string(),
            slug: "cabinet".to_string(),
            title: "Cabinet".to_string(),
            timezone: "Europe/Amsterdam".to_string(),
            is_active: active,
            created_at: Utc::now().into(),
        }
    }

    fn test_candidate(id: &str) -> candidate::Model {
        candidate::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            name: format!("Candidate {id}"),
            title: None,
            image_url: None,
            category: "minister".to_string(),
            sort: 0,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_tier_weights() {
        assert_eq!(Tier::S.weight(0), 55);
        assert_eq!(Tier::S.weight(1), 53);
        assert_eq!(Tier::S.weight(2), 51);
        assert_eq!(Tier::S.weight(3), 50);
        assert_eq!(Tier::A.weight(0), 44);
        assert_eq!(Tier::B.weight(2), 31);
        assert_eq!(Tier::C.weight(2), 20);
        assert_eq!(Tier::D.weight(0), 11);
        assert_eq!(Tier::D.weight(1), 10);
        assert_eq!(Tier::F.weight(0), 0);
        assert_eq!(Tier::F.weight(5), 0);
    }

    #[test]
    fn test_ballot_deserializes_sparse_tiers() {
        let ballot: TierBallot =
            serde_json::from_str(r#"{"S":["c1"],"B":["c2","c3"]}"#).unwrap();

        assert_eq!(ballot.s, ["c1"]);
        assert_eq!(ballot.b, ["c2", "c3"]);
        assert!(ballot.a.is_empty());
        assert_eq!(ballot.selection_count(), 3);
    }

    #[test]
    fn test_validate_produces_position_weighted_deltas() {
        let poll = test_poll(true);
        let candidates = vec![test_candidate("c1"), test_candidate("c2"), test_candidate("c3")];
        let ballot = TierBallot {
            s: vec!["c1".to_string(), "c2".to_string()],
            f: vec!["c3".to_string()],
            ..TierBallot::default()
        };

        let deltas = validate_ballot(&poll, &candidates, &ballot, 3).unwrap();

        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0].candidate_id, "c1");
        assert_eq!(deltas[0].score, 55);
        assert_eq!(deltas[0].votes, 1);
        assert_eq!(deltas[1].score, 53);
        assert_eq!(deltas[2].candidate_id, "c3");
        assert_eq!(deltas[2].score, 0);
        assert_eq!(deltas[2].votes, 1);
    }

    #[test]
    fn test_validate_rejects_inactive_poll() {
        let poll = test_poll(false);
        let candidates = vec![test_candidate("c1")];
        let ballot = TierBallot {
            s: vec!["c1".to_string()],
            ..TierBallot::default()
        };

        let result = validate_ballot(&poll, &candidates, &ballot, 1);

        assert!(matches!(result, Err(AppError::PollInactive)));
    }

    #[test]
    fn test_validate_rejects_unknown_candidate() {
        let poll = test_poll(true);
        let candidates = vec![test_candidate("c1")];
        let ballot = TierBallot {
            s: vec!["ghost".to_string()],
            ..TierBallot::default()
        };

        let result = validate_ballot(&poll, &candidates, &ballot, 1);

        assert!(matches!(result, Err(AppError::InvalidBallot(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_placement() {
        let poll = test_poll(true);
        let candidates = vec![test_candidate("c1")];
        let ballot = TierBallot {
            s: vec!["c1".to_string()],
            f: vec!["c1".to_string()],
            ..TierBallot::default()
        };

        let result = validate_ballot(&poll, &candidates, &ballot, 1);

        assert!(matches!(result, Err(AppError::InvalidBallot(_))));
    }

    #[test]
    fn test_validate_rejects_empty_ballot_regardless_of_minimum() {
        let poll = test_poll(true);
        let candidates = vec![test_candidate("c1")];

        let result = validate_ballot(&poll, &candidates, &TierBallot::default(), 0);

        assert!(matches!(result, Err(AppError::InvalidBallot(_))));
    }

    #[test]
    fn test_validate_rejects_below_minimum() {
        let poll = test_poll(true);
        let candidates = vec![test_candidate("c1"), test_candidate("c2")];
        let ballot = TierBallot {
            a: vec!["c1".to_string()],
            ..TierBallot::default()
        };

        let result = validate_ballot(&poll, &candidates, &ballot, 3);

        assert!(matches!(result, Err(AppError::InvalidBallot(_))));
    }

    fn service_with(db: StdArc<sea_orm::DatabaseConnection>, voting: VotingConfig) -> BallotService {
        BallotService::new(
            PollRepository::new(db.clone()),
            CandidateRepository::new(db.clone()),
            DailyScoreRepository::new(db),
            StdArc::new(StaticVerifier(true)),
            StdArc::new(NoopPublisher),
            voting,
        )
    }

    fn test_voting() -> VotingConfig {
        VotingConfig {
            min_selections: 3,
            challenge_required: false,
            challenge_secret: None,
            storage_timeout_secs: 5,
            snapshot_interval_secs: 300,
            strict_polls: vec![],
            rate_limit: tierboard_common::RateLimitSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_submit_applies_ballot() {
        let db = StdArc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_poll(true)]])
                .append_query_results([vec![
                    test_candidate("c1"),
                    test_candidate("c2"),
                    test_candidate("c3"),
                ]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db, test_voting());
        let receipt = service
            .submit(BallotSubmission {
                poll_slug: "cabinet".to_string(),
                ballot: TierBallot {
                    s: vec!["c1".to_string()],
                    a: vec!["c2".to_string()],
                    f: vec!["c3".to_string()],
                    ..TierBallot::default()
                },
                challenge_token: None,
                remote_ip: None,
            })
            .await
            .unwrap();

        assert_eq!(receipt.poll_slug, "cabinet");
    }

    #[tokio::test]
    async fn test_submit_rejects_failed_challenge() {
        let db = StdArc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_poll(true)]])
                .into_connection(),
        );

        let mut voting = test_voting();
        voting.challenge_required = true;

        let service = BallotService::new(
            PollRepository::new(db.clone()),
            CandidateRepository::new(db.clone()),
            DailyScoreRepository::new(db),
            StdArc::new(StaticVerifier(false)),
            StdArc::new(NoopPublisher),
            voting,
        );

        let result = service
            .submit(BallotSubmission {
                poll_slug: "cabinet".to_string(),
                ballot: TierBallot::default(),
                challenge_token: Some("bad".to_string()),
                remote_ip: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::ChallengeFailed)));
    }

    #[tokio::test]
    async fn test_submit_unknown_poll_is_not_found() {
        let db = StdArc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db, test_voting());
        let result = service
            .submit(BallotSubmission {
                poll_slug: "missing".to_string(),
                ballot: TierBallot::default(),
                challenge_token: None,
                remote_ip: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_strict_poll_accepts_single_selection() {
        let db = StdArc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll::Model {
                    slug: "strict".to_string(),
                    ..test_poll(true)
                }]])
                .append_query_results([[test_candidate("c1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let mut voting = test_voting();
        voting.strict_polls = vec!["strict".to_string()];

        let service = service_with(db, voting);
        let receipt = service
            .submit(BallotSubmission {
                poll_slug: "strict".to_string(),
                ballot: TierBallot {
                    s: vec!["c1".to_string()],
                    ..TierBallot::default()
                },
                challenge_token: None,
                remote_ip: None,
            })
            .await
            .unwrap();

        assert_eq!(receipt.poll_slug, "strict");
    }
}

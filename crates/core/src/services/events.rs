//! Leaderboard change events.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tierboard_common::AppResult;

/// One candidate's contribution carried on a ballot event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDelta {
    pub candidate_id: String,
    pub votes: i32,
    pub score: i32,
}

/// Event emitted when a poll's standings change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LeaderboardEvent {
    /// A ballot was accepted and its deltas applied.
    #[serde(rename_all = "camelCase")]
    BallotApplied {
        poll_slug: String,
        day: NaiveDate,
        deltas: Vec<EventDelta>,
    },
    /// A day's standings were frozen by the snapshot job.
    #[serde(rename_all = "camelCase")]
    SnapshotFrozen {
        poll_slug: String,
        day: NaiveDate,
        entries: usize,
    },
}

impl LeaderboardEvent {
    /// The poll this event belongs to.
    #[must_use]
    pub fn poll_slug(&self) -> &str {
        match self {
            Self::BallotApplied { poll_slug, .. } | Self::SnapshotFrozen { poll_slug, .. } => {
                poll_slug
            }
        }
    }

    /// The realtime channel subscribers listen on for this poll.
    #[must_use]
    pub fn channel(&self) -> String {
        format!("poll:{}", self.poll_slug())
    }
}

/// Sink for leaderboard events.
///
/// Publishing is best-effort: callers log failures and carry on, a lost
/// event never rolls back an accepted ballot.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &LeaderboardEvent) -> AppResult<()>;
}

/// Publisher that drops every event.
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: &LeaderboardEvent) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name() {
        let event = LeaderboardEvent::SnapshotFrozen {
            poll_slug: "cabinet".to_string(),
            day: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            entries: 12,
        };

        assert_eq!(event.channel(), "poll:cabinet");
    }

    #[test]
    fn test_ballot_applied_wire_format() {
        let event = LeaderboardEvent::BallotApplied {
            poll_slug: "cabinet".to_string(),
            day: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            deltas: vec![EventDelta {
                candidate_id: "c1".to_string(),
                votes: 1,
                score: 55,
            }],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ballotApplied");
        assert_eq!(json["pollSlug"], "cabinet");
        assert_eq!(json["day"], "2025-06-15");
        assert_eq!(json["deltas"][0]["candidateId"], "c1");
        assert_eq!(json["deltas"][0]["score"], 55);
    }
}

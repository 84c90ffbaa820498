//! Daily rank repository.

use std::sync::Arc;

use crate::entities::{DailyRank, daily_rank};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tierboard_common::{AppError, AppResult};

/// One frozen standing row for a poll day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub candidate_id: String,
    pub rank: i32,
    pub votes: i32,
    pub score: i32,
}

/// Daily rank repository for database operations.
#[derive(Clone)]
pub struct DailyRankRepository {
    db: Arc<DatabaseConnection>,
}

impl DailyRankRepository {
    /// Create a new daily rank repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Write the frozen standings of one poll day.
    ///
    /// Re-running the snapshot replaces existing rows, so retries converge
    /// on the same result instead of failing on duplicate keys.
    pub async fn upsert_day(
        &self,
        poll_id: &str,
        day: DateTimeWithTimeZone,
        entries: &[RankEntry],
    ) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for entry in entries {
            let model = daily_rank::ActiveModel {
                poll_id: Set(poll_id.to_string()),
                candidate_id: Set(entry.candidate_id.clone()),
                day: Set(day),
                rank: Set(entry.rank),
                votes: Set(entry.votes),
                score: Set(entry.score),
                created_at: Set(Utc::now().into()),
            };

            DailyRank::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        daily_rank::Column::PollId,
                        daily_rank::Column::CandidateId,
                        daily_rank::Column::Day,
                    ])
                    .update_columns([
                        daily_rank::Column::Rank,
                        daily_rank::Column::Votes,
                        daily_rank::Column::Score,
                    ])
                    .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Read the frozen standings of one poll day, best rank first.
    pub async fn find_by_poll_and_day(
        &self,
        poll_id: &str,
        day: DateTimeWithTimeZone,
    ) -> AppResult<Vec<daily_rank::Model>> {
        DailyRank::find()
            .filter(daily_rank::Column::PollId.eq(poll_id))
            .filter(daily_rank::Column::Day.eq(day))
            .order_by_asc(daily_rank::Column::Rank)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_day() -> DateTimeWithTimeZone {
        "2025-06-14T22:00:00+00:00".parse().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_day_writes_all_entries() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
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

        let repo = DailyRankRepository::new(db.clone());
        let entries = vec![
            RankEntry {
                candidate_id: "c1".to_string(),
                rank: 1,
                votes: 10,
                score: 420,
            },
            RankEntry {
                candidate_id: "c2".to_string(),
                rank: 2,
                votes: 8,
                score: 300,
            },
            RankEntry {
                candidate_id: "c3".to_string(),
                rank: 3,
                votes: 0,
                score: 0,
            },
        ];

        repo.upsert_day("p1", test_day(), &entries).await.unwrap();

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert_eq!(log.len(), 1, "all upserts share one transaction");
        let dump = format!("{:?}", log[0]);
        assert_eq!(dump.matches("ON CONFLICT").count(), 3);
    }

    #[tokio::test]
    async fn test_find_by_poll_and_day_orders_by_rank() {
        let row1 = daily_rank::Model {
            poll_id: "p1".to_string(),
            candidate_id: "c1".to_string(),
            day: test_day(),
            rank: 1,
            votes: 10,
            score: 420,
            created_at: Utc::now().into(),
        };
        let row2 = daily_rank::Model {
            poll_id: "p1".to_string(),
            candidate_id: "c2".to_string(),
            day: test_day(),
            rank: 2,
            votes: 8,
            score: 300,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row1, row2]])
                .into_connection(),
        );

        let repo = DailyRankRepository::new(db);
        let result = repo.find_by_poll_and_day("p1", test_day()).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].rank, 1);
        assert_eq!(result[1].rank, 2);
    }
}

//! Daily score repository.
//!
//! Scores are keyed on `(poll_id, candidate_id, day)` and only ever grow by
//! increments, so every write goes through an `INSERT .. ON CONFLICT DO
//! UPDATE` that adds the delta to whatever is already stored.

use std::sync::Arc;

use crate::entities::{DailyScore, daily_score};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tierboard_common::{AppError, AppResult};

/// One candidate's contribution from a single ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDelta {
    pub candidate_id: String,
    pub votes: i32,
    pub score: i32,
}

/// Daily score repository for database operations.
#[derive(Clone)]
pub struct DailyScoreRepository {
    db: Arc<DatabaseConnection>,
}

impl DailyScoreRepository {
    /// Create a new daily score repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Apply all deltas of one ballot atomically.
    ///
    /// Every row is an upsert-increment inside a single transaction, so a
    /// ballot either lands in full or not at all. Rows are written in
    /// candidate id order: concurrent ballots touching the same candidates
    /// then acquire their row locks in one global order and cannot
    /// deadlock each other.
    pub async fn apply_ballot(
        &self,
        poll_id: &str,
        day: DateTimeWithTimeZone,
        deltas: &[ScoreDelta],
    ) -> AppResult<()> {
        if deltas.is_empty() {
            return Ok(());
        }

        let mut ordered: Vec<&ScoreDelta> = deltas.iter().collect();
        ordered.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for delta in ordered {
            let model = daily_score::ActiveModel {
                poll_id: Set(poll_id.to_string()),
                candidate_id: Set(delta.candidate_id.clone()),
                day: Set(day),
                votes: Set(delta.votes),
                score: Set(delta.score),
                updated_at: Set(Utc::now().into()),
            };

            DailyScore::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        daily_score::Column::PollId,
                        daily_score::Column::CandidateId,
                        daily_score::Column::Day,
                    ])
                    .value(
                        daily_score::Column::Votes,
                        Expr::col((daily_score::Entity, daily_score::Column::Votes))
                            .add(delta.votes),
                    )
                    .value(
                        daily_score::Column::Score,
                        Expr::col((daily_score::Entity, daily_score::Column::Score))
                            .add(delta.score),
                    )
                    .update_column(daily_score::Column::UpdatedAt)
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

    /// Read the accumulated scores of one poll day.
    pub async fn find_by_poll_and_day(
        &self,
        poll_id: &str,
        day: DateTimeWithTimeZone,
    ) -> AppResult<Vec<daily_score::Model>> {
        DailyScore::find()
            .filter(daily_score::Column::PollId.eq(poll_id))
            .filter(daily_score::Column::Day.eq(day))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

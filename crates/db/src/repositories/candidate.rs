//! Candidate repository.

use std::sync::Arc;

use crate::entities::{Candidate, candidate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tierboard_common::{AppError, AppResult};

/// Candidate repository for database operations.
#[derive(Clone)]
pub struct CandidateRepository {
    db: Arc<DatabaseConnection>,
}

impl CandidateRepository {
    /// Create a new candidate repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the candidates of a poll in display order.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<candidate::Model>> {
        Candidate::find()
            .filter(candidate::Column::PollId.eq(poll_id))
            .order_by_asc(candidate::Column::Sort)
            .order_by_asc(candidate::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

//! Poll repository.

use std::sync::Arc;

use crate::entities::{Poll, poll};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tierboard_common::{AppError, AppResult};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by its URL slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by slug, returning an error if not found.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<poll::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {slug}")))
    }

    /// List all polls currently accepting ballots.
    pub async fn find_active(&self) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_poll(id: &str, slug: &str, is_active: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            slug: slug.to_string(),
            title: format!("Poll {slug}"),
            timezone: "Europe/Amsterdam".to_string(),
            is_active,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let poll = create_test_poll("p1", "cabinet", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll.clone()]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.find_by_slug("cabinet").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().slug, "cabinet");
    }

    #[tokio::test]
    async fn test_get_by_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.get_by_slug("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_active() {
        let poll1 = create_test_poll("p1", "cabinet", true);
        let poll2 = create_test_poll("p2", "shadow", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll1, poll2]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.find_active().await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.is_active));
    }
}

//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_poll_table;
mod m20250601_000002_create_candidate_table;
mod m20250601_000003_create_daily_score_table;
mod m20250601_000004_create_daily_rank_table;

/// Migration runner.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_poll_table::Migration),
            Box::new(m20250601_000002_create_candidate_table::Migration),
            Box::new(m20250601_000003_create_daily_score_table::Migration),
            Box::new(m20250601_000004_create_daily_rank_table::Migration),
        ]
    }
}

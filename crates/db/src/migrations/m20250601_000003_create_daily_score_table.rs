//! Create `daily_score` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyScore::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyScore::PollId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyScore::CandidateId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyScore::Day)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyScore::Votes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyScore::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyScore::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Composite key backs the ON CONFLICT upsert-increment
                    .primary_key(
                        Index::create()
                            .col(DailyScore::PollId)
                            .col(DailyScore::CandidateId)
                            .col(DailyScore::Day),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_score_poll")
                            .from(DailyScore::Table, DailyScore::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_score_candidate")
                            .from(DailyScore::Table, DailyScore::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Leaderboard reads scan one (poll, day) slice
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_score_poll_day")
                    .table(DailyScore::Table)
                    .col(DailyScore::PollId)
                    .col(DailyScore::Day)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyScore::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DailyScore {
    Table,
    PollId,
    CandidateId,
    Day,
    Votes,
    Score,
    UpdatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

#[derive(Iden)]
enum Candidate {
    Table,
    Id,
}

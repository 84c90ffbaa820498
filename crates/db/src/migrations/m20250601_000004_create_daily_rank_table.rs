//! Create `daily_rank` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyRank::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyRank::PollId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(DailyRank::CandidateId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyRank::Day)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyRank::Rank).integer().not_null())
                    .col(ColumnDef::new(DailyRank::Votes).integer().not_null())
                    .col(ColumnDef::new(DailyRank::Score).integer().not_null())
                    .col(
                        ColumnDef::new(DailyRank::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(DailyRank::PollId)
                            .col(DailyRank::CandidateId)
                            .col(DailyRank::Day),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_rank_poll")
                            .from(DailyRank::Table, DailyRank::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_rank_candidate")
                            .from(DailyRank::Table, DailyRank::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // History reads scan one (poll, day) slice ordered by rank
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_rank_poll_day")
                    .table(DailyRank::Table)
                    .col(DailyRank::PollId)
                    .col(DailyRank::Day)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyRank::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DailyRank {
    Table,
    PollId,
    CandidateId,
    Day,
    Rank,
    Votes,
    Score,
    CreatedAt,
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

//! Create candidate table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Candidate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Candidate::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Candidate::PollId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Candidate::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Candidate::Title).string_len(200))
                    .col(ColumnDef::new(Candidate::ImageUrl).text())
                    .col(
                        ColumnDef::new(Candidate::Category)
                            .string_len(32)
                            .not_null()
                            .default("minister"),
                    )
                    .col(
                        ColumnDef::new(Candidate::Sort)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Candidate::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_poll")
                            .from(Candidate::Table, Candidate::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_candidate_poll_id")
                    .table(Candidate::Table)
                    .col(Candidate::PollId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candidate::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Candidate {
    Table,
    Id,
    PollId,
    Name,
    Title,
    ImageUrl,
    Category,
    Sort,
    CreatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

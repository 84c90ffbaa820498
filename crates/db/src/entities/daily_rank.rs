//! Daily rank entity - the frozen per-day ranking snapshot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Frozen ranking row, keyed by (poll, candidate, day).
///
/// Written only by the snapshot job; reruns for the same key replace the
/// row. Never mutated by live traffic.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_rank")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub poll_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub candidate_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub day: DateTimeWithTimeZone,

    /// 1-based rank; no gaps, no shared numbers.
    pub rank: i32,

    /// Votes at freeze time.
    pub votes: i32,

    /// Score at freeze time.
    pub score: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
    #[sea_orm(
        belongs_to = "super::candidate::Entity",
        from = "Column::CandidateId",
        to = "super::candidate::Column::Id",
        on_delete = "Cascade"
    )]
    Candidate,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

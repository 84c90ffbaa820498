//! Daily score entity - the live per-day vote/score aggregate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily score aggregate, keyed by (poll, candidate, day).
///
/// `day` is the poll-local midnight as a UTC instant. Mutated only by
/// atomic upsert-increment; at most one row exists per key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_score")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub poll_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub candidate_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub day: DateTimeWithTimeZone,

    /// Count of ballot contributions.
    #[sea_orm(default_value = 0)]
    pub votes: i32,

    /// Weighted tally.
    #[sea_orm(default_value = 0)]
    pub score: i32,

    pub updated_at: DateTimeWithTimeZone,
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

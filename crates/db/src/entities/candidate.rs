//! Candidate entity - one rankable entry within a poll.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Candidate entity. Immutable during an active voting period from the
/// core's perspective.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidate")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Display name.
    pub name: String,

    /// Optional subtitle (office held, portfolio).
    #[sea_orm(nullable)]
    pub title: Option<String>,

    /// Optional portrait image reference.
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,

    /// Grouping label used by display layers.
    pub category: String,

    /// Stable display order. Never used for ranking.
    #[sea_orm(default_value = 0)]
    pub sort: i32,

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
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

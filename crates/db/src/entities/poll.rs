//! Poll entity - a named voting contest.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Poll entity. Reference data: created by admin tooling, read-only to
/// the voting core.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL-stable identifier (e.g. "best-ministers").
    #[sea_orm(unique, indexed)]
    pub slug: String,

    /// Display title.
    pub title: String,

    /// IANA timezone governing the poll's day boundary.
    pub timezone: String,

    /// Whether the poll currently accepts ballots.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candidate::Entity")]
    Candidate,
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// First-pick dice roll; one row per session, keyed by session id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dice_rolls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub round: i32,
    #[sea_orm(column_type = "SmallInteger")]
    pub target: Option<i16>,
    pub winner_team_id: Option<String>,
    pub confirmed_at: Option<OffsetDateTime>,
    pub version: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dice_picks::Entity")]
    Picks,
}

impl Related<super::dice_picks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Picks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dice_picks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub round: i32,
    pub team_id: String,
    pub participant_id: String,
    #[sea_orm(column_type = "SmallInteger")]
    pub value: i16,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dice_rolls::Entity",
        from = "Column::SessionId",
        to = "super::dice_rolls::Column::SessionId"
    )]
    Roll,
}

impl Related<super::dice_rolls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

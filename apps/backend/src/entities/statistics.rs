use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statistics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub drafted_game_id: String,
    pub participant_id: String,
    pub key: String,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::drafted_games::Entity",
        from = "Column::DraftedGameId",
        to = "super::drafted_games::Column::Id"
    )]
    DraftedGame,
}

impl Related<super::drafted_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DraftedGame.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

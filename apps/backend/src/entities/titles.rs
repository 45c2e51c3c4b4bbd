use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Awarded title. Rows are append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "titles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    /// `None` for tournament-wide titles.
    pub drafted_game_id: Option<String>,
    pub participant_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub is_humorous: bool,
    #[sea_orm(column_type = "Double")]
    pub points: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "account_id")]
    pub account_id: i64,
    /// Lichess game id.
    #[sea_orm(column_name = "game_id")]
    pub game_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub moves: Option<String>,
    /// Telegram message holding the rendered board.
    #[sea_orm(column_name = "message_id")]
    pub message_id: i64,
    #[sea_orm(column_name = "is_white")]
    pub is_white: Option<bool>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM adapter for the games table.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};

use crate::entities::games;

pub mod dto;

pub use dto::{GameCreate, GameUpdate};

pub async fn find_by_account_and_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    account_id: i64,
    game_id: &str,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::AccountId.eq(account_id))
        .filter(games::Column::GameId.eq(game_id))
        .one(conn)
        .await
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let game_active = games::ActiveModel {
        id: NotSet,
        account_id: Set(dto.account_id),
        game_id: Set(dto.game_id),
        moves: Set(None),
        message_id: Set(dto.message_id),
        is_white: Set(None),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };

    game_active.insert(conn).await
}

/// Unconditional overwrite; callers decide whether a write is warranted.
pub async fn update_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameUpdate,
) -> Result<(), sea_orm::DbErr> {
    let mut update = games::Entity::update_many()
        .col_expr(games::Column::Moves, Expr::value(Some(dto.moves)));
    if let Some(is_white) = dto.is_white {
        update = update.col_expr(games::Column::IsWhite, Expr::value(Some(is_white)));
    }

    let result = update
        .filter(games::Column::Id.eq(dto.id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::Custom(format!("GAME_NOT_FOUND:{}", dto.id)));
    }
    Ok(())
}

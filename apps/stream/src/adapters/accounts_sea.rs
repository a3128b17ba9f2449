//! SeaORM adapter for the accounts table (read-only for this service).

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::entities::accounts;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    account_id: i64,
) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
    accounts::Entity::find_by_id(account_id).one(conn).await
}

/// Ids of every account with a non-empty token, oldest first.
pub async fn ids_with_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .filter(accounts::Column::Token.ne(""))
        .order_by_asc(accounts::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    UserId,
    LichessId,
    Username,
    Title,
    Token,
    CreatedAt,
}

#[derive(Iden)]
enum Games {
    Table,
    Id,
    AccountId,
    GameId,
    Moves,
    MessageId,
    IsWhite,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // accounts (owned by the login flow; the stream engine only reads them)
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Accounts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::LichessId).string().not_null())
                    .col(ColumnDef::new(Accounts::Username).string().null())
                    .col(ColumnDef::new(Accounts::Title).string().null())
                    .col(ColumnDef::new(Accounts::Token).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // games
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Games::AccountId).big_integer().not_null())
                    .col(ColumnDef::new(Games::GameId).string().not_null())
                    .col(ColumnDef::new(Games::Moves).text().null())
                    .col(ColumnDef::new(Games::MessageId).big_integer().not_null())
                    .col(ColumnDef::new(Games::IsWhite).boolean().null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_account_id")
                            .from(Games::Table, Games::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (account, lichess game)
        manager
            .create_index(
                Index::create()
                    .name("games_account_id_game_id_key")
                    .table(Games::Table)
                    .col(Games::AccountId)
                    .col(Games::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order + drop index before table
        manager
            .drop_index(
                Index::drop()
                    .name("games_account_id_game_id_key")
                    .table(Games::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Games::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260101_000000_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Phones::Table)
                    .if_not_exists()
                    .col(pk_uuid(Phones::Id))
                    .col(uuid(Phones::UserId))
                    .col(string(Phones::Number))
                    .col(string(Phones::CityCode))
                    .col(string(Phones::CountryCode))
                    // Keeps the order the client supplied.
                    .col(integer(Phones::Position))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phones_user_id")
                            .from(Phones::Table, Phones::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_phones_user_id")
                    .table(Phones::Table)
                    .col(Phones::UserId)
                    .col(Phones::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Phones::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Phones {
    Table,
    Id,
    UserId,
    Number,
    CityCode,
    CountryCode,
    Position,
}

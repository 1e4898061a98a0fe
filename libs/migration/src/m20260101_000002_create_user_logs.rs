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
                    .table(UserLogs::Table)
                    .if_not_exists()
                    .col(pk_uuid(UserLogs::Id))
                    .col(uuid(UserLogs::UserId))
                    .col(string(UserLogs::Action))
                    .col(
                        timestamp_with_time_zone(UserLogs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_logs_user_id")
                            .from(UserLogs::Table, UserLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_logs_user_id_created_at")
                    .table(UserLogs::Table)
                    .col(UserLogs::UserId)
                    .col(UserLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_logs_created_at")
                    .table(UserLogs::Table)
                    .col(UserLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLogs::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserLogs {
    Table,
    Id,
    UserId,
    Action,
    CreatedAt,
}

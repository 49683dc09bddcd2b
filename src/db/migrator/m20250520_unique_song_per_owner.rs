use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The unique index covers lookups by (user_id, title).
        manager
            .drop_index(
                Index::drop()
                    .name("idx_songs_user_title")
                    .table(Songs::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_songs_user_title_artist")
                    .table(Songs::Table)
                    .col(Songs::UserId)
                    .col(Songs::Title)
                    .col(Songs::Artist)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_songs_user_title_artist")
                    .table(Songs::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_songs_user_title")
                    .table(Songs::Table)
                    .col(Songs::UserId)
                    .col(Songs::Title)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Songs {
    Table,
    UserId,
    Title,
    Artist,
}

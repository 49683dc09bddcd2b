use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Songs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Songs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Songs::UserId).integer().not_null())
                    .col(ColumnDef::new(Songs::Title).string().not_null())
                    .col(ColumnDef::new(Songs::Artist).string().not_null())
                    .col(ColumnDef::new(Songs::Genre).string().null())
                    .col(ColumnDef::new(Songs::Year).integer().null())
                    .col(ColumnDef::new(Songs::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Songs::UpdatedAt).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_songs_user_id")
                            .from(Songs::Table, Songs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_songs_user_id")
                    .table(Songs::Table)
                    .col(Songs::UserId)
                    .if_not_exists()
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
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_songs_user_artist")
                    .table(Songs::Table)
                    .col(Songs::UserId)
                    .col(Songs::Artist)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Songs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Songs {
    Table,
    Id,
    UserId,
    Title,
    Artist,
    Genre,
    Year,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("songs", "play_count").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Songs::Table)
                        .add_column(
                            ColumnDef::new(Songs::PlayCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("songs", "last_played_at").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Songs::Table)
                        .add_column(ColumnDef::new(Songs::LastPlayedAt).string().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Songs::Table)
                    .drop_column(Songs::PlayCount)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Songs::Table)
                    .drop_column(Songs::LastPlayedAt)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Songs {
    Table,
    PlayCount,
    LastPlayedAt,
}

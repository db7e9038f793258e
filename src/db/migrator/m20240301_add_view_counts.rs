use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Fresh databases already get the column from the entity definition.
        if !manager.has_column("content", "view_count").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Content::Table)
                        .add_column(
                            ColumnDef::new(Content::ViewCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;
        }

        for (name, column) in [
            ("idx_content_year", Content::Year),
            ("idx_content_rating", Content::Rating),
            ("idx_content_view_count", Content::ViewCount),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Content::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_content_year",
            "idx_content_rating",
            "idx_content_view_count",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Content::Table).to_owned())
                .await?;
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Content::Table)
                    .drop_column(Content::ViewCount)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Content {
    Table,
    Year,
    Rating,
    ViewCount,
}

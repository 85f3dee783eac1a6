use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Writings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Writings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Writings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Writings::Title).string().not_null())
                    .col(
                        ColumnDef::new(Writings::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Writings::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Writings::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Writings::Excerpt).text())
                    .col(ColumnDef::new(Writings::Content).text().not_null())
                    .col(ColumnDef::new(Writings::FeaturedImage).string())
                    .col(
                        ColumnDef::new(Writings::DownloadableFiles)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Writings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Writings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Writings::Table, Writings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Published listing filters on status and orders by published_at.
        manager
            .create_index(
                Index::create()
                    .table(Writings::Table)
                    .col(Writings::Status)
                    .col(Writings::PublishedAt)
                    .name("idx_writings_status_published_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Writings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Writings {
    Table,
    Id,
    UserId,
    Title,
    Slug,
    Status,
    PublishedAt,
    Excerpt,
    Content,
    FeaturedImage,
    DownloadableFiles,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Product::Pid)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Product::Pname, 255))
                    .col(text(Product::ProductCategory))
                    .col(text(Product::ImageUrl).default(""))
                    // Written only by review mutations
                    .col(decimal_len(Product::AvgRating, 3, 2).default(0))
                    .col(
                        timestamp_with_time_zone(Product::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE product
                    ADD CONSTRAINT product_pname_not_blank CHECK (btrim(pname) <> ''),
                    ADD CONSTRAINT product_category_not_blank CHECK (btrim(product_category) <> ''),
                    ADD CONSTRAINT product_avg_rating_range CHECK (avg_rating BETWEEN 0 AND 5)
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::ProductCategory)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_avg_rating")
                    .table(Product::Table)
                    .col(Product::AvgRating)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Product::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Product {
    Table,
    Pid,
    Pname,
    ProductCategory,
    ImageUrl,
    AvgRating,
    CreatedAt,
}

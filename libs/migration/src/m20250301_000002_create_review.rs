use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_product::Product;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Rid)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(Review::ProdId))
                    .col(small_integer(Review::Rating))
                    .col(integer(Review::HelpfulCount).default(0))
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_product")
                            .from(Review::Table, Review::ProdId)
                            .to(Product::Table, Product::Pid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE review
                    ADD CONSTRAINT review_rating_range CHECK (rating BETWEEN 1 AND 5),
                    ADD CONSTRAINT review_helpful_count_non_negative CHECK (helpful_count >= 0)
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_prod_id")
                    .table(Review::Table)
                    .col(Review::ProdId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Rid,
    ProdId,
    Rating,
    HelpfulCount,
    CreatedAt,
}

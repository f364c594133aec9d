use async_trait::async_trait;
use chrono::{DateTime, Utc};
use query_filters::{Filters, Metadata};
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use std::time::Duration;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::products::models::{CreateProduct, Product, ProductFilter, ProductSort};
use crate::products::repository::ProductRepository;
use crate::storage::{DEFAULT_QUERY_TIMEOUT, ExistsRow, IdRow, bounded};

/// Column list shared by every product read. `avg_rating` is NUMERIC(3,2) in
/// storage and travels as float8.
const PRODUCT_COLUMNS: &str = "p.pid, p.pname, p.product_category, p.image_url, \
     p.avg_rating::float8 AS avg_rating, p.created_at";

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
    timeout: Duration,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-operation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn insert_row(&self, input: CreateProduct) -> CatalogResult<Product> {
        let sql = format!(
            r#"
            INSERT INTO product AS p (pname, product_category, image_url)
            VALUES ($1, $2, $3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                input.pname.into(),
                input.product_category.into(),
                input.image_url.into(),
            ],
        );

        let row = ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::Storage(DbErr::RecordNotInserted))?;

        Ok(row.into())
    }

    async fn find_row(&self, id: i64) -> CatalogResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.pid = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = ProductRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn update_row(&self, product: Product) -> CatalogResult<Product> {
        let sql = format!(
            r#"
            UPDATE product AS p
            SET pname = $1, product_category = $2, image_url = $3
            WHERE p.pid = $4
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let pid = product.pid;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.pname.into(),
                product.product_category.into(),
                product.image_url.into(),
                pid.into(),
            ],
        );

        ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or(CatalogError::NotFound(RecordKind::Product, pid))
    }

    async fn delete_row(&self, id: i64) -> CatalogResult<bool> {
        // review rows go with it through ON DELETE CASCADE
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM product WHERE pid = $1 RETURNING pid AS id",
            [id.into()],
        );

        let deleted = IdRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(deleted.is_some())
    }

    async fn list_rows(
        &self,
        filter: ProductFilter,
        filters: Filters<ProductSort>,
    ) -> CatalogResult<(Vec<Product>, Metadata)> {
        let sql = format!(
            r#"
            SELECT COUNT(*) OVER() AS total_records, {PRODUCT_COLUMNS}
            FROM product p
            WHERE ($1::text IS NULL OR position(lower($1::text) in lower(p.pname)) > 0)
              AND ($2::text IS NULL OR position(lower($2::text) in lower(p.product_category)) > 0)
              AND ($3::float8 IS NULL OR p.avg_rating = ROUND($3::float8::numeric, 2))
            ORDER BY {}
            LIMIT $4 OFFSET $5
            "#,
            filters.order_by_clause()
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                filter.pname.into(),
                filter.product_category.into(),
                filter.avg_rating.into(),
                filters.limit().into(),
                filters.offset().into(),
            ],
        );

        let rows = ProductPageRow::find_by_statement(stmt).all(&self.db).await?;

        let total_records = rows.first().map_or(0, |r| r.total_records);
        let products = rows.into_iter().map(Into::into).collect();
        Ok((products, filters.metadata(total_records)))
    }

    async fn exists_row(&self, id: i64) -> CatalogResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM product WHERE pid = $1) AS found",
            [id.into()],
        );

        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|r| r.found))
    }
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    pid: i64,
    pname: String,
    product_category: String,
    image_url: String,
    avg_rating: f64,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            pid: row.pid,
            pname: row.pname,
            product_category: row.product_category,
            image_url: row.image_url,
            avg_rating: row.avg_rating,
            created_at: row.created_at,
        }
    }
}

/// A list row: the product plus the size of the whole filtered set.
#[derive(Debug, FromQueryResult)]
struct ProductPageRow {
    total_records: i64,
    pid: i64,
    pname: String,
    product_category: String,
    image_url: String,
    avg_rating: f64,
    created_at: DateTime<Utc>,
}

impl From<ProductPageRow> for Product {
    fn from(row: ProductPageRow) -> Self {
        Self {
            pid: row.pid,
            pname: row.pname,
            product_category: row.product_category,
            image_url: row.image_url,
            avg_rating: row.avg_rating,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, input: CreateProduct) -> CatalogResult<Product> {
        let product = bounded(self.timeout, "product.insert", self.insert_row(input)).await?;

        tracing::info!(product_id = product.pid, "Created product");
        Ok(product)
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<Product>> {
        bounded(self.timeout, "product.get", self.find_row(id)).await
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let product = bounded(self.timeout, "product.update", self.update_row(product)).await?;

        tracing::info!(product_id = product.pid, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let deleted = bounded(self.timeout, "product.delete", self.delete_row(id)).await?;

        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }

    async fn list(
        &self,
        filter: ProductFilter,
        filters: Filters<ProductSort>,
    ) -> CatalogResult<(Vec<Product>, Metadata)> {
        bounded(self.timeout, "product.list", self.list_rows(filter, filters)).await
    }

    async fn exists(&self, id: i64) -> CatalogResult<bool> {
        bounded(self.timeout, "product.exists", self.exists_row(id)).await
    }
}

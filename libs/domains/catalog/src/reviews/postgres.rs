//! PostgreSQL review storage.
//!
//! Rating mutations follow one protocol so that `product.avg_rating` always
//! matches the committed reviews:
//!
//! 1. begin a transaction
//! 2. lock the owning product row `FOR UPDATE`
//! 3. insert, update or delete the review
//! 4. recompute the product average ([`RECOMPUTE_AVG_RATING_SQL`])
//! 5. commit
//!
//! The row lock serialises recomputations for one product. Any error before
//! step 5 drops the transaction, which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use query_filters::{Filters, Metadata};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, FromQueryResult,
    Statement, TransactionTrait,
};
use std::time::Duration;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::rating::RECOMPUTE_AVG_RATING_SQL;
use crate::reviews::models::{CreateReview, Review, ReviewField, ReviewFilter, ReviewSort};
use crate::reviews::repository::ReviewRepository;
use crate::storage::{DEFAULT_QUERY_TIMEOUT, IdRow, bounded};

const REVIEW_COLUMNS: &str = "r.rid, r.prod_id, p.pname AS product_name, r.rating, \
     r.helpful_count, r.created_at";

/// PostgreSQL implementation of ReviewRepository
#[derive(Clone)]
pub struct PgReviewRepository {
    db: DatabaseConnection,
    timeout: Duration,
}

impl PgReviewRepository {
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

    async fn insert_tx(&self, input: CreateReview) -> CatalogResult<Review> {
        let txn = self.db.begin().await?;

        let locked = lock_product(&txn, input.prod_id).await?;
        let Some(pid) = locked else {
            return Err(CatalogError::DanglingReference {
                field: ReviewField::ProdId.into(),
                kind: RecordKind::Product,
                id: input.prod_id,
            });
        };

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO review (prod_id, rating) VALUES ($1, $2) RETURNING rid AS id",
            [pid.into(), input.rating.into()],
        );
        let rid = IdRow::find_by_statement(stmt)
            .one(&txn)
            .await?
            .ok_or(CatalogError::Storage(DbErr::RecordNotInserted))?
            .id;

        recompute_avg_rating(&txn, pid).await?;
        let review = read_back(&txn, rid).await?;

        txn.commit().await?;
        Ok(review)
    }

    async fn update_rating_tx(&self, id: i64, rating: i16) -> CatalogResult<Review> {
        let txn = self.db.begin().await?;

        let pid = lock_product_of_review(&txn, id)
            .await?
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE review SET rating = $1 WHERE rid = $2 RETURNING rid AS id",
            [rating.into(), id.into()],
        );
        IdRow::find_by_statement(stmt)
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))?;

        recompute_avg_rating(&txn, pid).await?;
        let review = read_back(&txn, id).await?;

        txn.commit().await?;
        Ok(review)
    }

    async fn delete_tx(&self, id: i64) -> CatalogResult<Option<i64>> {
        let txn = self.db.begin().await?;

        let Some(pid) = lock_product_of_review(&txn, id).await? else {
            return Ok(None);
        };

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM review WHERE rid = $1 RETURNING rid AS id",
            [id.into()],
        );
        if IdRow::find_by_statement(stmt).one(&txn).await?.is_none() {
            return Ok(None);
        }

        recompute_avg_rating(&txn, pid).await?;

        txn.commit().await?;
        Ok(Some(pid))
    }

    async fn adjust_helpful_count_row(&self, id: i64, delta: i32) -> CatalogResult<Review> {
        // One statement, so concurrent votes cannot overwrite each other
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            WITH updated AS (
                UPDATE review
                SET helpful_count = GREATEST(0, helpful_count + $1)
                WHERE rid = $2
                RETURNING rid, prod_id, rating, helpful_count, created_at
            )
            SELECT u.rid, u.prod_id, p.pname AS product_name, u.rating, u.helpful_count, u.created_at
            FROM updated u
            JOIN product p ON p.pid = u.prod_id
            "#,
            [delta.into(), id.into()],
        );

        ReviewRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))
    }

    async fn list_rows(
        &self,
        filter: ReviewFilter,
        filters: Filters<ReviewSort>,
    ) -> CatalogResult<(Vec<Review>, Metadata)> {
        let sql = format!(
            r#"
            SELECT COUNT(*) OVER() AS total_records, {REVIEW_COLUMNS}
            FROM review r
            JOIN product p ON p.pid = r.prod_id
            WHERE ($1::bigint IS NULL OR r.prod_id = $1::bigint)
              AND ($2::smallint IS NULL OR r.rating = $2::smallint)
              AND ($3::integer IS NULL OR r.helpful_count = $3::integer)
            ORDER BY {}
            LIMIT $4 OFFSET $5
            "#,
            filters.order_by_clause()
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                filter.prod_id.into(),
                filter.rating.into(),
                filter.helpful_count.into(),
                filters.limit().into(),
                filters.offset().into(),
            ],
        );

        let rows = ReviewPageRow::find_by_statement(stmt).all(&self.db).await?;

        let total_records = rows.first().map_or(0, |r| r.total_records);
        let reviews = rows.into_iter().map(Into::into).collect();
        Ok((reviews, filters.metadata(total_records)))
    }
}

/// Lock product `pid` for the rest of the transaction. `None` if it is gone.
async fn lock_product(txn: &DatabaseTransaction, pid: i64) -> CatalogResult<Option<i64>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pid AS id FROM product WHERE pid = $1 FOR UPDATE",
        [pid.into()],
    );
    let row = IdRow::find_by_statement(stmt).one(txn).await?;
    Ok(row.map(|r| r.id))
}

/// Lock the product owning review `rid`. `None` if the review is gone.
async fn lock_product_of_review(txn: &DatabaseTransaction, rid: i64) -> CatalogResult<Option<i64>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        SELECT p.pid AS id
        FROM review r
        JOIN product p ON p.pid = r.prod_id
        WHERE r.rid = $1
        FOR UPDATE OF p
        "#,
        [rid.into()],
    );
    let row = IdRow::find_by_statement(stmt).one(txn).await?;
    Ok(row.map(|r| r.id))
}

async fn recompute_avg_rating(txn: &DatabaseTransaction, pid: i64) -> CatalogResult<()> {
    let stmt =
        Statement::from_sql_and_values(DbBackend::Postgres, RECOMPUTE_AVG_RATING_SQL, [pid.into()]);

    IdRow::find_by_statement(stmt)
        .one(txn)
        .await?
        .ok_or(CatalogError::NotFound(RecordKind::Product, pid))?;
    Ok(())
}

async fn find_review<C: ConnectionTrait>(conn: &C, rid: i64) -> CatalogResult<Option<Review>> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM review r JOIN product p ON p.pid = r.prod_id WHERE r.rid = $1"
    );
    let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [rid.into()]);

    let row = ReviewRow::find_by_statement(stmt).one(conn).await?;
    Ok(row.map(Into::into))
}

/// Read a review inside the transaction that just wrote it.
async fn read_back(txn: &DatabaseTransaction, rid: i64) -> CatalogResult<Review> {
    find_review(txn, rid)
        .await?
        .ok_or(CatalogError::NotFound(RecordKind::Review, rid))
}

#[derive(Debug, FromQueryResult)]
struct ReviewRow {
    rid: i64,
    prod_id: i64,
    product_name: String,
    rating: i16,
    helpful_count: i32,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            rid: row.rid,
            prod_id: row.prod_id,
            product_name: row.product_name,
            rating: row.rating,
            helpful_count: row.helpful_count,
            created_at: row.created_at,
        }
    }
}

/// A list row: the review plus the size of the whole filtered set.
#[derive(Debug, FromQueryResult)]
struct ReviewPageRow {
    total_records: i64,
    rid: i64,
    prod_id: i64,
    product_name: String,
    rating: i16,
    helpful_count: i32,
    created_at: DateTime<Utc>,
}

impl From<ReviewPageRow> for Review {
    fn from(row: ReviewPageRow) -> Self {
        Self {
            rid: row.rid,
            prod_id: row.prod_id,
            product_name: row.product_name,
            rating: row.rating,
            helpful_count: row.helpful_count,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(&self, input: CreateReview) -> CatalogResult<Review> {
        let review = bounded(self.timeout, "review.insert", self.insert_tx(input)).await?;

        tracing::info!(review_id = review.rid, product_id = review.prod_id, "Created review");
        Ok(review)
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<Review>> {
        bounded(self.timeout, "review.get", find_review(&self.db, id)).await
    }

    async fn update_rating(&self, id: i64, rating: i16) -> CatalogResult<Review> {
        let review = bounded(
            self.timeout,
            "review.update_rating",
            self.update_rating_tx(id, rating),
        )
        .await?;

        tracing::info!(review_id = id, product_id = review.prod_id, "Updated review rating");
        Ok(review)
    }

    async fn adjust_helpful_count(&self, id: i64, delta: i32) -> CatalogResult<Review> {
        let review = bounded(
            self.timeout,
            "review.adjust_helpful_count",
            self.adjust_helpful_count_row(id, delta),
        )
        .await?;

        tracing::debug!(review_id = id, helpful_count = review.helpful_count, "Adjusted helpful count");
        Ok(review)
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let deleted = bounded(self.timeout, "review.delete", self.delete_tx(id)).await?;

        match deleted {
            Some(pid) => {
                tracing::info!(review_id = id, product_id = pid, "Deleted review");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(
        &self,
        filter: ReviewFilter,
        filters: Filters<ReviewSort>,
    ) -> CatalogResult<(Vec<Review>, Metadata)> {
        bounded(self.timeout, "review.list", self.list_rows(filter, filters)).await
    }
}

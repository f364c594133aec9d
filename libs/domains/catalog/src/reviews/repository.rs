use async_trait::async_trait;
use chrono::Utc;
use query_filters::{Filters, Metadata, SortDirection};
use std::cmp::Ordering;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::memory::{MemoryStore, StoredReview};
use crate::reviews::models::{CreateReview, Review, ReviewField, ReviewFilter, ReviewSort};

/// Repository trait for Review persistence.
///
/// Every call that changes a rating also recomputes the owning product's
/// `avg_rating` before it returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review; fails with `DanglingReference` if the product is gone
    async fn insert(&self, input: CreateReview) -> CatalogResult<Review>;

    /// Get a review by ID
    async fn get(&self, id: i64) -> CatalogResult<Option<Review>>;

    /// Replace a review's rating
    async fn update_rating(&self, id: i64, rating: i16) -> CatalogResult<Review>;

    /// Add `delta` to the helpful count, never going below zero
    async fn adjust_helpful_count(&self, id: i64, delta: i32) -> CatalogResult<Review>;

    /// Delete a review by ID
    async fn delete(&self, id: i64) -> CatalogResult<bool>;

    /// One page of matching reviews plus paging metadata
    async fn list(
        &self,
        filter: ReviewFilter,
        filters: Filters<ReviewSort>,
    ) -> CatalogResult<(Vec<Review>, Metadata)>;
}

/// In-memory implementation of ReviewRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryReviewRepository {
    store: MemoryStore,
}

impl InMemoryReviewRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn insert(&self, input: CreateReview) -> CatalogResult<Review> {
        let mut state = self.store.write().await;

        if !state.products.contains_key(&input.prod_id) {
            return Err(CatalogError::DanglingReference {
                field: ReviewField::ProdId.into(),
                kind: RecordKind::Product,
                id: input.prod_id,
            });
        }

        let stored = StoredReview {
            rid: state.next_rid(),
            prod_id: input.prod_id,
            rating: input.rating,
            helpful_count: 0,
            created_at: Utc::now(),
        };
        state.reviews.insert(stored.rid, stored.clone());
        state.recompute_avg_rating(stored.prod_id);

        tracing::info!(review_id = stored.rid, product_id = stored.prod_id, "Created review");
        Ok(state.review_view(&stored))
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<Review>> {
        let state = self.store.read().await;
        Ok(state.reviews.get(&id).map(|r| state.review_view(r)))
    }

    async fn update_rating(&self, id: i64, rating: i16) -> CatalogResult<Review> {
        let mut state = self.store.write().await;

        let stored = state
            .reviews
            .get_mut(&id)
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))?;
        stored.rating = rating;
        let stored = stored.clone();

        state.recompute_avg_rating(stored.prod_id);

        tracing::info!(review_id = id, product_id = stored.prod_id, "Updated review rating");
        Ok(state.review_view(&stored))
    }

    async fn adjust_helpful_count(&self, id: i64, delta: i32) -> CatalogResult<Review> {
        let mut state = self.store.write().await;

        let stored = state
            .reviews
            .get_mut(&id)
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))?;
        stored.helpful_count = stored.helpful_count.saturating_add(delta).max(0);
        let stored = stored.clone();

        tracing::debug!(review_id = id, helpful_count = stored.helpful_count, "Adjusted helpful count");
        Ok(state.review_view(&stored))
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut state = self.store.write().await;

        let Some(removed) = state.reviews.remove(&id) else {
            return Ok(false);
        };
        state.recompute_avg_rating(removed.prod_id);

        tracing::info!(review_id = id, product_id = removed.prod_id, "Deleted review");
        Ok(true)
    }

    async fn list(
        &self,
        filter: ReviewFilter,
        filters: Filters<ReviewSort>,
    ) -> CatalogResult<(Vec<Review>, Metadata)> {
        let state = self.store.read().await;

        let mut matching: Vec<Review> = state
            .reviews
            .values()
            .map(|r| state.review_view(r))
            .filter(|r| filter.matches(r))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_by(a, b, filters.sort);
            let ordering = match filters.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            ordering.then(a.rid.cmp(&b.rid))
        });

        let matched = matching.len() as i64;
        let page: Vec<Review> = matching
            .into_iter()
            .skip(usize::try_from(filters.offset()).unwrap_or_default())
            .take(usize::try_from(filters.limit()).unwrap_or_default())
            .collect();

        // Counted per returned row, as COUNT(*) OVER() does: an empty page has no total
        let total_records = if page.is_empty() { 0 } else { matched };
        Ok((page, filters.metadata(total_records)))
    }
}

fn compare_by(a: &Review, b: &Review, sort: ReviewSort) -> Ordering {
    match sort {
        ReviewSort::Rid => a.rid.cmp(&b.rid),
        ReviewSort::Rating => a.rating.cmp(&b.rating),
        ReviewSort::HelpfulCount => a.helpful_count.cmp(&b.helpful_count),
        ReviewSort::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

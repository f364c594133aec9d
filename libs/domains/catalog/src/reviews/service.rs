use query_filters::Metadata;
use std::sync::Arc;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::products::ProductRepository;
use crate::reviews::models::{
    CreateReview, HelpfulVote, Review, ReviewField, ReviewListQuery, UpdateReview,
};
use crate::reviews::repository::ReviewRepository;

/// Service layer for Review business logic
#[derive(Clone)]
pub struct ReviewService<R: ReviewRepository, P: ProductRepository> {
    repository: Arc<R>,
    products: Arc<P>,
}

impl<R: ReviewRepository, P: ProductRepository> ReviewService<R, P> {
    pub fn new(repository: R, products: P) -> Self {
        Self {
            repository: Arc::new(repository),
            products: Arc::new(products),
        }
    }

    /// Create a review for an existing product
    pub async fn create_review(&self, input: CreateReview) -> CatalogResult<Review> {
        input.validate()?;

        if !self.products.exists(input.prod_id).await? {
            return Err(CatalogError::DanglingReference {
                field: ReviewField::ProdId.into(),
                kind: RecordKind::Product,
                id: input.prod_id,
            });
        }

        // The repository checks again under the product lock
        self.repository.insert(input).await
    }

    /// Get a review by ID
    pub async fn get_review(&self, id: i64) -> CatalogResult<Review> {
        if id < 1 {
            return Err(CatalogError::NotFound(RecordKind::Review, id));
        }

        self.repository
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(RecordKind::Review, id))
    }

    /// Apply a partial update; an empty body returns the review unchanged
    pub async fn update_review(&self, id: i64, input: UpdateReview) -> CatalogResult<Review> {
        input.validate()?;

        match input.rating {
            Some(rating) if id >= 1 => self.repository.update_rating(id, rating).await,
            _ => self.get_review(id).await,
        }
    }

    /// Record a helpful (+1) or unhelpful (-1) vote
    pub async fn vote_helpful(&self, id: i64, vote: HelpfulVote) -> CatalogResult<Review> {
        vote.validate()?;

        if id < 1 {
            return Err(CatalogError::NotFound(RecordKind::Review, id));
        }
        self.repository
            .adjust_helpful_count(id, i32::from(vote.increment))
            .await
    }

    /// Delete a review
    pub async fn delete_review(&self, id: i64) -> CatalogResult<()> {
        if id < 1 {
            return Err(CatalogError::NotFound(RecordKind::Review, id));
        }

        if !self.repository.delete(id).await? {
            return Err(CatalogError::NotFound(RecordKind::Review, id));
        }

        Ok(())
    }

    /// List reviews matching the query string
    pub async fn list_reviews(
        &self,
        query: ReviewListQuery,
    ) -> CatalogResult<(Vec<Review>, Metadata)> {
        let (filter, filters) = query.into_parts()?;
        self.repository.list(filter, filters).await
    }
}

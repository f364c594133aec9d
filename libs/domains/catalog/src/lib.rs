//! Catalog Domain
//!
//! Products and their reviews, with each product's average rating kept
//! consistent with its reviews.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, JSON envelopes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, PATCH merge, reference checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + PostgreSQL / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, sort keys
//! └─────────────┘
//! ```
//!
//! Review writes run inside one transaction that locks the owning product
//! row, mutates the review and recomputes `avg_rating` before committing.
//! The in-memory store does the same under a single write lock.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     MemoryStore, InMemoryProductRepository, InMemoryReviewRepository,
//!     ProductService, ReviewService, products, reviews,
//! };
//!
//! let store = MemoryStore::new();
//! let product_service = ProductService::new(InMemoryProductRepository::new(store.clone()));
//! let review_service = ReviewService::new(
//!     InMemoryReviewRepository::new(store.clone()),
//!     InMemoryProductRepository::new(store),
//! );
//!
//! let router = axum::Router::new()
//!     .nest("/products", products::handlers::router(product_service))
//!     .nest("/reviews", reviews::handlers::router(review_service));
//! ```

pub mod envelope;
pub mod error;
pub mod memory;
pub mod products;
pub mod rating;
pub mod reviews;
pub mod storage;

// Re-export commonly used types
pub use envelope::MessageEnvelope;
pub use error::{CatalogError, CatalogResult, RecordKind};
pub use memory::MemoryStore;
pub use products::{
    CreateProduct, InMemoryProductRepository, PgProductRepository, Product, ProductFilter,
    ProductListQuery, ProductRepository, ProductService, ProductSort, UpdateProduct,
};
pub use reviews::{
    CreateReview, HelpfulVote, InMemoryReviewRepository, PgReviewRepository, Review, ReviewFilter,
    ReviewListQuery, ReviewRepository, ReviewService, ReviewSort, UpdateReview,
};
pub use storage::DEFAULT_QUERY_TIMEOUT;

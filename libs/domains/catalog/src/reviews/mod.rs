//! Reviews: ratings and helpful votes attached to a product.

pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use models::{
    CreateReview, HelpfulVote, Review, ReviewEnvelope, ReviewField, ReviewFilter,
    ReviewListQuery, ReviewSort, ReviewsEnvelope, UpdateReview,
};
pub use postgres::PgReviewRepository;
pub use repository::{InMemoryReviewRepository, ReviewRepository};
pub use service::ReviewService;

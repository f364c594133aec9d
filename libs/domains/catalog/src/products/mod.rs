//! Products: the owning side of the catalog.

pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use models::{
    CreateProduct, Product, ProductEnvelope, ProductField, ProductFilter, ProductListQuery,
    ProductSort, ProductsEnvelope, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;

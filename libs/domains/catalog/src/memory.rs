//! In-memory catalog storage for development and tests.
//!
//! Products and reviews live behind one `RwLock`, so a review write, the
//! cascade on product delete and the average recomputation all happen under
//! the same write guard. That gives the in-memory repositories the same
//! consistency the PostgreSQL ones get from a transaction and a row lock.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::products::Product;
use crate::rating::average_rating;
use crate::reviews::Review;

/// Review as stored; the product name is joined in on read.
#[derive(Debug, Clone)]
pub(crate) struct StoredReview {
    pub rid: i64,
    pub prod_id: i64,
    pub rating: i16,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub products: BTreeMap<i64, Product>,
    pub reviews: BTreeMap<i64, StoredReview>,
    last_pid: i64,
    last_rid: i64,
}

impl CatalogState {
    pub fn next_pid(&mut self) -> i64 {
        self.last_pid += 1;
        self.last_pid
    }

    pub fn next_rid(&mut self) -> i64 {
        self.last_rid += 1;
        self.last_rid
    }

    /// Store the mean of `pid`'s current reviews on the product.
    pub fn recompute_avg_rating(&mut self, pid: i64) {
        let avg = average_rating(
            self.reviews
                .values()
                .filter(|r| r.prod_id == pid)
                .map(|r| r.rating),
        );
        if let Some(product) = self.products.get_mut(&pid) {
            product.avg_rating = avg;
        }
    }

    /// Remove a product and every review it owns. Returns whether it existed.
    pub fn delete_product(&mut self, pid: i64) -> bool {
        if self.products.remove(&pid).is_none() {
            return false;
        }
        self.reviews.retain(|_, r| r.prod_id != pid);
        true
    }

    /// Join a stored review with its product's name.
    pub fn review_view(&self, stored: &StoredReview) -> Review {
        let product_name = self
            .products
            .get(&stored.prod_id)
            .map(|p| p.pname.clone())
            .unwrap_or_default();

        Review {
            rid: stored.rid,
            prod_id: stored.prod_id,
            product_name,
            rating: stored.rating,
            helpful_count: stored.helpful_count,
            created_at: stored.created_at,
        }
    }
}

/// Shared handle to the in-memory catalog. Clones see the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<CatalogState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().await
    }
}

use async_trait::async_trait;
use chrono::Utc;
use query_filters::{Filters, Metadata, SortDirection};
use std::cmp::Ordering;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::memory::MemoryStore;
use crate::products::models::{CreateProduct, Product, ProductFilter, ProductSort};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a validated product; storage assigns `pid` and `created_at`
    async fn insert(&self, input: CreateProduct) -> CatalogResult<Product>;

    /// Get a product by ID
    async fn get(&self, id: i64) -> CatalogResult<Option<Product>>;

    /// Overwrite the client-writable fields of an existing product
    async fn update(&self, product: Product) -> CatalogResult<Product>;

    /// Delete a product and, through the cascade, its reviews
    async fn delete(&self, id: i64) -> CatalogResult<bool>;

    /// One page of matching products plus paging metadata
    async fn list(
        &self,
        filter: ProductFilter,
        filters: Filters<ProductSort>,
    ) -> CatalogResult<(Vec<Product>, Metadata)>;

    /// Check whether a product exists
    async fn exists(&self, id: i64) -> CatalogResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: MemoryStore,
}

impl InMemoryProductRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, input: CreateProduct) -> CatalogResult<Product> {
        let mut state = self.store.write().await;

        let product = Product {
            pid: state.next_pid(),
            pname: input.pname,
            product_category: input.product_category,
            image_url: input.image_url,
            avg_rating: 0.0,
            created_at: Utc::now(),
        };
        state.products.insert(product.pid, product.clone());

        tracing::info!(product_id = product.pid, "Created product");
        Ok(product)
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<Product>> {
        let state = self.store.read().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let mut state = self.store.write().await;

        let stored = state
            .products
            .get_mut(&product.pid)
            .ok_or(CatalogError::NotFound(RecordKind::Product, product.pid))?;

        // avg_rating and created_at stay as stored
        stored.pname = product.pname;
        stored.product_category = product.product_category;
        stored.image_url = product.image_url;

        tracing::info!(product_id = stored.pid, "Updated product");
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut state = self.store.write().await;
        let deleted = state.delete_product(id);

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
        let state = self.store.read().await;

        let mut matching: Vec<&Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_by(a, b, filters.sort);
            let ordering = match filters.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            ordering.then(a.pid.cmp(&b.pid))
        });

        let matched = matching.len() as i64;
        let page: Vec<Product> = matching
            .into_iter()
            .skip(usize::try_from(filters.offset()).unwrap_or_default())
            .take(usize::try_from(filters.limit()).unwrap_or_default())
            .cloned()
            .collect();

        // Counted per returned row, as COUNT(*) OVER() does: an empty page has no total
        let total_records = if page.is_empty() { 0 } else { matched };
        Ok((page, filters.metadata(total_records)))
    }

    async fn exists(&self, id: i64) -> CatalogResult<bool> {
        let state = self.store.read().await;
        Ok(state.products.contains_key(&id))
    }
}

fn compare_by(a: &Product, b: &Product, sort: ProductSort) -> Ordering {
    match sort {
        ProductSort::Pid => a.pid.cmp(&b.pid),
        ProductSort::Pname => a.pname.to_lowercase().cmp(&b.pname.to_lowercase()),
        ProductSort::ProductCategory => a
            .product_category
            .to_lowercase()
            .cmp(&b.product_category.to_lowercase()),
        ProductSort::AvgRating => a.avg_rating.total_cmp(&b.avg_rating),
        ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(pname: &str, category: &str) -> CreateProduct {
        CreateProduct {
            pname: pname.to_string(),
            product_category: category.to_string(),
            image_url: String::new(),
        }
    }

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new(MemoryStore::new());
        for (pname, category) in [
            ("Walnut Desk", "office"),
            ("Keyboard", "peripherals"),
            ("Standing Desk", "office"),
            ("Mouse", "peripherals"),
            ("Desk Lamp", "lighting"),
        ] {
            repo.insert(new_product(pname, category)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_zero_average() {
        let repo = InMemoryProductRepository::new(MemoryStore::new());

        let first = repo.insert(new_product("Desk", "office")).await.unwrap();
        let second = repo.insert(new_product("Chair", "office")).await.unwrap();

        assert_eq!(first.pid, 1);
        assert_eq!(second.pid, 2);
        assert_eq!(first.avg_rating, 0.0);
        assert!(repo.exists(1).await.unwrap());
        assert!(!repo.exists(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_derived_fields() {
        let repo = InMemoryProductRepository::new(MemoryStore::new());
        let created = repo.insert(new_product("Desk", "office")).await.unwrap();

        let mut changed = created.clone();
        changed.pname = "Oak Desk".to_string();
        changed.avg_rating = 5.0;

        let updated = repo.update(changed).await.unwrap();
        assert_eq!(updated.pname, "Oak Desk");
        assert_eq!(updated.avg_rating, 0.0);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = InMemoryProductRepository::new(MemoryStore::new());
        let ghost = Product {
            pid: 9,
            pname: "Ghost".to_string(),
            product_category: "none".to_string(),
            image_url: String::new(),
            avg_rating: 0.0,
            created_at: Utc::now(),
        };

        let result = repo.update(ghost).await;
        assert!(matches!(
            result,
            Err(CatalogError::NotFound(RecordKind::Product, 9))
        ));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = seeded().await;
        assert!(repo.delete(2).await.unwrap());
        assert!(!repo.delete(2).await.unwrap());
        assert!(repo.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = seeded().await;
        let filter = ProductFilter {
            pname: Some("DESK".to_string()),
            ..Default::default()
        };
        let filters = Filters {
            page: 1,
            page_size: 2,
            ..Filters::default()
        };

        let (page, metadata) = repo.list(filter.clone(), filters).await.unwrap();
        assert_eq!(page.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(metadata.total_records, 3);
        assert_eq!(metadata.last_page, 2);
        assert_eq!(metadata.next_page, Some(2));

        let filters = Filters { page: 2, ..filters };
        let (page, metadata) = repo.list(filter, filters).await.unwrap();
        assert_eq!(page.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![5]);
        assert!(!metadata.has_next_page);
        assert_eq!(metadata.prev_page, Some(1));
    }

    #[tokio::test]
    async fn test_list_sorts_with_pid_tiebreak() {
        let repo = seeded().await;
        let filters = Filters {
            sort: ProductSort::ProductCategory,
            direction: SortDirection::Descending,
            ..Filters::default()
        };

        let (page, _) = repo.list(ProductFilter::default(), filters).await.unwrap();
        let pids: Vec<i64> = page.iter().map(|p| p.pid).collect();
        // peripherals (2, 4), office (1, 3), lighting (5)
        assert_eq!(pids, vec![2, 4, 1, 3, 5]);
    }

    #[tokio::test]
    async fn test_list_past_the_end_is_empty() {
        let repo = seeded().await;
        let filters = Filters {
            page: 4,
            page_size: 2,
            ..Filters::default()
        };

        let (page, metadata) = repo.list(ProductFilter::default(), filters).await.unwrap();
        assert!(page.is_empty());
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_list_sorts_names_case_insensitively() {
        let repo = InMemoryProductRepository::new(MemoryStore::new());
        for pname in ["banana", "Apple", "cherry", "apple"] {
            repo.insert(new_product(pname, "fruit")).await.unwrap();
        }
        let filters = Filters {
            sort: ProductSort::Pname,
            ..Filters::default()
        };

        let (page, _) = repo.list(ProductFilter::default(), filters).await.unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.pname.as_str()).collect();
        assert_eq!(names, vec!["Apple", "apple", "banana", "cherry"]);
    }

    #[tokio::test]
    async fn test_list_without_matches_has_empty_metadata() {
        let repo = seeded().await;
        let filter = ProductFilter {
            product_category: Some("garden".to_string()),
            ..Default::default()
        };

        let (page, metadata) = repo.list(filter, Filters::default()).await.unwrap();
        assert!(page.is_empty());
        assert!(metadata.is_empty());
    }
}

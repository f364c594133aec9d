use query_filters::Metadata;
use std::sync::Arc;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult, RecordKind};
use crate::products::models::{CreateProduct, Product, ProductListQuery, UpdateProduct};
use crate::products::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input.validate()?;
        self.repository.insert(input).await
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: i64) -> CatalogResult<Product> {
        if id < 1 {
            return Err(CatalogError::NotFound(RecordKind::Product, id));
        }

        self.repository
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(RecordKind::Product, id))
    }

    /// Merge `input` into the stored product and save the result
    pub async fn update_product(&self, id: i64, input: UpdateProduct) -> CatalogResult<Product> {
        input.validate()?;

        let mut product = self.get_product(id).await?;
        product.apply_update(input);
        product.validate()?;

        self.repository.update(product).await
    }

    /// Delete a product together with its reviews
    pub async fn delete_product(&self, id: i64) -> CatalogResult<()> {
        if id < 1 {
            return Err(CatalogError::NotFound(RecordKind::Product, id));
        }

        if !self.repository.delete(id).await? {
            return Err(CatalogError::NotFound(RecordKind::Product, id));
        }

        Ok(())
    }

    /// List products matching the query string
    pub async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> CatalogResult<(Vec<Product>, Metadata)> {
        let (filter, filters) = query.into_parts()?;
        self.repository.list(filter, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::models::ProductSort;
    use crate::products::repository::MockProductRepository;
    use chrono::Utc;
    use mockall::predicate::eq;
    use query_filters::SortDirection;

    fn stored(pid: i64) -> Product {
        Product {
            pid,
            pname: "Desk".to_string(),
            product_category: "office".to_string(),
            image_url: String::new(),
            avg_rating: 4.5,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_product_validates_before_insert() {
        let mut mock = MockProductRepository::new();
        mock.expect_insert().never();

        let service = ProductService::new(mock);
        let result = service
            .create_product(CreateProduct {
                pname: String::new(),
                product_category: "office".to_string(),
                image_url: String::new(),
            })
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_product_inserts_valid_input() {
        let mut mock = MockProductRepository::new();
        mock.expect_insert()
            .times(1)
            .returning(|input| {
                Ok(Product {
                    pname: input.pname,
                    ..stored(1)
                })
            });

        let service = ProductService::new(mock);
        let product = service
            .create_product(CreateProduct {
                pname: "Lamp".to_string(),
                product_category: "lighting".to_string(),
                image_url: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(product.pname, "Lamp");
    }

    #[tokio::test]
    async fn test_get_product_rejects_non_positive_ids() {
        let mut mock = MockProductRepository::new();
        mock.expect_get().never();

        let service = ProductService::new(mock);
        for id in [0, -1] {
            let result = service.get_product(id).await;
            assert!(matches!(
                result,
                Err(CatalogError::NotFound(RecordKind::Product, _))
            ));
        }
    }

    #[tokio::test]
    async fn test_get_product_missing() {
        let mut mock = MockProductRepository::new();
        mock.expect_get().with(eq(7)).returning(|_| Ok(None));

        let service = ProductService::new(mock);
        let result = service.get_product(7).await;
        assert!(matches!(
            result,
            Err(CatalogError::NotFound(RecordKind::Product, 7))
        ));
    }

    #[tokio::test]
    async fn test_update_product_merges_partial_input() {
        let mut mock = MockProductRepository::new();
        mock.expect_get().with(eq(3)).returning(|id| Ok(Some(stored(id))));
        mock.expect_update()
            .withf(|p| p.pid == 3 && p.pname == "Desk" && p.product_category == "furniture")
            .returning(Ok);

        let service = ProductService::new(mock);
        let product = service
            .update_product(
                3,
                UpdateProduct {
                    product_category: Some("furniture".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(product.product_category, "furniture");
        assert_eq!(product.avg_rating, 4.5);
    }

    #[tokio::test]
    async fn test_update_product_invalid_input_touches_nothing() {
        let mut mock = MockProductRepository::new();
        mock.expect_get().never();
        mock.expect_update().never();

        let service = ProductService::new(mock);
        let result = service
            .update_product(
                3,
                UpdateProduct {
                    pname: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_product_missing() {
        let mut mock = MockProductRepository::new();
        mock.expect_delete().with(eq(5)).returning(|_| Ok(false));

        let service = ProductService::new(mock);
        let result = service.delete_product(5).await;
        assert!(matches!(
            result,
            Err(CatalogError::NotFound(RecordKind::Product, 5))
        ));
    }

    #[tokio::test]
    async fn test_list_products_passes_parsed_query() {
        let mut mock = MockProductRepository::new();
        mock.expect_list()
            .withf(|filter, filters| {
                filter.pname.as_deref() == Some("desk")
                    && filters.page == 2
                    && filters.sort == ProductSort::Pname
                    && filters.direction == SortDirection::Descending
            })
            .returning(|_, _| Ok((vec![], Metadata::default())));

        let service = ProductService::new(mock);
        let query = ProductListQuery {
            pname: Some("desk".to_string()),
            page: Some("2".to_string()),
            sort: Some("-pname".to_string()),
            ..Default::default()
        };

        let (products, metadata) = service.list_products(query).await.unwrap();
        assert!(products.is_empty());
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_list_products_invalid_query_skips_storage() {
        let mut mock = MockProductRepository::new();
        mock.expect_list().never();

        let service = ProductService::new(mock);
        let query = ProductListQuery {
            sort: Some("pid;DROP TABLE product".to_string()),
            ..Default::default()
        };

        let result = service.list_products(query).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }
}

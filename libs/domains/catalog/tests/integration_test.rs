//! Integration tests for the PostgreSQL repositories
//!
//! These run against a real Postgres container (via test-utils) with the
//! workspace migrations applied. They need Docker:
//!
//! ```sh
//! cargo test -p domain_catalog --test integration_test -- --ignored
//! ```

use domain_catalog::*;
use query_filters::{Filters, SortDirection};
use test_utils::assertions::{assert_rating_eq, assert_some};
use test_utils::{TestDataBuilder, TestDatabase};

struct Catalog {
    products: ProductService<PgProductRepository>,
    reviews: ReviewService<PgReviewRepository, PgProductRepository>,
    product_repo: PgProductRepository,
    review_repo: PgReviewRepository,
}

fn catalog(db: &TestDatabase) -> Catalog {
    let product_repo = PgProductRepository::new(db.connection());
    let review_repo = PgReviewRepository::new(db.connection());

    Catalog {
        products: ProductService::new(product_repo.clone()),
        reviews: ReviewService::new(review_repo.clone(), product_repo.clone()),
        product_repo,
        review_repo,
    }
}

async fn product(catalog: &Catalog, builder: &TestDataBuilder, suffix: &str) -> Product {
    catalog
        .products
        .create_product(CreateProduct {
            pname: builder.name("product", suffix),
            product_category: builder.category(),
            image_url: String::new(),
        })
        .await
        .unwrap()
}

async fn stored_avg(catalog: &Catalog, pid: i64) -> f64 {
    catalog.products.get_product(pid).await.unwrap().avg_rating
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_product_crud_round_trip() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("product_crud");

    let created = product(&catalog, &builder, "main").await;
    assert!(created.pid > 0);
    assert_eq!(created.avg_rating, 0.0);

    let updated = catalog
        .products
        .update_product(
            created.pid,
            UpdateProduct {
                image_url: Some("https://img.example.com/1.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.pname, created.pname);
    assert_eq!(updated.image_url, "https://img.example.com/1.png");
    assert_eq!(updated.created_at, created.created_at);

    catalog.products.delete_product(created.pid).await.unwrap();
    assert!(matches!(
        catalog.products.get_product(created.pid).await,
        Err(CatalogError::NotFound(RecordKind::Product, _))
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_average_rating_protocol() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("average_rating");
    let pid = product(&catalog, &builder, "rated").await.pid;

    let first = catalog
        .reviews
        .create_review(CreateReview { prod_id: pid, rating: 4 })
        .await
        .unwrap();
    assert_eq!(first.product_name, builder.name("product", "rated"));
    assert_rating_eq(stored_avg(&catalog, pid).await, 4.0, "one review");

    let second = catalog
        .reviews
        .create_review(CreateReview { prod_id: pid, rating: 2 })
        .await
        .unwrap();
    assert_rating_eq(stored_avg(&catalog, pid).await, 3.0, "two reviews");

    catalog
        .reviews
        .update_review(second.rid, UpdateReview { rating: Some(1) })
        .await
        .unwrap();
    assert_rating_eq(stored_avg(&catalog, pid).await, 2.5, "after update");

    catalog.reviews.delete_review(second.rid).await.unwrap();
    assert_rating_eq(stored_avg(&catalog, pid).await, 4.0, "after delete");

    catalog.reviews.delete_review(first.rid).await.unwrap();
    assert_rating_eq(stored_avg(&catalog, pid).await, 0.0, "no reviews");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_average_rating_matches_in_memory_rounding() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("rounding");
    let pid = product(&catalog, &builder, "rounded").await.pid;

    let ratings: Vec<i16> = (0..7).map(|i| builder.rating(i)).collect();
    for &rating in &ratings {
        catalog
            .reviews
            .create_review(CreateReview { prod_id: pid, rating })
            .await
            .unwrap();
    }

    assert_eq!(
        stored_avg(&catalog, pid).await,
        rating::average_rating(ratings)
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_dangling_review_is_rejected_by_storage() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);

    let result = catalog
        .review_repo
        .insert(CreateReview {
            prod_id: 424_242,
            rating: 3,
        })
        .await;

    assert!(matches!(
        result,
        Err(CatalogError::DanglingReference { id: 424_242, .. })
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_reviews_keep_average_consistent() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("concurrent_reviews");
    let pid = product(&catalog, &builder, "busy").await.pid;

    let ratings: Vec<i16> = (0..20).map(|i| builder.rating(i)).collect();
    let inserts = ratings.iter().map(|&rating| {
        let repo = catalog.review_repo.clone();
        tokio::spawn(async move { repo.insert(CreateReview { prod_id: pid, rating }).await })
    });
    for result in futures::future::join_all(inserts).await {
        result.unwrap().unwrap();
    }

    assert_eq!(
        stored_avg(&catalog, pid).await,
        rating::average_rating(ratings)
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_helpful_votes() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("helpful_votes");
    let pid = product(&catalog, &builder, "voted").await.pid;
    let rid = catalog
        .reviews
        .create_review(CreateReview { prod_id: pid, rating: 5 })
        .await
        .unwrap()
        .rid;

    let floor = catalog.review_repo.adjust_helpful_count(rid, -1).await.unwrap();
    assert_eq!(floor.helpful_count, 0);

    let votes = (0..30).map(|_| {
        let repo = catalog.review_repo.clone();
        tokio::spawn(async move { repo.adjust_helpful_count(rid, 1).await })
    });
    for result in futures::future::join_all(votes).await {
        result.unwrap().unwrap();
    }

    let review = assert_some(catalog.review_repo.get(rid).await.unwrap(), "voted review");
    assert_eq!(review.helpful_count, 30);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_product_delete_cascades() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("cascade");
    let pid = product(&catalog, &builder, "doomed").await.pid;
    let rid = catalog
        .reviews
        .create_review(CreateReview { prod_id: pid, rating: 2 })
        .await
        .unwrap()
        .rid;

    assert!(catalog.product_repo.delete(pid).await.unwrap());
    assert!(catalog.review_repo.get(rid).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_products_filters_sorts_and_counts() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("list_products");

    let mut pids = Vec::new();
    for suffix in ["alpha", "beta", "gamma", "delta", "epsilon"] {
        pids.push(product(&catalog, &builder, suffix).await.pid);
    }
    catalog
        .reviews
        .create_review(CreateReview { prod_id: pids[1], rating: 5 })
        .await
        .unwrap();

    let filter = ProductFilter {
        product_category: Some(builder.category().to_uppercase()),
        ..Default::default()
    };
    let filters = Filters {
        page: 2,
        page_size: 2,
        sort: ProductSort::Pname,
        direction: SortDirection::Ascending,
    };
    let (page, metadata) = catalog.product_repo.list(filter, filters).await.unwrap();
    // alpha, beta | delta, epsilon | gamma
    let names: Vec<String> = page.into_iter().map(|p| p.pname).collect();
    assert_eq!(
        names,
        vec![
            builder.name("product", "delta"),
            builder.name("product", "epsilon")
        ]
    );
    assert_eq!(metadata.total_records, 5);
    assert_eq!(metadata.last_page, 3);

    let filter = ProductFilter {
        avg_rating: Some(5.0),
        ..Default::default()
    };
    let (page, _) = catalog
        .product_repo
        .list(filter, Filters::default())
        .await
        .unwrap();
    assert_eq!(page.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![pids[1]]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_products_page_past_the_end_has_empty_metadata() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("page_past_end");
    for suffix in ["one", "two", "three"] {
        product(&catalog, &builder, suffix).await;
    }

    let filter = ProductFilter {
        product_category: Some(builder.category()),
        ..Default::default()
    };
    let filters = Filters {
        page: 5,
        page_size: 10,
        ..Filters::default()
    };
    let (page, metadata) = catalog.product_repo.list(filter, filters).await.unwrap();

    assert!(page.is_empty());
    assert!(metadata.is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_reviews_with_equality_filters() {
    let db = TestDatabase::new().await;
    let catalog = catalog(&db);
    let builder = TestDataBuilder::from_test_name("list_reviews");
    let pid = product(&catalog, &builder, "reviewed").await.pid;

    for rating in [5, 3, 5] {
        catalog
            .reviews
            .create_review(CreateReview { prod_id: pid, rating })
            .await
            .unwrap();
    }

    let filter = ReviewFilter {
        prod_id: Some(pid),
        rating: Some(5),
        helpful_count: None,
    };
    let filters = Filters {
        sort: ReviewSort::Rid,
        direction: SortDirection::Descending,
        ..Filters::default()
    };
    let (page, metadata) = catalog.review_repo.list(filter, filters).await.unwrap();

    assert_eq!(page.len(), 2);
    assert!(page[0].rid > page[1].rid);
    assert_eq!(metadata.total_records, 2);
    assert!(!metadata.has_next_page);
}

//! Catalog service: products, categories and reviews.

use chrono::Utc;
use rust_decimal::Decimal;

use quince_core::{money, CategoryId, ProductId, ProductStatus, ReviewId, UserId};

use crate::config::CommerceConfig;
use crate::error::{CommerceError, Result};
use crate::models::{Category, NewCategory, NewProduct, Product, ProductImage, Review};
use crate::page::{Page, PageRequest};
use crate::store::{ProductSearch, Store};

/// Product creation request. Unset flags fall back to the catalog defaults
/// (`minimum_stock_level` from configuration, active, not featured,
/// `ACTIVE` status).
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_quantity: u32,
    pub minimum_stock_level: Option<u32>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub category_id: CategoryId,
    pub images: Vec<ProductImage>,
}

/// Product update request; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub minimum_stock_level: Option<u32>,
    pub status: Option<ProductStatus>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Category creation request.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
    pub parent_id: Option<CategoryId>,
}

/// Category update request; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Review submission.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub user_id: UserId,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Catalog operations.
pub struct CatalogService<'a> {
    store: &'a Store,
    config: &'a CommerceConfig,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a Store, config: &'a CommerceConfig) -> Self {
        Self { store, config }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a non-positive price or negative cost,
    /// `NotFound` if the category does not exist, `Conflict` if the SKU is
    /// taken.
    pub fn create_product(&self, request: CreateProduct) -> Result<Product> {
        tracing::info!(sku = %request.sku, "creating product");

        if !money::is_positive(request.price) {
            return Err(CommerceError::invalid("price must be greater than 0"));
        }
        if let Some(cost) = request.cost
            && !money::is_non_negative(cost)
        {
            return Err(CommerceError::invalid(
                "cost must be greater than or equal to 0",
            ));
        }

        let mut uow = self.store.begin();
        let product = uow.create_product(NewProduct {
            name: request.name,
            description: request.description,
            sku: request.sku,
            price: money::normalize(request.price),
            cost: request.cost.map(money::normalize),
            stock_quantity: request.stock_quantity,
            minimum_stock_level: request
                .minimum_stock_level
                .unwrap_or(self.config.default_minimum_stock_level),
            active: request.active.unwrap_or(true),
            featured: request.featured.unwrap_or(false),
            weight: request.weight,
            weight_unit: request.weight_unit,
            dimensions: request.dimensions,
            brand: request.brand,
            model: request.model,
            color: request.color,
            size: request.size,
            status: request.status.unwrap_or(ProductStatus::Active),
            category_id: request.category_id,
            images: request.images,
        })?;
        uow.commit();

        tracing::info!(product_id = %product.id, "product created successfully");
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store.snapshot().get_product(id)
    }

    /// Get a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn get_product_by_sku(&self, sku: &str) -> Result<Product> {
        self.store
            .snapshot()
            .find_product_by_sku(sku)
            .ok_or_else(|| CommerceError::not_found("product", sku))
    }

    /// Update a product's descriptive fields.
    ///
    /// Stock is changed through [`update_stock`](Self::update_stock), the
    /// flags through their dedicated toggles.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product (or a changed category) does not
    /// exist, `InvalidArgument` for a non-positive price.
    pub fn update_product(&self, id: ProductId, request: UpdateProduct) -> Result<Product> {
        tracing::info!(product_id = %id, "updating product");

        if let Some(price) = request.price
            && !money::is_positive(price)
        {
            return Err(CommerceError::invalid("price must be greater than 0"));
        }

        let mut uow = self.store.begin();
        let mut product = uow.get_product(id)?;

        if let Some(name) = request.name {
            product.name = name;
        }
        if let Some(description) = request.description {
            product.description = Some(description);
        }
        if let Some(price) = request.price {
            product.price = money::normalize(price);
        }
        if let Some(cost) = request.cost {
            product.cost = Some(money::normalize(cost));
        }
        if let Some(level) = request.minimum_stock_level {
            product.minimum_stock_level = level;
        }
        if let Some(status) = request.status {
            product.status = status;
        }
        if let Some(weight) = request.weight {
            product.weight = Some(weight);
        }
        if let Some(weight_unit) = request.weight_unit {
            product.weight_unit = Some(weight_unit);
        }
        if let Some(dimensions) = request.dimensions {
            product.dimensions = Some(dimensions);
        }
        if let Some(brand) = request.brand {
            product.brand = Some(brand);
        }
        if let Some(model) = request.model {
            product.model = Some(model);
        }
        if let Some(color) = request.color {
            product.color = Some(color);
        }
        if let Some(size) = request.size {
            product.size = Some(size);
        }
        if let Some(category_id) = request.category_id {
            product.category_id = category_id;
        }

        let product = uow.update_product(product)?;
        uow.commit();
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn delete_product(&self, id: ProductId) -> Result<()> {
        tracing::info!(product_id = %id, "deleting product");

        let mut uow = self.store.begin();
        uow.delete_product(id)?;
        uow.commit();
        Ok(())
    }

    /// List all products, paginated.
    #[must_use]
    pub fn list_products(&self, page: PageRequest) -> Page<Product> {
        Page::from_vec(self.store.snapshot().list_products(), page)
    }

    /// Search active products; filters combine with AND.
    #[must_use]
    pub fn search_products(&self, search: &ProductSearch, page: PageRequest) -> Page<Product> {
        Page::from_vec(self.store.snapshot().search_products(search), page)
    }

    /// Active products in a category, paginated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn products_in_category(
        &self,
        category_id: CategoryId,
        page: PageRequest,
    ) -> Result<Page<Product>> {
        let snapshot = self.store.snapshot();
        snapshot.get_category(category_id)?;
        Ok(Page::from_vec(
            snapshot.products_in_category(category_id),
            page,
        ))
    }

    /// Active featured products, paginated.
    #[must_use]
    pub fn featured_products(&self, page: PageRequest) -> Page<Product> {
        Page::from_vec(self.store.snapshot().featured_products(), page)
    }

    /// Products at or below their minimum stock level, paginated.
    #[must_use]
    pub fn low_stock_products(&self, page: PageRequest) -> Page<Product> {
        Page::from_vec(self.store.snapshot().low_stock_products(), page)
    }

    /// Set the stock quantity to an absolute value.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn update_stock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        tracing::info!(product_id = %id, quantity, "updating stock");

        let mut uow = self.store.begin();
        let mut product = uow.get_product(id)?;
        product.stock_quantity = quantity;
        let product = uow.update_product(product)?;
        uow.commit();
        Ok(product)
    }

    /// Flip the active flag. No side effects on dependents.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn set_product_active(&self, id: ProductId, active: bool) -> Result<Product> {
        tracing::info!(product_id = %id, active, "toggling product status");

        let mut uow = self.store.begin();
        let mut product = uow.get_product(id)?;
        product.active = active;
        let product = uow.update_product(product)?;
        uow.commit();
        Ok(product)
    }

    /// Flip the featured flag. No side effects on dependents.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn set_product_featured(&self, id: ProductId, featured: bool) -> Result<Product> {
        tracing::info!(product_id = %id, featured, "toggling featured status");

        let mut uow = self.store.begin();
        let mut product = uow.get_product(id)?;
        product.featured = featured;
        let product = uow.update_product(product)?;
        uow.commit();
        Ok(product)
    }

    /// Record a product view.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn record_view(&self, id: ProductId) -> Result<()> {
        let mut uow = self.store.begin();
        uow.increment_view_count(id)?;
        uow.commit();
        Ok(())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Submit a review for a product. New reviews await approval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the rating is outside 1–5, `NotFound`
    /// if the product or reviewer does not exist.
    pub fn add_review(&self, product_id: ProductId, request: CreateReview) -> Result<Review> {
        if !(1..=5).contains(&request.rating) {
            return Err(CommerceError::invalid("rating must be between 1 and 5"));
        }

        let mut uow = self.store.begin();
        uow.get_user(request.user_id)?;

        // Verified means the reviewer has a delivered order containing the
        // product.
        let verified = uow.orders_for_user(request.user_id).iter().any(|order| {
            order.is_completed()
                && order
                    .items
                    .iter()
                    .any(|item| item.product_id == product_id)
        });

        let review = uow.add_review(
            product_id,
            Review {
                id: ReviewId::new(0), // assigned by the store
                user_id: request.user_id,
                rating: request.rating,
                title: request.title,
                comment: request.comment,
                approved: false,
                verified,
                helpful_count: 0,
                unhelpful_count: 0,
                created_at: Utc::now(),
            },
        )?;
        uow.commit();
        Ok(review)
    }

    /// Approve a review and fold it into the product rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product or review does not exist.
    pub fn approve_review(&self, product_id: ProductId, review_id: ReviewId) -> Result<Review> {
        let mut uow = self.store.begin();
        let mut product = uow.get_product(product_id)?;

        let review = product
            .reviews
            .iter_mut()
            .find(|review| review.id == review_id)
            .ok_or_else(|| CommerceError::not_found("review", review_id))?;
        review.approved = true;
        let approved = review.clone();

        let ratings: Vec<u8> = product
            .reviews
            .iter()
            .filter(|review| review.approved)
            .map(|review| review.rating)
            .collect();
        #[allow(clippy::cast_possible_truncation)]
        {
            product.rating_count = ratings.len() as u32;
        }
        product.average_rating = if ratings.is_empty() {
            None
        } else {
            let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
            Some(money::normalize(
                Decimal::from(sum) / Decimal::from(ratings.len() as u64),
            ))
        };

        uow.update_product(product)?;
        uow.commit();
        Ok(approved)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the slug is taken, `NotFound` if the parent
    /// does not exist.
    pub fn create_category(&self, request: CreateCategory) -> Result<Category> {
        tracing::info!(slug = %request.slug, "creating category");

        let mut uow = self.store.begin();
        let category = uow.create_category(NewCategory {
            name: request.name,
            description: request.description,
            slug: request.slug,
            image_url: request.image_url,
            active: true,
            sort_order: request.sort_order.unwrap_or(0),
            parent_id: request.parent_id,
        })?;
        uow.commit();
        Ok(category)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.store.snapshot().get_category(id)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn get_category_by_slug(&self, slug: &str) -> Result<Category> {
        self.store
            .snapshot()
            .find_category_by_slug(slug)
            .ok_or_else(|| CommerceError::not_found("category", slug))
    }

    /// Update a category; only supplied fields change.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist, `Conflict` if the
    /// new slug is taken.
    pub fn update_category(&self, id: CategoryId, request: UpdateCategory) -> Result<Category> {
        let mut uow = self.store.begin();
        let mut category = uow.get_category(id)?;

        if let Some(name) = request.name {
            category.name = name;
        }
        if let Some(description) = request.description {
            category.description = Some(description);
        }
        if let Some(slug) = request.slug {
            category.slug = slug;
        }
        if let Some(image_url) = request.image_url {
            category.image_url = Some(image_url);
        }
        if let Some(active) = request.active {
            category.active = active;
        }
        if let Some(sort_order) = request.sort_order {
            category.sort_order = sort_order;
        }

        let category = uow.update_category(category)?;
        uow.commit();
        Ok(category)
    }

    /// Delete a category, its subcategories and their products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn delete_category(&self, id: CategoryId) -> Result<()> {
        tracing::info!(category_id = %id, "deleting category");

        let mut uow = self.store.begin();
        uow.delete_category(id)?;
        uow.commit();
        Ok(())
    }

    /// Root categories in display order.
    #[must_use]
    pub fn root_categories(&self) -> Vec<Category> {
        self.store.snapshot().root_categories()
    }

    /// Direct children of a category in display order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn subcategories(&self, id: CategoryId) -> Result<Vec<Category>> {
        let snapshot = self.store.snapshot();
        snapshot.get_category(id)?;
        Ok(snapshot.subcategories_of(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn fixture() -> (Store, CommerceConfig, CategoryId) {
        let store = Store::new();
        let config = CommerceConfig::default();
        let category_id = {
            let service = CatalogService::new(&store, &config);
            service
                .create_category(CreateCategory {
                    name: "Furniture".to_owned(),
                    description: None,
                    slug: "furniture".to_owned(),
                    image_url: None,
                    sort_order: None,
                    parent_id: None,
                })
                .unwrap()
                .id
        };
        (store, config, category_id)
    }

    fn create_request(sku: &str, category_id: CategoryId) -> CreateProduct {
        CreateProduct {
            name: "Walnut Desk".to_owned(),
            description: None,
            sku: sku.to_owned(),
            price: dec!(349.00),
            cost: None,
            stock_quantity: 25,
            minimum_stock_level: None,
            active: None,
            featured: None,
            status: None,
            weight: None,
            weight_unit: None,
            dimensions: None,
            brand: None,
            model: None,
            color: None,
            size: None,
            category_id,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_create_product_applies_defaults() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);

        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();
        assert_eq!(product.minimum_stock_level, 10);
        assert!(product.active);
        assert!(!product.featured);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[test]
    fn test_create_product_default_min_stock_is_configurable() {
        let (store, mut config, category_id) = fixture();
        config.default_minimum_stock_level = 3;
        let service = CatalogService::new(&store, &config);

        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();
        assert_eq!(product.minimum_stock_level, 3);
    }

    #[test]
    fn test_create_product_rejects_bad_money() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);

        let mut request = create_request("DESK-001", category_id);
        request.price = Decimal::ZERO;
        assert!(matches!(
            service.create_product(request),
            Err(CommerceError::InvalidArgument(_))
        ));

        let mut request = create_request("DESK-001", category_id);
        request.cost = Some(dec!(-1.00));
        assert!(matches!(
            service.create_product(request),
            Err(CommerceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_sku_conflicts() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);
        service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();
        assert!(matches!(
            service.create_product(create_request("DESK-001", category_id)),
            Err(CommerceError::Conflict(_))
        ));
    }

    #[test]
    fn test_update_stock_is_absolute() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);
        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();

        let product = service.update_stock(product.id, 7).unwrap();
        assert_eq!(product.stock_quantity, 7);
        let product = service.update_stock(product.id, 0).unwrap();
        assert_eq!(product.stock_quantity, 0);
    }

    #[test]
    fn test_toggles_flip_only_the_flag() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);
        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();

        let product = service.set_product_active(product.id, false).unwrap();
        assert!(!product.active);
        assert_eq!(product.status, ProductStatus::Active); // untouched

        let product = service.set_product_featured(product.id, true).unwrap();
        assert!(product.featured);
    }

    #[test]
    fn test_review_rating_bounds() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);
        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();

        let review = CreateReview {
            user_id: quince_core::UserId::new(1),
            rating: 6,
            title: None,
            comment: None,
        };
        assert!(matches!(
            service.add_review(product.id, review),
            Err(CommerceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_approve_review_updates_rating_aggregate() {
        let (store, config, category_id) = fixture();
        let service = CatalogService::new(&store, &config);
        let product = service
            .create_product(create_request("DESK-001", category_id))
            .unwrap();

        let user_id = {
            let mut uow = store.begin();
            let user = uow
                .create_user(crate::models::NewUser {
                    username: "alice".to_owned(),
                    email: quince_core::Email::parse("alice@x.com").unwrap(),
                    password_hash: "$argon2id$stub".to_owned(),
                    first_name: "Alice".to_owned(),
                    last_name: "Archer".to_owned(),
                    phone_number: None,
                    enabled: true,
                    email_verified: true,
                    status: quince_core::UserStatus::Active,
                    roles: std::collections::BTreeSet::from([quince_core::Role::User]),
                })
                .unwrap();
            uow.commit();
            user.id
        };

        let review = service
            .add_review(
                product.id,
                CreateReview {
                    user_id,
                    rating: 4,
                    title: Some("Sturdy".to_owned()),
                    comment: None,
                },
            )
            .unwrap();
        assert!(!review.approved);
        assert!(!review.verified); // no delivered order for this product

        service.approve_review(product.id, review.id).unwrap();
        let product = service.get_product(product.id).unwrap();
        assert_eq!(product.rating_count, 1);
        assert_eq!(product.average_rating, Some(dec!(4.00)));
    }
}

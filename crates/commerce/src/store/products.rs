//! Product entity operations, including the conditional stock decrement.

use chrono::Utc;
use rust_decimal::Decimal;

use quince_core::{CategoryId, ProductId, ReviewId};

use crate::error::{CommerceError, Result};
use crate::models::{NewProduct, Product, Review};

use super::{Sequences, State};

/// Filters for the product search; combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ProductSearch {
    /// Case-insensitive substring matched against name, description, brand
    /// and SKU.
    pub query: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive exact brand match.
    pub brand: Option<String>,
    pub featured_only: bool,
}

impl State {
    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist and `Conflict` if
    /// the SKU is taken.
    pub fn create_product(&mut self, new: NewProduct) -> Result<Product> {
        if !self.categories.contains_key(&new.category_id) {
            return Err(CommerceError::not_found("category", new.category_id));
        }
        if self.sku_index.contains_key(&new.sku) {
            return Err(CommerceError::conflict(format!(
                "sku already exists: {}",
                new.sku
            )));
        }

        let now = Utc::now();
        let id = ProductId::new(Sequences::next(&mut self.sequences.products));
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            sku: new.sku,
            price: new.price,
            cost: new.cost,
            stock_quantity: new.stock_quantity,
            minimum_stock_level: new.minimum_stock_level,
            active: new.active,
            featured: new.featured,
            weight: new.weight,
            weight_unit: new.weight_unit,
            dimensions: new.dimensions,
            brand: new.brand,
            model: new.model,
            color: new.color,
            size: new.size,
            status: new.status,
            category_id: new.category_id,
            images: new.images,
            reviews: Vec::new(),
            average_rating: None,
            rating_count: 0,
            view_count: 0,
            sales_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.sku_index.insert(product.sku.clone(), id);
        self.products.insert(id, product.clone());

        Ok(product)
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).cloned()
    }

    /// Look up a product by ID, failing with `NotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this ID.
    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        self.find_product(id)
            .ok_or_else(|| CommerceError::not_found("product", id))
    }

    /// Look up a product by exact SKU.
    #[must_use]
    pub fn find_product_by_sku(&self, sku: &str) -> Option<Product> {
        let id = self.sku_index.get(sku)?;
        self.products.get(id).cloned()
    }

    /// Whether a SKU is taken.
    #[must_use]
    pub fn sku_exists(&self, sku: &str) -> bool {
        self.sku_index.contains_key(sku)
    }

    /// Persist an updated product, refreshing the SKU index and the
    /// `updated_at` stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product (or a changed category) does not
    /// exist, `Conflict` if the new SKU belongs to another product.
    pub fn update_product(&mut self, mut product: Product) -> Result<Product> {
        let existing = self.get_product(product.id)?;

        if !self.categories.contains_key(&product.category_id) {
            return Err(CommerceError::not_found("category", product.category_id));
        }

        if product.sku != existing.sku {
            if self.sku_index.contains_key(&product.sku) {
                return Err(CommerceError::conflict(format!(
                    "sku already exists: {}",
                    product.sku
                )));
            }
            self.sku_index.remove(&existing.sku);
            self.sku_index.insert(product.sku.clone(), product.id);
        }

        product.updated_at = Utc::now();
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Delete a product and the cart lines referencing it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn delete_product(&mut self, id: ProductId) -> Result<()> {
        let product = self.get_product(id)?;

        self.sku_index.remove(&product.sku);
        self.products.remove(&id);

        let cart_owners: Vec<_> = self
            .carts
            .values()
            .filter(|cart| cart.items.iter().any(|item| item.product_id == id))
            .map(|cart| cart.user_id)
            .collect();
        for user_id in cart_owners {
            if let Some(mut cart) = self.carts.get(&user_id).cloned() {
                cart.items.retain(|item| item.product_id != id);
                cart.updated_at = Utc::now();
                self.carts.insert(user_id, cart);
            }
        }

        Ok(())
    }

    /// Conditionally decrement stock.
    ///
    /// The decrement and the sufficiency check are a single write under the
    /// unit of work's exclusive guard: when current stock is at least
    /// `quantity` the stock is reduced and `true` is returned, otherwise the
    /// store is left untouched and `false` is returned. Callers must treat
    /// `false` as insufficient stock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> Result<bool> {
        let mut product = self.get_product(id)?;

        if product.stock_quantity < quantity {
            return Ok(false);
        }

        product.stock_quantity -= quantity;
        product.updated_at = Utc::now();
        self.products.insert(id, product);
        Ok(true)
    }

    /// Add to a product's sales counter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn increment_sales_count(&mut self, id: ProductId, quantity: u32) -> Result<()> {
        let mut product = self.get_product(id)?;
        product.sales_count += u64::from(quantity);
        self.products.insert(id, product);
        Ok(())
    }

    /// Bump a product's view counter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn increment_view_count(&mut self, id: ProductId) -> Result<()> {
        let mut product = self.get_product(id)?;
        product.view_count += 1;
        self.products.insert(id, product);
        Ok(())
    }

    /// Attach a review to a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn add_review(&mut self, id: ProductId, mut review: Review) -> Result<Review> {
        let mut product = self.get_product(id)?;
        review.id = ReviewId::new(Sequences::next(&mut self.sequences.reviews));
        product.reviews.push(review.clone());
        product.updated_at = Utc::now();
        self.products.insert(id, product);
        Ok(review)
    }

    /// All products sorted by ID.
    #[must_use]
    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.products.values().cloned().collect();
        products.sort_by_key(|product| product.id);
        products
    }

    /// Active products in a category, sorted by ID.
    #[must_use]
    pub fn products_in_category(&self, category_id: CategoryId) -> Vec<Product> {
        let mut products: Vec<_> = self
            .products
            .values()
            .filter(|product| product.category_id == category_id && product.active)
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id);
        products
    }

    /// Active featured products, sorted by ID.
    #[must_use]
    pub fn featured_products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self
            .products
            .values()
            .filter(|product| product.featured && product.active)
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id);
        products
    }

    /// Products at or below their minimum stock level, sorted by ID.
    #[must_use]
    pub fn low_stock_products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self
            .products
            .values()
            .filter(|product| product.is_low_stock())
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id);
        products
    }

    /// Search active products; all supplied filters must match.
    #[must_use]
    pub fn search_products(&self, search: &ProductSearch) -> Vec<Product> {
        let needle = search.query.as_deref().map(str::to_lowercase);
        let brand = search.brand.as_deref().map(str::to_lowercase);

        let mut products: Vec<_> = self
            .products
            .values()
            .filter(|product| product.active)
            .filter(|product| {
                needle.as_deref().is_none_or(|needle| {
                    product.name.to_lowercase().contains(needle)
                        || product
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                        || product
                            .brand
                            .as_deref()
                            .is_some_and(|b| b.to_lowercase().contains(needle))
                        || product.sku.to_lowercase().contains(needle)
                })
            })
            .filter(|product| {
                search
                    .category_id
                    .is_none_or(|category_id| product.category_id == category_id)
            })
            .filter(|product| search.min_price.is_none_or(|min| product.price >= min))
            .filter(|product| search.max_price.is_none_or(|max| product.price <= max))
            .filter(|product| {
                brand
                    .as_deref()
                    .is_none_or(|brand| product.brand.as_deref().is_some_and(|b| b.eq_ignore_ascii_case(brand)))
            })
            .filter(|product| !search.featured_only || product.featured)
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id);
        products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use quince_core::ProductStatus;

    use super::*;
    use crate::models::NewCategory;
    use crate::store::Store;

    fn seeded_store() -> (Store, CategoryId) {
        let store = Store::new();
        let category_id = {
            let mut uow = store.begin();
            let category = uow
                .create_category(NewCategory {
                    name: "Furniture".to_owned(),
                    description: None,
                    slug: "furniture".to_owned(),
                    image_url: None,
                    active: true,
                    sort_order: 0,
                    parent_id: None,
                })
                .unwrap();
            uow.commit();
            category.id
        };
        (store, category_id)
    }

    fn new_product(sku: &str, category_id: CategoryId, stock: u32) -> NewProduct {
        NewProduct {
            name: "Walnut Desk".to_owned(),
            description: Some("Solid walnut writing desk".to_owned()),
            sku: sku.to_owned(),
            price: dec!(349.00),
            cost: None,
            stock_quantity: stock,
            minimum_stock_level: 10,
            active: true,
            featured: false,
            weight: None,
            weight_unit: None,
            dimensions: None,
            brand: Some("Quince".to_owned()),
            model: None,
            color: None,
            size: None,
            status: ProductStatus::Active,
            category_id,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_create_requires_category_and_unique_sku() {
        let (store, category_id) = seeded_store();
        let mut uow = store.begin();

        let missing = CategoryId::new(99);
        assert!(matches!(
            uow.create_product(new_product("DESK-001", missing, 5)),
            Err(CommerceError::NotFound { .. })
        ));

        uow.create_product(new_product("DESK-001", category_id, 5))
            .unwrap();
        assert!(matches!(
            uow.create_product(new_product("DESK-001", category_id, 5)),
            Err(CommerceError::Conflict(_))
        ));
    }

    #[test]
    fn test_decrement_stock_insufficient_leaves_stock_unchanged() {
        let (store, category_id) = seeded_store();
        let mut uow = store.begin();
        let product = uow
            .create_product(new_product("DESK-001", category_id, 3))
            .unwrap();

        assert!(!uow.decrement_stock(product.id, 5).unwrap());
        assert_eq!(uow.get_product(product.id).unwrap().stock_quantity, 3);
    }

    #[test]
    fn test_decrement_stock_to_zero_makes_unavailable() {
        let (store, category_id) = seeded_store();
        let mut uow = store.begin();
        let product = uow
            .create_product(new_product("DESK-001", category_id, 3))
            .unwrap();

        assert!(uow.decrement_stock(product.id, 3).unwrap());
        let product = uow.get_product(product.id).unwrap();
        assert_eq!(product.stock_quantity, 0);
        assert!(!product.is_available());
    }

    #[test]
    fn test_decrement_stock_exact_subtraction() {
        let (store, category_id) = seeded_store();
        let mut uow = store.begin();
        let product = uow
            .create_product(new_product("DESK-001", category_id, 10))
            .unwrap();

        assert!(uow.decrement_stock(product.id, 4).unwrap());
        assert_eq!(uow.get_product(product.id).unwrap().stock_quantity, 6);
    }

    #[test]
    fn test_search_filters_combine_with_and() {
        let (store, category_id) = seeded_store();
        let mut uow = store.begin();
        uow.create_product(new_product("DESK-001", category_id, 5))
            .unwrap();
        let mut other = new_product("CHAIR-001", category_id, 5);
        other.name = "Oak Chair".to_owned();
        other.brand = Some("Oakline".to_owned());
        other.price = dec!(89.00);
        uow.create_product(other).unwrap();

        // Substring across name/sku, case-insensitive.
        assert_eq!(uow.search_products(&ProductSearch {
            query: Some("desk".to_owned()),
            ..ProductSearch::default()
        }).len(), 1);

        // AND: matching query but out-of-range price yields nothing.
        assert!(uow
            .search_products(&ProductSearch {
                query: Some("desk".to_owned()),
                max_price: Some(dec!(100.00)),
                ..ProductSearch::default()
            })
            .is_empty());

        // Brand is exact, case-insensitive.
        assert_eq!(
            uow.search_products(&ProductSearch {
                brand: Some("oakline".to_owned()),
                ..ProductSearch::default()
            })
            .len(),
            1
        );
    }

    #[test]
    fn test_delete_product_removes_cart_lines() {
        let (store, category_id) = seeded_store();
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
        uow.create_cart(user.id).unwrap();
        let product = uow
            .create_product(new_product("DESK-001", category_id, 5))
            .unwrap();

        let mut cart = uow.get_cart(user.id).unwrap();
        cart.items.push(crate::models::CartItem {
            product_id: product.id,
            quantity: 2,
            added_at: Utc::now(),
        });
        uow.update_cart(cart).unwrap();

        uow.delete_product(product.id).unwrap();
        assert!(uow.get_cart(user.id).unwrap().is_empty());
        assert!(!uow.sku_exists("DESK-001"));
    }
}

//! Product, product image and review records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use quince_core::{CategoryId, ProductId, ProductStatus, ReviewId, UserId};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Unique stock keeping unit.
    pub sku: String,
    /// Selling price, strictly positive, 2-decimal.
    pub price: Decimal,
    /// Acquisition cost, non-negative when present.
    pub cost: Option<Decimal>,
    pub stock_quantity: u32,
    /// At or below this level the product counts as low stock.
    pub minimum_stock_level: u32,
    pub active: bool,
    pub featured: bool,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub status: ProductStatus,
    pub category_id: CategoryId,
    /// Ordered gallery images, owned by the product.
    pub images: Vec<ProductImage>,
    /// Customer reviews, owned by the product.
    pub reviews: Vec<Review>,
    pub average_rating: Option<Decimal>,
    pub rating_count: u32,
    pub view_count: u64,
    pub sales_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be purchased.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.active && self.status == ProductStatus::Active && self.stock_quantity > 0
    }

    /// Whether stock is at or below the minimum level.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.minimum_stock_level
    }
}

/// A product gallery image.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
    pub active: bool,
}

/// A customer review of a product.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
    /// Reviews are hidden until approved.
    pub approved: bool,
    /// Whether the reviewer bought the product here.
    pub verified: bool,
    pub helpful_count: u32,
    pub unhelpful_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a product; the store assigns ID and timestamps and
/// the counters start at zero.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_quantity: u32,
    pub minimum_stock_level: u32,
    pub active: bool,
    pub featured: bool,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub status: ProductStatus,
    pub category_id: CategoryId,
    pub images: Vec<ProductImage>,
}

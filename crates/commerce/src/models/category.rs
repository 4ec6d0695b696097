//! Category record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use quince_core::CategoryId;

/// A catalog category.
///
/// Categories form a tree through `parent_id`; a category without a parent
/// is a root. Deleting a category cascades to its subcategories and
/// products.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Unique URL slug.
    pub slug: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub sort_order: i32,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether this category sits at the top of the tree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Fields for creating a category; the store assigns ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub sort_order: i32,
    pub parent_id: Option<CategoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_root() {
        let now = Utc::now();
        let mut category = Category {
            id: CategoryId::new(1),
            name: "Furniture".to_owned(),
            description: None,
            slug: "furniture".to_owned(),
            image_url: None,
            active: true,
            sort_order: 0,
            parent_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(category.is_root());

        category.parent_id = Some(CategoryId::new(9));
        assert!(!category.is_root());
    }
}

//! Category entity operations.

use chrono::Utc;

use quince_core::CategoryId;

use crate::error::{CommerceError, Result};
use crate::models::{Category, NewCategory};

use super::{Sequences, State};

impl State {
    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the slug is taken and `NotFound` if a parent
    /// is named but absent.
    pub fn create_category(&mut self, new: NewCategory) -> Result<Category> {
        if self.slug_index.contains_key(&new.slug) {
            return Err(CommerceError::conflict(format!(
                "slug already exists: {}",
                new.slug
            )));
        }
        if let Some(parent_id) = new.parent_id
            && !self.categories.contains_key(&parent_id)
        {
            return Err(CommerceError::not_found("category", parent_id));
        }

        let now = Utc::now();
        let id = CategoryId::new(Sequences::next(&mut self.sequences.categories));
        let category = Category {
            id,
            name: new.name,
            description: new.description,
            slug: new.slug,
            image_url: new.image_url,
            active: new.active,
            sort_order: new.sort_order,
            parent_id: new.parent_id,
            created_at: now,
            updated_at: now,
        };

        self.slug_index.insert(category.slug.clone(), id);
        self.categories.insert(id, category.clone());

        Ok(category)
    }

    /// Look up a category by ID.
    #[must_use]
    pub fn find_category(&self, id: CategoryId) -> Option<Category> {
        self.categories.get(&id).cloned()
    }

    /// Look up a category by ID, failing with `NotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category has this ID.
    pub fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.find_category(id)
            .ok_or_else(|| CommerceError::not_found("category", id))
    }

    /// Look up a category by slug.
    #[must_use]
    pub fn find_category_by_slug(&self, slug: &str) -> Option<Category> {
        let id = self.slug_index.get(slug)?;
        self.categories.get(id).cloned()
    }

    /// Persist an updated category, refreshing the slug index and the
    /// `updated_at` stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category (or a changed parent) does not
    /// exist, `Conflict` if the new slug belongs to another category, and
    /// `InvalidArgument` if the category is made its own parent.
    pub fn update_category(&mut self, mut category: Category) -> Result<Category> {
        let existing = self.get_category(category.id)?;

        if let Some(parent_id) = category.parent_id {
            if parent_id == category.id {
                return Err(CommerceError::invalid(
                    "category cannot be its own parent",
                ));
            }
            if !self.categories.contains_key(&parent_id) {
                return Err(CommerceError::not_found("category", parent_id));
            }
        }

        if category.slug != existing.slug {
            if self.slug_index.contains_key(&category.slug) {
                return Err(CommerceError::conflict(format!(
                    "slug already exists: {}",
                    category.slug
                )));
            }
            self.slug_index.remove(&existing.slug);
            self.slug_index.insert(category.slug.clone(), category.id);
        }

        category.updated_at = Utc::now();
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Delete a category, its subcategories, and their products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        let category = self.get_category(id)?;

        let child_ids: Vec<_> = self
            .categories
            .values()
            .filter(|child| child.parent_id == Some(id))
            .map(|child| child.id)
            .collect();
        for child_id in child_ids {
            self.delete_category(child_id)?;
        }

        let product_ids: Vec<_> = self
            .products
            .values()
            .filter(|product| product.category_id == id)
            .map(|product| product.id)
            .collect();
        for product_id in product_ids {
            self.delete_product(product_id)?;
        }

        self.slug_index.remove(&category.slug);
        self.categories.remove(&id);
        Ok(())
    }

    /// All categories sorted by sort order then name.
    #[must_use]
    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<_> = self.categories.values().cloned().collect();
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        categories
    }

    /// Root categories sorted by sort order then name.
    #[must_use]
    pub fn root_categories(&self) -> Vec<Category> {
        self.list_categories()
            .into_iter()
            .filter(Category::is_root)
            .collect()
    }

    /// Direct children of a category, sorted by sort order then name.
    #[must_use]
    pub fn subcategories_of(&self, id: CategoryId) -> Vec<Category> {
        self.list_categories()
            .into_iter()
            .filter(|category| category.parent_id == Some(id))
            .collect()
    }
}

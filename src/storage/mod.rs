//! Storage abstractions for user-facing category definitions.
//!
//! The categories offered to the reader (which ones, in what order, under
//! what label) are UI configuration and persist between sessions. The page
//! cache never touches this storage.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Browser configuration
//! └── categories.json       # Category definitions
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Category;

// Re-export for convenience
pub use local::LocalStorage;

/// A category as offered to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub category: Category,

    /// Label shown in menus
    pub label: String,
}

impl CategoryDefinition {
    pub fn new(category: Category, label: impl Into<String>) -> Self {
        Self {
            category,
            label: label.into(),
        }
    }
}

impl From<Category> for CategoryDefinition {
    fn from(category: Category) -> Self {
        Self::new(category, category.label())
    }
}

/// On-disk layout of `categories.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesFile {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryDefinition>,
}

impl CategoriesFile {
    pub fn new(categories: Vec<CategoryDefinition>) -> Self {
        Self {
            updated_at: Utc::now(),
            categories,
        }
    }
}

/// Every category under its default label.
pub fn default_categories() -> Vec<CategoryDefinition> {
    Category::ALL.into_iter().map(CategoryDefinition::from).collect()
}

/// Add a definition, or relabel it in place if already present.
pub fn upsert_category(list: &mut Vec<CategoryDefinition>, definition: CategoryDefinition) {
    match list.iter_mut().find(|d| d.category == definition.category) {
        Some(existing) => existing.label = definition.label,
        None => list.push(definition),
    }
}

/// Remove a definition. Returns whether it was present.
pub fn remove_category(list: &mut Vec<CategoryDefinition>, category: Category) -> bool {
    let before = list.len();
    list.retain(|d| d.category != category);
    list.len() != before
}

/// Look up an offered category by slug or label, ignoring case.
pub fn find_category<'a>(
    list: &'a [CategoryDefinition],
    name: &str,
) -> Option<&'a CategoryDefinition> {
    let name = name.trim();
    list.iter().find(|d| {
        d.category.slug().eq_ignore_ascii_case(name) || d.label.eq_ignore_ascii_case(name)
    })
}

/// Trait for category definition storage backends.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Load definitions, falling back to [`default_categories`] when none are stored.
    async fn load_categories(&self) -> Result<Vec<CategoryDefinition>>;

    /// Replace the stored definitions.
    async fn save_categories(&self, categories: &[CategoryDefinition]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_relabels_existing() {
        let mut list = default_categories();
        upsert_category(&mut list, CategoryDefinition::new(Category::Art, "Arts & Design"));
        assert_eq!(list.len(), Category::ALL.len());
        let art = list.iter().find(|d| d.category == Category::Art).unwrap();
        assert_eq!(art.label, "Arts & Design");
    }

    #[test]
    fn test_remove_then_upsert_appends() {
        let mut list = default_categories();
        assert!(remove_category(&mut list, Category::Fiction));
        assert!(!remove_category(&mut list, Category::Fiction));

        upsert_category(&mut list, Category::Fiction.into());
        assert_eq!(list.last().unwrap().category, Category::Fiction);
    }

    #[test]
    fn test_find_category_by_slug_or_label() {
        let mut list = default_categories();
        upsert_category(&mut list, CategoryDefinition::new(Category::Poetry, "Verse"));
        remove_category(&mut list, Category::Romance);

        assert_eq!(find_category(&list, "POETRY").unwrap().category, Category::Poetry);
        assert_eq!(find_category(&list, " verse ").unwrap().category, Category::Poetry);
        assert!(find_category(&list, "romance").is_none());
        assert!(find_category(&list, "cooking").is_none());
    }
}

// src/models/selection.rs

//! Selection and cache keys.

use std::fmt;

use crate::models::Category;

/// What is being browsed: a category (or the unfiltered feed) or a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    /// Category mode. `None` is the "no filter" sentinel.
    Category(Option<Category>),

    /// Free-text search mode.
    Query(String),
}

impl SelectionKey {
    /// Build the active key from the selected category and query text.
    ///
    /// A blank query falls back to category mode.
    pub fn resolve(category: Option<Category>, query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            SelectionKey::Category(category)
        } else {
            SelectionKey::Query(query.to_string())
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKey::Category(Some(category)) => write!(f, "category:{}", category),
            SelectionKey::Category(None) => f.write_str("category:*"),
            SelectionKey::Query(query) => write!(f, "query:{}", query),
        }
    }
}

/// Cache key: one page of one selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub selection: SelectionKey,
    pub page: u32,
}

impl PageKey {
    pub fn new(selection: SelectionKey, page: u32) -> Self {
        Self { selection, page }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.selection, self.page)
    }
}

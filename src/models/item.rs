// src/models/item.rs

//! Raw upstream records and the normalized items shown to the reader.

use serde::{Deserialize, Serialize};

use crate::utils::strip_html;

const UNTITLED: &str = "Untitled";
const NO_DESCRIPTION: &str = "No description available.";

/// A record as delivered by an upstream adapter, before normalization.
///
/// Adapters map their source-specific field names onto this shape; the
/// browser then turns it into a [`ResultItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    /// Short name of the upstream (e.g., "openlibrary")
    pub source: String,

    /// Upstream identifier, unique within the source
    pub id: String,

    /// Title as delivered
    pub title: String,

    /// Description text, possibly containing HTML
    pub description: Option<String>,

    /// Link to the item on the upstream site
    pub link: Option<String>,

    /// Cover or thumbnail URL
    pub image_url: Option<String>,

    /// Subject/category labels attached by the upstream
    pub subjects: Vec<String>,
}

/// Normalized record rendered by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Display label of the category this item is shown under
    pub category: String,

    /// Unique across concatenated pages: `{source}-{id}-{page}-{index}`
    pub dedupe_key: String,
}

impl ResultItem {
    /// Normalize a raw record fetched as item `index` of page `page`.
    ///
    /// `category` is the display label to use when the selection fixes one;
    /// otherwise the first upstream subject (or `fallback_label`) is used.
    pub fn normalize(
        raw: RawItem,
        page: u32,
        index: usize,
        category: Option<&str>,
        fallback_label: &str,
    ) -> Self {
        let title = raw.title.trim();
        let description = raw
            .description
            .as_deref()
            .map(strip_html)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let category = category
            .map(str::to_string)
            .or_else(|| raw.subjects.first().map(|s| s.trim().to_string()))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| fallback_label.to_string());

        Self {
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            description,
            link: raw.link.unwrap_or_default(),
            image_url: raw.image_url.filter(|u| !u.trim().is_empty()),
            category,
            dedupe_key: format!("{}-{}-{}-{}", raw.source, raw.id, page, index),
        }
    }
}

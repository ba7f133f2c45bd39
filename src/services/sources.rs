// src/services/sources.rs

//! Upstream content sources.
//!
//! Three logically distinct read-only listings feed the browser. Each
//! returns raw records for one page; normalization happens in the browser.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, Config, RawItem};
use crate::services::RequestToken;
use crate::services::google_books::GoogleBooks;
use crate::services::openlibrary::OpenLibrary;
use crate::utils::http::create_async_client;

/// General/featured listing used for the unfiltered view.
#[async_trait]
pub trait DefaultFeedSource: Send + Sync {
    async fn fetch_feed(
        &self,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>>;
}

/// Category-filtered listing.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_category(
        &self,
        category: Category,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>>;
}

/// Free-text search listing.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Short upstream name used in error reports.
    fn name(&self) -> &str;

    async fn fetch_search(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>>;
}

/// The set of upstreams a browser reads from.
#[derive(Clone)]
pub struct Sources {
    pub feed: Arc<dyn DefaultFeedSource>,
    pub category: Arc<dyn CategorySource>,
    pub search: Arc<dyn SearchSource>,
}

impl Sources {
    pub fn new(
        feed: Arc<dyn DefaultFeedSource>,
        category: Arc<dyn CategorySource>,
        search: Arc<dyn SearchSource>,
    ) -> Self {
        Self {
            feed,
            category,
            search,
        }
    }

    /// Build the HTTP-backed sources described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let open_library = Arc::new(OpenLibrary::new(client.clone(), &config.sources)?);
        let google_books = Arc::new(GoogleBooks::new(client, &config.sources)?);
        Ok(Self::new(open_library.clone(), open_library, google_books))
    }
}

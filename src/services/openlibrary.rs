// src/services/openlibrary.rs

//! Open Library listings: the trending feed and subject browsing.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{Category, RawItem, SourcesConfig};
use crate::services::RequestToken;
use crate::services::sources::{CategorySource, DefaultFeedSource};
use crate::utils::http::fetch_json;
use crate::utils::resolve_url;

const SOURCE: &str = "openlibrary";
const COVER_URL: &str = "https://covers.openlibrary.org/b/id";

/// Open Library adapter.
pub struct OpenLibrary {
    client: Client,
    feed_url: Url,
    category_template: String,
    site: Url,
}

impl OpenLibrary {
    pub fn new(client: Client, config: &SourcesConfig) -> Result<Self> {
        let feed_url = Url::parse(&config.default_feed_url)?;
        let site = feed_url.join("/")?;
        Ok(Self {
            client,
            feed_url,
            category_template: config.category_url.clone(),
            site,
        })
    }

    fn feed_request(&self, page: u32, page_size: usize) -> Url {
        let mut url = self.feed_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &page_size.to_string());
        url
    }

    fn category_request(&self, category: Category, page: u32, page_size: usize) -> Result<Url> {
        let offset = (page.saturating_sub(1) as usize) * page_size;
        let mut url = Url::parse(&self.category_template.replace("{category}", category.slug()))?;
        url.query_pairs_mut()
            .append_pair("limit", &page_size.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    async fn fetch_works(&self, url: Url, token: &RequestToken) -> Result<Vec<RawItem>> {
        let listing: WorksPage = fetch_json(&self.client, url, token).await?;
        Ok(listing
            .works
            .into_iter()
            .map(|work| work.into_raw(&self.site))
            .collect())
    }
}

#[async_trait]
impl DefaultFeedSource for OpenLibrary {
    async fn fetch_feed(
        &self,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        self.fetch_works(self.feed_request(page, page_size), token)
            .await
    }
}

#[async_trait]
impl CategorySource for OpenLibrary {
    async fn fetch_category(
        &self,
        category: Category,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        let url = self.category_request(category, page, page_size)?;
        self.fetch_works(url, token).await
    }
}

/// Listing payload shared by the trending and subject endpoints.
#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    works: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    key: String,
    #[serde(default)]
    title: String,
    /// Trending payloads list author names directly
    #[serde(default)]
    author_name: Vec<String>,
    /// Subject payloads nest them
    #[serde(default)]
    authors: Vec<AuthorRef>,
    #[serde(default, alias = "cover_id")]
    cover_i: Option<u64>,
    #[serde(default)]
    first_publish_year: Option<i32>,
    #[serde(default)]
    subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    name: String,
}

impl Work {
    fn into_raw(self, site: &Url) -> RawItem {
        let mut authors = self.author_name;
        authors.extend(self.authors.into_iter().map(|a| a.name));

        let mut description = String::new();
        if !authors.is_empty() {
            description.push_str(&format!("by {}", authors.join(", ")));
        }
        if let Some(year) = self.first_publish_year {
            if !description.is_empty() {
                description.push_str(" · ");
            }
            description.push_str(&format!("first published {}", year));
        }

        RawItem {
            source: SOURCE.to_string(),
            id: self.key.trim_start_matches("/works/").to_string(),
            title: self.title,
            description: (!description.is_empty()).then_some(description),
            link: Some(resolve_url(site, &self.key)),
            image_url: self.cover_i.map(|id| format!("{}/{}-M.jpg", COVER_URL, id)),
            subjects: self.subject,
        }
    }
}

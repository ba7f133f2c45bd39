// src/services/google_books.rs

//! Google Books volume search.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{MAX_PAGE_SIZE, RawItem, SourcesConfig};
use crate::services::RequestToken;
use crate::services::sources::SearchSource;
use crate::utils::http::fetch_json;

const SOURCE: &str = "googlebooks";

/// Google Books adapter.
pub struct GoogleBooks {
    client: Client,
    search_url: Url,
}

impl GoogleBooks {
    pub fn new(client: Client, config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            client,
            search_url: Url::parse(&config.search_url)?,
        })
    }

    /// Build the volumes URL. Pages larger than upstream serves are refused
    /// rather than shrunk, so short-page exhaustion stays meaningful.
    fn search_request(&self, query: &str, page: u32, page_size: usize) -> Result<Url> {
        if page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "{} serves at most {} results per page, {} requested",
                SOURCE, MAX_PAGE_SIZE, page_size
            )));
        }
        let start_index = (page.saturating_sub(1) as usize) * page_size;
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("startIndex", &start_index.to_string())
            .append_pair("maxResults", &page_size.to_string());
        Ok(url)
    }
}

#[async_trait]
impl SearchSource for GoogleBooks {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch_search(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        let url = self.search_request(query, page, page_size)?;
        let volumes: Volumes = fetch_json(&self.client, url, token).await?;
        Ok(volumes.items.into_iter().map(Volume::into_raw).collect())
    }
}

#[derive(Debug, Deserialize)]
struct Volumes {
    /// Absent when nothing matched
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: String,
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    info_link: Option<String>,
    #[serde(default)]
    image_links: Option<ImageLinks>,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    small_thumbnail: Option<String>,
}

impl Volume {
    fn into_raw(self) -> RawItem {
        let info = self.volume_info;
        let image_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail))
            .map(|u| u.replacen("http://", "https://", 1));

        RawItem {
            source: SOURCE.to_string(),
            id: self.id,
            title: info.title,
            description: info.description,
            link: info.info_link,
            image_url,
            subjects: info.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> GoogleBooks {
        GoogleBooks::new(Client::new(), &SourcesConfig::default()).unwrap()
    }

    #[test]
    fn test_search_request_url() {
        let url = adapter().search_request("dune messiah", 2, 20).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/books/v1/volumes?q=dune+messiah&startIndex=20&maxResults=20"
        );
    }

    #[test]
    fn test_oversized_page_is_refused() {
        let url = adapter().search_request("x", 3, MAX_PAGE_SIZE).unwrap();
        assert!(url.as_str().ends_with("startIndex=80&maxResults=40"));

        assert!(matches!(
            adapter().search_request("x", 1, 50),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_volume_payload_maps_to_raw_items() {
        let json = r#"{
            "kind": "books#volumes",
            "totalItems": 1,
            "items": [{
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "description": "<b>Inside</b> the company",
                    "infoLink": "https://books.google.com/books?id=zyTCAlFPjgYC",
                    "imageLinks": {"thumbnail": "http://books.google.com/thumb.jpg"},
                    "categories": ["Business & Economics"]
                }
            }]
        }"#;
        let volumes: Volumes = serde_json::from_str(json).unwrap();
        let raw: Vec<RawItem> = volumes.items.into_iter().map(Volume::into_raw).collect();

        assert_eq!(raw[0].id, "zyTCAlFPjgYC");
        assert_eq!(raw[0].description.as_deref(), Some("<b>Inside</b> the company"));
        assert_eq!(
            raw[0].image_url.as_deref(),
            Some("https://books.google.com/thumb.jpg")
        );
        assert_eq!(raw[0].subjects, vec!["Business & Economics"]);
    }

    #[test]
    fn test_no_matches_is_empty_page() {
        let volumes: Volumes =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(volumes.items.is_empty());
    }
}

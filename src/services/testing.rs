// src/services/testing.rs

//! Scriptable in-memory upstream for tests.
//!
//! Requests are keyed as `feed:{page}`, `category:{slug}:{page}` and
//! `search:{query}:{page}`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{AppError, Result};
use crate::models::{Category, RawItem};
use crate::services::RequestToken;
use crate::services::sources::{CategorySource, DefaultFeedSource, SearchSource, Sources};

/// `count` raw items titled `{prefix}{n}`, all filed under `subject`.
pub(crate) fn raw_items(prefix: &str, count: usize, subject: &str) -> Vec<RawItem> {
    (0..count)
        .map(|n| RawItem {
            source: "mock".to_string(),
            id: format!("{}{}", prefix, n),
            title: format!("{}{}", prefix, n),
            description: Some(format!("About {}{}", prefix, n)),
            link: Some(format!("https://books.example/{}{}", prefix, n)),
            image_url: None,
            subjects: vec![subject.to_string()],
        })
        .collect()
}

#[derive(Default)]
pub(crate) struct MockCatalog {
    pages: Mutex<HashMap<String, Vec<RawItem>>>,
    failures: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    started: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn sources(self: &Arc<Self>) -> Sources {
        Sources::new(self.clone(), self.clone(), self.clone())
    }

    pub(crate) fn respond(&self, key: &str, items: Vec<RawItem>) {
        self.pages.lock().insert(key.to_string(), items);
    }

    pub(crate) fn fail(&self, key: &str) {
        self.failures.lock().insert(key.to_string());
    }

    /// Never answer; only ends (as cancelled) once the token is superseded.
    pub(crate) fn hang(&self, key: &str) {
        self.hanging.lock().insert(key.to_string());
    }

    /// Hold the response until the returned notify fires.
    pub(crate) fn gate(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(key.to_string(), notify.clone());
        notify
    }

    /// Fires when a request for `key` arrives.
    pub(crate) fn started(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.started.lock().insert(key.to_string(), notify.clone());
        notify
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|k| *k == key).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    async fn serve(&self, key: String, token: &RequestToken) -> Result<Vec<RawItem>> {
        self.calls.lock().push(key.clone());

        let started = self.started.lock().get(&key).cloned();
        if let Some(started) = started {
            started.notify_one();
        }

        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let hanging = self.hanging.lock().contains(&key);
        if hanging {
            token.cancelled().await;
            return Err(AppError::Cancelled);
        }

        let failing = self.failures.lock().contains(&key);
        if failing {
            return Err(AppError::network("mock", format!("{} unavailable", key)));
        }

        let page = self.pages.lock().get(&key).cloned();
        Ok(page.unwrap_or_default())
    }
}

#[async_trait]
impl DefaultFeedSource for MockCatalog {
    async fn fetch_feed(
        &self,
        page: u32,
        _page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        self.serve(format!("feed:{}", page), token).await
    }
}

#[async_trait]
impl CategorySource for MockCatalog {
    async fn fetch_category(
        &self,
        category: Category,
        page: u32,
        _page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        self.serve(format!("category:{}:{}", category.slug(), page), token)
            .await
    }
}

#[async_trait]
impl SearchSource for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_search(
        &self,
        query: &str,
        page: u32,
        _page_size: usize,
        token: &RequestToken,
    ) -> Result<Vec<RawItem>> {
        self.serve(format!("search:{}:{}", query, page), token).await
    }
}

// src/services/browser.rs

//! Paginated catalog browser.
//!
//! Turns selections (category, free-text query, "load more") into the list
//! of items on display. Pages come from the injected [`PageCache`] when
//! fresh and from the upstream sources otherwise.
//!
//! Every selection mints a new request generation. A fetch remembers the
//! generation it started under, and its result is applied to the view only
//! if that generation is still current, so a slow response for an old
//! selection can never overwrite a newer one. Late results are still cached.
//!
//! Fetch failures never reach the caller: the view simply ends up with no
//! further pages (and no items, for a reset).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::{Category, Config, PageKey, RawItem, ResultItem, SelectionKey};
use crate::services::cache::{CacheEntry, SharedPageCache};
use crate::services::debounce::Debouncer;
use crate::services::sources::Sources;
use crate::services::token::{Generations, RequestToken};

const FEATURED_LABEL: &str = "Featured";
const GENERAL_LABEL: &str = "General";

/// Tunables for a [`Browser`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Items requested per page
    pub page_size: usize,

    /// Category browsed when the default feed fails
    pub fallback_category: Category,

    /// Client-side deadline for search requests
    pub search_timeout: Duration,
}

impl BrowserOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.browser.page_size,
            fallback_category: config.browser.fallback_category,
            search_timeout: config.http.search_timeout(),
        }
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A user selection, as fed through the debounce gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Category(Option<Category>),
    Search(String),
}

/// What the rendering layer observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Active selection, `None` before anything was loaded
    pub selection: Option<SelectionKey>,
    pub loading: bool,
    pub items: Vec<ResultItem>,
    pub has_more: bool,
}

/// Whether fetched items replace or extend the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Reset,
    Append,
}

/// A normalized page fresh from an upstream.
struct FetchedPage {
    items: Vec<ResultItem>,
    exhausted: bool,
}

#[derive(Debug, Default)]
struct BrowserState {
    active: Option<SelectionKey>,
    category: Option<Category>,
    page: u32,
    items: Vec<ResultItem>,
    has_more: bool,
    /// Generation of the display-affecting fetch in flight
    in_flight: Option<u64>,
}

/// Fetch orchestrator for one browsing session.
pub struct Browser {
    sources: Sources,
    cache: SharedPageCache,
    options: BrowserOptions,
    generations: Generations,
    state: Mutex<BrowserState>,
    view: watch::Sender<ViewState>,
}

impl Browser {
    pub fn new(sources: Sources, cache: SharedPageCache, options: BrowserOptions) -> Self {
        let (view, _rx) = watch::channel(ViewState::default());
        Self {
            sources,
            cache,
            options,
            generations: Generations::new(),
            state: Mutex::new(BrowserState::default()),
            view,
        }
    }

    pub fn cache(&self) -> &SharedPageCache {
        &self.cache
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Receive every view update.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Current request generation.
    pub fn generation(&self) -> u64 {
        self.generations.current()
    }

    /// Load the unfiltered view if nothing has been selected yet.
    pub async fn load_initial(&self) {
        let loaded = self.state.lock().active.is_some();
        if loaded {
            log::debug!("Initial view already loaded");
            return;
        }
        self.select_category(None).await;
    }

    /// Browse a category (`None` for the unfiltered feed).
    ///
    /// Re-selecting the active category does nothing.
    pub async fn select_category(&self, category: Option<Category>) {
        let key = SelectionKey::Category(category);
        let token = {
            let mut state = self.state.lock();
            if state.active.as_ref() == Some(&key) {
                log::debug!("{} already selected", key);
                return;
            }
            state.category = category;
            state.items.clear();
            self.begin_reset(&mut state, key.clone())
        };

        self.fetch_page(key, 1, FetchMode::Reset, token).await;
    }

    /// Search for `query`; a blank query returns to the selected category.
    pub async fn search(&self, query: &str) {
        let (key, token) = {
            let mut state = self.state.lock();
            let key = SelectionKey::resolve(state.category, query);
            let token = self.begin_reset(&mut state, key.clone());
            (key, token)
        };

        self.fetch_page(key, 1, FetchMode::Reset, token).await;
    }

    /// Append the next page of the active selection.
    ///
    /// No-op when nothing is selected, the last page was exhausted, or a
    /// fetch for the current generation is still in flight.
    pub async fn load_more(&self) {
        let (key, page, token) = {
            let mut state = self.state.lock();
            let Some(key) = state.active.clone() else {
                log::debug!("Nothing selected; ignoring load more");
                return;
            };
            if !state.has_more {
                log::debug!("{} has no more pages", key);
                return;
            }
            if state.in_flight.is_some() {
                log::debug!("Fetch in flight for {}; ignoring load more", key);
                return;
            }

            state.page += 1;
            let token = self.generations.token();
            state.in_flight = Some(token.generation());
            self.publish(&state);
            (key, state.page, token)
        };

        self.fetch_page(key, page, FetchMode::Append, token).await;
    }

    /// Apply a selection.
    pub async fn apply(&self, selection: Selection) {
        match selection {
            Selection::Category(category) => self.select_category(category).await,
            Selection::Search(query) => self.search(&query).await,
        }
    }

    /// Gate selections through a trailing debounce window.
    ///
    /// Only the last selection of a burst is applied, on its own task.
    pub fn debounced(self: &Arc<Self>, window: Duration) -> Debouncer<Selection> {
        let browser = Arc::clone(self);
        Debouncer::new(window, move |selection| {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.apply(selection).await });
        })
    }

    /// Switch to `key` at page 1 under a fresh generation.
    fn begin_reset(&self, state: &mut BrowserState, key: SelectionKey) -> RequestToken {
        state.active = Some(key);
        state.page = 1;
        let token = self.generations.advance();
        state.in_flight = Some(token.generation());
        self.publish(state);
        token
    }

    async fn fetch_page(&self, key: SelectionKey, page: u32, mode: FetchMode, token: RequestToken) {
        let page_key = PageKey::new(key.clone(), page);
        let outcome = match self.cache.get(&page_key) {
            Some(entry) => Ok(entry),
            None => self
                .fetch_remote(&key, page, &token)
                .await
                .map(|fetched| self.cache.insert(page_key, fetched.items, fetched.exhausted)),
        };

        self.commit(&key, page, mode, &token, outcome);
    }

    async fn fetch_remote(
        &self,
        key: &SelectionKey,
        page: u32,
        token: &RequestToken,
    ) -> Result<FetchedPage> {
        let page_size = self.options.page_size;
        match key {
            SelectionKey::Query(query) => {
                let search = &self.sources.search;
                let raw = tokio::time::timeout(
                    self.options.search_timeout,
                    search.fetch_search(query, page, page_size, token),
                )
                .await
                .map_err(|_| AppError::timeout(search.name(), self.options.search_timeout.as_secs()))??;
                let exhausted = raw.len() < page_size;
                Ok(Self::normalize(raw, page, exhausted, None, GENERAL_LABEL))
            }
            SelectionKey::Category(Some(category)) => self.browse(*category, page, token).await,
            SelectionKey::Category(None) => {
                match self.sources.feed.fetch_feed(page, page_size, token).await {
                    Ok(raw) => {
                        let exhausted = raw.len() < page_size;
                        Ok(Self::normalize(raw, page, exhausted, None, FEATURED_LABEL))
                    }
                    // Later pages would mix two listings, so only the first falls back
                    Err(primary) if page == 1 && !primary.is_cancelled() => {
                        self.fall_back(primary, page, token).await
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Browse the fallback category after the default feed failed.
    async fn fall_back(
        &self,
        primary: AppError,
        page: u32,
        token: &RequestToken,
    ) -> Result<FetchedPage> {
        let category = self.options.fallback_category;
        log::warn!(
            "Default feed failed ({}); browsing '{}' instead",
            primary,
            category
        );
        self.browse(category, page, token).await.map_err(|e| {
            if e.is_cancelled() {
                e
            } else {
                AppError::FallbackExhausted {
                    category: category.to_string(),
                    primary: primary.to_string(),
                    fallback: e.to_string(),
                }
            }
        })
    }

    /// Fetch a category page, dropping items the upstream mis-filed.
    async fn browse(
        &self,
        category: Category,
        page: u32,
        token: &RequestToken,
    ) -> Result<FetchedPage> {
        let page_size = self.options.page_size;
        let raw = self
            .sources
            .category
            .fetch_category(category, page, page_size, token)
            .await?;

        // Exhaustion follows the upstream count, not the filtered one
        let exhausted = raw.len() < page_size;
        let total = raw.len();
        let matching: Vec<RawItem> = raw
            .into_iter()
            .filter(|item| item.subjects.iter().any(|s| category.matches_subject(s)))
            .collect();
        if matching.len() < total {
            log::debug!(
                "Dropped {} of {} items not filed under '{}'",
                total - matching.len(),
                total,
                category
            );
        }

        Ok(Self::normalize(
            matching,
            page,
            exhausted,
            Some(category.label()),
            GENERAL_LABEL,
        ))
    }

    fn normalize(
        raw: Vec<RawItem>,
        page: u32,
        exhausted: bool,
        label: Option<&str>,
        fallback_label: &str,
    ) -> FetchedPage {
        let items = raw
            .into_iter()
            .enumerate()
            .map(|(index, item)| ResultItem::normalize(item, page, index, label, fallback_label))
            .collect();
        FetchedPage { items, exhausted }
    }

    /// Apply a finished fetch to the view if its generation is still current.
    fn commit(
        &self,
        key: &SelectionKey,
        page: u32,
        mode: FetchMode,
        token: &RequestToken,
        outcome: Result<CacheEntry>,
    ) {
        let mut state = self.state.lock();
        if !token.is_valid() {
            match &outcome {
                Ok(_) => log::debug!("Discarding stale page {} of {}", page, key),
                Err(e) => log::debug!("Stale fetch of page {} of {} ended: {}", page, key, e),
            }
            return;
        }

        state.in_flight = None;
        match outcome {
            Ok(entry) => {
                match mode {
                    FetchMode::Reset => state.items = entry.items,
                    FetchMode::Append => state.items.extend(entry.items),
                }
                state.has_more = !entry.exhausted;
                log::debug!(
                    "Showing {} items for {} (page {}, more: {})",
                    state.items.len(),
                    key,
                    page,
                    state.has_more
                );
            }
            Err(e) => {
                if e.is_cancelled() {
                    log::debug!("Fetch of page {} of {} cancelled", page, key);
                } else {
                    log::warn!("Failed to fetch page {} of {}: {}", page, key, e);
                }
                if mode == FetchMode::Reset {
                    state.items.clear();
                }
                state.has_more = false;
            }
        }
        self.publish(&state);
    }

    fn publish(&self, state: &BrowserState) {
        self.view.send_replace(ViewState {
            selection: state.active.clone(),
            loading: state.in_flight.is_some(),
            items: state.items.clone(),
            has_more: state.has_more,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::models::{CacheConfig, MAX_PAGE_SIZE};
    use crate::services::cache::{ManualClock, PageCache};
    use crate::services::testing::{MockCatalog, raw_items};

    fn options() -> BrowserOptions {
        BrowserOptions {
            page_size: 20,
            fallback_category: Category::Fiction,
            search_timeout: Duration::from_secs(10),
        }
    }

    fn browser(mock: &Arc<MockCatalog>) -> (Arc<Browser>, Arc<ManualClock>) {
        browser_with(mock, options())
    }

    fn browser_with(
        mock: &Arc<MockCatalog>,
        options: BrowserOptions,
    ) -> (Arc<Browser>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(PageCache::with_clock(CacheConfig::default(), clock.clone()));
        let browser = Arc::new(Browser::new(mock.sources(), cache, options));
        (browser, clock)
    }

    fn titles(view: &ViewState) -> Vec<String> {
        view.items.iter().map(|i| i.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_network() {
        let mock = MockCatalog::new();
        mock.respond("category:science:1", raw_items("sci", 20, "Science"));
        mock.respond("category:history:1", raw_items("his", 20, "History"));
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::Science)).await;
        let first = browser.view();
        browser.select_category(Some(Category::History)).await;
        browser.select_category(Some(Category::Science)).await;

        assert_eq!(mock.count("category:science:1"), 1);
        assert_eq!(browser.view().items, first.items);
        assert_eq!(browser.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_forces_refetch() {
        let mock = MockCatalog::new();
        mock.respond("category:science:1", raw_items("sci", 20, "Science"));
        mock.respond("category:history:1", raw_items("his", 20, "History"));
        let (browser, clock) = browser(&mock);

        browser.select_category(Some(Category::Science)).await;
        browser.select_category(Some(Category::History)).await;
        clock.advance(ChronoDuration::minutes(31));
        browser.select_category(Some(Category::Science)).await;

        assert_eq!(mock.count("category:science:1"), 2);
        assert_eq!(browser.view().items.len(), 20);
    }

    #[tokio::test]
    async fn test_newer_search_wins_over_slower_older_one() {
        let mock = MockCatalog::new();
        mock.respond("search:alpha:1", raw_items("alpha", 20, "Fiction"));
        mock.respond("search:beta:1", raw_items("beta", 20, "Fiction"));
        let gate = mock.gate("search:alpha:1");
        let started = mock.started("search:alpha:1");
        let (browser, _clock) = browser(&mock);

        let slow = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.search("alpha").await })
        };
        started.notified().await;

        browser.search("beta").await;
        gate.notify_one();
        slow.await.unwrap();

        let view = browser.view();
        assert_eq!(view.selection, Some(SelectionKey::Query("beta".into())));
        assert!(titles(&view).iter().all(|t| t.starts_with("beta")));
        assert!(!view.loading);

        // The late page still landed in the cache
        let alpha = PageKey::new(SelectionKey::Query("alpha".into()), 1);
        assert!(browser.cache().get(&alpha).is_some());
    }

    #[tokio::test]
    async fn test_older_search_finishing_first_is_never_shown() {
        let mock = MockCatalog::new();
        mock.respond("search:alpha:1", raw_items("alpha", 20, "Fiction"));
        mock.respond("search:beta:1", raw_items("beta", 20, "Fiction"));
        let alpha_gate = mock.gate("search:alpha:1");
        let alpha_started = mock.started("search:alpha:1");
        let beta_gate = mock.gate("search:beta:1");
        let beta_started = mock.started("search:beta:1");
        let (browser, _clock) = browser(&mock);
        let mut rx = browser.subscribe();

        let older = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.search("alpha").await })
        };
        alpha_started.notified().await;
        let newer = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.search("beta").await })
        };
        beta_started.notified().await;

        // alpha resolves while beta is still outstanding
        alpha_gate.notify_one();
        older.await.unwrap();
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.selection, Some(SelectionKey::Query("beta".into())));
        assert!(titles(&view).iter().all(|t| !t.starts_with("alpha")));
        assert!(view.loading);

        beta_gate.notify_one();
        newer.await.unwrap();
        let view = browser.view();
        assert_eq!(view.items.len(), 20);
        assert!(titles(&view).iter().all(|t| t.starts_with("beta")));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_is_silent_and_harmless() {
        let mock = MockCatalog::new();
        mock.hang("search:alpha:1");
        mock.respond("category:science:1", raw_items("sci", 20, "Science"));
        let started = mock.started("search:alpha:1");
        let (browser, _clock) = browser(&mock);

        let slow = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.search("alpha").await })
        };
        started.notified().await;

        browser.select_category(Some(Category::Science)).await;
        slow.await.unwrap();

        let view = browser.view();
        assert_eq!(view.items.len(), 20);
        assert!(view.has_more);
        let alpha = PageKey::new(SelectionKey::Query("alpha".into()), 1);
        assert!(browser.cache().get(&alpha).is_none());
    }

    #[tokio::test]
    async fn test_exhaustion_stops_pagination() {
        let mock = MockCatalog::new();
        mock.respond("search:rare:1", raw_items("rare", 5, "Poetry"));
        let (browser, _clock) = browser(&mock);

        browser.search("rare").await;
        assert!(!browser.view().has_more);

        browser.load_more().await;
        assert_eq!(mock.total_calls(), 1);
        assert_eq!(browser.view().items.len(), 5);
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("p1-", 20, "Fiction"));
        mock.respond("feed:2", raw_items("p2-", 20, "Fiction"));
        mock.respond("feed:3", raw_items("p3-", 3, "Fiction"));
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;
        let before = browser.view().items;
        browser.load_more().await;
        browser.load_more().await;

        let view = browser.view();
        assert_eq!(view.items.len(), 43);
        assert_eq!(view.items[..20], before[..]);
        assert_eq!(view.items[20].title, "p2-0");
        assert_eq!(view.items[39].title, "p2-19");
        assert_eq!(view.items[42].title, "p3-2");
        assert!(!view.has_more);

        let keys: HashSet<_> = view.items.iter().map(|i| &i.dedupe_key).collect();
        assert_eq!(keys.len(), 43);
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_items() {
        let mock = MockCatalog::new();
        mock.respond("category:history:1", raw_items("his", 20, "History"));
        mock.fail("category:history:2");
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::History)).await;
        let before = browser.view().items;
        browser.load_more().await;

        let view = browser.view();
        assert_eq!(view.items, before);
        assert!(!view.has_more);
        assert!(!view.loading);

        browser.load_more().await;
        assert_eq!(mock.count("category:history:2"), 1);
    }

    #[tokio::test]
    async fn test_full_page_at_upstream_limit_keeps_paging() {
        let mock = MockCatalog::new();
        mock.respond("search:tolkien:1", raw_items("t", MAX_PAGE_SIZE, "Fiction"));
        let options = BrowserOptions {
            page_size: MAX_PAGE_SIZE,
            ..options()
        };
        let (browser, _clock) = browser_with(&mock, options);

        browser.search("tolkien").await;

        let view = browser.view();
        assert_eq!(view.items.len(), MAX_PAGE_SIZE);
        assert!(view.has_more);
    }

    #[tokio::test]
    async fn test_reselecting_same_category_is_noop() {
        let mock = MockCatalog::new();
        mock.respond("category:science:1", raw_items("sci", 20, "Science"));
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::Science)).await;
        let generation = browser.generation();
        browser.select_category(Some(Category::Science)).await;

        assert_eq!(mock.total_calls(), 1);
        assert_eq!(browser.generation(), generation);
    }

    #[tokio::test]
    async fn test_initial_feed_then_final_short_page() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("top", 20, "Fiction"));
        mock.respond("feed:2", raw_items("more", 5, "Fiction"));
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;
        let view = browser.view();
        assert_eq!(view.items.len(), 20);
        assert!(view.has_more);
        assert_eq!(view.items[0].category, "Fiction");

        browser.load_more().await;
        let view = browser.view();
        assert_eq!(view.items.len(), 25);
        assert!(!view.has_more);
    }

    #[tokio::test]
    async fn test_default_feed_failure_falls_back_to_category() {
        let mock = MockCatalog::new();
        mock.fail("feed:1");
        mock.respond("category:fiction:1", raw_items("fic", 20, "Fiction"));
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;

        let view = browser.view();
        assert_eq!(view.items.len(), 20);
        assert!(view.items.iter().all(|i| i.category == "Fiction"));
        assert_eq!(view.items[0].title, "fic0");
        assert!(view.has_more);
        assert_eq!(mock.calls(), vec!["feed:1", "category:fiction:1"]);
    }

    #[tokio::test]
    async fn test_feed_failure_after_first_page_does_not_fall_back() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("top", 20, "Fiction"));
        mock.fail("feed:2");
        mock.respond("category:fiction:2", raw_items("fic", 20, "Fiction"));
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;
        browser.load_more().await;

        let view = browser.view();
        assert_eq!(mock.calls(), vec!["feed:1", "feed:2"]);
        assert_eq!(view.items.len(), 20);
        assert!(titles(&view).iter().all(|t| t.starts_with("top")));
        assert!(!view.has_more);
    }

    #[tokio::test]
    async fn test_fallback_exhausted_shows_empty_state() {
        let mock = MockCatalog::new();
        mock.fail("feed:1");
        mock.fail("category:fiction:1");
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;

        let view = browser.view();
        assert!(view.items.is_empty());
        assert!(!view.has_more);
        assert!(!view.loading);
        assert!(browser.cache().is_empty());
    }

    #[tokio::test]
    async fn test_category_results_are_filtered_defensively() {
        let mock = MockCatalog::new();
        let mut page = raw_items("sci", 15, "Popular Science");
        page.extend(raw_items("cook", 5, "Cooking"));
        mock.respond("category:science:1", page);
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::Science)).await;

        let view = browser.view();
        assert_eq!(view.items.len(), 15);
        assert!(titles(&view).iter().all(|t| t.starts_with("sci")));
        // Upstream returned a full page, so more may follow
        assert!(view.has_more);
    }

    #[tokio::test]
    async fn test_fiction_filter_drops_nonfiction() {
        let mock = MockCatalog::new();
        let mut page = raw_items("fic", 18, "Fiction");
        page.extend(raw_items("nonfic", 1, "Nonfiction"));
        page.extend(raw_items("juv", 1, "Juvenile nonfiction"));
        mock.respond("category:fiction:1", page);
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::Fiction)).await;

        let view = browser.view();
        assert_eq!(view.items.len(), 18);
        assert!(titles(&view).iter().all(|t| t.starts_with("fic")));
        assert!(view.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_deadline_gives_empty_state() {
        let mock = MockCatalog::new();
        mock.hang("search:slow:1");
        let (browser, _clock) = browser(&mock);

        browser.search("slow").await;

        let view = browser.view();
        assert!(view.items.is_empty());
        assert!(!view.has_more);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_load_more_is_serialized() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("a", 20, "Fiction"));
        mock.respond("feed:2", raw_items("b", 20, "Fiction"));
        let gate = mock.gate("feed:2");
        let started = mock.started("feed:2");
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;
        let pending = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.load_more().await })
        };
        started.notified().await;
        assert!(browser.view().loading);

        browser.load_more().await;
        gate.notify_one();
        pending.await.unwrap();

        assert_eq!(mock.count("feed:2"), 1);
        assert_eq!(mock.count("feed:3"), 0);
        assert_eq!(browser.view().items.len(), 40);
    }

    #[tokio::test]
    async fn test_stale_load_more_is_discarded() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("a", 20, "Fiction"));
        mock.respond("feed:2", raw_items("b", 20, "Fiction"));
        mock.respond("category:history:1", raw_items("his", 20, "History"));
        let gate = mock.gate("feed:2");
        let started = mock.started("feed:2");
        let (browser, _clock) = browser(&mock);

        browser.load_initial().await;
        let pending = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.load_more().await })
        };
        started.notified().await;

        browser.select_category(Some(Category::History)).await;
        gate.notify_one();
        pending.await.unwrap();

        let view = browser.view();
        assert_eq!(view.items.len(), 20);
        assert!(titles(&view).iter().all(|t| t.starts_with("his")));
    }

    #[tokio::test]
    async fn test_blank_search_returns_to_category() {
        let mock = MockCatalog::new();
        mock.respond("category:art:1", raw_items("art", 20, "Art"));
        mock.respond("search:monet:1", raw_items("monet", 4, "Art"));
        let (browser, _clock) = browser(&mock);

        browser.select_category(Some(Category::Art)).await;
        browser.search("monet").await;
        assert_eq!(browser.view().items.len(), 4);

        browser.search("   ").await;
        let view = browser.view();
        assert_eq!(view.selection, Some(SelectionKey::Category(Some(Category::Art))));
        assert_eq!(view.items.len(), 20);
        assert_eq!(mock.count("category:art:1"), 1);
    }

    #[tokio::test]
    async fn test_selecting_category_clears_query() {
        let mock = MockCatalog::new();
        mock.respond("search:dune:1", raw_items("dune", 3, "Fiction"));
        mock.respond("category:poetry:1", raw_items("poem", 2, "Poetry"));
        let (browser, _clock) = browser(&mock);

        browser.search("dune").await;
        browser.select_category(Some(Category::Poetry)).await;

        let view = browser.view();
        assert_eq!(view.selection, Some(SelectionKey::Category(Some(Category::Poetry))));
        assert_eq!(titles(&view), vec!["poem0", "poem1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_selections_apply_last_only() {
        let mock = MockCatalog::new();
        mock.respond("search:abc:1", raw_items("abc", 20, "Fiction"));
        let (browser, _clock) = browser(&mock);
        let gate = browser.debounced(Duration::from_millis(50));

        for query in ["a", "ab", "abc"] {
            gate.call(Selection::Search(query.to_string()));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(mock.calls(), vec!["search:abc:1"]);
        assert_eq!(browser.view().items.len(), 20);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let mock = MockCatalog::new();
        mock.respond("feed:1", raw_items("x", 2, "Fiction"));
        let (browser, _clock) = browser(&mock);
        let mut rx = browser.subscribe();

        browser.load_initial().await;

        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.selection, Some(SelectionKey::Category(None)));
    }
}

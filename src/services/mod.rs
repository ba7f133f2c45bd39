//! Service layer for the catalog browser.
//!
//! This module contains the business logic for:
//! - Page caching with expiry (`PageCache`)
//! - Request generations and cancellation (`Generations`, `RequestToken`)
//! - Upstream adapters (`OpenLibrary`, `GoogleBooks`)
//! - Fetch orchestration (`Browser`)
//! - Selection debouncing (`Debouncer`)

mod browser;
pub mod cache;
mod debounce;
mod google_books;
mod openlibrary;
pub mod sources;
mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{Browser, BrowserOptions, Selection, ViewState};
pub use cache::{CacheEntry, CacheStats, Clock, ManualClock, PageCache, SharedPageCache, SystemClock};
pub use debounce::Debouncer;
pub use google_books::GoogleBooks;
pub use openlibrary::OpenLibrary;
pub use sources::{CategorySource, DefaultFeedSource, SearchSource, Sources};
pub use token::{Generations, RequestToken};

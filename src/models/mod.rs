// src/models/mod.rs

//! Domain models for the catalog browser.
//!
//! This module contains the data structures shared by the cache, the
//! upstream adapters and the browser, organized by their primary purpose.

mod category;
mod config;
mod item;
mod selection;

// Re-export all public types
pub use category::Category;
pub use config::{
    BrowserConfig, CacheConfig, Config, HttpConfig, LoggingConfig, MAX_PAGE_SIZE, SourcesConfig,
};
pub use item::{RawItem, ResultItem};
pub use selection::{PageKey, SelectionKey};

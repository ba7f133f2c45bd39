//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Category;

/// Largest page size every upstream can serve (Google Books caps `maxResults` at 40).
pub const MAX_PAGE_SIZE: usize = 40;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Page cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Browsing behavior
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Upstream endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Write configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.search_timeout_secs == 0 {
            return Err(AppError::validation("http.search_timeout_secs must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::validation("cache.max_entries must be > 0"));
        }
        if self.browser.page_size == 0 {
            return Err(AppError::validation("browser.page_size must be > 0"));
        }
        if self.browser.page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "browser.page_size must be <= {}",
                MAX_PAGE_SIZE
            )));
        }
        url::Url::parse(&self.sources.default_feed_url)?;
        url::Url::parse(&self.sources.search_url)?;
        if !self.sources.category_url.contains("{category}") {
            return Err(AppError::validation(
                "sources.category_url must contain a {category} placeholder",
            ));
        }
        url::Url::parse(&self.sources.category_url.replace("{category}", "fiction"))?;
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Client-side deadline for full-text search requests
    #[serde(default = "defaults::search_timeout")]
    pub search_timeout_secs: u64,
}

impl HttpConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            search_timeout_secs: defaults::search_timeout(),
        }
    }
}

/// Page cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether pages are cached at all
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// How long a fetched page stays valid
    #[serde(default = "defaults::ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached pages
    #[serde(default = "defaults::max_entries")]
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            ttl_secs: defaults::ttl(),
            max_entries: defaults::max_entries(),
        }
    }
}

/// Browsing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Items requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Quiet window for coalescing rapid selections
    #[serde(default = "defaults::debounce")]
    pub debounce_ms: u64,

    /// Category browsed when the default feed is unavailable
    #[serde(default = "defaults::fallback_category")]
    pub fallback_category: Category,
}

impl BrowserConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            debounce_ms: defaults::debounce(),
            fallback_category: defaults::fallback_category(),
        }
    }
}

/// Upstream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Featured/default listing used for the unfiltered view
    #[serde(default = "defaults::default_feed_url")]
    pub default_feed_url: String,

    /// Category listing; `{category}` is replaced by the category slug
    #[serde(default = "defaults::category_url")]
    pub category_url: String,

    /// Full-text search endpoint
    #[serde(default = "defaults::search_url")]
    pub search_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            default_feed_url: defaults::default_feed_url(),
            category_url: defaults::category_url(),
            search_url: defaults::search_url(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither `--verbose` nor `RUST_LOG` is given
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use crate::models::Category;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bookshelf/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn search_timeout() -> u64 {
        10
    }

    // Cache defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn ttl() -> u64 {
        30 * 60
    }
    pub fn max_entries() -> usize {
        500
    }

    // Browser defaults
    pub fn page_size() -> usize {
        20
    }
    pub fn debounce() -> u64 {
        50
    }
    pub fn fallback_category() -> Category {
        Category::Fiction
    }

    // Source defaults
    pub fn default_feed_url() -> String {
        "https://openlibrary.org/trending/daily.json".into()
    }
    pub fn category_url() -> String {
        "https://openlibrary.org/subjects/{category}.json".into()
    }
    pub fn search_url() -> String {
        "https://www.googleapis.com/books/v1/volumes".into()
    }

    pub fn level() -> String {
        "info".into()
    }
}

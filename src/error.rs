// src/error.rs

//! Unified error handling for the catalog browser.

use std::fmt;

use thiserror::Error;

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (transport error or non-success status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream returned something unusable
    #[error("Network failure from {upstream}: {message}")]
    Network { upstream: String, message: String },

    /// Client-side deadline exceeded
    #[error("Request to {upstream} timed out after {secs}s")]
    Timeout { upstream: String, secs: u64 },

    /// Superseded by a newer request generation
    #[error("Request cancelled")]
    Cancelled,

    /// Default feed failed and so did the fallback category browse
    #[error("Default feed failed ({primary}); fallback '{category}' failed ({fallback})")]
    FallbackExhausted {
        category: String,
        primary: String,
        fallback: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network failure attributed to an upstream.
    pub fn network(upstream: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            upstream: upstream.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error for an upstream.
    pub fn timeout(upstream: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            upstream: upstream.into(),
            secs,
        }
    }

    /// True for supersession-triggered cancellation, which is never reported.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

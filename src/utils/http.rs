// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::services::RequestToken;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET a URL and decode the JSON body.
///
/// The transfer is aborted as soon as `token` is superseded, yielding
/// [`AppError::Cancelled`]. Non-success statuses are errors.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
    token: &RequestToken,
) -> Result<T> {
    log::debug!("GET {}", url);
    let request = async {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok::<T, AppError>(response.json::<T>().await?)
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = request => result,
    }
}

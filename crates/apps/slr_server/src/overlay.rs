//! One-shot fetch of the sea-level-rise overlay.

use std::time::Duration;

use formats::{FeatureCollection, florida_overlay_from_str};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("overlay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("overlay endpoint answered {0}")]
    Status(StatusCode),
}

pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

pub async fn fetch_overlay_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }
    Ok(resp.text().await?)
}

/// Fetches and filters the overlay. Never fails: a missing URL, a network
/// error or an unusable payload all produce an empty collection.
pub async fn load_florida_overlay(client: &Client, url: Option<&str>) -> FeatureCollection {
    let Some(url) = url else {
        info!("no overlay URL configured; sea-level overlay disabled");
        return FeatureCollection::empty();
    };
    info!("fetching sea-level overlay from {url}");
    match fetch_overlay_text(client, url).await {
        Ok(payload) => florida_overlay_from_str(&payload),
        Err(err) => {
            warn!("{err}; showing no sea-level polygons");
            FeatureCollection::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{http_client, load_florida_overlay};
    use std::time::Duration;

    #[tokio::test]
    async fn missing_url_means_empty_overlay() {
        let client = http_client(Duration::from_secs(1)).unwrap();
        assert!(load_florida_overlay(&client, None).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_means_empty_overlay() {
        let client = http_client(Duration::from_millis(500)).unwrap();
        // Nothing listens on the loopback discard port.
        let overlay = load_florida_overlay(&client, Some("http://127.0.0.1:9/slr.geojson")).await;
        assert!(overlay.is_empty());
    }
}

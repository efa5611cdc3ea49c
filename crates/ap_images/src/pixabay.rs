//! Pixabay image search client

use std::fmt;

use ap_core::{Error, ImageSearch, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
}

pub struct PixabayClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PixabayClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: "https://pixabay.com/api/".to_string(),
        }
    }

    fn parse(body: &str) -> Result<Vec<String>> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response
            .hits
            .into_iter()
            .filter_map(|hit| hit.large_image_url)
            .collect())
    }
}

impl fmt::Debug for PixabayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixabayClient")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ImageSearch for PixabayClient {
    fn name(&self) -> &str {
        "Pixabay"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ImageSearch("Pixabay API key is not configured".to_string()))?;

        // Pixabay rejects page sizes below 3
        let per_page = per_page.clamp(3, 200).to_string();
        debug!("Searching Pixabay for '{}'", query);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", api_key),
                ("q", query),
                ("image_type", "photo"),
                ("safesearch", "true"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: "Pixabay search failed".to_string(),
            });
        }

        Self::parse(&response.text().await?)
    }
}

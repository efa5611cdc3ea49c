//! Pexels photo search client

use std::fmt;

use ap_core::{Error, ImageSearch, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Deserialize)]
struct PhotoSources {
    large: Option<String>,
}

pub struct PexelsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PexelsClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: "https://api.pexels.com/v1".to_string(),
        }
    }

    fn parse(body: &str) -> Result<Vec<String>> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response
            .photos
            .into_iter()
            .filter_map(|photo| photo.src.large)
            .collect())
    }
}

impl fmt::Debug for PexelsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PexelsClient")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ImageSearch for PexelsClient {
    fn name(&self) -> &str {
        "Pexels"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ImageSearch("Pexels API key is not configured".to_string()))?;

        let per_page = per_page.to_string();
        debug!("Searching Pexels for '{}'", query);
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("Authorization", api_key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: "Pexels search failed".to_string(),
            });
        }

        Self::parse(&response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "page": 1,
            "photos": [
                {"id": 1, "src": {"original": "https://images.pexels.com/1.jpg", "large": "https://images.pexels.com/1-large.jpg"}},
                {"id": 2, "src": {"original": "https://images.pexels.com/2.jpg"}}
            ]
        }"#;
        assert_eq!(
            PexelsClient::parse(body).unwrap(),
            vec!["https://images.pexels.com/1-large.jpg".to_string()]
        );
        assert!(PexelsClient::parse(r#"{"page": 1}"#).unwrap().is_empty());
        assert!(PexelsClient::parse("not json").is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let client = PexelsClient::new(Client::new(), Some(String::new()));
        assert!(!client.is_configured());
        assert!(client.search("ducks", 5).await.is_err());
    }
}

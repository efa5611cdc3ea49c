use std::sync::Arc;

use ap_core::config::ImageConfig;
use ap_core::{ImageSearch, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{PexelsClient, PixabayClient};

/// Finds a featured image candidate for a topic.
pub struct ImageResolver {
    sources: Vec<Arc<dyn ImageSearch>>,
    per_page: u32,
}

impl ImageResolver {
    /// Sources in order of preference.
    pub fn new(sources: Vec<Arc<dyn ImageSearch>>, per_page: u32) -> Self {
        Self { sources, per_page }
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let sources: Vec<Arc<dyn ImageSearch>> = vec![
            Arc::new(PexelsClient::new(client.clone(), config.pexels_key.clone())),
            Arc::new(PixabayClient::new(client, config.pixabay_key.clone())),
        ];
        Ok(Self::new(sources, config.per_page))
    }

    /// Candidates from the first source that has any. Errors count as no
    /// results.
    pub async fn candidates(&self, topic: &str) -> Vec<String> {
        for source in &self.sources {
            if !source.is_configured() {
                debug!("Skipping {} (no API key)", source.name());
                continue;
            }
            match source.search(topic, self.per_page).await {
                Ok(urls) if !urls.is_empty() => {
                    info!("🖼️ {} returned {} images for '{}'", source.name(), urls.len(), topic);
                    return urls;
                }
                Ok(_) => info!("{} has no images for '{}'", source.name(), topic),
                Err(e) => warn!("⚠️ {} search failed: {}", source.name(), e),
            }
        }
        Vec::new()
    }

    /// One candidate picked uniformly at random, or `None`.
    pub async fn resolve_image<R: Rng + ?Sized + Send>(&self, topic: &str, rng: &mut R) -> Option<String> {
        let candidates = self.candidates(topic).await;
        candidates.choose(rng).cloned()
    }
}

use std::sync::Arc;

use ap_content::html::text_of;
use ap_core::config::AffiliateConfig;
use ap_core::{Error, GenerationRequest, Product, Result, TextGenerator};
use tracing::{info, warn};
use url::Url;

use crate::parse::extract_quoted;
use crate::prompts::{excerpt, product_prompt, PRODUCT_EXCERPT_CHARS};

const MAX_SUGGESTIONS: usize = 5;

/// Asks the model for product ideas and turns them into vendor search links.
pub struct ProductRecommender {
    model: Arc<dyn TextGenerator>,
    search_url: Url,
    tag: String,
}

impl ProductRecommender {
    pub fn new(model: Arc<dyn TextGenerator>, config: &AffiliateConfig) -> Result<Self> {
        let search_url = Url::parse(&config.vendor_search_url).map_err(|e| {
            Error::Config(format!("Invalid vendor search URL {}: {}", config.vendor_search_url, e))
        })?;
        Ok(Self {
            model,
            search_url,
            tag: config.tag.clone(),
        })
    }

    /// Product names suggested for the article. Failures are logged and give
    /// an empty list.
    pub async fn suggest_products(&self, article_text: &str) -> Vec<String> {
        let plain = text_of(article_text);
        let request = GenerationRequest::new(product_prompt(excerpt(&plain, PRODUCT_EXCERPT_CHARS)))
            .with_temperature(0.5)
            .with_max_tokens(200);

        match self.model.generate(&request).await {
            Ok(raw) => {
                let names: Vec<String> = extract_quoted(&raw).into_iter().take(MAX_SUGGESTIONS).collect();
                if names.is_empty() {
                    warn!("⚠️ No product names found in model reply");
                } else {
                    info!("🛒 Suggested products: {}", names.join(", "));
                }
                names
            }
            Err(e) => {
                warn!("⚠️ Product suggestion failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Vendor search links carrying the referral tag. Names with nothing
    /// searchable left after cleanup are skipped.
    pub fn build_vendor_links(&self, names: &[String]) -> Vec<Product> {
        names
            .iter()
            .filter_map(|name| {
                let query = search_terms(name)?;
                let mut url = self.search_url.clone();
                url.query_pairs_mut()
                    .clear()
                    .append_pair("k", &query)
                    .append_pair("tag", &self.tag);
                Some(Product {
                    name: name.trim().to_string(),
                    url: url.to_string(),
                })
            })
            .collect()
    }
}

/// Alphanumeric words of a name joined by spaces, which the query encoder
/// writes as `+`.
fn search_terms(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

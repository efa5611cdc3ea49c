use std::sync::Arc;

use ap_content::seo;
use ap_content::topics::clean_generated_topic;
use ap_core::config::ModelConfig;
use ap_core::{Article, Error, GenerationRequest, Result, TextGenerator, Topic};
use tracing::info;

use crate::parse::parse_article_response;
use crate::prompts::{article_prompt, topic_prompt};

/// Produces article drafts and fresh topics from the text model.
pub struct ArticleWriter {
    model: Arc<dyn TextGenerator>,
    temperature: f32,
    max_tokens: u32,
}

impl ArticleWriter {
    pub fn new(model: Arc<dyn TextGenerator>, config: &ModelConfig) -> Self {
        Self {
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Generates an article for `topic`. The body is still raw model text;
    /// normalization happens downstream.
    pub async fn write(&self, topic: &Topic) -> Result<Article> {
        let request = GenerationRequest::new(article_prompt(topic))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        let raw = self.model.generate(&request).await?;
        let parsed = parse_article_response(&raw);

        if parsed.body.is_empty() {
            return Err(Error::Generation(format!(
                "Model reply for '{}' has no article body",
                topic.text
            )));
        }

        let title = parsed.title.unwrap_or_else(|| topic.text.clone());
        let meta_description = seo::meta_description(
            parsed.meta_description.as_deref(),
            &ap_content::normalize(&parsed.body),
        );
        info!("✍️ Drafted '{}' ({} characters)", title, parsed.body.len());

        Ok(Article {
            seo_title: seo::seo_title(&title),
            focus_keyword: seo::focus_keyword(&title),
            meta_description,
            title,
            html_body: parsed.body,
        })
    }

    /// Asks the model for a new topic in `niche`, steering away from `avoid`.
    pub async fn propose_topic(&self, niche: &str, avoid: &[String]) -> Result<Option<Topic>> {
        let request = GenerationRequest::new(topic_prompt(niche, avoid))
            .with_temperature(0.9)
            .with_max_tokens(60);
        let raw = self.model.generate(&request).await?;
        Ok(clean_generated_topic(&raw).map(Topic::new))
    }
}

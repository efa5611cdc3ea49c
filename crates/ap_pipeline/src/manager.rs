use std::fmt;
use std::sync::Arc;

use ap_content::affiliate::inject_with_limit;
use ap_content::links::post_anchor;
use ap_content::{apply_internal_links, normalize, CategoryResolver, TopicSelector};
use ap_core::{Config, Error, MediaAsset, PostStore, Product, PublishOutcome, Result, TextGenerator, Topic};
use ap_images::ImageResolver;
use ap_inference::{ArticleWriter, ProductRecommender};
use ap_storage::{InternalLinkLog, TopicHistory};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::links::InternalLinkBuilder;
use crate::logging::Logger;
use crate::publisher::{MediaFetcher, Publisher};
use crate::scheduler::Cycle;

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub topic: String,
    pub title: String,
    pub category_id: u64,
    pub products: usize,
    pub internal_links: usize,
    pub image: Option<String>,
    pub outcome: PublishOutcome,
}

impl CycleReport {
    pub fn summary(&self) -> String {
        let outcome = match &self.outcome {
            PublishOutcome::Published { id, link } => format!("published #{} {}", id, link),
            PublishOutcome::DuplicateSkipped { slug } => format!("duplicate '{}' skipped", slug),
            PublishOutcome::Failed(reason) => format!("failed ({})", reason),
        };
        format!(
            "'{}' in category {}, {} products, {} internal links, {}: {}",
            self.title,
            self.category_id,
            self.products,
            self.internal_links,
            if self.image.is_some() { "with image" } else { "no image" },
            outcome
        )
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Runs topic selection through publishing, one cycle at a time.
pub struct PipelineManager {
    selector: TopicSelector,
    history: TopicHistory,
    link_log: InternalLinkLog,
    writer: ArticleWriter,
    recommender: ProductRecommender,
    categories: CategoryResolver,
    images: ImageResolver,
    links: InternalLinkBuilder,
    publisher: Publisher,
    static_products: Vec<Product>,
    max_insertions: usize,
    internal_link_count: usize,
    niche: String,
    generate_topics: bool,
    cycles: usize,
    rng: StdRng,
}

impl PipelineManager {
    pub fn new(
        config: &Config,
        model: Arc<dyn TextGenerator>,
        store: Arc<dyn PostStore>,
        images: ImageResolver,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self> {
        Ok(Self {
            selector: TopicSelector::new(config.topics.clone()),
            history: TopicHistory::new(&config.state.topics_history),
            link_log: InternalLinkLog::new(&config.state.internal_links_log),
            writer: ArticleWriter::new(model.clone(), &config.model),
            recommender: ProductRecommender::new(model, &config.affiliate)?,
            categories: CategoryResolver::new(config.categories.clone()),
            images,
            links: InternalLinkBuilder::new(store.clone(), config.recent_posts_page),
            publisher: Publisher::new(store, fetcher),
            static_products: config.affiliate.static_products.clone(),
            max_insertions: config.affiliate.max_insertions,
            internal_link_count: config.internal_link_count,
            niche: config.niche.clone(),
            generate_topics: false,
            cycles: 0,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Ask the model for topics even when the pool has entries.
    pub fn with_generated_topics(mut self, generate: bool) -> Self {
        self.generate_topics = generate;
        self
    }

    pub fn history(&self) -> &TopicHistory {
        &self.history
    }

    async fn used_topics(&self, logger: &Logger) -> Vec<String> {
        match self.history.load().await {
            Ok(used) => used,
            Err(e) => {
                logger.warn(&format!("⚠️ Topic history unreadable, treating as empty: {}", e));
                Vec::new()
            }
        }
    }

    async fn choose_topic(&mut self, used: &[String], logger: &Logger) -> Result<Topic> {
        if self.generate_topics || self.selector.is_empty() {
            match self.writer.propose_topic(&self.niche, used).await {
                Ok(Some(topic)) => {
                    logger.info(&format!("💡 Model proposed '{}'", topic.text));
                    return Ok(topic);
                }
                Ok(None) => logger.warn("⚠️ Model proposed an empty topic"),
                Err(e) => logger.warn(&format!("⚠️ Topic generation failed: {}", e)),
            }
        }

        self.selector
            .select(used, &mut self.rng)
            .ok_or_else(|| Error::Generation("No topic available: the pool is empty".to_string()))
    }

    async fn record_topic(&self, topic: &str, logger: &Logger) {
        if let Err(e) = self.history.record(topic).await {
            logger.warn(&format!("⚠️ Could not record topic history: {}", e));
        }
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.cycles += 1;
        let logger = Logger::new().with_prefix(format!("[cycle {}]", self.cycles));

        let used = self.used_topics(&logger).await;
        let topic = self.choose_topic(&used, &logger).await?;
        logger.info(&format!("🎯 Topic: {}", topic.text));

        let mut article = self.writer.write(&topic).await?;
        let category_id = self
            .categories
            .resolve_category(&topic.text, topic.category_hint.as_deref());
        logger.info(&format!(
            "🗂️ Category {} ({})",
            category_id,
            self.categories.name_of(category_id).unwrap_or("unmapped")
        ));

        let body = normalize(&article.html_body);

        let names = self.recommender.suggest_products(&body).await;
        let mut products = self.recommender.build_vendor_links(&names);
        if products.is_empty() && !self.static_products.is_empty() {
            logger.info("🛒 Using the static product list");
            products = self.static_products.clone();
        }
        let body = inject_with_limit(&body, &products, self.max_insertions, &mut self.rng);

        let related = self
            .links
            .pick_recent_posts(self.internal_link_count, &mut self.rng)
            .await;
        let anchors: Vec<String> = related.iter().map(post_anchor).collect();
        let body = apply_internal_links(&body, &anchors);

        let image = self.images.resolve_image(&topic.text, &mut self.rng).await;
        if image.is_none() {
            logger.info("🖼️ No image found, publishing without one");
        }
        let media = image
            .clone()
            .map(|url| MediaAsset::new(url).with_alt_text(article.title.clone()));

        article.html_body = body;
        let outcome = self.publisher.publish(&article, media, category_id).await;

        match &outcome {
            PublishOutcome::Published { link, .. } => {
                if !related.is_empty() {
                    let urls: Vec<String> = related.iter().map(|p| p.link.clone()).collect();
                    if let Err(e) = self.link_log.append(&article.title, link, &urls).await {
                        logger.warn(&format!("⚠️ Could not write the internal-links log: {}", e));
                    }
                }
                self.record_topic(&topic.text, &logger).await;
            }
            PublishOutcome::DuplicateSkipped { .. } => self.record_topic(&topic.text, &logger).await,
            PublishOutcome::Failed(reason) => logger.error(&format!("❌ Publish failed: {}", reason)),
        }

        Ok(CycleReport {
            topic: topic.text,
            title: article.title,
            category_id,
            products: products.len().min(self.max_insertions),
            internal_links: anchors.len(),
            image,
            outcome,
        })
    }
}

#[async_trait]
impl Cycle for PipelineManager {
    async fn run_cycle(&mut self) -> Result<CycleReport> {
        PipelineManager::run_cycle(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::config::StateConfig;
    use ap_core::{GenerationRequest, ImageSearch, MediaUpload, TopicEntry};
    use ap_inference::models::DummyModel;
    use ap_storage::InMemoryStore;
    use tempfile::TempDir;

    struct MockFetcher;

    #[async_trait]
    impl MediaFetcher for MockFetcher {
        async fn fetch(&self, _url: &str) -> Result<MediaUpload> {
            Ok(MediaUpload {
                file_name: "photo.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                bytes: vec![1, 2, 3],
            })
        }
    }

    #[derive(Debug)]
    struct FixedImages(Vec<String>);

    #[async_trait]
    impl ImageSearch for FixedImages {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn search(&self, _query: &str, _per_page: u32) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct BrokenModel;

    #[async_trait]
    impl TextGenerator for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Err(Error::Generation("quota exceeded".to_string()))
        }
    }

    fn config(dir: &TempDir, topics: &[(&str, Option<&str>)]) -> Config {
        Config {
            state: StateConfig::in_dir(dir.path()),
            topics: topics
                .iter()
                .map(|(text, category)| TopicEntry {
                    text: text.to_string(),
                    category: category.map(str::to_string),
                })
                .collect(),
            ..Config::default()
        }
    }

    fn manager(config: &Config, model: Arc<dyn TextGenerator>, store: &InMemoryStore, images: &[&str]) -> PipelineManager {
        let source: Arc<dyn ImageSearch> = Arc::new(FixedImages(images.iter().map(|s| s.to_string()).collect()));
        PipelineManager::new(
            config,
            model,
            Arc::new(store.clone()),
            ImageResolver::new(vec![source], 10),
            Arc::new(MockFetcher),
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(11))
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[("Best Duck Hunting Tactics", None)]);
        let store = InMemoryStore::new();
        for i in 0..4 {
            store.insert_published(&format!("Old Post {}", i), &format!("old-post-{}", i)).await;
        }
        let mut manager = manager(&config, Arc::new(DummyModel::new()), &store, &["https://img/duck.jpg"]);

        let report = manager.run_cycle().await.unwrap();
        assert_eq!(report.topic, "Best Duck Hunting Tactics");
        assert_eq!(report.category_id, 2);
        assert_eq!(report.products, 3);
        assert_eq!(report.internal_links, 3);
        assert!(report.outcome.post_id().is_some());

        let post = store
            .find_by_slug("best-duck-hunting-tactics-a-practical-guide")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.categories, vec![2]);
        assert!(post.featured_media.is_some());

        assert_eq!(post.title, "Best Duck Hunting Tactics: A Practical Guide");

        let content = store.content_of(post.id).await.unwrap();
        assert_eq!(content.matches(r#"class="affiliate-box""#).count(), 3);
        assert!(content.contains("tag=autopress-20"));
        assert!(content.contains(r#"<div class="related-posts">"#));
        assert!(!content.contains(ap_content::INTERNAL_LINKS_PLACEHOLDER));
        assert!(!content.contains("[BODY]"));
        assert!(content.starts_with("<h2>Why It Matters</h2>"));

        assert_eq!(
            manager.history().load().await.unwrap(),
            vec!["Best Duck Hunting Tactics"]
        );
        let log = std::fs::read_to_string(&config.state.internal_links_log).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("http://localhost/old-post-"));
    }

    #[tokio::test]
    async fn test_published_body_is_assembled() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[("Training Retriever Puppies", Some("dogs"))]);
        let store = InMemoryStore::new();
        store.insert_published("Old Post", "old-post").await;
        let mut manager = manager(&config, Arc::new(DummyModel::new()), &store, &[]);

        let report = manager.run_cycle().await.unwrap();
        assert_eq!(report.category_id, 5);
        assert_eq!(report.image, None);

        let posts = store.posts().await;
        let post = posts.last().unwrap();
        assert!(post.featured_media.is_none());
        assert_eq!(
            post.meta.get("_yoast_wpseo_focuskw").map(String::as_str),
            Some("training retriever puppies")
        );
    }

    #[tokio::test]
    async fn test_second_cycle_with_same_topic_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[("Trout Flies", None)]);
        let store = InMemoryStore::new();
        let mut manager = manager(&config, Arc::new(DummyModel::new()), &store, &[]);

        assert!(manager.run_cycle().await.unwrap().outcome.post_id().is_some());
        let second = manager.run_cycle().await.unwrap();
        assert!(matches!(second.outcome, PublishOutcome::DuplicateSkipped { .. }));
        assert_eq!(store.posts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_link_log_only_records_published_posts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[("Trout Flies", None)]);
        let store = InMemoryStore::new();
        store.insert_published("Old Post", "old-post").await;
        let mut manager = manager(&config, Arc::new(DummyModel::new()), &store, &[]);

        let first = manager.run_cycle().await.unwrap();
        let link = match &first.outcome {
            PublishOutcome::Published { link, .. } => link.clone(),
            other => panic!("unexpected outcome {:?}", other),
        };
        let second = manager.run_cycle().await.unwrap();
        assert!(matches!(second.outcome, PublishOutcome::DuplicateSkipped { .. }));
        assert!(second.internal_links > 0);

        let log = std::fs::read_to_string(&config.state.internal_links_log).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields[2], link);
        assert_eq!(fields[3], "http://localhost/old-post/");
    }

    #[tokio::test]
    async fn test_generated_topic_when_pool_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[]);
        let store = InMemoryStore::new();
        let mut manager = manager(&config, Arc::new(DummyModel::new()), &store, &[]);

        let report = manager.run_cycle().await.unwrap();
        assert_eq!(report.topic, "Scouting Public Land Before Opening Day");
        assert_eq!(report.category_id, 1);
    }

    #[tokio::test]
    async fn test_model_failure_fails_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &[("Trout Flies", None)]);
        let store = InMemoryStore::new();
        let mut manager = manager(&config, Arc::new(BrokenModel), &store, &[]);

        assert!(manager.run_cycle().await.is_err());
        assert!(store.posts().await.is_empty());
        assert!(manager.history().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_products_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir, &[("Trout Flies", None)]);
        config.affiliate.static_products = vec![Product {
            name: "Fly Box".to_string(),
            url: "https://shop.example.com/fly-box".to_string(),
        }];
        let store = InMemoryStore::new();

        #[derive(Debug)]
        struct NoProductsModel(DummyModel);

        #[async_trait]
        impl TextGenerator for NoProductsModel {
            fn name(&self) -> &str {
                "no-products"
            }

            async fn generate(&self, request: &GenerationRequest) -> Result<String> {
                if request.prompt.starts_with(ap_inference::prompts::PRODUCT_INSTRUCTION) {
                    return Ok("Nothing comes to mind.".to_string());
                }
                self.0.generate(request).await
            }
        }

        let mut manager = manager(&config, Arc::new(NoProductsModel(DummyModel::new())), &store, &[]);
        let report = manager.run_cycle().await.unwrap();
        assert_eq!(report.products, 1);

        let id = report.outcome.post_id().unwrap();
        let content = store.content_of(id).await.unwrap();
        assert!(content.contains(r#"<a href="https://shop.example.com/fly-box""#));
    }
}

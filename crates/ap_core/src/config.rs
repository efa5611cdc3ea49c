use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Product, TopicEntry};
use crate::{Error, Result};

/// Everything the pipeline needs, built once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub site: SiteConfig,
    pub model: ModelConfig,
    pub images: ImageConfig,
    pub affiliate: AffiliateConfig,
    pub categories: CategoryConfig,
    pub schedule: ScheduleConfig,
    pub state: StateConfig,
    pub topics: Vec<TopicEntry>,
    /// Subject area used when the model has to propose a topic
    pub niche: String,
    /// Anchors placed in the related-posts block
    pub internal_link_count: usize,
    /// Page size when fetching recent posts for internal links
    pub recent_posts_page: usize,
}

#[derive(Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub username: String,
    pub app_password: String,
    pub timeout: Duration,
}

impl SiteConfig {
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.username.is_empty() && !self.app_password.is_empty()
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone)]
pub struct ImageConfig {
    pub pexels_key: Option<String>,
    pub pixabay_key: Option<String>,
    pub per_page: u32,
    pub timeout: Duration,
}

impl fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageConfig")
            .field("pexels_key", &self.pexels_key.as_deref().map(|_| "<redacted>"))
            .field("pixabay_key", &self.pixabay_key.as_deref().map(|_| "<redacted>"))
            .field("per_page", &self.per_page)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AffiliateConfig {
    pub tag: String,
    pub vendor_search_url: String,
    /// Used when the recommender comes back empty
    pub static_products: Vec<Product>,
    pub max_insertions: usize,
}

/// Keywords that map a topic onto a category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryConfig {
    /// Category name to remote id, in declaration order
    pub ids: Vec<(String, u64)>,
    /// Scanned in order; the first group with a matching keyword wins
    pub keyword_groups: Vec<KeywordGroup>,
    pub default_category: String,
}

impl CategoryConfig {
    pub fn id_of(&self, name: &str) -> Option<u64> {
        let name = name.trim().to_lowercase();
        self.ids
            .iter()
            .find(|(known, _)| known.to_lowercase() == name)
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub min_interval: Duration,
    pub max_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct StateConfig {
    pub topics_history: PathBuf,
    pub internal_links_log: PathBuf,
    pub app_log: Option<PathBuf>,
}

impl StateConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            topics_history: dir.join("used_topics.json"),
            internal_links_log: dir.join("internal_links.log"),
            app_log: Some(dir.join("autopress.log")),
        }
    }
}

pub const DEFAULT_CATEGORY_ID: u64 = 1;

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            ids: vec![
                ("outdoors".to_string(), 1),
                ("hunting".to_string(), 2),
                ("fishing".to_string(), 3),
                ("camping".to_string(), 4),
                ("dogs".to_string(), 5),
                ("survival".to_string(), 6),
                ("gear".to_string(), 7),
            ],
            keyword_groups: vec![
                KeywordGroup::new(
                    "hunting",
                    &["hunting", "hunt", "deer", "duck", "elk", "turkey", "rifle", "archery", "decoy", "waterfowl"],
                ),
                KeywordGroup::new(
                    "fishing",
                    &["fishing", "fish", "bass", "trout", "angler", "lure", "bait", "tackle"],
                ),
                KeywordGroup::new(
                    "dogs",
                    &["dog", "puppy", "puppies", "retriever", "hound", "canine", "k9"],
                ),
                KeywordGroup::new(
                    "camping",
                    &["camping", "campsite", "campfire", "backpacking", "hiking"],
                ),
                KeywordGroup::new(
                    "survival",
                    &["survival", "bushcraft", "prepper", "first aid", "emergency"],
                ),
                KeywordGroup::new(
                    "gear",
                    &["gear", "knife", "knives", "boots", "jacket", "optics", "binoculars"],
                ),
            ],
            default_category: "outdoors".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                base_url: String::new(),
                username: String::new(),
                app_password: String::new(),
                timeout: Duration::from_secs(30),
            },
            model: ModelConfig {
                api_key: None,
                model_name: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                temperature: 0.7,
                max_tokens: 2000,
                timeout: Duration::from_secs(120),
            },
            images: ImageConfig {
                pexels_key: None,
                pixabay_key: None,
                per_page: 15,
                timeout: Duration::from_secs(20),
            },
            affiliate: AffiliateConfig {
                tag: "autopress-20".to_string(),
                vendor_search_url: "https://www.amazon.com/s".to_string(),
                static_products: Vec::new(),
                max_insertions: 3,
            },
            categories: CategoryConfig::default(),
            schedule: ScheduleConfig {
                min_interval: Duration::from_secs(45 * 60),
                max_interval: Duration::from_secs(75 * 60),
            },
            state: StateConfig::in_dir(Path::new("data")),
            topics: default_topics(),
            niche: "hunting, fishing and the outdoors".to_string(),
            internal_link_count: 3,
            recent_posts_page: 20,
        }
    }
}

impl Config {
    /// Checks the settings that would otherwise only fail mid-cycle.
    pub fn validate(&self, require_site: bool) -> Result<()> {
        if self.schedule.min_interval > self.schedule.max_interval {
            return Err(Error::Config(format!(
                "minimum interval ({}s) is larger than maximum interval ({}s)",
                self.schedule.min_interval.as_secs(),
                self.schedule.max_interval.as_secs()
            )));
        }
        if require_site && !self.site.is_complete() {
            return Err(Error::Config(
                "WordPress base URL, username and application password are required".to_string(),
            ));
        }
        if self.categories.id_of(&self.categories.default_category).is_none() {
            tracing::warn!(
                "Default category '{}' has no id, falling back to {}",
                self.categories.default_category,
                DEFAULT_CATEGORY_ID
            );
        }
        Ok(())
    }
}

/// Parses `name=id,name=id` into an ordered category map.
pub fn parse_category_map(s: &str) -> Result<Vec<(String, u64)>> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, id) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("Invalid category entry: {}", pair)))?;
            let id = id
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("Invalid category id in: {}", pair)))?;
            Ok((name.trim().to_lowercase(), id))
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicFileEntry {
    Text(String),
    Entry(TopicEntry),
}

/// Reads a topic pool: a JSON array of strings or `{text, category}` objects.
pub fn load_topics_file(path: &Path) -> Result<Vec<TopicEntry>> {
    let raw = fs::read_to_string(path)?;
    let entries: Vec<TopicFileEntry> = serde_json::from_str(&raw)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            TopicFileEntry::Text(text) => TopicEntry { text, category: None },
            TopicFileEntry::Entry(entry) => entry,
        })
        .filter(|entry| !entry.text.trim().is_empty())
        .collect())
}

/// Reads the static affiliate products: a JSON array of `{name, url}`.
pub fn load_products_file(path: &Path) -> Result<Vec<Product>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn default_topics() -> Vec<TopicEntry> {
    [
        ("Best duck hunting tactics for late season", Some("hunting")),
        ("How to choose a tent for cold weather camping", Some("camping")),
        ("Fly fishing for trout in small streams", Some("fishing")),
        ("Training a retriever puppy for the field", Some("dogs")),
        ("Essential items for a wilderness first aid kit", Some("survival")),
        ("Picking binoculars for glassing big game", None),
        ("Planning a first backpacking trip", None),
        ("Bass fishing patterns after a cold front", None),
    ]
    .iter()
    .map(|(text, category)| TopicEntry {
        text: text.to_string(),
        category: category.map(str::to_string),
    })
    .collect()
}

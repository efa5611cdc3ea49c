use ap_core::{Topic, TopicEntry};
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use tracing::info;

lazy_static! {
    static ref LIST_MARKER: Regex = Regex::new(r"^(?:[-*#]+|\d+[.)])\s*").unwrap();
}

/// Picks the next topic from the configured pool.
#[derive(Debug, Clone)]
pub struct TopicSelector {
    pool: Vec<TopicEntry>,
}

impl TopicSelector {
    pub fn new(pool: Vec<TopicEntry>) -> Self {
        Self { pool }
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn entries(&self) -> &[TopicEntry] {
        &self.pool
    }

    /// Uniform pick among entries missing from `used`. Once every entry has
    /// been used the whole pool is eligible again. `None` for an empty pool.
    pub fn select<R: Rng + ?Sized>(&self, used: &[String], rng: &mut R) -> Option<Topic> {
        let fresh: Vec<&TopicEntry> = self
            .pool
            .iter()
            .filter(|entry| !is_used(&entry.text, used))
            .collect();

        let entry = if fresh.is_empty() {
            if !self.pool.is_empty() {
                info!("♻️ Every topic in the pool has been used, starting over");
            }
            self.pool.choose(rng)?
        } else {
            *fresh.choose(rng)?
        };

        Some(Topic::from(entry))
    }
}

pub fn is_used(topic: &str, used: &[String]) -> bool {
    let topic = topic.trim().to_lowercase();
    used.iter().any(|u| u.trim().to_lowercase() == topic)
}

/// Cleans a model-proposed topic: first non-empty line, list markers and
/// quotes removed.
pub fn clean_generated_topic(raw: &str) -> Option<String> {
    raw.lines()
        .map(|line| {
            LIST_MARKER
                .replace(line.trim(), "")
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '\u{201c}' || c == '\u{201d}')
                .trim()
                .to_string()
        })
        .find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<TopicEntry> {
        vec![
            TopicEntry { text: "Duck calls".to_string(), category: Some("hunting".to_string()) },
            TopicEntry { text: "Trout flies".to_string(), category: None },
            TopicEntry { text: "Tent care".to_string(), category: Some("camping".to_string()) },
        ]
    }

    #[test]
    fn test_select_skips_used_topics() {
        let selector = TopicSelector::new(pool());
        let used = vec!["duck calls".to_string(), "Tent care ".to_string()];
        for seed in 0..10 {
            let topic = selector.select(&used, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(topic.text, "Trout flies");
            assert_eq!(topic.category_hint, None);
        }
    }

    #[test]
    fn test_select_resets_when_exhausted() {
        let selector = TopicSelector::new(pool());
        let used: Vec<String> = pool().into_iter().map(|e| e.text).collect();
        let topic = selector.select(&used, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(pool().iter().any(|e| e.text == topic.text));
    }

    #[test]
    fn test_select_carries_category_hint() {
        let selector = TopicSelector::new(pool());
        let used = vec!["Trout flies".to_string(), "Tent care".to_string()];
        let topic = selector.select(&used, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(topic, Topic::new("Duck calls").with_category("hunting"));
    }

    #[test]
    fn test_empty_pool() {
        let selector = TopicSelector::new(Vec::new());
        assert!(selector.select(&[], &mut StdRng::seed_from_u64(0)).is_none());
    }

    #[test]
    fn test_clean_generated_topic() {
        assert_eq!(
            clean_generated_topic("\n1. \"Scouting Public Land for Early Season Deer\"\n2. Other"),
            Some("Scouting Public Land for Early Season Deer".to_string())
        );
        assert_eq!(clean_generated_topic("- Ice fishing basics"), Some("Ice fishing basics".to_string()));
        assert_eq!(clean_generated_topic("2024 gear picks"), Some("2024 gear picks".to_string()));
        assert_eq!(clean_generated_topic("  \n "), None);
    }
}

use ap_core::config::{CategoryConfig, DEFAULT_CATEGORY_ID};
use tracing::debug;

/// Maps topics to remote category ids.
///
/// Resolution order: a known manual category, then the first keyword group
/// (in configured order) with a keyword contained in the lowercased topic,
/// then the default category. Nothing here fails; the last resort is id 1.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    config: CategoryConfig,
}

impl CategoryResolver {
    pub fn new(config: CategoryConfig) -> Self {
        Self { config }
    }

    pub fn resolve_category(&self, topic: &str, manual_category: Option<&str>) -> u64 {
        if let Some(manual) = manual_category {
            match self.config.id_of(manual) {
                Some(id) => return id,
                None => debug!("Unknown manual category '{}', matching keywords", manual),
            }
        }

        let topic = topic.to_lowercase();
        for group in &self.config.keyword_groups {
            if group.keywords.iter().any(|keyword| topic.contains(keyword.as_str())) {
                if let Some(id) = self.config.id_of(&group.category) {
                    return id;
                }
            }
        }

        self.default_id()
    }

    pub fn default_id(&self) -> u64 {
        self.config
            .id_of(&self.config.default_category)
            .unwrap_or(DEFAULT_CATEGORY_ID)
    }

    /// Name for an id, for log lines
    pub fn name_of(&self, id: u64) -> Option<&str> {
        self.config
            .ids
            .iter()
            .find(|(_, known)| *known == id)
            .map(|(name, _)| name.as_str())
    }
}

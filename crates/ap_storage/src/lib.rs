use std::sync::Arc;

use ap_core::config::SiteConfig;
use ap_core::{Error, PostStore, Result};

pub mod backends;
pub mod local;

pub use backends::*;
pub use local::{InternalLinkLog, TopicHistory};

/// Builds the post store named on the command line.
pub fn create_store(kind: &str, site: &SiteConfig) -> Result<Arc<dyn PostStore>> {
    match kind.to_lowercase().as_str() {
        "wordpress" | "wp" => Ok(Arc::new(WordPressStore::new(site)?)),
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        other => Err(Error::Config(format!(
            "Unknown store '{}'. Available stores: wordpress, memory",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_store;
    pub use super::local::{InternalLinkLog, TopicHistory};
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::Config;

    #[test]
    fn test_create_store() {
        let mut site = Config::default().site;
        assert!(create_store("memory", &site).is_ok());
        assert!(create_store("wordpress", &site).is_err());
        assert!(create_store("sqlite", &site).is_err());

        site.base_url = "https://blog.example.com".to_string();
        site.username = "editor".to_string();
        site.app_password = "abcd efgh".to_string();
        assert!(create_store("WordPress", &site).is_ok());
    }
}

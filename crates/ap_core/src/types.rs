use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A subject for one cycle, with an optional category name hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub text: String,
    pub category_hint: Option<String>,
}

impl Topic {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category_hint: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_hint = Some(category.into());
        self
    }
}

/// Entry of the configured topic pool, as found in a topics file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<&TopicEntry> for Topic {
    fn from(entry: &TopicEntry) -> Self {
        Topic {
            text: entry.text.clone(),
            category_hint: entry.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub seo_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub source_url: String,
    pub remote_id: Option<u64>,
    pub alt_text: Option<String>,
}

impl MediaAsset {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            remote_id: None,
            alt_text: None,
        }
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }
}

/// Binary payload handed to the post store for a media upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A post as seen in the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: u64,
    pub slug: String,
    pub status: String,
    pub link: String,
    pub title: String,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub featured_media: Option<u64>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Creation payload for a new post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: String,
    pub categories: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Published { id: u64, link: String },
    DuplicateSkipped { slug: String },
    Failed(String),
}

impl PublishOutcome {
    pub fn post_id(&self) -> Option<u64> {
        match self {
            PublishOutcome::Published { id, .. } => Some(*id),
            _ => None,
        }
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use ap_core::{Error, MediaUpload, NewPost, PostStore, PublishedPost, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

const BASE_LINK: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub id: u64,
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    pub alt_text: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: Vec<PublishedPost>,
    media: Vec<StoredMedia>,
    contents: BTreeMap<u64, String>,
    next_id: u64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local post store, used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored post, oldest first.
    pub async fn posts(&self) -> Vec<PublishedPost> {
        self.state.read().await.posts.clone()
    }

    /// HTML body a post was created with.
    pub async fn content_of(&self, post_id: u64) -> Option<String> {
        self.state.read().await.contents.get(&post_id).cloned()
    }

    pub async fn media(&self) -> Vec<StoredMedia> {
        self.state.read().await.media.clone()
    }

    /// Seeds an already published post.
    pub async fn insert_published(&self, title: &str, slug: &str) -> PublishedPost {
        let mut state = self.state.write().await;
        let post = PublishedPost {
            id: state.allocate_id(),
            slug: slug.to_string(),
            status: "publish".to_string(),
            link: format!("{}/{}/", BASE_LINK, slug),
            title: title.to_string(),
            categories: Vec::new(),
            featured_media: None,
            meta: Default::default(),
        };
        state.posts.push(post.clone());
        post
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PublishedPost>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<PublishedPost>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| p.status == "publish")
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<PublishedPost> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = PublishedPost {
            id,
            slug: post.slug.clone(),
            status: post.status.clone(),
            link: format!("{}/{}/", BASE_LINK, post.slug),
            title: post.title.clone(),
            categories: post.categories.clone(),
            featured_media: post.featured_media,
            meta: post.meta.clone(),
        };
        state.contents.insert(id, post.content.clone());
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn upload_media(&self, upload: &MediaUpload) -> Result<u64> {
        if upload.bytes.is_empty() {
            return Err(Error::Storage(format!("Media {} is empty", upload.file_name)));
        }
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.media.push(StoredMedia {
            id,
            file_name: upload.file_name.clone(),
            mime_type: upload.mime_type.clone(),
            size: upload.bytes.len(),
            alt_text: None,
        });
        Ok(id)
    }

    async fn update_media_alt(&self, media_id: u64, alt_text: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let media = state
            .media
            .iter_mut()
            .find(|m| m.id == media_id)
            .ok_or_else(|| Error::Storage(format!("No media with id {}", media_id)))?;
        media.alt_text = Some(alt_text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(title: &str, slug: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "<p>Body</p>".to_string(),
            status: "publish".to_string(),
            categories: vec![2],
            featured_media: None,
            meta: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = InMemoryStore::new();
        let first = store.create_post(&new_post("Duck Calls", "duck-calls")).await.unwrap();
        let second = store.create_post(&new_post("Trout Flies", "trout-flies")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.link, "http://localhost/duck-calls/");
        assert_eq!(store.content_of(first.id).await.as_deref(), Some("<p>Body</p>"));

        let found = store.find_by_slug("duck-calls").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_by_slug("elk").await.unwrap().is_none());

        let recent = store.recent_posts(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].slug, "trout-flies");
    }

    #[tokio::test]
    async fn test_drafts_are_not_recent() {
        let store = InMemoryStore::new();
        let mut draft = new_post("Draft", "draft");
        draft.status = "draft".to_string();
        store.create_post(&draft).await.unwrap();
        assert!(store.recent_posts(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_media() {
        let store = InMemoryStore::new();
        let upload = MediaUpload {
            file_name: "duck.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        };
        let id = store.upload_media(&upload).await.unwrap();
        store.update_media_alt(id, "A duck").await.unwrap();
        assert_eq!(store.media().await[0].alt_text.as_deref(), Some("A duck"));
        assert!(store.update_media_alt(id + 100, "x").await.is_err());

        let empty = MediaUpload { bytes: Vec::new(), ..upload };
        assert!(store.upload_media(&empty).await.is_err());
    }
}

use std::sync::Arc;

use ap_content::links::post_anchor;
use ap_core::{PostStore, PublishedPost};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

/// Picks recently published posts to link from a new article.
pub struct InternalLinkBuilder {
    store: Arc<dyn PostStore>,
    page_size: usize,
}

impl InternalLinkBuilder {
    pub fn new(store: Arc<dyn PostStore>, page_size: usize) -> Self {
        Self { store, page_size }
    }

    /// Up to `limit` distinct posts sampled from the most recent page. An
    /// unreachable store gives none.
    pub async fn pick_recent_posts<R: Rng + ?Sized + Send>(&self, limit: usize, rng: &mut R) -> Vec<PublishedPost> {
        if limit == 0 {
            return Vec::new();
        }

        let recent = match self.store.recent_posts(self.page_size).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("⚠️ Could not fetch recent posts: {}", e);
                return Vec::new();
            }
        };
        let linkable: Vec<PublishedPost> = recent.into_iter().filter(|p| !p.link.is_empty()).collect();

        let picked: Vec<PublishedPost> = linkable.choose_multiple(rng, limit).cloned().collect();
        info!("🔗 Picked {} of {} recent posts for internal links", picked.len(), linkable.len());
        picked
    }

    /// Anchors for up to `limit` recent posts.
    pub async fn recent_post_links<R: Rng + ?Sized + Send>(&self, limit: usize, rng: &mut R) -> Vec<String> {
        self.pick_recent_posts(limit, rng)
            .await
            .iter()
            .map(post_anchor)
            .collect()
    }
}

use async_trait::async_trait;
use crate::types::{MediaUpload, NewPost, PublishedPost};
use crate::Result;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Looks up a post by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PublishedPost>>;

    /// Returns up to `limit` published posts, newest first
    async fn recent_posts(&self, limit: usize) -> Result<Vec<PublishedPost>>;

    /// Creates a post and returns it as stored
    async fn create_post(&self, post: &NewPost) -> Result<PublishedPost>;

    /// Uploads a media file and returns its remote id
    async fn upload_media(&self, upload: &MediaUpload) -> Result<u64>;

    /// Sets the alt text of an uploaded media item
    async fn update_media_alt(&self, media_id: u64, alt_text: &str) -> Result<()>;
}

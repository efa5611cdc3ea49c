use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ap_content::slugify;
use ap_core::{Article, Error, MediaAsset, MediaUpload, NewPost, PostStore, PublishOutcome, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{error, info, warn};
use url::Url;

pub const SEO_TITLE_KEY: &str = "_yoast_wpseo_title";
pub const SEO_DESCRIPTION_KEY: &str = "_yoast_wpseo_metadesc";
pub const SEO_FOCUS_KEYWORD_KEY: &str = "_yoast_wpseo_focuskw";

/// Downloads a remote image so it can be re-uploaded to the post store.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<MediaUpload>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<MediaUpload> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: format!("Image download failed for {}", url),
            });
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_lowercase())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| mime_from_name(url).to_string());
        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(Error::Storage(format!("Image at {} is empty", url)));
        }

        Ok(MediaUpload {
            file_name: file_name_for(url, &mime_type),
            mime_type,
            bytes,
        })
    }
}

fn mime_from_name(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// File name for an uploaded image: the last path segment of its URL, or a
/// generic name, always with an extension.
fn file_name_for(url: &str, mime_type: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|mut s| s.next_back().map(str::to_string)))
        .unwrap_or_default();
    let cleaned: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let stem = cleaned.trim_matches('.');

    if stem.is_empty() {
        format!("featured-image.{}", extension_for(mime_type))
    } else if stem.contains('.') {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension_for(mime_type))
    }
}

fn seo_meta(article: &Article) -> BTreeMap<String, String> {
    [
        (SEO_TITLE_KEY, &article.seo_title),
        (SEO_DESCRIPTION_KEY, &article.meta_description),
        (SEO_FOCUS_KEYWORD_KEY, &article.focus_keyword),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, value)| (key.to_string(), value.clone()))
    .collect()
}

/// Creates posts in the store, at most once per slug.
pub struct Publisher {
    store: Arc<dyn PostStore>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl Publisher {
    pub fn new(store: Arc<dyn PostStore>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn publish(&self, article: &Article, media: Option<MediaAsset>, category_id: u64) -> PublishOutcome {
        let slug = slugify(&article.title);
        if slug.is_empty() {
            return PublishOutcome::Failed(format!("Title '{}' gives an empty slug", article.title));
        }

        match self.store.find_by_slug(&slug).await {
            Ok(Some(existing)) => {
                info!("⏭️ '{}' already exists as post {}, skipping", slug, existing.id);
                return PublishOutcome::DuplicateSkipped { slug };
            }
            Ok(None) => {}
            Err(e) => warn!("⚠️ Duplicate check for '{}' failed, publishing anyway: {}", slug, e),
        }

        let featured_media = match media {
            Some(asset) => self.attach_media(&asset).await,
            None => None,
        };

        let post = NewPost {
            title: article.title.clone(),
            slug,
            content: article.html_body.clone(),
            status: "publish".to_string(),
            categories: vec![category_id],
            featured_media,
            meta: seo_meta(article),
        };

        match self.store.create_post(&post).await {
            Ok(created) => {
                info!("✅ Published '{}' as post {} ({})", post.title, created.id, created.link);
                PublishOutcome::Published {
                    id: created.id,
                    link: created.link,
                }
            }
            Err(e) => {
                error!("❌ Creating post '{}' failed: {}", post.title, e);
                PublishOutcome::Failed(e.to_string())
            }
        }
    }

    /// Remote media id for the asset. Failures leave the post without a
    /// featured image.
    async fn attach_media(&self, asset: &MediaAsset) -> Option<u64> {
        if let Some(id) = asset.remote_id {
            return Some(id);
        }

        let upload = match self.fetcher.fetch(&asset.source_url).await {
            Ok(upload) => upload,
            Err(e) => {
                warn!("⚠️ Downloading {} failed: {}", asset.source_url, e);
                return None;
            }
        };

        let media_id = match self.store.upload_media(&upload).await {
            Ok(id) => id,
            Err(e) => {
                warn!("⚠️ Uploading {} failed: {}", upload.file_name, e);
                return None;
            }
        };

        if let Some(alt) = asset.alt_text.as_deref().filter(|a| !a.is_empty()) {
            if let Err(e) = self.store.update_media_alt(media_id, alt).await {
                warn!("⚠️ Setting alt text on media {} failed: {}", media_id, e);
            }
        }
        Some(media_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::PublishedPost;
    use ap_storage::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockFetcher {
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MediaFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<MediaUpload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Remote {
                    status: 404,
                    message: url.to_string(),
                });
            }
            Ok(MediaUpload {
                file_name: file_name_for(url, "image/jpeg"),
                mime_type: "image/jpeg".to_string(),
                bytes: vec![0xFF, 0xD8, 0xFF],
            })
        }
    }

    /// Store whose lookups or creations fail.
    struct BrokenStore {
        inner: InMemoryStore,
        fail_lookup: bool,
        fail_create: bool,
    }

    #[async_trait]
    impl PostStore for BrokenStore {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<PublishedPost>> {
            if self.fail_lookup {
                return Err(Error::Storage("lookup unavailable".to_string()));
            }
            self.inner.find_by_slug(slug).await
        }

        async fn recent_posts(&self, limit: usize) -> Result<Vec<PublishedPost>> {
            self.inner.recent_posts(limit).await
        }

        async fn create_post(&self, post: &NewPost) -> Result<PublishedPost> {
            if self.fail_create {
                return Err(Error::Remote {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            self.inner.create_post(post).await
        }

        async fn upload_media(&self, upload: &MediaUpload) -> Result<u64> {
            self.inner.upload_media(upload).await
        }

        async fn update_media_alt(&self, media_id: u64, alt_text: &str) -> Result<()> {
            self.inner.update_media_alt(media_id, alt_text).await
        }
    }

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            seo_title: title.to_string(),
            meta_description: "All about it.".to_string(),
            focus_keyword: "duck calls".to_string(),
            html_body: "<p>Body</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_twice_skips_duplicate() {
        let store = InMemoryStore::new();
        let publisher = Publisher::new(Arc::new(store.clone()), MockFetcher::new(false));

        let first = publisher.publish(&article("My Great Post!"), None, 2).await;
        assert!(matches!(first, PublishOutcome::Published { .. }));
        let second = publisher.publish(&article("My Great Post!"), None, 2).await;
        assert_eq!(
            second,
            PublishOutcome::DuplicateSkipped {
                slug: "my-great-post".to_string()
            }
        );

        let posts = store.posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].categories, vec![2]);
        assert_eq!(posts[0].meta.get(SEO_FOCUS_KEYWORD_KEY).map(String::as_str), Some("duck calls"));
    }

    #[tokio::test]
    async fn test_publish_with_featured_image() {
        let store = InMemoryStore::new();
        let publisher = Publisher::new(Arc::new(store.clone()), MockFetcher::new(false));
        let media = MediaAsset::new("https://images.example.com/photos/123/duck.jpeg?w=940")
            .with_alt_text("Duck Calls");

        let outcome = publisher.publish(&article("Duck Calls"), Some(media), 2).await;
        let id = outcome.post_id().unwrap();

        let stored_media = store.media().await;
        assert_eq!(stored_media.len(), 1);
        assert_eq!(stored_media[0].file_name, "duck.jpeg");
        assert_eq!(stored_media[0].alt_text.as_deref(), Some("Duck Calls"));

        let post = store.find_by_slug("duck-calls").await.unwrap().unwrap();
        assert_eq!(post.id, id);
        assert_eq!(post.featured_media, Some(stored_media[0].id));
    }

    #[tokio::test]
    async fn test_media_failure_still_publishes() {
        let store = InMemoryStore::new();
        let fetcher = MockFetcher::new(true);
        let publisher = Publisher::new(Arc::new(store.clone()), fetcher.clone());

        let outcome = publisher
            .publish(&article("Duck Calls"), Some(MediaAsset::new("https://img/missing.jpg")), 2)
            .await;
        assert!(outcome.post_id().is_some());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.posts().await[0].featured_media, None);
    }

    #[tokio::test]
    async fn test_existing_remote_media_is_reused() {
        let store = InMemoryStore::new();
        let fetcher = MockFetcher::new(false);
        let publisher = Publisher::new(Arc::new(store.clone()), fetcher.clone());
        let media = MediaAsset {
            remote_id: Some(77),
            ..MediaAsset::new("https://img/a.jpg")
        };

        publisher.publish(&article("Duck Calls"), Some(media), 2).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.posts().await[0].featured_media, Some(77));
    }

    #[tokio::test]
    async fn test_store_failures() {
        let lookup_down = BrokenStore {
            inner: InMemoryStore::new(),
            fail_lookup: true,
            fail_create: false,
        };
        let publisher = Publisher::new(Arc::new(lookup_down), MockFetcher::new(false));
        assert!(publisher.publish(&article("Duck Calls"), None, 1).await.post_id().is_some());

        let create_down = BrokenStore {
            inner: InMemoryStore::new(),
            fail_lookup: false,
            fail_create: true,
        };
        let publisher = Publisher::new(Arc::new(create_down), MockFetcher::new(false));
        assert!(matches!(
            publisher.publish(&article("Duck Calls"), None, 1).await,
            PublishOutcome::Failed(_)
        ));

        let publisher = Publisher::new(Arc::new(InMemoryStore::new()), MockFetcher::new(false));
        assert!(matches!(publisher.publish(&article("!!!"), None, 1).await, PublishOutcome::Failed(_)));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name_for("https://cdn.example.com/photos/elk.png", "image/png"), "elk.png");
        assert_eq!(file_name_for("https://cdn.example.com/photos/12345", "image/webp"), "12345.webp");
        assert_eq!(file_name_for("https://cdn.example.com/", "image/jpeg"), "featured-image.jpg");
        assert_eq!(file_name_for("not a url", "image/jpeg"), "featured-image.jpg");
        assert_eq!(mime_from_name("https://x/a.PNG?w=2"), "image/png");
    }
}

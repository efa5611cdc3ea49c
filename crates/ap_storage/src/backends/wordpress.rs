use std::collections::BTreeMap;
use std::fmt;

use ap_core::config::SiteConfig;
use ap_core::{Error, MediaUpload, NewPost, PostStore, PublishedPost, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

const API_PATH: &str = "wp-json/wp/v2/";
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct WpRendered {
    #[serde(default)]
    rendered: String,
}

#[derive(Debug, Deserialize)]
struct WpPost {
    id: u64,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    link: String,
    title: Option<WpRendered>,
    #[serde(default)]
    categories: Vec<u64>,
    #[serde(default)]
    featured_media: u64,
    // An empty array when the site registers no meta keys
    #[serde(default)]
    meta: Value,
}

#[derive(Debug, Deserialize)]
struct WpMedia {
    id: u64,
}

impl From<WpPost> for PublishedPost {
    fn from(post: WpPost) -> Self {
        let meta = match post.meta {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key, s)),
                    Value::Number(n) => Some((key, n.to_string())),
                    Value::Bool(b) => Some((key, b.to_string())),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        PublishedPost {
            id: post.id,
            slug: post.slug,
            status: post.status,
            link: post.link,
            title: post.title.map(|t| t.rendered).unwrap_or_default(),
            categories: post.categories,
            featured_media: (post.featured_media != 0).then_some(post.featured_media),
            meta,
        }
    }
}

/// Post store backed by the WordPress REST API, authenticated with an
/// application password.
pub struct WordPressStore {
    client: Client,
    api_base: Url,
    username: String,
    app_password: String,
}

impl fmt::Debug for WordPressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressStore")
            .field("api_base", &self.api_base.as_str())
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

impl WordPressStore {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        if !config.is_complete() {
            return Err(Error::Config(
                "WordPress store needs a base URL, username and application password".to_string(),
            ));
        }

        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let api_base = Url::parse(&base)
            .and_then(|url| url.join(API_PATH))
            .map_err(|e| Error::Config(format!("Invalid WordPress base URL {}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("autopress/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base,
            username: config.username.clone(),
            app_password: config.app_password.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| Error::Storage(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.app_password))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Remote {
            status: status.as_u16(),
            message: body.chars().take(300).collect(),
        })
    }
}

/// `Content-Disposition` value for a media upload.
fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\r' | '\n'))
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[async_trait]
impl PostStore for WordPressStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PublishedPost>> {
        let url = self.endpoint("posts")?;
        let response = self
            .authed(self.client.get(url).query(&[("slug", slug)]))
            .send()
            .await?;
        let posts: Vec<WpPost> = Self::check(response).await?.json().await?;
        debug!("Slug '{}' matched {} posts", slug, posts.len());
        Ok(posts.into_iter().next().map(PublishedPost::from))
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<PublishedPost>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let per_page = limit.min(MAX_PAGE_SIZE).to_string();
        let url = self.endpoint("posts")?;
        let response = self
            .authed(
                self.client
                    .get(url)
                    .query(&[("per_page", per_page.as_str()), ("status", "publish")]),
            )
            .send()
            .await?;
        let posts: Vec<WpPost> = Self::check(response).await?.json().await?;
        Ok(posts.into_iter().map(PublishedPost::from).collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<PublishedPost> {
        let url = self.endpoint("posts")?;
        let response = self.authed(self.client.post(url).json(post)).send().await?;
        let created: WpPost = Self::check(response).await?.json().await?;
        info!("📝 WordPress created post {} ({})", created.id, created.link);
        Ok(created.into())
    }

    async fn upload_media(&self, upload: &MediaUpload) -> Result<u64> {
        let url = self.endpoint("media")?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_DISPOSITION, attachment_header(&upload.file_name))
            .header(CONTENT_TYPE, upload.mime_type.as_str())
            .body(upload.bytes.clone());
        let response = self.authed(request).send().await?;
        let media: WpMedia = Self::check(response).await?.json().await?;
        info!("🖼️ Uploaded {} as media {}", upload.file_name, media.id);
        Ok(media.id)
    }

    async fn update_media_alt(&self, media_id: u64, alt_text: &str) -> Result<()> {
        let url = self.endpoint(&format!("media/{}", media_id))?;
        let response = self
            .authed(self.client.post(url).json(&json!({ "alt_text": alt_text })))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::Config;

    fn site(base_url: &str) -> SiteConfig {
        SiteConfig {
            base_url: base_url.to_string(),
            username: "editor".to_string(),
            app_password: "abcd efgh ijkl".to_string(),
            ..Config::default().site
        }
    }

    #[test]
    fn test_endpoints() {
        let store = WordPressStore::new(&site("https://blog.example.com")).unwrap();
        assert_eq!(
            store.endpoint("posts").unwrap().as_str(),
            "https://blog.example.com/wp-json/wp/v2/posts"
        );

        let store = WordPressStore::new(&site("https://example.com/blog/")).unwrap();
        assert_eq!(
            store.endpoint("media/42").unwrap().as_str(),
            "https://example.com/blog/wp-json/wp/v2/media/42"
        );
    }

    #[test]
    fn test_rejects_incomplete_site() {
        assert!(WordPressStore::new(&Config::default().site).is_err());
        assert!(WordPressStore::new(&site("not a url")).is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let store = WordPressStore::new(&site("https://blog.example.com")).unwrap();
        let debug = format!("{:?}", store);
        assert!(!debug.contains("abcd"));
        assert!(debug.contains("editor"));
    }

    #[test]
    fn test_post_mapping() {
        let raw = r#"{
            "id": 17,
            "slug": "duck-calls",
            "status": "publish",
            "link": "https://blog.example.com/duck-calls/",
            "title": {"rendered": "Duck Calls &#8211; A Guide"},
            "categories": [2],
            "featured_media": 0,
            "meta": {"_yoast_wpseo_focuskw": "duck calls", "footnotes": ""}
        }"#;
        let post: PublishedPost = serde_json::from_str::<WpPost>(raw).unwrap().into();
        assert_eq!(post.id, 17);
        assert_eq!(post.title, "Duck Calls &#8211; A Guide");
        assert_eq!(post.featured_media, None);
        assert_eq!(post.meta.get("_yoast_wpseo_focuskw").map(String::as_str), Some("duck calls"));

        let bare: PublishedPost = serde_json::from_str::<WpPost>(r#"{"id": 3, "meta": []}"#)
            .unwrap()
            .into();
        assert!(bare.meta.is_empty());
        assert_eq!(bare.title, "");
    }

    #[test]
    fn test_attachment_header() {
        assert_eq!(attachment_header("duck-calls.jpg"), "attachment; filename=\"duck-calls.jpg\"");
        assert_eq!(attachment_header("a\"b.jpg"), "attachment; filename=\"ab.jpg\"");
    }
}

//! State kept on local disk between cycles.

use std::path::{Path, PathBuf};

use ap_core::Result;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// JSON array of topics that have already been published.
#[derive(Debug, Clone)]
pub struct TopicHistory {
    path: PathBuf,
}

impl TopicHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the history, creating an empty file when there is none.
    pub async fn load(&self) -> Result<Vec<String>> {
        if !fs::try_exists(&self.path).await? {
            ensure_parent(&self.path).await?;
            fs::write(&self.path, "[]").await?;
            info!("📁 Created topic history at {}", self.path.display());
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn record(&self, topic: &str) -> Result<()> {
        let mut used = self.load().await?;
        used.push(topic.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&used)?).await?;
        debug!("Recorded topic '{}' ({} used)", topic, used.len());
        Ok(())
    }
}

/// Append-only record of the internal links placed in each post.
#[derive(Debug, Clone)]
pub struct InternalLinkLog {
    path: PathBuf,
}

impl InternalLinkLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, title: &str, post_link: &str, links: &[String]) -> Result<()> {
        self.append_at(Utc::now(), title, post_link, links).await
    }

    pub async fn append_at(
        &self,
        at: DateTime<Utc>,
        title: &str,
        post_link: &str,
        links: &[String],
    ) -> Result<()> {
        ensure_parent(&self.path).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(log_line(at, title, post_link, links).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn log_line(at: DateTime<Utc>, title: &str, post_link: &str, links: &[String]) -> String {
    let title = title.replace(['\t', '\n'], " ");
    format!("{}\t{}\t{}\t{}\n", at.to_rfc3339(), title, post_link, links.join(" | "))
}

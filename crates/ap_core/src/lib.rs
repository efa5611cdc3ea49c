pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{GenerationRequest, ImageSearch, TextGenerator};
pub use storage::PostStore;
pub use types::{
    Article, MediaAsset, MediaUpload, NewPost, Product, PublishOutcome, PublishedPost, Topic,
    TopicEntry,
};

pub mod models;
pub mod parse;
pub mod products;
pub mod prompts;
pub mod writer;

pub mod prelude {
    pub use super::models::create_model;
    pub use super::products::ProductRecommender;
    pub use super::writer::ArticleWriter;
    pub use ap_core::{Article, Error, GenerationRequest, Product, Result, TextGenerator, Topic};
}

pub use models::create_model;
pub use products::ProductRecommender;
pub use writer::ArticleWriter;

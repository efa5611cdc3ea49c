pub mod affiliate;
pub mod category;
pub mod html;
pub mod links;
pub mod normalize;
pub mod seo;
pub mod slug;
pub mod topics;

pub use affiliate::inject;
pub use category::CategoryResolver;
pub use links::{apply_internal_links, INTERNAL_LINKS_PLACEHOLDER};
pub use normalize::normalize;
pub use self::slug::slugify;
pub use topics::TopicSelector;

pub mod prelude {
    pub use super::category::CategoryResolver;
    pub use super::topics::TopicSelector;
    pub use super::{apply_internal_links, inject, normalize, slugify};
    pub use ap_core::{Article, Product, Result, Topic};
}

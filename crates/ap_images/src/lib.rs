//! Image search for featured images.
//!
//! Sources are asked in order of preference: Pexels first, Pixabay only
//! when Pexels has nothing or has no key.

pub mod pexels;
pub mod pixabay;
pub mod resolver;

pub use pexels::PexelsClient;
pub use pixabay::PixabayClient;
pub use resolver::ImageResolver;

pub mod memory;
pub mod wordpress;

pub use memory::InMemoryStore;
pub use wordpress::WordPressStore;

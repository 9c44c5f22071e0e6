pub mod memory;

pub use memory::{CacheService, CacheStats};

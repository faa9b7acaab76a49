pub mod query;
pub mod render;
pub mod serve;

// Re-export command functions for convenience
pub use query::{query, QueryParams};
pub use render::render;
pub use serve::serve;

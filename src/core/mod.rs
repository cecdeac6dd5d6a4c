// Public modules
pub mod context;
pub mod error;
pub mod executor;
pub mod images;
pub mod mirror;
pub mod server;
pub mod ssh;
pub mod step;

// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};

//! Quill Shared Library
//!
//! Types, models and validation helpers shared by the backend and its
//! clients.

pub mod models;
pub mod slug;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{BlogPost, BlogStatus, BlogSummary};
pub use slug::generate_slug;
pub use types::*;

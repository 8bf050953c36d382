//! Document store seam shared by the `listings` and `users` collections.

pub mod memory;

pub use memory::{InMemoryListingStore, InMemoryUserDirectory};

/// Failures reported by the document store. Messages are the provider's own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document {id} failed validation: {reason}")]
    InvalidDocument { id: String, reason: String },
}

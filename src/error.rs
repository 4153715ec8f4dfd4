//! Error taxonomy for catalog queries and startup indexing.
//!
//! Per-request failures are recovered at the HTTP boundary and rendered as a
//! structured `{ "error": { "code", "message" } }` body. Only
//! [`CatalogError::Configuration`] is fatal, and only at startup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("item {0} not found")]
    NotFound(u32),

    #[error("invalid group: {0}")]
    InvalidGroup(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The item is indexed but its PDF is gone from disk.
    #[error("content for item {id} is missing: {}", path.display())]
    ContentMissing { id: u32, path: PathBuf },

    #[error("item {0} has no next item")]
    NoSuccessor(u32),

    #[error("cannot read group directory {}: {source}", path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Machine-readable error code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::InvalidGroup(_) => "invalid_group",
            CatalogError::InvalidArgument(_) => "invalid_argument",
            CatalogError::ContentMissing { .. } => "content_missing",
            CatalogError::NoSuccessor(_) => "no_successor",
            CatalogError::Configuration { .. } => "configuration",
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

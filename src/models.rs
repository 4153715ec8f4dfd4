//! Core data models for the catalog.
//!
//! These types are produced once by the [`indexer`](crate::indexer) and
//! served by the [`Catalog`](crate::catalog::Catalog). Wire forms use
//! camelCase field names.

use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

/// A named bucket of items backed by one directory.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: u32,
    pub name: String,
    pub source_dir: PathBuf,
}

/// The `(id, name)` pair returned by `GET /api/groups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: u32,
    pub name: String,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
        }
    }
}

/// Display-only fields, generated once at indexing time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub color: String,
    pub bg_color: String,
    pub enrolled_count: u32,
    /// One fractional digit, e.g. `"4.2"`.
    pub rating: String,
}

/// A single PDF-backed catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: u32,
    pub title: String,
    pub group_id: u32,
    pub group_name: String,
    pub progress: u8,
    pub completed: bool,
    pub icon: String,
    /// Size-derived label (`"<bytes / 1000> min"`), not a real reading time.
    pub duration: String,
    #[serde(flatten)]
    pub decoration: Decoration,
    pub next_item_id: Option<u32>,
    /// File name as listed on disk; resolved against the group directory.
    #[serde(skip)]
    pub file_name: OsString,
}

impl CatalogItem {
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
        self.completed = progress == 100;
    }
}

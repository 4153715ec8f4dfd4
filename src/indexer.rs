//! One-shot directory indexer.
//!
//! Lists each configured group directory (non-recursively, in filesystem
//! listing order), keeps files with a `.pdf` extension (any case), and
//! synthesizes a [`CatalogItem`] for each one. Item ids come from a single
//! counter shared across groups, so ids increase in (group order, listing
//! order). Once every group is scanned the flat list is linked through
//! `next_item_id`.
//!
//! A group directory that is missing or unreadable aborts indexing. Entries
//! that vanish between listing and stat are skipped.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

use rand::Rng;
use walkdir::WalkDir;

use crate::config::GroupConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogItem, Decoration, Group};

/// Bytes per "minute" in the size-derived duration label.
pub const BYTES_PER_MINUTE: u64 = 1000;

const MIN_RATING: f64 = 3.0;
const MAX_RATING: f64 = 5.0;
const MAX_ENROLLED: u32 = 1000;

/// Output of [`index_groups`].
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    pub groups: Vec<Group>,
    /// Flat ordering of every item.
    pub items: Vec<CatalogItem>,
    /// Item ids per group id, in discovery order. Every group has an entry.
    pub items_by_group: HashMap<u32, Vec<u32>>,
}

pub fn index_groups<R: Rng + ?Sized>(
    configs: &[GroupConfig],
    default_icon: &str,
    rng: &mut R,
) -> CatalogResult<CatalogIndex> {
    let mut groups = Vec::with_capacity(configs.len());
    let mut items = Vec::new();
    let mut items_by_group = HashMap::with_capacity(configs.len());
    let mut next_id: u32 = 1;

    for (group_id, cfg) in (1u32..).zip(configs) {
        let group = Group {
            id: group_id,
            name: cfg.name.clone(),
            source_dir: cfg.path.clone(),
        };

        let files = list_pdfs(&group.source_dir)?;
        tracing::info!(
            group = %group.name,
            dir = %group.source_dir.display(),
            files = files.len(),
            "indexed group"
        );

        let mut ids = Vec::with_capacity(files.len());
        for (file_name, size) in files {
            let item = CatalogItem {
                id: next_id,
                title: title_from_file_name(&file_name),
                group_id: group.id,
                group_name: group.name.clone(),
                progress: 0,
                completed: false,
                icon: default_icon.to_string(),
                duration: duration_label(size),
                decoration: decorate(rng),
                next_item_id: None,
                file_name,
            };
            ids.push(item.id);
            items.push(item);
            next_id += 1;
        }

        items_by_group.insert(group.id, ids);
        groups.push(group);
    }

    link_successors(&mut items);

    Ok(CatalogIndex {
        groups,
        items,
        items_by_group,
    })
}

/// Returns `(file_name, size)` for each PDF directly inside `dir`.
fn list_pdfs(dir: &Path) -> CatalogResult<Vec<(OsString, u64)>> {
    let meta = std::fs::metadata(dir).map_err(|source| CatalogError::Configuration {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(CatalogError::Configuration {
            path: dir.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory walk failed"));
                return Err(CatalogError::Configuration {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_pdf_extension(entry.path()) {
            continue;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => {
                tracing::debug!(path = %entry.path().display(), error = %err, "skipping vanished file");
                continue;
            }
        };

        files.push((entry.file_name().to_os_string(), size));
    }

    Ok(files)
}

pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Display title; lossy for names that are not valid UTF-8.
fn title_from_file_name(file_name: &OsStr) -> String {
    Path::new(file_name)
        .file_stem()
        .unwrap_or(file_name)
        .to_string_lossy()
        .to_string()
}

pub fn duration_label(size_bytes: u64) -> String {
    format!("{} min", size_bytes / BYTES_PER_MINUTE)
}

fn decorate<R: Rng + ?Sized>(rng: &mut R) -> Decoration {
    Decoration {
        color: random_color(rng),
        bg_color: random_color(rng),
        enrolled_count: rng.gen_range(0..MAX_ENROLLED),
        rating: format!("{:.1}", rng.gen_range(MIN_RATING..=MAX_RATING)),
    }
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..0x0100_0000u32))
}

fn link_successors(items: &mut [CatalogItem]) {
    let ids: Vec<u32> = items.iter().map(|item| item.id).collect();
    for (item, next) in items.iter_mut().zip(ids.iter().skip(1)) {
        item.next_item_id = Some(*next);
    }
    if let Some(last) = items.last_mut() {
        last.next_item_id = None;
    }
}

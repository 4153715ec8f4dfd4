//! The in-memory catalog service.
//!
//! [`Catalog`] owns the structures produced by the indexer for the life of
//! the process. Everything is frozen after [`Catalog::build`] except each
//! item's progress, which sits behind its own `RwLock` so concurrent updates
//! to the same item serialize while different items stay independent.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};
use crate::indexer::{index_groups, CatalogIndex};
use crate::models::{CatalogItem, Group, GroupSummary};

/// Backing file of an item, confirmed present at lookup time.
#[derive(Debug, Clone)]
pub struct ItemContent {
    pub path: PathBuf,
    pub size: u64,
}

/// Counts reported by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub groups: usize,
    pub items: usize,
    pub completed: usize,
    pub indexed_at: DateTime<Utc>,
}

pub struct Catalog {
    groups: Vec<Group>,
    items: Vec<RwLock<CatalogItem>>,
    /// Item id → position in `items`.
    positions: HashMap<u32, usize>,
    items_by_group: HashMap<u32, Vec<u32>>,
    indexed_at: DateTime<Utc>,
}

impl Catalog {
    /// Indexes every configured group. Fails if any group directory is unreadable.
    pub fn build(config: &Config) -> CatalogResult<Self> {
        let mut rng = rand::thread_rng();
        let index = index_groups(&config.groups, &config.catalog.default_icon, &mut rng)?;
        Ok(Self::from_index(index))
    }

    pub fn from_index(index: CatalogIndex) -> Self {
        let positions = index
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();

        Self {
            groups: index.groups,
            items: index.items.into_iter().map(RwLock::new).collect(),
            positions,
            items_by_group: index.items_by_group,
            indexed_at: Utc::now(),
        }
    }

    fn slot(&self, id: u32) -> CatalogResult<&RwLock<CatalogItem>> {
        self.positions
            .get(&id)
            .map(|&pos| &self.items[pos])
            .ok_or(CatalogError::NotFound(id))
    }

    fn snapshot(slot: &RwLock<CatalogItem>) -> CatalogItem {
        slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn list_all(&self) -> Vec<CatalogItem> {
        self.items.iter().map(Self::snapshot).collect()
    }

    pub fn get(&self, id: u32) -> CatalogResult<CatalogItem> {
        self.slot(id).map(Self::snapshot)
    }

    /// Items of one group in discovery order. An empty group is not an error.
    pub fn list_by_group(&self, group_id: u32) -> CatalogResult<Vec<CatalogItem>> {
        let ids = self
            .items_by_group
            .get(&group_id)
            .ok_or_else(|| CatalogError::InvalidGroup(group_id.to_string()))?;
        ids.iter().map(|&id| self.get(id)).collect()
    }

    pub fn list_groups(&self) -> Vec<GroupSummary> {
        self.groups.iter().map(GroupSummary::from).collect()
    }

    pub fn group(&self, group_id: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Sets an item's progress percentage; `completed` follows `progress == 100`.
    ///
    /// The id is resolved before the value is validated, so an unknown id is
    /// always `NotFound`. A rejected value leaves the stored item untouched.
    pub fn update_progress(&self, id: u32, progress: Option<i64>) -> CatalogResult<CatalogItem> {
        let slot = self.slot(id)?;

        let progress = progress
            .ok_or_else(|| CatalogError::InvalidArgument("progress is required".to_string()))?;
        let progress = u8::try_from(progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                CatalogError::InvalidArgument(format!(
                    "progress must be between 0 and 100, got {}",
                    progress
                ))
            })?;

        let mut item = slot.write().unwrap_or_else(PoisonError::into_inner);
        item.set_progress(progress);
        tracing::debug!(id, progress, completed = item.completed, "progress updated");
        Ok(item.clone())
    }

    /// Path of the item's PDF inside its group directory.
    pub fn content_path(&self, id: u32) -> CatalogResult<PathBuf> {
        let item = self.get(id)?;
        let group = self
            .group(item.group_id)
            .ok_or(CatalogError::NotFound(id))?;
        Ok(group.source_dir.join(&item.file_name))
    }

    /// Resolves the item's PDF and checks it still exists on disk.
    pub async fn content(&self, id: u32) -> CatalogResult<ItemContent> {
        let path = self.content_path(id)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ItemContent {
                path,
                size: meta.len(),
            }),
            Ok(_) => Err(CatalogError::ContentMissing { id, path }),
            Err(err) => {
                tracing::warn!(id, path = %path.display(), error = %err, "indexed content is gone");
                Err(CatalogError::ContentMissing { id, path })
            }
        }
    }

    /// The item that follows `id` in the flat ordering.
    pub fn next(&self, id: u32) -> CatalogResult<CatalogItem> {
        let item = self.get(id)?;
        let next_id = item.next_item_id.ok_or(CatalogError::NoSuccessor(id))?;
        self.get(next_id)
    }

    pub fn stats(&self) -> CatalogStats {
        let completed = self
            .items
            .iter()
            .filter(|slot| slot.read().unwrap_or_else(PoisonError::into_inner).completed)
            .count();
        CatalogStats {
            groups: self.groups.len(),
            items: self.items.len(),
            completed,
            indexed_at: self.indexed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// "Gynecology" and "Pediatrics" hold one PDF each, "Obstetrics" is empty.
    /// Single-file groups keep id assignment independent of listing order.
    fn fixture() -> (TempDir, Catalog) {
        let tmp = TempDir::new().unwrap();
        let gyn = tmp.path().join("Gynecology");
        let obs = tmp.path().join("Obstetrics");
        let extra = tmp.path().join("Pediatrics");
        fs::create_dir_all(&gyn).unwrap();
        fs::create_dir_all(&obs).unwrap();
        fs::create_dir_all(&extra).unwrap();
        fs::write(gyn.join("Anatomy.pdf"), vec![b'%'; 4200]).unwrap();
        fs::write(extra.join("Growth.pdf"), vec![b'%'; 100]).unwrap();

        let groups = vec![
            group("Gynecology", &gyn),
            group("Obstetrics", &obs),
            group("Pediatrics", &extra),
        ];
        let index = index_groups(&groups, "default-icon.png", &mut StdRng::seed_from_u64(7)).unwrap();
        (tmp, Catalog::from_index(index))
    }

    fn group(name: &str, path: &Path) -> GroupConfig {
        GroupConfig {
            name: name.to_string(),
            path: path.to_path_buf(),
        }
    }

    #[test]
    fn get_and_list() {
        let (_tmp, catalog) = fixture();

        let all = catalog.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].title, "Anatomy");
        assert_eq!(all[0].group_name, "Gynecology");
        assert_eq!(all[0].duration, "4 min");
        assert_eq!(all[1].id, 2);
        assert_eq!(all[1].group_id, 3);

        assert_eq!(catalog.get(2).unwrap().title, "Growth");
        assert!(matches!(catalog.get(999), Err(CatalogError::NotFound(999))));
    }

    #[test]
    fn groups_listed_in_configuration_order() {
        let (_tmp, catalog) = fixture();
        let names: Vec<String> = catalog.list_groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Gynecology", "Obstetrics", "Pediatrics"]);
    }

    #[test]
    fn list_by_group_distinguishes_empty_from_unknown() {
        let (_tmp, catalog) = fixture();

        let gyn = catalog.list_by_group(1).unwrap();
        assert_eq!(gyn.len(), 1);
        assert_eq!(gyn[0].title, "Anatomy");

        assert!(catalog.list_by_group(2).unwrap().is_empty());
        assert!(matches!(
            catalog.list_by_group(42),
            Err(CatalogError::InvalidGroup(_))
        ));
    }

    #[test]
    fn progress_update_and_completion() {
        let (_tmp, catalog) = fixture();

        let item = catalog.update_progress(1, Some(40)).unwrap();
        assert_eq!(item.progress, 40);
        assert!(!item.completed);
        assert_eq!(catalog.get(1).unwrap().progress, 40);

        let item = catalog.update_progress(1, Some(100)).unwrap();
        assert!(item.completed);
        assert!(catalog.get(1).unwrap().completed);
        assert_eq!(catalog.stats().completed, 1);

        let item = catalog.update_progress(1, Some(0)).unwrap();
        assert!(!item.completed);
        assert_eq!(catalog.stats().completed, 0);
    }

    #[test]
    fn rejected_progress_keeps_prior_value() {
        let (_tmp, catalog) = fixture();
        catalog.update_progress(1, Some(55)).unwrap();

        for bad in [Some(-1), Some(101), Some(1000), None] {
            let err = catalog.update_progress(1, bad).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)), "{:?}", bad);
            assert_eq!(catalog.get(1).unwrap().progress, 55);
        }
    }

    #[test]
    fn unknown_id_wins_over_bad_progress() {
        let (_tmp, catalog) = fixture();
        assert!(matches!(
            catalog.update_progress(999, Some(500)),
            Err(CatalogError::NotFound(999))
        ));
    }

    #[test]
    fn next_follows_flat_order() {
        let (_tmp, catalog) = fixture();
        assert_eq!(catalog.next(1).unwrap().id, 2);
        assert!(matches!(catalog.next(2), Err(CatalogError::NoSuccessor(2))));
        assert!(matches!(catalog.next(3), Err(CatalogError::NotFound(3))));
    }

    #[test]
    fn decoration_stable_across_reads() {
        let (_tmp, catalog) = fixture();
        let first = catalog.get(1).unwrap();
        catalog.update_progress(1, Some(10)).unwrap();
        let second = catalog.get(1).unwrap();
        assert_eq!(first.decoration, second.decoration);
    }

    #[tokio::test]
    async fn content_missing_after_delete() {
        let (tmp, catalog) = fixture();

        let content = catalog.content(1).await.unwrap();
        assert_eq!(content.size, 4200);
        assert_eq!(content.path, tmp.path().join("Gynecology").join("Anatomy.pdf"));

        fs::remove_file(&content.path).unwrap();
        assert!(matches!(
            catalog.content(1).await,
            Err(CatalogError::ContentMissing { id: 1, .. })
        ));
        assert!(matches!(catalog.content(77).await, Err(CatalogError::NotFound(77))));
    }

    #[test]
    fn concurrent_updates_on_one_item_settle_on_a_written_value() {
        let (_tmp, catalog) = fixture();
        let catalog = Arc::new(catalog);

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let catalog = catalog.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        catalog.update_progress(1, Some(n * 10)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let item = catalog.get(1).unwrap();
        assert_eq!(item.progress % 10, 0);
        assert!(item.progress <= 70);
        assert_eq!(item.completed, item.progress == 100);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_file_name_still_serves_content() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("g");
        fs::create_dir_all(&dir).unwrap();
        let name = OsStr::from_bytes(b"bad\xffname.pdf");
        fs::write(dir.join(name), b"%PDF").unwrap();

        let index = index_groups(&[group("g", &dir)], "icon.png", &mut StdRng::seed_from_u64(1)).unwrap();
        let catalog = Catalog::from_index(index);

        assert_eq!(catalog.get(1).unwrap().title, "bad\u{fffd}name");
        let content = catalog.content(1).await.unwrap();
        assert_eq!(content.path, dir.join(name));
        assert_eq!(content.size, 4);
    }

    #[test]
    fn item_with_unknown_group_resolves_as_not_found() {
        let (_tmp, catalog) = fixture();
        let mut item = catalog.get(1).unwrap();
        item.group_id = 99;
        let index = CatalogIndex {
            groups: Vec::new(),
            items: vec![item],
            items_by_group: HashMap::new(),
        };
        let orphaned = Catalog::from_index(index);

        assert!(matches!(orphaned.content_path(1), Err(CatalogError::NotFound(1))));
    }
}

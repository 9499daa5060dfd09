//! Which title prefixes have at least one patch file.
//!
//! Built once at startup from an index-mode scan of the patch store, so a
//! program without patches costs a single set lookup at load time.

use crate::error::Result;
use crate::format::{self, ParseMode};
use crate::patch::TitlePrefix;
use crate::store::PatchStore;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct TitleCache {
    prefixes: HashSet<TitlePrefix>,
    files: Vec<PathBuf>,
}

impl TitleCache {
    /// Scans every file in `store`. Unreadable or malformed files are
    /// logged and left out; only a failure to list the store is an error.
    pub fn build<S: PatchStore>(store: &S) -> Result<Self> {
        let mut cache = TitleCache::default();
        for path in store.list()? {
            match index_file(store, &path) {
                Ok(ids) => {
                    debug!("{}: {} title ids", path.display(), ids.len());
                    cache.prefixes.extend(ids);
                    cache.files.push(path);
                }
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }
        info!(
            "title cache holds {} prefixes from {} files",
            cache.prefixes.len(),
            cache.files.len()
        );
        Ok(cache)
    }

    pub fn has_patches(&self, prefix: TitlePrefix) -> bool {
        self.prefixes.contains(&prefix)
    }

    /// Files that passed the index scan, to reopen when a title matches.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Known prefixes in ascending order.
    pub fn prefixes(&self) -> Vec<TitlePrefix> {
        let mut prefixes: Vec<_> = self.prefixes.iter().copied().collect();
        prefixes.sort();
        prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn clear(&mut self) {
        self.prefixes.clear();
        self.files.clear();
    }
}

fn index_file<S: PatchStore>(store: &S, path: &Path) -> Result<Vec<TitlePrefix>> {
    let mut handle = store.open(path)?;
    Ok(format::parse(&mut handle, ParseMode::Index)?.title_ids)
}

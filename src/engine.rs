//! Load-time entry point.

use crate::apply;
use crate::builtin;
use crate::cache::TitleCache;
use crate::error::Result;
use crate::format::{self, ParseMode};
use crate::patch::{PatchFile, TitlePrefix};
use crate::store::{DirStore, PatchStore, MAX_FILES};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub patch_dir: PathBuf,
    pub max_files: usize,
    /// Apply the compiled-in rule table after file patches.
    pub builtin_rules: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            patch_dir: PathBuf::from("patches"),
            max_files: MAX_FILES,
            builtin_rules: true,
        }
    }
}

/// What one `patch_program` call did. Informational only.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub files_applied: usize,
    pub entries_applied: usize,
    pub replacements: usize,
    pub failures: usize,
    pub builtin_replacements: usize,
}

pub struct PatchEngine<S: PatchStore = DirStore> {
    store: S,
    cache: TitleCache,
    builtin_rules: bool,
}

impl PatchEngine<DirStore> {
    pub fn from_config(config: &EngineConfig) -> Self {
        let store = DirStore::new(&config.patch_dir).with_max_files(config.max_files);
        let mut engine = PatchEngine::start(store);
        engine.builtin_rules = config.builtin_rules;
        engine
    }
}

impl<S: PatchStore> PatchEngine<S> {
    /// Builds the title cache. A store that cannot be listed leaves the
    /// cache empty; built-in rules still apply.
    pub fn start(store: S) -> Self {
        let cache = TitleCache::build(&store).unwrap_or_else(|e| {
            warn!("patch store unavailable: {}", e);
            TitleCache::default()
        });
        PatchEngine {
            store,
            cache,
            builtin_rules: true,
        }
    }

    pub fn cache(&self) -> &TitleCache {
        &self.cache
    }

    pub fn set_builtin_rules(&mut self, enabled: bool) {
        self.builtin_rules = enabled;
    }

    /// Rewrites `code` in place for `program_id`.
    ///
    /// File patches run first, in store order and then file order, followed
    /// by the built-in rules. Failures are logged and counted, never returned.
    pub fn patch_program(&self, program_id: u64, code: &mut [u8]) -> PatchReport {
        let prefix = TitlePrefix::from_program_id(program_id);
        let mut report = PatchReport::default();

        if self.cache.has_patches(prefix) {
            for path in self.cache.files() {
                match self.load(path) {
                    Ok(file) if file.applies_to(prefix) => {
                        debug!("{}: applying to {:016X}", path.display(), program_id);
                        apply_file(&file, code, &mut report);
                        report.files_applied += 1;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("skipping {}: {}", path.display(), e);
                        report.failures += 1;
                    }
                }
            }
        }

        if self.builtin_rules {
            apply_builtin(program_id, code, &mut report);
        }

        if report.replacements + report.builtin_replacements > 0 {
            info!(
                "patched {:016X}: {} replacements from {} files, {} built-in",
                program_id, report.replacements, report.files_applied, report.builtin_replacements
            );
        }
        report
    }

    /// Releases the cache. The next `start` rebuilds it from scratch.
    pub fn shutdown(mut self) -> S {
        self.cache.clear();
        self.store
    }

    fn load(&self, path: &Path) -> Result<PatchFile> {
        let mut handle = self.store.open(path)?;
        format::parse(&mut handle, ParseMode::Full)
    }
}

fn apply_file(file: &PatchFile, code: &mut [u8], report: &mut PatchReport) {
    for (index, entry) in file.patches.iter().enumerate() {
        match apply::apply_entry(code, entry) {
            Ok(count) => {
                report.entries_applied += 1;
                report.replacements += count;
            }
            Err(e) => {
                warn!("entry {}: {}", index, e);
                report.failures += 1;
            }
        }
    }
}

fn apply_builtin(program_id: u64, code: &mut [u8], report: &mut PatchReport) {
    let rule = match builtin::rule_for(program_id) {
        Some(rule) => rule,
        None => return,
    };
    for patch in rule.patches {
        match patch.apply(code) {
            Ok(count) => report.builtin_replacements += count,
            Err(e) => {
                warn!("builtin '{}': {}", patch.name, e);
                report.failures += 1;
            }
        }
    }
}

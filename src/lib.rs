//! Load-time binary patching of program code images.
//!
//! Patch files (`.rnp`) declare which titles they apply to and a list of
//! find-and-replace entries. At startup a [`PatchEngine`] indexes a patch
//! directory into a [`TitleCache`]; for each program load,
//! [`PatchEngine::patch_program`] applies the matching files and then the
//! built-in rules to the code image in place.

pub mod apply;
pub mod builtin;
pub mod cache;
pub mod engine;
pub mod error;
pub mod format;
pub mod matcher;
pub mod patch;
pub mod store;

pub use cache::TitleCache;
pub use engine::{EngineConfig, PatchEngine, PatchReport};
pub use error::{Error, Result};
pub use format::ParseMode;
pub use patch::{PatchEntry, PatchFile, TitlePrefix};
pub use store::{DirStore, PatchStore};

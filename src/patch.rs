use hex_buffer_serde::{Hex as _, HexForm};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest pattern or replacement the engine will hold for a single entry.
pub const SCRATCH_CAPACITY: usize = 256;

/// 24-bit program identifier fragment used for applicability lookups.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[serde(transparent)]
pub struct TitlePrefix(u32);

impl TitlePrefix {
    pub const MASK: u32 = 0x00FF_FFFF;

    pub fn new(raw: u32) -> Self {
        TitlePrefix(raw & Self::MASK)
    }

    /// Unique-id bits of a full program identifier.
    pub fn from_program_id(program_id: u64) -> Self {
        TitlePrefix::new((program_id >> 8) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TitlePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

/// One find-and-replace rule.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug, Default)]
pub struct PatchEntry {
    /// Upper bound on replacements per code image. Non-positive disables the entry.
    pub repeat_count: i8,
    /// Displacement from the match start to the start of the overwrite.
    pub byte_offset: i8,
    #[serde(with = "HexForm::<Vec<u8>>")]
    pub pattern: Vec<u8>,
    #[serde(with = "HexForm::<Vec<u8>>")]
    pub replacement: Vec<u8>,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug, Default)]
pub struct PatchFile {
    pub title_ids: Vec<TitlePrefix>,
    pub patches: Vec<PatchEntry>,
}

impl PatchFile {
    pub fn applies_to(&self, prefix: TitlePrefix) -> bool {
        self.title_ids.contains(&prefix)
    }
}

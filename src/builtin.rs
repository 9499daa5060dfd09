//! Patches compiled into the engine, keyed by full program identifier.

use crate::apply;
use crate::error::Result;
use log::debug;

/// A fixed find-and-replace applied to every listed title.
#[derive(Debug)]
pub struct BuiltinPatch {
    pub name: &'static str,
    pub pattern: &'static [u8],
    pub offset: isize,
    pub replacement: &'static [u8],
    pub count: usize,
}

#[derive(Debug)]
pub struct BuiltinRule {
    pub titles: &'static [u64],
    pub patches: &'static [BuiltinPatch],
}

impl BuiltinRule {
    pub fn matches(&self, program_id: u64) -> bool {
        self.titles.contains(&program_id)
    }
}

pub static RULES: &[BuiltinRule] = &[
    // HOME Menu: USA, JPN, EUR, CHN, KOR, TWN
    BuiltinRule {
        titles: &[
            0x0004_0030_0000_8F02,
            0x0004_0030_0000_8202,
            0x0004_0030_0000_9802,
            0x0004_0030_0000_A102,
            0x0004_0030_0000_A902,
            0x0004_0030_0000_B102,
        ],
        patches: &[BuiltinPatch {
            name: "region free",
            pattern: &[0x00, 0x00, 0x55, 0xE3, 0x01, 0x10, 0xA0, 0xE3],
            offset: -16,
            replacement: &[0x01, 0x00, 0xA0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1],
            count: 1,
        }],
    },
    // System Settings: JPN, USA, EUR, CHN, KOR, TWN
    BuiltinRule {
        titles: &[
            0x0004_0010_0002_0000,
            0x0004_0010_0002_1000,
            0x0004_0010_0002_2000,
            0x0004_0010_0002_6000,
            0x0004_0010_0002_7000,
            0x0004_0010_0002_8000,
        ],
        patches: &[BuiltinPatch {
            name: "version string",
            // UTF-16LE "Ver." -> "\u{E024}Rei"
            pattern: &[b'V', 0, b'e', 0, b'r', 0, b'.', 0],
            offset: 0,
            replacement: &[0x24, 0xE0, b'R', 0, b'e', 0, b'i', 0],
            count: 1,
        }],
    },
    // NS
    BuiltinRule {
        titles: &[0x0004_0130_0000_8002],
        patches: &[BuiltinPatch {
            name: "stop foreign cart updates",
            pattern: &[0x0C, 0x18, 0xE1, 0xD8],
            offset: 0,
            replacement: &[0x0B, 0x18, 0x21, 0xC8],
            count: 2,
        }],
    },
    // CFG
    BuiltinRule {
        titles: &[0x0004_0130_0000_1702],
        patches: &[BuiltinPatch {
            name: "secureinfo signature check",
            pattern: &[0x06, 0x46, 0x10, 0x48, 0xFC],
            offset: 0,
            replacement: &[0x00, 0x26],
            count: 1,
        }],
    },
    // NIM
    BuiltinRule {
        titles: &[0x0004_0130_0000_2C02],
        patches: &[
            BuiltinPatch {
                name: "block auto updates",
                pattern: &[0x25, 0x79, 0x0B, 0x99],
                offset: 0,
                replacement: &[0xE3, 0xA0],
                count: 1,
            },
            BuiltinPatch {
                name: "skip eshop update check",
                pattern: &[0x30, 0xB5, 0xF1, 0xB0],
                offset: 0,
                replacement: &[0x00, 0x20, 0x08, 0x60, 0x70, 0x47],
                count: 1,
            },
        ],
    },
];

pub fn rule_for(program_id: u64) -> Option<&'static BuiltinRule> {
    RULES.iter().find(|rule| rule.matches(program_id))
}

impl BuiltinPatch {
    pub fn apply(&self, code: &mut [u8]) -> Result<usize> {
        let applied = apply::apply(code, self.pattern, self.offset, self.replacement, self.count)?;
        debug!("builtin '{}': {} replacements", self.name, applied);
        Ok(applied)
    }
}

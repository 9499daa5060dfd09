//! Shared fixtures for integration tests

#![allow(dead_code)]

use rnpatch::{PatchEntry, PatchFile, TitlePrefix};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HOME_MENU_USA: u64 = 0x0004_0030_0000_8F02;
pub const GAME: u64 = 0x0004_0000_0005_5D00;

pub const REGION_PATTERN: [u8; 8] = [0x00, 0x00, 0x55, 0xE3, 0x01, 0x10, 0xA0, 0xE3];
pub const REGION_PATCH: [u8; 8] = [0x01, 0x00, 0xA0, 0xE3, 0x1E, 0xFF, 0x2F, 0xE1];

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

pub fn entry(repeat_count: i8, byte_offset: i8, pattern: &[u8], replacement: &[u8]) -> PatchEntry {
    PatchEntry {
        repeat_count,
        byte_offset,
        pattern: pattern.to_vec(),
        replacement: replacement.to_vec(),
    }
}

pub fn patch_file(titles: &[u64], patches: Vec<PatchEntry>) -> PatchFile {
    PatchFile {
        title_ids: titles.iter().map(|&id| TitlePrefix::from_program_id(id)).collect(),
        patches,
    }
}

pub fn write_patch(dir: &Path, name: &str, file: &PatchFile) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, file.to_bytes().expect("Failed to encode patch")).expect("Failed to write patch");
    path
}

pub fn write_raw(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Code image of `len` filler bytes with `bytes` placed at `at`.
pub fn code_with(len: usize, at: usize, bytes: &[u8]) -> Vec<u8> {
    let mut code = vec![0xCC; len];
    code[at..at + bytes.len()].copy_from_slice(bytes);
    code
}

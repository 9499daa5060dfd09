mod common;

use common::*;
use pretty_assertions::assert_eq;
use rnpatch::{DirStore, EngineConfig, PatchEngine, TitleCache, TitlePrefix};

#[test]
fn region_free_rule_writes_before_match() {
    let mut code = code_with(64, 32, &REGION_PATTERN);
    let applied = rnpatch::apply::apply(&mut code, &REGION_PATTERN, -16, &REGION_PATCH, 1).unwrap();
    assert_eq!(applied, 1);

    let mut expected = code_with(64, 32, &REGION_PATTERN);
    expected[16..24].copy_from_slice(&REGION_PATCH);
    assert_eq!(code, expected);
}

#[test]
fn cache_reflects_directory() {
    let dir = temp_dir();
    write_patch(dir.path(), "game.rnp", &patch_file(&[GAME], vec![entry(1, 0, b"a", b"b")]));
    write_patch(
        dir.path(),
        "multi.rnp",
        &patch_file(&[GAME, 0x0004_0000_0001_2300], vec![]),
    );
    let mut bad_magic = patch_file(&[0x0004_0000_00AB_CD00], vec![]).to_bytes().unwrap();
    bad_magic[..3].copy_from_slice(b"NOP");
    write_raw(dir.path(), "bad_magic.rnp", &bad_magic);
    write_raw(dir.path(), "short.rnp", b"RNP\x05");
    write_raw(dir.path(), "readme.txt", b"not a patch");

    let cache = TitleCache::build(&DirStore::new(dir.path())).unwrap();

    assert!(cache.has_patches(TitlePrefix::from_program_id(GAME)));
    assert!(cache.has_patches(TitlePrefix::new(0x0001_23)));
    assert!(!cache.has_patches(TitlePrefix::new(0x00AB_CD)));
    assert_eq!(
        cache.prefixes(),
        vec![TitlePrefix::new(0x0001_23), TitlePrefix::from_program_id(GAME)]
    );
    assert_eq!(cache.files().len(), 2);
}

#[test]
fn missing_directory_still_runs_builtins() {
    let dir = temp_dir();
    let config = EngineConfig {
        patch_dir: dir.path().join("absent"),
        ..EngineConfig::default()
    };
    let engine = PatchEngine::from_config(&config);
    assert!(engine.cache().is_empty());

    let mut code = code_with(64, 40, &REGION_PATTERN);
    let report = engine.patch_program(HOME_MENU_USA, &mut code);
    assert_eq!(report.builtin_replacements, 1);
    assert_eq!(&code[24..32], &REGION_PATCH);
}

#[test]
fn file_patches_apply_end_to_end() {
    let dir = temp_dir();
    write_patch(
        dir.path(),
        "game.rnp",
        &patch_file(
            &[GAME],
            vec![
                entry(2, 0, &[0xDE, 0xAD], &[0xBE, 0xEF]),
                entry(1, 2, &[0x11, 0x22], &[0x33]),
            ],
        ),
    );
    write_patch(
        dir.path(),
        "other.rnp",
        &patch_file(&[0x0004_0000_0001_2300], vec![entry(1, 0, &[0xCC], &[0x00])]),
    );
    write_raw(dir.path(), "junk.rnp", b"garbage");

    let engine = PatchEngine::start(DirStore::new(dir.path()));
    let mut code = vec![0xDE, 0xAD, 0x00, 0xDE, 0xAD, 0x00, 0xDE, 0xAD, 0x11, 0x22, 0x44];
    let report = engine.patch_program(GAME, &mut code);

    assert_eq!(
        code,
        vec![0xBE, 0xEF, 0x00, 0xBE, 0xEF, 0x00, 0xDE, 0xAD, 0x11, 0x22, 0x33]
    );
    assert_eq!(report.files_applied, 1);
    assert_eq!(report.entries_applied, 2);
    assert_eq!(report.replacements, 3);
    assert_eq!(report.failures, 0);
}

#[test]
fn title_without_patches_skips_file_io() {
    let dir = temp_dir();
    let path = write_patch(
        dir.path(),
        "game.rnp",
        &patch_file(&[GAME], vec![entry(1, 0, &[0x01], &[0x02])]),
    );
    let engine = PatchEngine::start(DirStore::new(dir.path()));
    // Corrupt the file after the scan; an unrelated title never reopens it.
    std::fs::write(&path, b"broken").unwrap();

    let mut code = vec![0x01; 4];
    let report = engine.patch_program(0x0004_0000_0009_9900, &mut code);
    assert_eq!(code, vec![0x01; 4]);
    assert_eq!(report.failures, 0);

    let report = engine.patch_program(GAME, &mut code);
    assert_eq!(report.failures, 1);
    assert_eq!(code, vec![0x01; 4]);
}

#[test]
fn config_round_trips_through_json() {
    let config: EngineConfig = serde_json::from_str(r#"{"patch_dir":"/sd/patches","builtin_rules":false}"#).unwrap();
    assert_eq!(config.patch_dir, std::path::PathBuf::from("/sd/patches"));
    assert_eq!(config.max_files, 255);
    assert!(!config.builtin_rules);
}

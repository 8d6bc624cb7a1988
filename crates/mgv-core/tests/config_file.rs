// SPDX-License-Identifier: Apache-2.0

use mgv_core::{sha256_hex, ErrorCode, MgvConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn load_reads_toml_file_when_present() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        "root_location = \"http://localhost:8000/data\"\ncontig_max_gap = 42\n",
    )
    .expect("write config");
    let cfg = MgvConfig::from_toml_file(&path).expect("load config");
    assert_eq!(cfg.root_location, "http://localhost:8000/data");
    assert_eq!(cfg.contig_max_gap, 42);
}

#[test]
fn missing_file_is_a_config_error_but_load_skips_it() {
    let tmp = tempdir().expect("tempdir");
    let absent = tmp.path().join("absent.toml");
    let err = MgvConfig::from_toml_file(&absent).expect_err("missing file");
    assert_eq!(err.code, ErrorCode::Config);
    let cfg = MgvConfig::load(Some(&absent)).expect("defaults");
    assert_eq!(cfg.packer_gap, MgvConfig::default().packer_gap);
}

#[test]
fn cache_db_dir_nests_db_name_under_cache_dir() {
    let cfg = MgvConfig {
        cache_dir: "/tmp/mgv".into(),
        cache_db_name: "db".to_string(),
        ..MgvConfig::default()
    };
    assert_eq!(cfg.cache_db_dir(), std::path::PathBuf::from("/tmp/mgv/db"));
}

#[test]
fn sha256_hex_is_lowercase_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

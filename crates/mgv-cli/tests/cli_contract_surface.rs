// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;

fn parse_commands_from_help(text: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut in_commands = false;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed == "Commands:" {
            in_commands = true;
            continue;
        }
        if in_commands {
            if trimmed.is_empty() {
                break;
            }
            let name = trimmed.split_whitespace().next().unwrap_or("");
            if !name.is_empty() && name != "help" {
                commands.push(name.to_string());
            }
        }
    }
    commands.sort();
    commands
}

/// A wget-style mirror of the data service: query strings live in file names.
fn write_mirror(dir: &Path) {
    fs::write(
        dir.join("fetch.cgi?datatype=metadata"),
        r#"[{"type":"genome","name":"A/J","shortname":"AJ","path":"aj","timestamp":"1",
            "chromosomes":[{"name":"1"},{"name":"2"}],
            "tracks":[{"track":"genes","filetype":"gff"},{"track":"sequences","filetype":"fasta"}]},
           {"type":"genome","name":"C57BL/6J","path":"b6","timestamp":"1",
            "chromosomes":[{"name":"1"}],
            "tracks":[{"track":"genes","filetype":"gff"}]}]"#,
    )
    .expect("metadata");
    fs::write(
        dir.join("fetch.cgi?datatype=gff&genome=aj&track=genes"),
        "1\tMGI\tgene\t100\t200\t.\t+\t.\tID=aj1;cID=MGI:97490;symbol=Pax6\n\
         2\tMGI\tgene\t50\t80\t.\t-\t.\tID=aj2;symbol=Kit\n",
    )
    .expect("aj genes");
    fs::write(
        dir.join("fetch.cgi?datatype=gff&genome=b6&track=genes"),
        "1\tMGI\tgene\t110\t210\t.\t+\t.\tID=b61;cID=MGI:97490;symbol=Pax6\n",
    )
    .expect("b6 genes");
    fs::write(
        dir.join("fetch.cgi?datatype=fasta&genome=aj&track=sequences&chr=1&start=1&end=8"),
        ">aj::1:1-8\nACGT\nACGT\n",
    )
    .expect("sequence");
}

/// No `--root`: the root location comes from whatever config file is found.
fn mgv_without_root(cache: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mgv").expect("mgv binary");
    cmd.env("MGV_CACHE_DIR", cache)
        .env("XDG_CONFIG_HOME", cache.join("xdg"))
        .env_remove("MGV_ROOT")
        .env("MGV_LOG_LEVEL", "warn")
        .arg("--json");
    cmd
}

fn mgv(mirror: &Path, cache: &Path) -> Command {
    let mut cmd = mgv_without_root(cache);
    cmd.arg("--root").arg(mirror);
    cmd
}

fn write_config(path: &Path, mirror: &Path) {
    fs::create_dir_all(path.parent().expect("config dir")).expect("mkdir config dir");
    fs::write(
        path,
        format!("root_location = {:?}\n", mirror.display().to_string()),
    )
    .expect("config");
}

fn genome_names(out: &Value) -> Vec<&str> {
    out.as_array()
        .expect("array")
        .iter()
        .filter_map(|g| g["name"].as_str())
        .collect()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run mgv");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json stdout")
}

#[test]
fn help_lists_the_data_commands() {
    let output = Command::cargo_bin("mgv")
        .expect("mgv binary")
        .arg("--help")
        .output()
        .expect("run help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 help");
    assert_eq!(
        parse_commands_from_help(&text),
        vec!["genes", "genologs", "genomes", "lookup", "sequence"]
    );
    assert!(text.contains("MGV_LOG_LEVEL"));
}

#[test]
fn version_flag_prints_crate_version() {
    Command::cargo_bin("mgv")
        .expect("mgv binary")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn genomes_are_listed_from_a_file_mirror() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    write_mirror(mirror.path());

    let out = stdout_json(mgv(mirror.path(), cache.path()).arg("genomes"));
    assert_eq!(genome_names(&out), vec!["A/J", "C57BL/6J"]);
    assert_eq!(out[0]["shortname"], "AJ");
    assert_eq!(out[0]["chromosomes"], 2);
    assert_eq!(
        out[0]["readers"],
        serde_json::json!(["genes", "sequences"])
    );
}

#[test]
fn workspace_config_file_sets_root_without_flags() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    let workspace = tempfile::tempdir().expect("workspace");
    write_mirror(mirror.path());
    write_config(&workspace.path().join(".mgv/config.toml"), mirror.path());

    let out = stdout_json(
        mgv_without_root(cache.path())
            .current_dir(workspace.path())
            .arg("genomes"),
    );
    assert_eq!(genome_names(&out), vec!["A/J", "C57BL/6J"]);
}

#[test]
fn user_config_file_is_used_when_workspace_has_none() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    let workspace = tempfile::tempdir().expect("workspace");
    write_mirror(mirror.path());
    write_config(&cache.path().join("xdg/mgv/config.toml"), mirror.path());

    let out = stdout_json(
        mgv_without_root(cache.path())
            .current_dir(workspace.path())
            .arg("genomes"),
    );
    assert_eq!(genome_names(&out), vec!["A/J", "C57BL/6J"]);
}

#[test]
fn explicit_config_flag_wins_over_workspace_file() {
    let mirror = tempfile::tempdir().expect("mirror");
    let empty = tempfile::tempdir().expect("empty mirror");
    let cache = tempfile::tempdir().expect("cache");
    let workspace = tempfile::tempdir().expect("workspace");
    write_mirror(mirror.path());
    write_config(&workspace.path().join(".mgv/config.toml"), empty.path());
    let explicit = workspace.path().join("explicit.toml");
    write_config(&explicit, mirror.path());

    let out = stdout_json(
        mgv_without_root(cache.path())
            .current_dir(workspace.path())
            .arg("--config")
            .arg(&explicit)
            .arg("genomes"),
    );
    assert_eq!(genome_names(&out), vec!["A/J", "C57BL/6J"]);
}

#[test]
fn lookup_and_genologs_resolve_across_genomes() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    write_mirror(mirror.path());

    let out = stdout_json(
        mgv(mirror.path(), cache.path()).args(["lookup", "--genome", "AJ", "kit"]),
    );
    assert_eq!(out["features"][0]["ID"], "aj2");
    assert_eq!(out["features"][0]["strand"], "-");

    let out = stdout_json(mgv(mirror.path(), cache.path()).args([
        "genologs",
        "--genome",
        "A/J",
        "aj1",
        "--in",
        "C57BL/6J,A/J",
    ]));
    assert_eq!(out["genologs"][0]["feature"]["ID"], "b61");
    assert_eq!(out["genologs"][1]["feature"]["ID"], "aj1");
}

#[test]
fn genes_and_sequence_read_a_region() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    write_mirror(mirror.path());

    let out = stdout_json(mgv(mirror.path(), cache.path()).args([
        "genes", "--genome", "A/J", "--region", "2:1-100",
    ]));
    assert_eq!(out["region"], "2:1-100");
    assert_eq!(out["features"].as_array().map(Vec::len), Some(1));

    let out = stdout_json(mgv(mirror.path(), cache.path()).args([
        "sequence", "--genome", "A/J", "--region", "1:1-8",
    ]));
    assert_eq!(out["sequence"], "ACGTACGT");
}

#[test]
fn errors_print_code_and_exit_non_zero() {
    let mirror = tempfile::tempdir().expect("mirror");
    let cache = tempfile::tempdir().expect("cache");
    write_mirror(mirror.path());

    mgv(mirror.path(), cache.path())
        .args(["lookup", "--genome", "DBA/2J", "Pax6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown_genome: genome DBA/2J is not registered"));

    mgv(mirror.path(), cache.path())
        .args(["genes", "--genome", "A/J", "--region", "X:1-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing_chromosome"));
}

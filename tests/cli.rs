#![allow(deprecated)] // Command::cargo_bin: the suggested replacement is nightly-only

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn srcpatch() -> Command {
    Command::cargo_bin("srcpatch").expect("binary exists")
}

#[test]
fn load_applies_inline_rules() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "let old_name = 1;\nuse old_name;\n").expect("failed to write fixture");

    srcpatch()
        .arg("load")
        .arg(&path)
        .args(["-r", "s/old_name/new_name/g"])
        .assert()
        .success()
        .stdout("let new_name = 1;\nuse new_name;\n");
}

#[test]
fn load_applies_a_rules_file() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "foo foo\n").expect("failed to write fixture");

    let rules = dir.path().join("rules.json");
    fs::write(
        &rules,
        r#"{ "rules": [ { "name": "rename", "subst": ["s/foo/bar/g"] } ] }"#,
    )
    .expect("failed to write rules file");

    srcpatch()
        .arg("load")
        .arg(&path)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .success()
        .stdout("bar bar\n");
}

#[test]
fn file_rules_run_before_inline_rules() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "a\n").expect("failed to write fixture");

    let rules = dir.path().join("rules.json");
    fs::write(
        &rules,
        r#"{ "rules": [ { "name": "first", "subst": ["s/a/b/g"] } ] }"#,
    )
    .expect("failed to write rules file");

    // The file rule rewrites a -> b, the inline rule b -> c; only that
    // order produces "c".
    srcpatch()
        .arg("load")
        .arg(&path)
        .arg("--rules")
        .arg(&rules)
        .args(["-r", "s/b/c/g"])
        .assert()
        .success()
        .stdout("c\n");
}

#[test]
fn cat_leaves_content_alone() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "untouched bytes\n").expect("failed to write fixture");

    srcpatch()
        .arg("cat")
        .arg(&path)
        .assert()
        .success()
        .stdout("untouched bytes\n");
}

#[test]
fn load_of_a_missing_file_fails() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("gone.src");

    srcpatch()
        .arg("load")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no resource at"));
}

#[test]
fn malformed_rules_are_rejected() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "anything\n").expect("failed to write fixture");

    srcpatch()
        .arg("load")
        .arg(&path)
        .args(["-r", "x/a/b/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid substitution rule"));
}

#[test]
fn stat_reports_file_metadata() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("widget.src");
    fs::write(&path, "12345").expect("failed to write fixture");

    srcpatch()
        .arg("stat")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("type: file").and(predicate::str::contains("size: 5")));
}

#[test]
fn quiet_stat_of_a_missing_path_prints_no_metadata() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("gone.src");

    srcpatch()
        .arg("stat")
        .arg("--quiet")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no metadata"));
}

#[test]
fn loud_stat_of_a_missing_path_fails() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("gone.src");

    srcpatch()
        .arg("stat")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to stat"));
}

#[test]
fn help_lists_the_subcommands() {
    srcpatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("load")
                .and(predicate::str::contains("cat"))
                .and(predicate::str::contains("stat")),
        );
}

//! Integration tests for the `kiln` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const REQUEST: &str = r#"
[blueprint]
name = "layered"

[[blueprint.modules]]
name = "api"
depends_on = ["core"]

[[blueprint.modules]]
name = "core"

[profile]
project_name = "shop"
description = "Sells things"
"#;

const CYCLIC: &str = r#"{
  "blueprint": {
    "name": "loop",
    "modules": [
      { "name": "a", "dependsOn": ["b"] },
      { "name": "b", "dependsOn": ["a"] }
    ]
  },
  "profile": { "project_name": "loop" }
}"#;

/// A workspace with an empty config file so the user's own config never
/// leaks into a test.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("kiln.toml"), "").unwrap();
        fs::write(temp.path().join("request.toml"), REQUEST).unwrap();
        Self { temp }
    }

    fn path(&self) -> &Path {
        self.temp.path()
    }

    fn join(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    fn kiln(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("kiln");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("KILN_GENERATION__CONFLICT_STRATEGY")
            .env_remove("KILN_GENERATION__DEFAULT_OUTPUT")
            .arg("--config")
            .arg(self.join("kiln.toml"));
        cmd
    }
}

#[test]
fn help_lists_commands() {
    Workspace::new()
        .kiln()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn generate_writes_project_into_cwd() {
    let ws = Workspace::new();

    ws.kiln()
        .args(["generate", "request.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 'shop'"));

    let root = ws.join("shop");
    assert!(root.join("src/core.rs").is_file());
    assert!(root.join("src/api.rs").is_file());
    assert!(root.join("tests/api_test.rs").is_file());
    assert!(root.join("CONTEXT.md").is_file());
    let main = fs::read_to_string(root.join("src/main.rs")).unwrap();
    assert!(main.starts_with("mod core;\nmod api;\n"));
}

#[test]
fn output_flag_picks_the_root() {
    let ws = Workspace::new();

    ws.kiln()
        .args(["generate", "request.toml", "-o", "out/here"])
        .assert()
        .success();

    assert!(ws.join("out/here/Cargo.toml").is_file());
    assert!(!ws.join("shop").exists());
}

#[test]
fn dry_run_lists_files_and_writes_nothing() {
    let ws = Workspace::new();

    ws.kiln()
        .args(["generate", "request.toml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("src/main.rs"))
        .stdout(predicate::str::contains("Planned 'shop'"));

    assert!(!ws.join("shop").exists());
}

#[test]
fn dry_run_json_is_machine_readable() {
    let ws = Workspace::new();

    let out = ws
        .kiln()
        .args(["generate", "request.toml", "--dry-run", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["manifest"]["dry_run"], true);
    assert_eq!(report["manifest"]["name"], "shop");
    let files = report["files"].as_array().unwrap();
    assert!(files.iter().any(|f| f["path"] == "README.md"));
    assert!(files.iter().all(|f| f["bytes"].as_u64().unwrap() > 0));
}

#[test]
fn cycle_is_a_user_error() {
    let ws = Workspace::new();
    fs::write(ws.join("loop.json"), CYCLIC).unwrap();

    ws.kiln()
        .args(["generate", "loop.json", "-y"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Circular dependency"));

    assert!(!ws.join("loop").exists());
}

#[test]
fn missing_request_is_reported() {
    Workspace::new()
        .kiln()
        .args(["generate", "absent.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not load request"));
}

#[test]
fn non_empty_root_needs_confirmation() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.join("shop")).unwrap();
    fs::write(ws.join("shop/README.md"), "mine\n").unwrap();

    ws.kiln()
        .args(["generate", "request.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Operation cancelled"));

    assert!(!ws.join("shop/src").exists());
    assert_eq!(fs::read_to_string(ws.join("shop/README.md")).unwrap(), "mine\n");
}

#[test]
fn skip_keeps_existing_files_and_warns() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.join("shop")).unwrap();
    fs::write(ws.join("shop/README.md"), "mine\n").unwrap();

    ws.kiln()
        .args(["generate", "request.toml", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "README.md already existed: kept existing file",
        ));

    assert_eq!(fs::read_to_string(ws.join("shop/README.md")).unwrap(), "mine\n");
    assert!(ws.join("shop/src/main.rs").is_file());
}

#[test]
fn overwrite_flag_replaces_existing_files() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.join("shop")).unwrap();
    fs::write(ws.join("shop/README.md"), "mine\n").unwrap();

    ws.kiln()
        .args(["generate", "request.toml", "-y", "--on-conflict", "overwrite"])
        .assert()
        .success();

    let readme = fs::read_to_string(ws.join("shop/README.md")).unwrap();
    assert!(readme.starts_with("# shop"));
}

#[test]
fn configured_strategy_applies_without_flag() {
    let ws = Workspace::new();
    fs::write(
        ws.join("kiln.toml"),
        "[generation]\nconflict_strategy = \"merge\"\n",
    )
    .unwrap();
    fs::create_dir_all(ws.join("shop")).unwrap();
    fs::write(ws.join("shop/README.md"), "mine\n").unwrap();

    ws.kiln()
        .args(["generate", "request.toml", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merge marker"));

    let readme = fs::read_to_string(ws.join("shop/README.md")).unwrap();
    assert!(readme.contains("kiln: merged output"));
}

#[test]
fn plan_prints_dependency_order() {
    Workspace::new()
        .kiln()
        .args(["plan", "request.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. core"))
        .stdout(predicate::str::contains("2. api (after core)"))
        .stdout(predicate::str::contains("Total steps:"));
}

#[test]
fn environment_overrides_config_file() {
    Workspace::new()
        .kiln()
        .env("KILN_GENERATION__CONFLICT_STRATEGY", "overwrite")
        .args(["config", "get", "generation.conflict_strategy"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "generation.conflict_strategy = overwrite",
        ));
}

#[test]
fn unknown_config_key_exits_with_configuration_code() {
    Workspace::new()
        .kiln()
        .args(["config", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn invalid_config_file_exits_with_configuration_code() {
    let ws = Workspace::new();
    fs::write(ws.join("kiln.toml"), "[output]\nformat = \"yaml\"\n").unwrap();

    ws.kiln()
        .args(["plan", "request.toml"])
        .assert()
        .code(4);
}

#[test]
fn init_writes_defaults_to_the_given_path() {
    let ws = Workspace::new();
    let target = ws.join("fresh/kiln.toml");

    cargo_bin_cmd!("kiln")
        .current_dir(ws.path())
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&target)
        .arg("init")
        .assert()
        .success();

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("conflict_strategy = \"skip\""));
    assert!(written.contains("progress = true"));
}

#[test]
fn completions_mention_the_binary() {
    Workspace::new()
        .kiln()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"));
}

//! CLI smoke tests for conduit.
//!
//! These tests run the real binary against temporary output directories and
//! check exit codes, messages, and the files it leaves behind.

use std::io::Read;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the conduit binary, isolated from the caller's game directory.
fn conduit_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("conduit");
  cmd.env_remove("CONDUIT_MCDIR");
  cmd
}

/// `conduit build <demo> -o <temp>/out`.
fn build_cmd(demo: &str, temp: &TempDir) -> Command {
  let mut cmd = conduit_cmd();
  cmd.arg("build").arg(demo).arg("-o").arg(temp.path().join("out"));
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  conduit_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  conduit_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("conduit"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["list", "build"] {
    conduit_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// list
// =============================================================================

#[test]
fn list_shows_demos() {
  conduit_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("basic"))
    .stdout(predicate::str::contains("right-click"))
    .stdout(predicate::str::contains("load"));
}

#[test]
fn list_json_is_parseable() {
  let output = conduit_cmd().args(["list", "--output", "json"]).output().unwrap();
  assert!(output.status.success());

  let demos: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(demos.as_array().map(Vec::len), Some(3));
}

// =============================================================================
// build
// =============================================================================

#[test]
fn build_basic_writes_directory() {
  let temp = TempDir::new().unwrap();

  build_cmd("basic", &temp)
    .assert()
    .success()
    .stdout(predicate::str::contains("Built basic"));

  let out = temp.path().join("out/datapack");
  assert_eq!(
    std::fs::read_to_string(out.join("data/test/function/hello_world.mcfunction")).unwrap(),
    "say Hello World!"
  );
  let mcmeta: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(out.join("pack.mcmeta")).unwrap()).unwrap();
  assert_eq!(mcmeta["pack"]["pack_format"], 71);
}

#[test]
fn build_zip_names_archives_after_package() {
  let temp = TempDir::new().unwrap();

  build_cmd("right-click", &temp).arg("--zip").assert().success();

  let data_zip = temp.path().join("out/right_click-data-1.0.zip");
  assert!(data_zip.is_file());
  assert!(temp.path().join("out/right_click-assets-1.0.zip").is_file());

  let mut archive = zip::ZipArchive::new(std::fs::File::open(&data_zip).unwrap()).unwrap();
  let mut callback = String::new();
  archive
    .by_name("data/right_click/function/on_right_click/wand.mcfunction")
    .unwrap()
    .read_to_string(&mut callback)
    .unwrap();
  assert!(callback.starts_with("advancement revoke @s only right_click:on_right_click/wand"));
}

#[test]
fn build_targets_requested_version() {
  let temp = TempDir::new().unwrap();

  build_cmd("load", &temp).args(["--minecraft", "1.21.6"]).assert().success();

  let data = temp.path().join("out/datapack/data");
  assert!(data.join("startup/dialog/welcome.json").is_file());
  assert_eq!(
    std::fs::read_to_string(data.join("minecraft/tags/function/tick.json")).unwrap(),
    r##"{"values":["#startup:ticking"]}"##
  );
}

#[test]
fn build_rejects_unknown_version() {
  let temp = TempDir::new().unwrap();

  build_cmd("basic", &temp)
    .args(["--minecraft", "1.20.1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("1.20.1"));
}

#[test]
fn rebuild_requires_force_when_not_interactive() {
  let temp = TempDir::new().unwrap();
  build_cmd("basic", &temp).assert().success();

  build_cmd("basic", &temp)
    .assert()
    .failure()
    .stderr(predicate::str::contains("--force"));

  build_cmd("basic", &temp).arg("--force").assert().success();
}

#[test]
fn link_without_minecraft_dir_fails() {
  let temp = TempDir::new().unwrap();

  build_cmd("basic", &temp)
    .args(["--link-to", "world"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("CONDUIT_MCDIR"));
}

#[test]
fn link_to_missing_save_fails() {
  let temp = TempDir::new().unwrap();
  let minecraft = temp.path().join("minecraft");
  std::fs::create_dir_all(minecraft.join("saves")).unwrap();

  build_cmd("basic", &temp)
    .args(["--link-to", "world"])
    .env("CONDUIT_MCDIR", &minecraft)
    .assert()
    .failure()
    .stderr(predicate::str::contains("save 'world' not found"));
}

#[cfg(unix)]
#[test]
fn link_into_save_from_env() {
  let temp = TempDir::new().unwrap();
  let minecraft = temp.path().join("minecraft");
  let datapacks = minecraft.join("saves/world/datapacks");
  std::fs::create_dir_all(&datapacks).unwrap();

  build_cmd("right-click", &temp)
    .args(["--link-to", "world"])
    .env("CONDUIT_MCDIR", &minecraft)
    .assert()
    .success();

  let link = datapacks.join("right_click-1.0");
  assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
  assert!(link.join("pack.mcmeta").is_file());
}

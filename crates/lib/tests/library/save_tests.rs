//! End-to-end saves through both output backends.

use std::io::Read;

use conduit_lib::member::{Advancement, Function};
use conduit_lib::{
  ArchiveOutput, DirectoryOutput, MinecraftVersion, Output, Pack, PackError, PackMetadata, RegistryError,
};
use serde_json::json;
use tempfile::TempDir;

fn sample_pack() -> Pack {
  let mut pack = Pack::datapack(PackMetadata::new("Round trip", MinecraftVersion::V1_21_5)).unwrap();
  let ns = pack.namespace("test").unwrap();

  let tick = ns.reserve::<Function>("foo/bar").unwrap();
  ns.add(
    "foo/bar",
    Advancement::new(json!({ "criteria": {}, "rewards": { "function": tick } })),
  )
  .unwrap();
  ns.initialize(&tick, Function::new(["say hi", "say bye"])).unwrap();
  ns.tag::<Function>("tick").unwrap().add(&tick);
  pack
}

#[tokio::test]
async fn directory_save_writes_expected_tree() {
  let temp = TempDir::new().unwrap();
  let root = temp.path().join("datapack");

  let saved = sample_pack().save(Output::new(DirectoryOutput::new(&root))).await.unwrap();
  assert_eq!(saved, root);

  assert_eq!(
    std::fs::read_to_string(root.join("data/test/function/foo/bar.mcfunction")).unwrap(),
    "say hi\nsay bye"
  );
  assert_eq!(
    std::fs::read_to_string(root.join("data/test/tags/function/tick.json")).unwrap(),
    r#"{"values":["test:foo/bar"]}"#
  );
  let advancement: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(root.join("data/test/advancement/foo/bar.json")).unwrap()).unwrap();
  assert_eq!(advancement["rewards"]["function"], "test:foo/bar");

  let functions: Vec<_> = std::fs::read_dir(root.join("data/test/function/foo")).unwrap().collect();
  assert_eq!(functions.len(), 1);
}

#[tokio::test]
async fn archive_save_holds_equivalent_entries() {
  let temp = TempDir::new().unwrap();
  let zip_path = temp.path().join("pack.zip");

  sample_pack().save(Output::new(ArchiveOutput::new(&zip_path))).await.unwrap();

  let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
  let mut function = String::new();
  archive
    .by_name("data/test/function/foo/bar.mcfunction")
    .unwrap()
    .read_to_string(&mut function)
    .unwrap();
  assert_eq!(function, "say hi\nsay bye");
  assert!(archive.by_name("pack.mcmeta").is_ok());
}

#[tokio::test]
async fn refused_permission_leaves_destination_untouched() {
  let temp = TempDir::new().unwrap();
  let blocker = temp.path().join("datapack");
  std::fs::write(&blocker, "keep me").unwrap();

  let result = sample_pack().save(Output::new(DirectoryOutput::new(&blocker))).await;
  assert!(matches!(result, Err(PackError::PermissionDenied { path }) if path == blocker));
  assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "keep me");
}

#[tokio::test]
async fn archive_refuses_directory_destination() {
  let temp = TempDir::new().unwrap();
  let target = temp.path().join("pack.zip");
  std::fs::create_dir(&target).unwrap();
  std::fs::write(target.join("inside.txt"), "x").unwrap();

  let result = sample_pack().save(Output::new(ArchiveOutput::new(&target))).await;
  assert!(matches!(result, Err(PackError::PermissionDenied { .. })));
  assert!(target.join("inside.txt").is_file());
}

#[tokio::test]
async fn open_reservation_aborts_before_any_write() {
  let temp = TempDir::new().unwrap();
  let root = temp.path().join("datapack");

  let mut pack = sample_pack();
  pack.namespace("test").unwrap().reserve::<Function>("forgotten").unwrap();

  let result = pack.save(Output::new(DirectoryOutput::new(&root))).await;
  match result {
    Err(PackError::Registry(RegistryError::UnfulfilledReservations(ids))) => {
      assert_eq!(ids, vec!["test:forgotten".to_string()]);
    }
    other => panic!("expected unfulfilled reservation, got {:?}", other),
  }
  assert!(!root.exists());
}

//! Building packs into an output directory.
//!
//! A build saves an optional data pack and an optional resource pack below
//! [`BuildConfig::out_dir`], either as loose directories or as zip archives:
//!
//! ```text
//! out/datapack/                     out/<name>-data[-<version>].zip
//! out/resourcepack/         or      out/<name>-assets[-<version>].zip
//! ```
//!
//! The data pack can then be linked into a world save so the game picks it up
//! without copying (see [`link`]).
//!
//! # Submodules
//!
//! - [`link`] - Symlinking a built data pack into a world save

pub mod link;
mod types;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::output::{ArchiveOutput, DirectoryOutput, Output};
use crate::pack::{Pack, PackError};

pub use types::*;

/// Artifact base name: the package name, or the current directory's name.
pub fn artifact_name(datapack: Option<&Pack>, resourcepack: Option<&Pack>) -> Result<String, BuildError> {
  let package = datapack
    .or(resourcepack)
    .and_then(|pack| pack.metadata().package.as_ref());
  if let Some(package) = package {
    return Ok(package.name.clone());
  }

  let cwd = std::env::current_dir().map_err(BuildError::CurrentDir)?;
  Ok(
    cwd
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "pack".to_string()),
  )
}

/// `-<version>` when the package carries a version, else empty.
pub fn version_suffix(datapack: Option<&Pack>, resourcepack: Option<&Pack>) -> String {
  datapack
    .or(resourcepack)
    .and_then(|pack| pack.metadata().package.as_ref())
    .and_then(|package| package.version.as_deref())
    .map(|version| format!("-{}", version))
    .unwrap_or_default()
}

/// Output locations for the data pack and the resource pack.
pub fn output_paths(config: &BuildConfig, name: &str, suffix: &str) -> (PathBuf, PathBuf) {
  if config.zip {
    (
      config.out_dir.join(format!("{}-data{}.zip", name, suffix)),
      config.out_dir.join(format!("{}-assets{}.zip", name, suffix)),
    )
  } else {
    (config.out_dir.join("datapack"), config.out_dir.join("resourcepack"))
  }
}

/// Build the given packs according to `config`.
///
/// Packs are saved one after the other; a failure stops the build before the
/// next pack is touched.
pub async fn build(
  config: &BuildConfig,
  datapack: Option<&Pack>,
  resourcepack: Option<&Pack>,
) -> Result<BuildReport, BuildError> {
  fs::create_dir_all(&config.out_dir)
    .await
    .map_err(|source| BuildError::CreateOutDir {
      path: config.out_dir.clone(),
      source,
    })?;

  let name = artifact_name(datapack, resourcepack)?;
  let suffix = version_suffix(datapack, resourcepack);
  let (data_path, assets_path) = output_paths(config, &name, &suffix);
  let mut report = BuildReport::default();

  if let Some(pack) = datapack {
    info!(path = %data_path.display(), "building datapack");
    report.datapack = Some(save_pack(pack, &data_path, config.zip).await?);
  }
  if let Some(pack) = resourcepack {
    info!(path = %assets_path.display(), "building resourcepack");
    report.resourcepack = Some(save_pack(pack, &assets_path, config.zip).await?);
  }

  if let (Some(save), Some(saved)) = (&config.link_to, &report.datapack) {
    let file_name = format!("{}{}{}", name, suffix, if config.zip { ".zip" } else { "" });
    let link = link::link_into_save(config.minecraft_dir.as_deref(), save, saved, &file_name).await?;
    report.link = Some(link);
  }

  Ok(report)
}

async fn save_pack(pack: &Pack, path: &Path, zip: bool) -> Result<PathBuf, PackError> {
  if zip {
    pack.save(Output::new(ArchiveOutput::new(path))).await
  } else {
    pack.save(Output::new(DirectoryOutput::new(path))).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::member::{Font, Function};
  use crate::pack::{MinecraftVersion, Package, PackMetadata};
  use serde_json::json;
  use tempfile::TempDir;

  fn datapack(package: Package) -> Pack {
    let metadata = PackMetadata::new("Test", MinecraftVersion::V1_21_5).with_package(package);
    let mut pack = Pack::datapack(metadata).unwrap();
    pack
      .namespace("test")
      .unwrap()
      .add("hello", Function::new(["say hi"]))
      .unwrap();
    pack
  }

  fn resourcepack() -> Pack {
    let mut pack = Pack::resourcepack(PackMetadata::new("Test", MinecraftVersion::V1_21_5)).unwrap();
    pack
      .namespace("test")
      .unwrap()
      .add("default", Font::new(json!({ "providers": [] })))
      .unwrap();
    pack
  }

  #[test]
  fn zip_names_include_version() {
    let config = BuildConfig {
      zip: true,
      ..BuildConfig::default()
    };
    let (data, assets) = output_paths(&config, "wands", "-1.0.0");
    assert_eq!(data, PathBuf::from("./out/wands-data-1.0.0.zip"));
    assert_eq!(assets, PathBuf::from("./out/wands-assets-1.0.0.zip"));
  }

  #[test]
  fn directory_names_are_fixed() {
    let (data, assets) = output_paths(&BuildConfig::default(), "ignored", "");
    assert_eq!(data, PathBuf::from("./out/datapack"));
    assert_eq!(assets, PathBuf::from("./out/resourcepack"));
  }

  #[test]
  fn package_name_wins_over_directory() {
    let pack = datapack(Package::new("wands").with_version("2.1"));
    assert_eq!(artifact_name(Some(&pack), None).unwrap(), "wands");
    assert_eq!(version_suffix(Some(&pack), None), "-2.1");
  }

  #[tokio::test]
  async fn builds_directories() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfig {
      out_dir: temp.path().join("out"),
      ..BuildConfig::default()
    };
    let data = datapack(Package::new("wands"));
    let assets = resourcepack();

    let report = build(&config, Some(&data), Some(&assets)).await.unwrap();
    assert_eq!(report.datapack, Some(temp.path().join("out/datapack")));
    assert_eq!(report.resourcepack, Some(temp.path().join("out/resourcepack")));
    assert!(report.link.is_none());
    assert!(temp.path().join("out/datapack/data/test/function/hello.mcfunction").is_file());
    assert!(temp.path().join("out/resourcepack/assets/test/font/default.json").is_file());
  }

  #[tokio::test]
  async fn builds_archives() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfig {
      out_dir: temp.path().to_path_buf(),
      zip: true,
      ..BuildConfig::default()
    };
    let data = datapack(Package::new("wands").with_version("1.0"));

    let report = build(&config, Some(&data), None).await.unwrap();
    assert_eq!(report.datapack, Some(temp.path().join("wands-data-1.0.zip")));
    assert!(temp.path().join("wands-data-1.0.zip").is_file());
    assert!(!temp.path().join("wands-assets-1.0.zip").exists());
  }

  #[tokio::test]
  async fn link_without_minecraft_dir_fails() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfig {
      out_dir: temp.path().to_path_buf(),
      link_to: Some("world".to_string()),
      ..BuildConfig::default()
    };
    let data = datapack(Package::new("wands"));

    let result = build(&config, Some(&data), None).await;
    assert!(matches!(result, Err(BuildError::MissingMinecraftDir)));
  }
}

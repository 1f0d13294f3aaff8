//! Linking a built data pack into a world save.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use super::BuildError;

/// Symlink `built` into `<minecraft_dir>/saves/<save>/datapacks/<file_name>`.
///
/// An existing symlink at that location is replaced. Anything else already
/// there is left alone and reported as an error.
pub async fn link_into_save(
  minecraft_dir: Option<&Path>,
  save: &str,
  built: &Path,
  file_name: &str,
) -> Result<PathBuf, BuildError> {
  let minecraft_dir = minecraft_dir.ok_or(BuildError::MissingMinecraftDir)?;
  let datapacks = minecraft_dir.join("saves").join(save).join("datapacks");
  if !fs::metadata(&datapacks).await.is_ok_and(|meta| meta.is_dir()) {
    return Err(BuildError::SaveNotFound {
      save: save.to_string(),
      path: datapacks,
    });
  }

  let link = datapacks.join(file_name);
  let link_err = |target: &Path, source: io::Error| BuildError::Link {
    target: target.to_path_buf(),
    link: link.clone(),
    source,
  };

  let target = fs::canonicalize(built).await.map_err(|e| link_err(built, e))?;

  match fs::symlink_metadata(&link).await {
    Ok(meta) if meta.file_type().is_symlink() => {
      debug!(link = %link.display(), "replacing existing link");
      remove_symlink(&link).await.map_err(|e| link_err(&target, e))?;
    }
    Ok(_) => {
      return Err(link_err(
        &target,
        io::Error::new(io::ErrorKind::AlreadyExists, "a file that is not a link is in the way"),
      ));
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(link_err(&target, e)),
  }

  symlink(&target, &link).await.map_err(|e| link_err(&target, e))?;
  info!(target = %target.display(), link = %link.display(), "linked datapack into save");
  Ok(link)
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
  fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
  if fs::metadata(target).await?.is_dir() {
    fs::symlink_dir(target, link).await
  } else {
    fs::symlink_file(target, link).await
  }
}

#[cfg(unix)]
async fn remove_symlink(link: &Path) -> io::Result<()> {
  fs::remove_file(link).await
}

#[cfg(windows)]
async fn remove_symlink(link: &Path) -> io::Result<()> {
  // Directory links must be removed as directories on Windows.
  match fs::remove_file(link).await {
    Ok(()) => Ok(()),
    Err(_) => fs::remove_dir(link).await,
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn world(temp: &TempDir) -> PathBuf {
    let datapacks = temp.path().join("minecraft/saves/world/datapacks");
    std::fs::create_dir_all(&datapacks).unwrap();
    temp.path().join("minecraft")
  }

  fn built(temp: &TempDir) -> PathBuf {
    let built = temp.path().join("out/datapack");
    std::fs::create_dir_all(&built).unwrap();
    built
  }

  #[tokio::test]
  async fn links_into_save() {
    let temp = TempDir::new().unwrap();
    let minecraft = world(&temp);
    let built = built(&temp);

    let link = link_into_save(Some(&minecraft), "world", &built, "wands").await.unwrap();
    assert_eq!(link, minecraft.join("saves/world/datapacks/wands"));
    assert_eq!(std::fs::read_link(&link).unwrap(), built.canonicalize().unwrap());
  }

  #[tokio::test]
  async fn replaces_existing_link() {
    let temp = TempDir::new().unwrap();
    let minecraft = world(&temp);
    let built = built(&temp);

    link_into_save(Some(&minecraft), "world", &built, "wands").await.unwrap();
    let link = link_into_save(Some(&minecraft), "world", &built, "wands").await.unwrap();
    assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
  }

  #[tokio::test]
  async fn refuses_to_replace_real_directory() {
    let temp = TempDir::new().unwrap();
    let minecraft = world(&temp);
    let built = built(&temp);
    std::fs::create_dir(minecraft.join("saves/world/datapacks/wands")).unwrap();

    let result = link_into_save(Some(&minecraft), "world", &built, "wands").await;
    assert!(matches!(result, Err(BuildError::Link { .. })));
  }

  #[tokio::test]
  async fn missing_save_fails() {
    let temp = TempDir::new().unwrap();
    let minecraft = world(&temp);
    let built = built(&temp);

    let result = link_into_save(Some(&minecraft), "other", &built, "wands").await;
    assert!(matches!(result, Err(BuildError::SaveNotFound { save, .. }) if save == "other"));
  }

  #[tokio::test]
  async fn missing_minecraft_dir_fails() {
    let temp = TempDir::new().unwrap();
    let built = built(&temp);
    let result = link_into_save(None, "world", &built, "wands").await;
    assert!(matches!(result, Err(BuildError::MissingMinecraftDir)));
  }
}

//! Loose directory tree backend.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::{Backend, FileContent, OutputBuffer, OutputError, ancestor_writable};

/// Writes the buffered output as a directory tree rooted at `base_path`.
///
/// Committing is destructive: any existing directory at `base_path` is removed
/// first.
#[derive(Debug, Clone)]
pub struct DirectoryOutput {
  base_path: PathBuf,
}

impl DirectoryOutput {
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }
}

impl Backend for DirectoryOutput {
  fn save_path(&self) -> &Path {
    &self.base_path
  }

  async fn request_permissions(&self) -> bool {
    match fs::metadata(&self.base_path).await {
      Ok(meta) if !meta.is_dir() => {
        error!(path = %self.base_path.display(), "save path exists and is not a directory");
        false
      }
      Ok(meta) if meta.permissions().readonly() => {
        error!(path = %self.base_path.display(), "save path is read-only");
        false
      }
      Ok(_) => true,
      Err(e) if e.kind() == io::ErrorKind::NotFound => ancestor_writable(&self.base_path).await,
      Err(e) => {
        error!(path = %self.base_path.display(), error = %e, "cannot inspect save path");
        false
      }
    }
  }

  async fn complete(&self, buffer: OutputBuffer) -> Result<(), OutputError> {
    let base = self.base_path.clone();

    match fs::remove_dir_all(&base).await {
      Ok(()) => debug!(path = %base.display(), "removed previous output"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(source) => return Err(OutputError::Remove { path: base, source }),
    }
    fs::create_dir_all(&base).await.map_err(|source| OutputError::CreateDir {
      path: base.clone(),
      source,
    })?;

    let (directories, files) = buffer.into_parts();

    // Sorted by path, so parents are created before their children.
    for (path, options) in directories {
      let absolute = base.join(&path);
      let result = if options.recursive {
        fs::create_dir_all(&absolute).await
      } else {
        fs::create_dir(&absolute).await
      };
      result.map_err(|source| OutputError::CreateDir { path: absolute, source })?;
    }

    let file_count = files.len();
    let mut join_set = JoinSet::new();
    for (path, content) in files {
      let absolute = base.join(&path);
      join_set.spawn(async move {
        let result = match &content {
          FileContent::Bytes(bytes) => fs::write(&absolute, bytes).await,
          FileContent::Text(text) => fs::write(&absolute, text.as_bytes()).await,
        };
        result.map_err(|source| OutputError::Write { path: absolute, source })
      });
    }

    while let Some(joined) = join_set.join_next().await {
      joined??;
    }

    info!(path = %base.display(), files = file_count, "wrote output directory");
    Ok(())
  }
}

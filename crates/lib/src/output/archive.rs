//! Compressed archive backend.

use std::io::{self, Cursor, Write};
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{error, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Backend, OutputBuffer, OutputError, ancestor_writable};

/// Writes the buffered output as one zip archive at `zip_file`.
///
/// Directories are implied by entry names and are not stored separately.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
  zip_file: PathBuf,
}

impl ArchiveOutput {
  pub fn new(zip_file: impl Into<PathBuf>) -> Self {
    let zip_file = zip_file.into();
    if zip_file.extension().is_none_or(|ext| ext != "zip") {
      warn!(path = %zip_file.display(), "archive output expects a path to a .zip file");
    }
    Self { zip_file }
  }
}

impl Backend for ArchiveOutput {
  fn save_path(&self) -> &Path {
    &self.zip_file
  }

  async fn request_permissions(&self) -> bool {
    match fs::metadata(&self.zip_file).await {
      Ok(meta) if meta.is_dir() => {
        error!(path = %self.zip_file.display(), "archive path is a directory");
        false
      }
      Ok(meta) if meta.permissions().readonly() => {
        error!(path = %self.zip_file.display(), "archive path is read-only");
        false
      }
      Ok(_) => true,
      Err(e) if e.kind() == io::ErrorKind::NotFound => ancestor_writable(&self.zip_file).await,
      Err(e) => {
        error!(path = %self.zip_file.display(), error = %e, "cannot inspect archive path");
        false
      }
    }
  }

  async fn complete(&self, buffer: OutputBuffer) -> Result<(), OutputError> {
    let entries = buffer.files().count();
    let bytes = encode(&self.zip_file, &buffer)?;

    if let Some(parent) = self.zip_file.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).await.map_err(|source| OutputError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }
    fs::write(&self.zip_file, bytes).await.map_err(|source| OutputError::Write {
      path: self.zip_file.clone(),
      source,
    })?;

    info!(path = %self.zip_file.display(), entries, "wrote output archive");
    Ok(())
  }
}

/// Build the archive in memory.
fn encode(zip_file: &Path, buffer: &OutputBuffer) -> Result<Vec<u8>, OutputError> {
  let archive_err = |source: zip::result::ZipError| OutputError::Archive {
    path: zip_file.to_path_buf(),
    source,
  };

  let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
  let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

  for (path, content) in buffer.files() {
    writer.start_file(entry_name(path), options).map_err(archive_err)?;
    writer.write_all(content.as_bytes()).map_err(|source| OutputError::Write {
      path: zip_file.join(path),
      source,
    })?;
  }

  let cursor = writer.finish().map_err(archive_err)?;
  Ok(cursor.into_inner())
}

/// Archive entry names always use `/`, whatever the host separator.
fn entry_name(path: &Path) -> String {
  path
    .components()
    .filter_map(|component| match component {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

//! Buffered output with interchangeable physical backends.
//!
//! Saving a pack happens in two phases that never interleave:
//!
//! 1. **Plan**: namespaces and the pack write into an [`Output`] through
//!    [`SubOutput`] views. Every `mkdir` and `write_file` call is recorded in an
//!    [`OutputBuffer`]; nothing touches the filesystem.
//! 2. **Commit**: [`Output::request_permissions`] runs the backend's pre-flight
//!    check, then [`Output::complete`] hands the buffer to the backend which
//!    materializes it.
//!
//! `complete` consumes the root output, so a buffer can be committed at most
//! once. Views borrow the root and cannot commit.
//!
//! # Backends
//!
//! - [`DirectoryOutput`]: replaces a loose directory tree.
//! - [`ArchiveOutput`]: writes a single deflate-compressed zip archive.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::error;

pub mod archive;
pub mod directory;

pub use archive::ArchiveOutput;
pub use directory::DirectoryOutput;

/// Errors raised while buffering or committing output.
#[derive(Debug, Error)]
pub enum OutputError {
  #[error("failed to create directory {}: {source}", .path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove existing output {}: {source}", .path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to encode {} as JSON: {source}", .path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to build archive {}: {source}", .path.display())]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("write task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// Options for a buffered directory creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirOptions {
  /// Create missing parents as well.
  pub recursive: bool,
}

impl DirOptions {
  pub fn recursive() -> Self {
    Self { recursive: true }
  }
}

/// Content of a buffered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
  Text(String),
  Bytes(Vec<u8>),
}

impl FileContent {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      FileContent::Text(text) => text.as_bytes(),
      FileContent::Bytes(bytes) => bytes,
    }
  }

  /// The content as text, if it was buffered as text.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      FileContent::Text(text) => Some(text),
      FileContent::Bytes(_) => None,
    }
  }
}

impl From<String> for FileContent {
  fn from(text: String) -> Self {
    FileContent::Text(text)
  }
}

impl From<&str> for FileContent {
  fn from(text: &str) -> Self {
    FileContent::Text(text.to_string())
  }
}

impl From<Vec<u8>> for FileContent {
  fn from(bytes: Vec<u8>) -> Self {
    FileContent::Bytes(bytes)
  }
}

impl From<&[u8]> for FileContent {
  fn from(bytes: &[u8]) -> Self {
    FileContent::Bytes(bytes.to_vec())
  }
}

/// Pending directory creations and file writes, keyed by path relative to the
/// output root.
///
/// Later writes to the same path replace earlier ones.
#[derive(Debug, Default)]
pub struct OutputBuffer {
  directories: BTreeMap<PathBuf, DirOptions>,
  files: BTreeMap<PathBuf, FileContent>,
}

impl OutputBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn mkdir(&mut self, path: PathBuf, options: DirOptions) {
    self.directories.insert(path, options);
  }

  pub fn write_file(&mut self, path: PathBuf, content: FileContent) {
    self.files.insert(path, content);
  }

  /// Buffered directories in path order, so parents precede children.
  pub fn directories(&self) -> impl Iterator<Item = (&Path, DirOptions)> {
    self.directories.iter().map(|(path, options)| (path.as_path(), *options))
  }

  pub fn files(&self) -> impl Iterator<Item = (&Path, &FileContent)> {
    self.files.iter().map(|(path, content)| (path.as_path(), content))
  }

  pub fn file(&self, path: impl AsRef<Path>) -> Option<&FileContent> {
    self.files.get(path.as_ref())
  }

  pub fn has_directory(&self, path: impl AsRef<Path>) -> bool {
    self.directories.contains_key(path.as_ref())
  }

  pub fn is_empty(&self) -> bool {
    self.directories.is_empty() && self.files.is_empty()
  }

  pub(crate) fn into_parts(self) -> (BTreeMap<PathBuf, DirOptions>, BTreeMap<PathBuf, FileContent>) {
    (self.directories, self.files)
  }
}

/// A physical destination for a buffered output.
pub trait Backend {
  /// The effective root location.
  fn save_path(&self) -> &Path;

  /// Pre-flight check run before any destructive action.
  ///
  /// Returning `false` aborts the save.
  fn request_permissions(&self) -> impl Future<Output = bool> + Send;

  /// Materialize the buffer. This is the single commit point.
  fn complete(&self, buffer: OutputBuffer) -> impl Future<Output = Result<(), OutputError>> + Send;
}

/// The root of a buffered output.
#[derive(Debug)]
pub struct Output<B> {
  buffer: OutputBuffer,
  backend: B,
}

impl<B: Backend> Output<B> {
  pub fn new(backend: B) -> Self {
    Self {
      buffer: OutputBuffer::new(),
      backend,
    }
  }

  /// A view rooted at the output root.
  pub fn view(&mut self) -> SubOutput<'_> {
    SubOutput {
      buffer: &mut self.buffer,
      root: self.backend.save_path(),
      base: PathBuf::new(),
    }
  }

  /// A view that prefixes `path` onto every operation.
  pub fn with_base(&mut self, path: impl AsRef<Path>) -> SubOutput<'_> {
    SubOutput {
      buffer: &mut self.buffer,
      root: self.backend.save_path(),
      base: path.as_ref().to_path_buf(),
    }
  }

  pub fn file(&mut self, path: impl AsRef<Path>) -> OutputFile<'_> {
    OutputFile {
      buffer: &mut self.buffer,
      path: path.as_ref().to_path_buf(),
    }
  }

  pub fn mkdir(&mut self, path: impl AsRef<Path>, options: DirOptions) {
    self.buffer.mkdir(path.as_ref().to_path_buf(), options);
  }

  pub fn write_file(&mut self, path: impl AsRef<Path>, content: impl Into<FileContent>) {
    self.buffer.write_file(path.as_ref().to_path_buf(), content.into());
  }

  pub fn save_path(&self) -> &Path {
    self.backend.save_path()
  }

  pub fn buffer(&self) -> &OutputBuffer {
    &self.buffer
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub async fn request_permissions(&self) -> bool {
    self.backend.request_permissions().await
  }

  /// Commit every buffered operation.
  pub async fn complete(self) -> Result<(), OutputError> {
    self.backend.complete(self.buffer).await
  }
}

/// A borrowed view of an [`Output`] that prefixes a base path onto every
/// operation.
#[derive(Debug)]
pub struct SubOutput<'a> {
  buffer: &'a mut OutputBuffer,
  root: &'a Path,
  base: PathBuf,
}

impl SubOutput<'_> {
  pub fn mkdir(&mut self, path: impl AsRef<Path>, options: DirOptions) {
    let path = join(&self.base, path.as_ref());
    self.buffer.mkdir(path, options);
  }

  pub fn write_file(&mut self, path: impl AsRef<Path>, content: impl Into<FileContent>) {
    let path = join(&self.base, path.as_ref());
    self.buffer.write_file(path, content.into());
  }

  pub fn with_base(&mut self, path: impl AsRef<Path>) -> SubOutput<'_> {
    SubOutput {
      buffer: &mut *self.buffer,
      root: self.root,
      base: join(&self.base, path.as_ref()),
    }
  }

  pub fn file(&mut self, path: impl AsRef<Path>) -> OutputFile<'_> {
    OutputFile {
      buffer: &mut *self.buffer,
      path: join(&self.base, path.as_ref()),
    }
  }

  /// The base of this view, relative to the output root.
  pub fn base(&self) -> &Path {
    &self.base
  }

  /// The effective location of this view.
  pub fn save_path(&self) -> PathBuf {
    join(self.root, &self.base)
  }
}

/// A single pending file within an output.
#[derive(Debug)]
pub struct OutputFile<'a> {
  buffer: &'a mut OutputBuffer,
  path: PathBuf,
}

impl OutputFile<'_> {
  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn write(&mut self, content: impl Into<FileContent>) {
    self.buffer.write_file(self.path.clone(), content.into());
  }

  /// Write `value` as compact JSON.
  pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), OutputError> {
    let text = serde_json::to_string(value).map_err(|source| OutputError::Json {
      path: self.path.clone(),
      source,
    })?;
    self.write(text);
    Ok(())
  }
}

fn join(base: &Path, path: &Path) -> PathBuf {
  if path.as_os_str().is_empty() {
    base.to_path_buf()
  } else {
    base.join(path)
  }
}

/// Whether the closest existing ancestor of `path` is a writable directory.
pub(crate) async fn ancestor_writable(path: &Path) -> bool {
  let mut current = path.parent();
  while let Some(dir) = current {
    let probe = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    match fs::metadata(probe).await {
      Ok(meta) => {
        let writable = meta.is_dir() && !meta.permissions().readonly();
        if !writable {
          error!(path = %probe.display(), "parent of save path is not a writable directory");
        }
        return writable;
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => current = dir.parent(),
      Err(e) => {
        error!(path = %probe.display(), error = %e, "cannot inspect parent of save path");
        return false;
      }
    }
  }
  false
}

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::pack::PackError;

/// Options for one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  /// Directory all artifacts are written below.
  pub out_dir: PathBuf,
  /// Write zip archives instead of loose directories.
  pub zip: bool,
  /// Name of a world save to link the built data pack into.
  pub link_to: Option<String>,
  /// The game directory holding `saves/`.
  pub minecraft_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      out_dir: PathBuf::from("./out"),
      zip: false,
      link_to: None,
      minecraft_dir: None,
    }
  }
}

/// Where a build put things.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
  pub datapack: Option<PathBuf>,
  pub resourcepack: Option<PathBuf>,
  /// The symlink created inside the world save, if any.
  pub link: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Pack(#[from] PackError),

  #[error("failed to create output directory {}: {source}", .path.display())]
  CreateOutDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot determine the current directory: {0}")]
  CurrentDir(#[source] io::Error),

  #[error("minecraft directory not specified; set CONDUIT_MCDIR to your .minecraft directory")]
  MissingMinecraftDir,

  #[error("save '{save}' not found (looked for {})", .path.display())]
  SaveNotFound { save: String, path: PathBuf },

  #[error("failed to link {} to {}: {source}", .target.display(), .link.display())]
  Link {
    target: PathBuf,
    link: PathBuf,
    #[source]
    source: io::Error,
  },
}

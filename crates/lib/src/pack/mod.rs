//! Data packs and resource packs.
//!
//! A [`Pack`] owns its namespaces and writes them below a pack type folder:
//!
//! ```text
//! <save path>/
//! ├── pack.mcmeta
//! └── data/<namespace>/...      (assets/<namespace>/... for resource packs)
//! ```
//!
//! Saving goes through an [`Output`]: the whole pack is planned into the
//! output's buffer first, then committed in one step.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::macros::{MacroDef, MacroIds};
use crate::namespace::{Namespace, RegistryError};
use crate::output::{Backend, Output, OutputError};
use crate::sequence::SequenceError;

mod version;

pub use version::{DIALOG_MIN_FORMAT, MinecraftVersion, PackFormats};

#[derive(Debug, Error)]
pub enum PackError {
  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error(transparent)]
  Sequence(#[from] SequenceError),

  #[error(transparent)]
  Output(#[from] OutputError),

  #[error("permission denied for {}", .path.display())]
  PermissionDenied { path: PathBuf },

  #[error("unsupported Minecraft version '{0}'")]
  UnsupportedVersion(String),
}

/// Which half of the game a pack feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackType {
  Data,
  Resource,
}

impl PackType {
  /// Top-level folder holding the namespaces.
  pub fn folder(self) -> &'static str {
    match self {
      PackType::Data => "data",
      PackType::Resource => "assets",
    }
  }
}

impl fmt::Display for PackType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackType::Data => f.write_str("data"),
      PackType::Resource => f.write_str("resource"),
    }
  }
}

/// Distribution name and version, used to name build artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
  pub name: String,
  pub version: Option<String>,
}

impl Package {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      version: None,
    }
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = Some(version.into());
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMetadata {
  pub description: String,
  pub minecraft: MinecraftVersion,
  pub package: Option<Package>,
}

impl PackMetadata {
  pub fn new(description: impl Into<String>, minecraft: MinecraftVersion) -> Self {
    Self {
      description: description.into(),
      minecraft,
      package: None,
    }
  }

  pub fn with_package(mut self, package: Package) -> Self {
    self.package = Some(package);
    self
  }
}

#[derive(Serialize)]
struct McMeta<'a> {
  pack: McMetaPack<'a>,
}

#[derive(Serialize)]
struct McMetaPack<'a> {
  description: &'a str,
  pack_format: u32,
}

/// A data pack or resource pack under construction.
pub struct Pack {
  pack_type: PackType,
  metadata: PackMetadata,
  formats: PackFormats,
  namespaces: BTreeMap<String, Namespace>,
  macro_ids: MacroIds,
}

impl Pack {
  pub fn new(pack_type: PackType, metadata: PackMetadata) -> Result<Self, PackError> {
    let formats = PackFormats::resolve(metadata.minecraft)?;
    Ok(Self {
      pack_type,
      metadata,
      formats,
      namespaces: BTreeMap::new(),
      macro_ids: MacroIds::new(),
    })
  }

  pub fn datapack(metadata: PackMetadata) -> Result<Self, PackError> {
    Self::new(PackType::Data, metadata)
  }

  pub fn resourcepack(metadata: PackMetadata) -> Result<Self, PackError> {
    Self::new(PackType::Resource, metadata)
  }

  /// The namespace `name`, created on first use.
  pub fn namespace(&mut self, name: &str) -> Result<&mut Namespace, RegistryError> {
    match self.namespaces.entry(name.to_string()) {
      Entry::Occupied(entry) => Ok(entry.into_mut()),
      Entry::Vacant(entry) => {
        let namespace = Namespace::new(name, self.pack_type, self.formats)?;
        Ok(entry.insert(namespace))
      }
    }
  }

  /// Define a macro with an identity unique within this pack.
  pub fn define_macro<A, R, F>(&mut self, body: F) -> MacroDef<A, R>
  where
    A: 'static,
    R: 'static,
    F: Fn(A, &mut Namespace, &str) -> Result<R, RegistryError> + 'static,
  {
    MacroDef::new(self.macro_ids.mint(), body)
  }

  /// The token minter, for macro definitions built outside of
  /// [`Pack::define_macro`].
  pub fn macro_ids(&mut self) -> &mut MacroIds {
    &mut self.macro_ids
  }

  pub fn pack_type(&self) -> PackType {
    self.pack_type
  }

  pub fn metadata(&self) -> &PackMetadata {
    &self.metadata
  }

  pub fn formats(&self) -> PackFormats {
    self.formats
  }

  pub fn pack_format(&self) -> u32 {
    self.formats.for_pack(self.pack_type)
  }

  pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
    self.namespaces.values()
  }

  /// Check every namespace for open reservations.
  ///
  /// All leftovers across the pack are collected into one error.
  pub fn validate(&self) -> Result<(), RegistryError> {
    let unfulfilled: Vec<String> = self
      .namespaces
      .values()
      .flat_map(Namespace::pending_reservations)
      .collect();
    if unfulfilled.is_empty() {
      return Ok(());
    }

    for identifier in &unfulfilled {
      error!(identifier = %identifier, "reserved but never initialized");
    }
    Err(RegistryError::UnfulfilledReservations(unfulfilled))
  }

  /// Buffer the whole pack into `output` without committing it.
  pub fn plan<B: Backend>(&self, output: &mut Output<B>) -> Result<(), PackError> {
    self.validate()?;

    output.file("pack.mcmeta").write_json(&McMeta {
      pack: McMetaPack {
        description: &self.metadata.description,
        pack_format: self.pack_format(),
      },
    })?;

    for (name, namespace) in &self.namespaces {
      let base = Path::new(self.pack_type.folder()).join(name);
      namespace.save(&mut output.with_base(base))?;
    }
    Ok(())
  }

  /// Plan the pack into `output`, then commit it.
  ///
  /// Nothing is written if planning fails or the backend refuses
  /// permission. Returns the path the pack was saved to.
  pub async fn save<B: Backend>(&self, mut output: Output<B>) -> Result<PathBuf, PackError> {
    self.plan(&mut output)?;

    let path = output.save_path().to_path_buf();
    if !output.request_permissions().await {
      error!(path = %path.display(), "no permission to save {} pack", self.pack_type);
      return Err(PackError::PermissionDenied { path });
    }

    output.complete().await?;
    info!(path = %path.display(), namespaces = self.namespaces.len(), "saved {} pack", self.pack_type);
    Ok(path)
  }
}

impl fmt::Debug for Pack {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pack")
      .field("pack_type", &self.pack_type)
      .field("metadata", &self.metadata)
      .field("formats", &self.formats)
      .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
      .finish()
  }
}

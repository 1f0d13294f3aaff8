//! Content copied in from outside the pack definition.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::namespace::{Namespace, RegistryError};
use crate::output::{OutputError, OutputFile};

use super::{Member, MemberKind, MemberType};

/// A file copied byte for byte into `<folder>/<path><.ext>`, where the
/// extension comes from the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
  from: PathBuf,
  folder: String,
}

impl Include {
  pub fn new(from: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      folder: folder.into(),
    }
  }

  pub fn source(&self) -> &Path {
    &self.from
  }
}

impl Member for Include {
  fn kind(&self) -> MemberKind {
    Self::KIND
  }

  fn on_add(&mut self, namespace: &mut Namespace, path: &str) -> Result<(), RegistryError> {
    if !self.from.is_file() {
      return Err(RegistryError::MissingSource {
        identifier: format!("{}:{}", namespace.name(), path),
        source_path: self.from.clone(),
      });
    }
    Ok(())
  }

  fn location(&self, path: &str) -> PathBuf {
    let name = match self.from.extension() {
      Some(ext) => format!("{}.{}", path, ext.to_string_lossy()),
      None => path.to_string(),
    };
    Path::new(&self.folder).join(name)
  }

  fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError> {
    let bytes = std::fs::read(&self.from).map_err(|source| OutputError::Read {
      path: self.from.clone(),
      source,
    })?;
    file.write(bytes);
    Ok(())
  }
}

impl MemberType for Include {
  const KIND: MemberKind = MemberKind::Include;
}

/// Arbitrary JSON placed at `<folder>/<path>.json`, for definition types the
/// library has no dedicated kind for.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonInclude {
  folder: String,
  data: Value,
}

impl JsonInclude {
  pub fn new(folder: impl Into<String>, data: Value) -> Self {
    Self {
      folder: folder.into(),
      data,
    }
  }

  pub fn from_serialize<T: Serialize + ?Sized>(folder: impl Into<String>, data: &T) -> Result<Self, serde_json::Error> {
    Ok(Self::new(folder, serde_json::to_value(data)?))
  }
}

impl Member for JsonInclude {
  fn kind(&self) -> MemberKind {
    Self::KIND
  }

  fn location(&self, path: &str) -> PathBuf {
    Path::new(&self.folder).join(format!("{}.json", path))
  }

  fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError> {
    file.write_json(&self.data)
  }
}

impl MemberType for JsonInclude {
  const KIND: MemberKind = MemberKind::JsonInclude;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn include_location_keeps_source_extension() {
    let include = Include::new("assets/drops.json", "loot_table");
    assert_eq!(include.location("chest/extra"), PathBuf::from("loot_table/chest/extra.json"));
  }

  #[test]
  fn include_without_extension() {
    let include = Include::new("LICENSE", "");
    assert_eq!(include.location("license"), PathBuf::from("license"));
  }

  #[test]
  fn json_include_location() {
    let include = JsonInclude::new("worldgen/biome", serde_json::json!({}));
    assert_eq!(include.location("tundra"), PathBuf::from("worldgen/biome/tundra.json"));
  }
}

//! Game versions and the pack format numbers they expect.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::sequence::{SequenceError, SequenceGraph};

use super::{PackError, PackType};

/// First data pack format that loads dialog definitions.
pub const DIALOG_MIN_FORMAT: u32 = 77;

/// Game versions with known pack formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MinecraftVersion {
  #[default]
  #[serde(rename = "1.21.5")]
  V1_21_5,
  #[serde(rename = "1.21.6")]
  V1_21_6,
  #[serde(rename = "1.21.7")]
  V1_21_7,
  #[serde(rename = "1.21.8")]
  V1_21_8,
}

impl MinecraftVersion {
  pub const ALL: [MinecraftVersion; 4] = [
    MinecraftVersion::V1_21_5,
    MinecraftVersion::V1_21_6,
    MinecraftVersion::V1_21_7,
    MinecraftVersion::V1_21_8,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      MinecraftVersion::V1_21_5 => "1.21.5",
      MinecraftVersion::V1_21_6 => "1.21.6",
      MinecraftVersion::V1_21_7 => "1.21.7",
      MinecraftVersion::V1_21_8 => "1.21.8",
    }
  }

  fn data_format(self) -> u32 {
    match self {
      MinecraftVersion::V1_21_5 => 71,
      MinecraftVersion::V1_21_6 => 80,
      MinecraftVersion::V1_21_7 | MinecraftVersion::V1_21_8 => 81,
    }
  }

  fn resource_format(self) -> u32 {
    match self {
      MinecraftVersion::V1_21_5 => 55,
      MinecraftVersion::V1_21_6 => 63,
      MinecraftVersion::V1_21_7 | MinecraftVersion::V1_21_8 => 64,
    }
  }
}

impl fmt::Display for MinecraftVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MinecraftVersion {
  type Err = PackError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    MinecraftVersion::ALL
      .into_iter()
      .find(|version| version.as_str() == s)
      .ok_or_else(|| PackError::UnsupportedVersion(s.to_string()))
  }
}

/// Format numbers and feature flags derived from one game version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackFormats {
  pub data: u32,
  pub resource: u32,
  /// Whether data packs of this version can define dialogs.
  pub dialogs: bool,
}

impl PackFormats {
  pub fn resolve(version: MinecraftVersion) -> Result<Self, SequenceError> {
    let resolved = SequenceGraph::<u32>::new()
      .value("data", version.data_format())
      .value("resource", version.resource_format())
      .value("dialog_min", DIALOG_MIN_FORMAT)
      .derived("dialogs", |t| {
        let supported = t.get("data")? >= t.get("dialog_min")?;
        Ok(u32::from(supported))
      })
      .resolve()?;

    Ok(Self {
      data: *resolved.value("data")?,
      resource: *resolved.value("resource")?,
      dialogs: *resolved.value("dialogs")? != 0,
    })
  }

  pub fn for_pack(&self, pack_type: PackType) -> u32 {
    match pack_type {
      PackType::Data => self.data,
      PackType::Resource => self.resource,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_round_trips_through_str() {
    for version in MinecraftVersion::ALL {
      assert_eq!(version.to_string().parse::<MinecraftVersion>().unwrap(), version);
    }
  }

  #[test]
  fn unknown_version_is_rejected() {
    assert!(matches!(
      "1.20.1".parse::<MinecraftVersion>(),
      Err(PackError::UnsupportedVersion(v)) if v == "1.20.1"
    ));
  }

  #[test]
  fn formats_for_1_21_5() {
    let formats = PackFormats::resolve(MinecraftVersion::V1_21_5).unwrap();
    assert_eq!(formats.data, 71);
    assert_eq!(formats.resource, 55);
    assert!(!formats.dialogs);
    assert_eq!(formats.for_pack(PackType::Resource), 55);
  }

  #[test]
  fn dialogs_from_1_21_6() {
    let formats = PackFormats::resolve(MinecraftVersion::V1_21_6).unwrap();
    assert_eq!(formats.data, 80);
    assert!(formats.dialogs);
  }
}

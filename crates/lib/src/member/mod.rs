//! Member kinds and the capability every artifact provides to a namespace.
//!
//! A member is one named unit of generated content. The registry never looks
//! at a member's concrete type: it buckets members by their [`MemberKind`] and
//! talks to them through the [`Member`] trait.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use crate::namespace::{Namespace, RegistryError};
use crate::output::{OutputError, OutputFile};
use crate::pack::PackType;

pub mod function;
pub mod include;
pub mod json;

pub use function::Function;
pub use include::{Include, JsonInclude};
pub use json::{Advancement, Dialog, Enchantment, Font, ItemModel, ItemModifier, LootTable, Predicate, Recipe};

/// Explicit kind tag for every member type.
///
/// Used as the registry's bucket key and to look up where a kind lives on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
  Function,
  Advancement,
  Recipe,
  LootTable,
  Predicate,
  ItemModifier,
  Enchantment,
  Dialog,
  Font,
  ItemModel,
  /// A file copied verbatim from disk.
  Include,
  /// Arbitrary JSON at a caller chosen folder.
  JsonInclude,
}

impl MemberKind {
  /// Folder within the namespace. Empty for kinds that pick their own location.
  pub fn data_folder(self) -> &'static str {
    match self {
      MemberKind::Function => "function",
      MemberKind::Advancement => "advancement",
      MemberKind::Recipe => "recipe",
      MemberKind::LootTable => "loot_table",
      MemberKind::Predicate => "predicate",
      MemberKind::ItemModifier => "item_modifier",
      MemberKind::Enchantment => "enchantment",
      MemberKind::Dialog => "dialog",
      MemberKind::Font => "font",
      MemberKind::ItemModel => "items",
      MemberKind::Include | MemberKind::JsonInclude => "",
    }
  }

  /// Extension without the leading dot. Empty for [`MemberKind::Include`],
  /// which keeps the source file's extension.
  pub fn file_extension(self) -> &'static str {
    match self {
      MemberKind::Function => "mcfunction",
      MemberKind::Include => "",
      _ => "json",
    }
  }

  /// The pack type this kind belongs to, or `None` if it fits either.
  pub fn pack_type(self) -> Option<PackType> {
    match self {
      MemberKind::Font | MemberKind::ItemModel => Some(PackType::Resource),
      MemberKind::Include | MemberKind::JsonInclude => None,
      _ => Some(PackType::Data),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      MemberKind::Function => "function",
      MemberKind::Advancement => "advancement",
      MemberKind::Recipe => "recipe",
      MemberKind::LootTable => "loot table",
      MemberKind::Predicate => "predicate",
      MemberKind::ItemModifier => "item modifier",
      MemberKind::Enchantment => "enchantment",
      MemberKind::Dialog => "dialog",
      MemberKind::Font => "font",
      MemberKind::ItemModel => "item model",
      MemberKind::Include => "included file",
      MemberKind::JsonInclude => "included JSON",
    }
  }
}

impl fmt::Display for MemberKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Upcast helper so the registry can recover a member's concrete type.
pub trait AsAny: Any {
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

/// The capability a namespace needs from an artifact.
pub trait Member: AsAny {
  fn kind(&self) -> MemberKind;

  /// Runs exactly once when the member is registered, either through
  /// [`Namespace::add`] or through [`Namespace::initialize`]. Used for
  /// compatibility checks and for registering companion content.
  fn on_add(&mut self, _namespace: &mut Namespace, _path: &str) -> Result<(), RegistryError> {
    Ok(())
  }

  /// Location of the member's file relative to the namespace root.
  fn location(&self, path: &str) -> PathBuf {
    let kind = self.kind();
    PathBuf::from(kind.data_folder()).join(format!("{}.{}", path, kind.file_extension()))
  }

  fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError>;
}

/// A concrete member type with a statically known kind.
pub trait MemberType: Member + Sized {
  const KIND: MemberKind;
}

/// Members that several call sites may contribute to.
pub trait Mergeable {
  /// Fold `other` into `self`.
  fn merge(&mut self, other: Self);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_metadata() {
    assert_eq!(MemberKind::Function.data_folder(), "function");
    assert_eq!(MemberKind::Function.file_extension(), "mcfunction");
    assert_eq!(MemberKind::ItemModel.data_folder(), "items");
    assert_eq!(MemberKind::LootTable.file_extension(), "json");
    assert_eq!(MemberKind::Font.pack_type(), Some(PackType::Resource));
    assert_eq!(MemberKind::Include.pack_type(), None);
  }

  #[test]
  fn default_location_uses_folder_and_extension() {
    let function = Function::new(["say hi"]);
    assert_eq!(function.location("foo/bar"), PathBuf::from("function/foo/bar.mcfunction"));
  }
}

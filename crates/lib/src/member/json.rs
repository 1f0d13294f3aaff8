//! JSON-encoded definitions.
//!
//! Every kind here holds an already serialized [`serde_json::Value`]. Build one
//! from a `json!` literal or from any [`Serialize`] value; identifiers inside it
//! serialize to their `namespace:path` form.

use serde::Serialize;
use serde_json::Value;

use crate::namespace::{Namespace, RegistryError};
use crate::output::{OutputError, OutputFile};

use super::{Member, MemberKind, MemberType};

macro_rules! json_member {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq)]
    pub struct $name {
      data: Value,
    }

    impl $name {
      pub fn new(data: Value) -> Self {
        Self { data }
      }

      pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(data).map(Self::new)
      }

      pub fn data(&self) -> &Value {
        &self.data
      }

      pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
      }
    }

    impl From<Value> for $name {
      fn from(data: Value) -> Self {
        Self::new(data)
      }
    }

    impl MemberType for $name {
      const KIND: MemberKind = MemberKind::$name;
    }
  };
}

/// `Member` impl for kinds with no registration hook.
macro_rules! plain_json_member {
  ($($name:ident),* $(,)?) => {
    $(
      impl Member for $name {
        fn kind(&self) -> MemberKind {
          Self::KIND
        }

        fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError> {
          file.write_json(&self.data)
        }
      }
    )*
  };
}

json_member!(
  /// Grants rewards when its criteria are met.
  Advancement
);
json_member!(Recipe);
json_member!(LootTable);
json_member!(Predicate);
json_member!(ItemModifier);
json_member!(Enchantment);
json_member!(
  /// A modal screen. Requires a data format that supports dialogs.
  Dialog
);
json_member!(
  /// Resource pack glyph provider definition.
  Font
);
json_member!(
  /// Resource pack item model definition.
  ItemModel
);

plain_json_member!(Advancement, Recipe, LootTable, Predicate, ItemModifier, Enchantment, Font, ItemModel);

impl Member for Dialog {
  fn kind(&self) -> MemberKind {
    Self::KIND
  }

  fn on_add(&mut self, namespace: &mut Namespace, path: &str) -> Result<(), RegistryError> {
    if !namespace.formats().dialogs {
      return Err(RegistryError::Incompatible {
        identifier: format!("{}:{}", namespace.name(), path),
        reason: format!(
          "dialogs need data format {} or newer, but this pack uses {}",
          crate::pack::DIALOG_MIN_FORMAT,
          namespace.formats().data
        ),
      });
    }
    Ok(())
  }

  fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError> {
    file.write_json(&self.data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[derive(Serialize)]
  struct Shapeless {
    #[serde(rename = "type")]
    kind: &'static str,
    ingredients: Vec<&'static str>,
  }

  #[test]
  fn from_serialize_keeps_structure() {
    let recipe = Recipe::from_serialize(&Shapeless {
      kind: "crafting_shapeless",
      ingredients: vec!["stick"],
    })
    .unwrap();
    assert_eq!(
      recipe.data(),
      &json!({ "type": "crafting_shapeless", "ingredients": ["stick"] })
    );
  }

  #[test]
  fn kinds_are_distinct() {
    assert_eq!(Advancement::KIND, MemberKind::Advancement);
    assert_eq!(ItemModel::new(json!({})).kind(), MemberKind::ItemModel);
  }
}

//! Named sets of identifiers.
//!
//! A tag is shared: every [`Tag`] handle obtained from
//! [`Namespace::tag`](crate::namespace::Namespace::tag) for the same name and
//! kind points at the same entries, so independent call sites can contribute
//! to one manifest.
//!
//! Nested tags are recorded by identifier, not by value. A nested tag's own
//! contents may keep growing after it is nested; only the emission order is
//! fixed: direct values first, then nested references.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::Serialize;

use crate::identifier::Identifier;

/// The mutable contents behind a tag.
#[derive(Debug, Default)]
pub struct TagEntries {
  values: Vec<String>,
  nested: Vec<String>,
  replace: bool,
}

impl TagEntries {
  fn push_value(&mut self, value: String) {
    if !self.values.contains(&value) {
      self.values.push(value);
    }
  }

  fn push_nested(&mut self, reference: String) {
    if !self.nested.contains(&reference) {
      self.nested.push(reference);
    }
  }

  pub fn len(&self) -> usize {
    self.values.len() + self.nested.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The JSON document written for this tag.
  pub fn manifest(&self) -> TagManifest {
    TagManifest {
      values: self.values.iter().chain(&self.nested).cloned().collect(),
      replace: self.replace,
    }
  }
}

/// Serialized form: `{"values": [...], "replace": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagManifest {
  pub values: Vec<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub replace: bool,
}

/// A handle to a tag over members of kind `K`.
pub struct Tag<K> {
  identifier: Identifier<Tag<K>>,
  entries: Rc<RefCell<TagEntries>>,
  _kind: PhantomData<fn() -> K>,
}

impl<K> Tag<K> {
  pub(crate) fn new(identifier: Identifier<Tag<K>>, entries: Rc<RefCell<TagEntries>>) -> Self {
    Self {
      identifier,
      entries,
      _kind: PhantomData,
    }
  }

  pub fn identifier(&self) -> &Identifier<Tag<K>> {
    &self.identifier
  }

  /// `#namespace:path`, the form used to reference a tag from commands and
  /// other tags.
  pub fn reference(&self) -> String {
    format!("#{}", self.identifier)
  }

  /// Add one identifier. Adding an identifier twice is a no-op.
  pub fn add(&self, identifier: &Identifier<K>) -> &Self {
    self.entries.borrow_mut().push_value(identifier.to_string());
    self
  }

  pub fn add_all<'a, I>(&self, identifiers: I) -> &Self
  where
    I: IntoIterator<Item = &'a Identifier<K>>,
    K: 'a,
  {
    let mut entries = self.entries.borrow_mut();
    for identifier in identifiers {
      entries.push_value(identifier.to_string());
    }
    drop(entries);
    self
  }

  /// Include every member of another tag of the same kind.
  pub fn add_tag(&self, tag: &Tag<K>) -> &Self {
    self.entries.borrow_mut().push_nested(tag.reference());
    self
  }

  /// Make this tag override lower-priority packs instead of merging with them.
  pub fn set_replace(&self, replace: bool) -> &Self {
    self.entries.borrow_mut().replace = replace;
    self
  }

  pub fn manifest(&self) -> TagManifest {
    self.entries.borrow().manifest()
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }
}

impl<K> Clone for Tag<K> {
  fn clone(&self) -> Self {
    Self {
      identifier: self.identifier.clone(),
      entries: Rc::clone(&self.entries),
      _kind: PhantomData,
    }
  }
}

impl<K> fmt::Debug for Tag<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Tag")
      .field("identifier", &self.identifier)
      .field("entries", &self.entries.borrow())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Script;

  fn tag(path: &str) -> Tag<Script> {
    Tag::new(Identifier::new("test", path), Rc::default())
  }

  fn id(path: &str) -> Identifier<Script> {
    Identifier::new("test", path)
  }

  #[test]
  fn duplicates_collapse() {
    let load = tag("load");
    load.add(&id("a")).add(&id("b")).add(&id("a"));
    assert_eq!(load.manifest().values, vec!["test:a", "test:b"]);
  }

  #[test]
  fn nested_tags_come_after_values() {
    let load = tag("load");
    let inner = tag("inner");
    load.add_tag(&inner);
    load.add(&id("a"));
    inner.add(&id("later"));
    assert_eq!(load.manifest().values, vec!["test:a", "#test:inner"]);
  }

  #[test]
  fn clones_share_entries() {
    let load = tag("load");
    let other = load.clone();
    other.add_all([&id("a"), &id("b")]);
    assert_eq!(load.len(), 2);
  }

  #[test]
  fn handles_from_namespace_share_entries() {
    use crate::member::Function;
    use crate::pack::{MinecraftVersion, PackFormats, PackType};

    let formats = PackFormats::resolve(MinecraftVersion::default()).unwrap();
    let mut ns = crate::Namespace::new("test", PackType::Data, formats).unwrap();
    let first = ns.tag::<Function>("load").unwrap();
    let second = ns.tag::<Function>("load").unwrap();
    first.add(&Identifier::new("test", "a"));
    second.add(&Identifier::new("test", "b"));

    assert_eq!(first.identifier().to_string(), "test:load");
    assert_eq!(first.manifest().values, vec!["test:a", "test:b"]);
  }

  #[test]
  fn replace_only_serialized_when_set() {
    let load = tag("load");
    load.add(&id("a"));
    assert_eq!(
      serde_json::to_string(&load.manifest()).unwrap(),
      r#"{"values":["test:a"]}"#
    );
    load.set_replace(true);
    assert_eq!(
      serde_json::to_string(&load.manifest()).unwrap(),
      r#"{"values":["test:a"],"replace":true}"#
    );
  }

  #[test]
  fn reference_has_hash_prefix() {
    assert_eq!(tag("tick").reference(), "#test:tick");
  }
}

//! Typed `namespace:path` references.
//!
//! An [`Identifier`] names a member or tag of a known kind. The kind is a
//! phantom marker only: it stops an `Identifier<Function>` from being used
//! where an `Identifier<Advancement>` is expected, but carries no runtime
//! payload. Identifiers can be minted before the content they name exists
//! (see [`Namespace::reserve`](crate::namespace::Namespace::reserve)).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::namespace::RegistryError;

/// A reference to a named artifact of kind `K`, printable as `namespace:path`.
pub struct Identifier<K: ?Sized> {
  namespace: String,
  path: String,
  _kind: PhantomData<fn() -> K>,
}

impl<K: ?Sized> Identifier<K> {
  /// Create an identifier without validating either half.
  ///
  /// Use [`Identifier::from_str`] for user supplied strings.
  pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      path: path.into(),
      _kind: PhantomData,
    }
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  /// Reinterpret this identifier as naming a different kind.
  ///
  /// Needed when referencing content from another pack whose type is only
  /// known by convention.
  pub fn cast<T: ?Sized>(&self) -> Identifier<T> {
    Identifier::new(self.namespace.clone(), self.path.clone())
  }
}

impl<K: ?Sized> Clone for Identifier<K> {
  fn clone(&self) -> Self {
    Self::new(self.namespace.clone(), self.path.clone())
  }
}

impl<K: ?Sized> PartialEq for Identifier<K> {
  fn eq(&self, other: &Self) -> bool {
    self.namespace == other.namespace && self.path == other.path
  }
}

impl<K: ?Sized> Eq for Identifier<K> {}

impl<K: ?Sized> Hash for Identifier<K> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.namespace.hash(state);
    self.path.hash(state);
  }
}

impl<K: ?Sized> fmt::Display for Identifier<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.namespace, self.path)
  }
}

impl<K: ?Sized> fmt::Debug for Identifier<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Identifier({})", self)
  }
}

impl<K: ?Sized> Serialize for Identifier<K> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<K: ?Sized> FromStr for Identifier<K> {
  type Err = RegistryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (namespace, path) = s.split_once(':').ok_or_else(|| RegistryError::InvalidIdentifier {
      identifier: s.to_string(),
      reason: "expected 'namespace:path'".to_string(),
    })?;
    validate_namespace(namespace)?;
    validate_path(path)?;
    Ok(Self::new(namespace, path))
  }
}

/// Check that a namespace name only uses `[a-z0-9_.-]`.
pub fn validate_namespace(name: &str) -> Result<(), RegistryError> {
  if name.is_empty() {
    return Err(invalid(name, "namespace is empty"));
  }
  if let Some(c) = name.chars().find(|c| !is_namespace_char(*c)) {
    return Err(invalid(name, &format!("invalid character '{}' in namespace", c)));
  }
  Ok(())
}

/// Check that a member path only uses `[a-z0-9_./-]` and has no empty segments.
pub fn validate_path(path: &str) -> Result<(), RegistryError> {
  if path.is_empty() {
    return Err(invalid(path, "path is empty"));
  }
  if let Some(c) = path.chars().find(|c| !is_namespace_char(*c) && *c != '/') {
    return Err(invalid(path, &format!("invalid character '{}' in path", c)));
  }
  if path.split('/').any(str::is_empty) {
    return Err(invalid(path, "path has an empty segment"));
  }
  Ok(())
}

fn is_namespace_char(c: char) -> bool {
  c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

fn invalid(identifier: &str, reason: &str) -> RegistryError {
  RegistryError::InvalidIdentifier {
    identifier: identifier.to_string(),
    reason: reason.to_string(),
  }
}

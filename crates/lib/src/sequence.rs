//! Lazy evaluation of mutually referential named values.
//!
//! A [`SequenceGraph`] is a table of named nodes. A node is either a literal
//! value or a function of the other nodes. Resolution does not depend on
//! declaration order: a derived node reads whatever it needs through a
//! [`Resolver`], and every read resolves its target on demand.
//!
//! ```text
//! a = 1
//! b = a + 1       resolve()  ->  { a: 1, b: 2, c: 3 }
//! c = b + 1
//! ```
//!
//! A node that transitively reads itself aborts the whole resolution with
//! [`SequenceError::CircularDependency`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum SequenceError {
  #[error("circular dependency: {chain}")]
  CircularDependency { chain: String },

  #[error("unknown node '{0}'")]
  UnknownNode(String),
}

type Derive<V> = dyn Fn(&mut Resolver<'_, V>) -> Result<V, SequenceError>;

enum Node<V> {
  Value(V),
  Derived(Box<Derive<V>>),
}

/// An unresolved table of named values.
pub struct SequenceGraph<V> {
  nodes: BTreeMap<String, Node<V>>,
}

impl<V> Default for SequenceGraph<V> {
  fn default() -> Self {
    Self { nodes: BTreeMap::new() }
  }
}

impl<V: Clone> SequenceGraph<V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// A literal node. Replaces any node of the same name.
  pub fn value(mut self, name: impl Into<String>, value: V) -> Self {
    self.nodes.insert(name.into(), Node::Value(value));
    self
  }

  /// A node computed from other nodes. Replaces any node of the same name.
  pub fn derived<F>(mut self, name: impl Into<String>, derive: F) -> Self
  where
    F: Fn(&mut Resolver<'_, V>) -> Result<V, SequenceError> + 'static,
  {
    self.nodes.insert(name.into(), Node::Derived(Box::new(derive)));
    self
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Resolve every node.
  pub fn resolve(&self) -> Result<Resolved<V>, SequenceError> {
    let mut resolver = Resolver {
      nodes: &self.nodes,
      resolved: BTreeMap::new(),
      unresolved: self.nodes.keys().cloned().collect(),
      stack: Vec::new(),
    };

    // Dependencies resolve themselves on first read, so the order here is
    // irrelevant.
    while let Some(name) = resolver.unresolved.pop_last() {
      resolver.evaluate(&name)?;
    }

    debug!(nodes = resolver.resolved.len(), "resolved sequence graph");
    Ok(Resolved {
      values: resolver.resolved,
    })
  }
}

impl<V> fmt::Debug for SequenceGraph<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SequenceGraph")
      .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// Read-through view of a graph under resolution.
pub struct Resolver<'a, V> {
  nodes: &'a BTreeMap<String, Node<V>>,
  resolved: BTreeMap<String, V>,
  /// Nodes not yet started. A node that is neither here nor resolved is
  /// being computed further up the stack.
  unresolved: BTreeSet<String>,
  stack: Vec<String>,
}

impl<V: Clone> Resolver<'_, V> {
  /// The value of node `name`, resolving it first if needed.
  pub fn get(&mut self, name: &str) -> Result<V, SequenceError> {
    if let Some(value) = self.resolved.get(name) {
      return Ok(value.clone());
    }
    if !self.nodes.contains_key(name) {
      return Err(SequenceError::UnknownNode(name.to_string()));
    }
    if !self.unresolved.remove(name) {
      let mut chain = self.stack.clone();
      chain.push(name.to_string());
      return Err(SequenceError::CircularDependency {
        chain: chain.join(" -> "),
      });
    }
    self.evaluate(name)
  }

  fn evaluate(&mut self, name: &str) -> Result<V, SequenceError> {
    let nodes = self.nodes;
    let node = nodes
      .get(name)
      .ok_or_else(|| SequenceError::UnknownNode(name.to_string()))?;

    self.stack.push(name.to_string());
    let value = match node {
      Node::Value(value) => value.clone(),
      Node::Derived(derive) => derive(self)?,
    };
    self.stack.pop();

    trace!(node = name, "resolved node");
    self.resolved.insert(name.to_string(), value.clone());
    Ok(value)
  }
}

/// A fully resolved, immutable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<V> {
  values: BTreeMap<String, V>,
}

impl<V> Resolved<V> {
  pub fn get(&self, name: &str) -> Option<&V> {
    self.values.get(name)
  }

  pub fn value(&self, name: &str) -> Result<&V, SequenceError> {
    self
      .values
      .get(name)
      .ok_or_else(|| SequenceError::UnknownNode(name.to_string()))
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
    self.values.iter().map(|(name, value)| (name.as_str(), value))
  }
}

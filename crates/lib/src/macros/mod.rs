//! Reusable, identity-tracked registration logic.
//!
//! A macro definition ([`MacroDef`]) is minted once with a [`MacroId`] token.
//! Calling it with arguments produces a one-shot [`Macro`] that
//! [`Namespace::add_macro`](crate::namespace::Namespace::add_macro) runs at a
//! path. The namespace remembers which paths every token has already run at,
//! so the same definition can never register its content twice at one path.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::namespace::{Namespace, RegistryError};

pub mod right_click;

/// Identity shared by every invocation of one macro definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(u64);

impl fmt::Display for MacroId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

static NEXT_MACRO_ID: AtomicU64 = AtomicU64::new(0);

/// Mints [`MacroId`]s.
///
/// Ids come from one process-wide counter, so definitions minted through
/// different minters (a data pack and a resource pack, say) never collide.
#[derive(Debug, Default)]
pub struct MacroIds {
  minted: usize,
}

impl MacroIds {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn mint(&mut self) -> MacroId {
    self.minted += 1;
    MacroId(NEXT_MACRO_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// How many ids this minter has handed out.
  pub fn minted(&self) -> usize {
    self.minted
  }
}

type Body<A, R> = dyn Fn(A, &mut Namespace, &str) -> Result<R, RegistryError>;

/// A macro definition taking arguments `A` and producing `R`.
pub struct MacroDef<A, R> {
  id: MacroId,
  body: Rc<Body<A, R>>,
}

impl<A: 'static, R: 'static> MacroDef<A, R> {
  pub fn new<F>(id: MacroId, body: F) -> Self
  where
    F: Fn(A, &mut Namespace, &str) -> Result<R, RegistryError> + 'static,
  {
    Self { id, body: Rc::new(body) }
  }

  pub fn id(&self) -> MacroId {
    self.id
  }

  /// Bind arguments, ready to be run at a path.
  pub fn call(&self, args: A) -> Macro<R> {
    let body = Rc::clone(&self.body);
    Macro::new(self.id, move |namespace, path| body(args, namespace, path))
  }
}

impl<A, R> Clone for MacroDef<A, R> {
  fn clone(&self) -> Self {
    Self {
      id: self.id,
      body: Rc::clone(&self.body),
    }
  }
}

/// One pending macro invocation.
pub struct Macro<R> {
  id: MacroId,
  callback: Box<dyn FnOnce(&mut Namespace, &str) -> Result<R, RegistryError>>,
}

impl<R> Macro<R> {
  pub fn new<F>(id: MacroId, callback: F) -> Self
  where
    F: FnOnce(&mut Namespace, &str) -> Result<R, RegistryError> + 'static,
  {
    Self {
      id,
      callback: Box::new(callback),
    }
  }

  pub fn id(&self) -> MacroId {
    self.id
  }

  pub(crate) fn invoke(self, namespace: &mut Namespace, path: &str) -> Result<R, RegistryError> {
    (self.callback)(namespace, path)
  }
}

impl<R> fmt::Debug for Macro<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Macro").field("id", &self.id).finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minted_ids_are_unique() {
    let mut ids = MacroIds::new();
    let a = ids.mint();
    let b = ids.mint();
    assert_ne!(a, b);
    assert_eq!(ids.minted(), 2);
  }

  #[test]
  fn separate_minters_never_collide() {
    let mut data = MacroIds::new();
    let mut resource = MacroIds::new();
    let ids = [data.mint(), resource.mint(), data.mint(), resource.mint()];
    for (i, a) in ids.iter().enumerate() {
      for b in &ids[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }

  #[test]
  fn calls_share_the_definition_id() {
    let mut ids = MacroIds::new();
    let def = MacroDef::new(ids.mint(), |n: u32, _: &mut Namespace, _: &str| Ok(n * 2));
    assert_eq!(def.call(1).id(), def.id());
    assert_eq!(def.clone().call(2).id(), def.id());
  }
}

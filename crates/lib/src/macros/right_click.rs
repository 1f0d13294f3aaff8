//! Run a function when a player right-clicks with a matching item.
//!
//! The macro registers, under `on_right_click/<name>`:
//!
//! - an advancement triggered by using (or finishing using) the item, whose
//!   reward is the callback function
//! - the callback function itself, prefixed with a command that revokes the
//!   advancement so it can fire again
//!
//! The item needs a `consumable` component for the game to report it as used.

use serde_json::{Value, json};

use crate::identifier::Identifier;
use crate::member::{Advancement, Function};
use crate::namespace::{Namespace, RegistryError};

use super::{MacroDef, MacroIds};

/// Arguments to the right-click macro.
#[derive(Debug, Clone)]
pub struct RightClick {
  /// Item sub-predicates the held item must match.
  pub predicates: Value,
  pub callback: Function,
  /// Fire when the use finishes instead of when it starts.
  pub on_finish: bool,
}

impl RightClick {
  pub fn new(predicates: Value, callback: Function) -> Self {
    Self {
      predicates,
      callback,
      on_finish: false,
    }
  }

  pub fn on_finish(mut self) -> Self {
    self.on_finish = true;
    self
  }
}

/// Define the right-click macro with a fresh identity.
pub fn define(ids: &mut MacroIds) -> MacroDef<RightClick, Identifier<Function>> {
  MacroDef::new(ids.mint(), handler)
}

fn handler(args: RightClick, namespace: &mut Namespace, name: &str) -> Result<Identifier<Function>, RegistryError> {
  let RightClick {
    predicates,
    mut callback,
    on_finish,
  } = args;
  let path = format!("on_right_click/{}", name);
  let trigger_kind = if on_finish { "consume_item" } else { "using_item" };

  let callback_id = namespace.reserve::<Function>(&path)?;
  let trigger = namespace.add(
    &path,
    Advancement::new(json!({
      "criteria": {
        "right_click": {
          "trigger": trigger_kind,
          "conditions": {
            "item": { "predicates": predicates },
          },
        },
      },
      "rewards": {
        "function": callback_id,
      },
    })),
  )?;

  callback.prepend(format!("advancement revoke @s only {}", trigger));
  namespace.initialize(&callback_id, callback)?;
  Ok(callback_id)
}

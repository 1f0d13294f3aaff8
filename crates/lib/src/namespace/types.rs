//! Error types for namespace registration and saving.

use std::path::PathBuf;

use thiserror::Error;

use crate::macros::MacroId;
use crate::member::MemberKind;
use crate::output::OutputError;
use crate::pack::PackType;

/// Errors raised while registering or saving namespace content.
///
/// All of these are fatal for the current save.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// `reserve` on a path that is already reserved or defined.
  #[error("the {kind} '{identifier}' is already reserved")]
  DuplicateReservation { identifier: String, kind: MemberKind },

  /// A second member at the same path and kind.
  #[error("the {kind} '{identifier}' is already defined")]
  DuplicateMember { identifier: String, kind: MemberKind },

  /// The same macro invoked twice at one path.
  #[error("macro {macro_id} was already invoked at '{identifier}'")]
  DuplicateMacroInvocation { identifier: String, macro_id: MacroId },

  /// `initialize` without a matching `reserve`.
  #[error("the {kind} '{identifier}' was not previously reserved")]
  UnreservedInitialization { identifier: String, kind: MemberKind },

  /// Reservations that were never initialized, one entry per identifier.
  #[error("reserved but never initialized: {}", .0.join(", "))]
  UnfulfilledReservations(Vec<String>),

  #[error("invalid identifier '{identifier}': {reason}")]
  InvalidIdentifier { identifier: String, reason: String },

  #[error("the {kind} '{identifier}' belongs in a {expected} pack, not a {actual} pack")]
  WrongPackType {
    identifier: String,
    kind: MemberKind,
    expected: PackType,
    actual: PackType,
  },

  /// A member's registration hook rejected the pack it is being added to.
  #[error("'{identifier}' is not compatible with this pack: {reason}")]
  Incompatible { identifier: String, reason: String },

  #[error("included file {} for '{identifier}' does not exist", .source_path.display())]
  MissingSource { identifier: String, source_path: PathBuf },

  #[error("failed to save '{identifier}': {source}")]
  Save {
    identifier: String,
    #[source]
    source: OutputError,
  },
}

//! conduit-lib: Core types and logic for Conduit
//!
//! This crate builds Minecraft data packs and resource packs from Rust code:
//! - `Namespace`: the registry that owns members and tags under one name
//! - `Member`: one generated file (function, advancement, recipe, ...)
//! - `Tag`: a shared, named set of identifiers
//! - `Macro`: identity-tracked registration logic run at a path
//! - `SequenceGraph`: lazy evaluator for mutually referential constants
//! - `Output`: buffered plan/commit destination with directory and zip backends
//! - `Pack`: a data pack or resource pack, and `build` to write both to disk

pub mod build;
pub mod identifier;
pub mod macros;
pub mod member;
pub mod namespace;
pub mod output;
pub mod pack;
pub mod sequence;
pub mod tag;

pub use identifier::Identifier;
pub use macros::{Macro, MacroDef, MacroId, MacroIds};
pub use member::{Member, MemberKind, MemberType, Mergeable};
pub use namespace::{Namespace, RegistryError};
pub use output::{ArchiveOutput, DirectoryOutput, Output, OutputError};
pub use pack::{MinecraftVersion, Pack, PackError, PackMetadata, PackType, Package};
pub use sequence::{SequenceError, SequenceGraph};
pub use tag::Tag;

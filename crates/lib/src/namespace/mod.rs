//! The member registry for one naming scope.
//!
//! A [`Namespace`] owns every member and tag declared under one name and
//! guarantees that each `(kind, path)` pair is defined exactly once.
//!
//! # Forward references
//!
//! Content often has to name something that is not built yet. A trigger
//! advancement must name the function it runs, while that function must name
//! the advancement it revokes. [`Namespace::reserve`] breaks the cycle by
//! handing out a usable [`Identifier`] first; [`Namespace::initialize`] later
//! supplies the member. A reservation is a consume-once token, and any
//! reservation still open at save time fails [`Namespace::validate`].
//!
//! # Layout
//!
//! ```text
//! <namespace>/
//! ├── <data-folder>/<path>.<ext>   # one file per member
//! └── tags/<data-folder>/<path>.json
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, error, info};

use crate::identifier::{Identifier, validate_namespace, validate_path};
use crate::macros::{Macro, MacroId};
use crate::member::{AsAny, Member, MemberKind, MemberType, Mergeable};
use crate::output::{DirOptions, SubOutput};
use crate::pack::{PackFormats, PackType};
use crate::tag::{Tag, TagEntries};

mod types;

pub use types::RegistryError;

pub struct Namespace {
  name: String,
  pack_type: PackType,
  formats: PackFormats,

  /// Promised but not yet initialized paths, per kind.
  reserved: BTreeMap<MemberKind, BTreeSet<String>>,

  /// Live members, per kind.
  members: BTreeMap<MemberKind, BTreeMap<String, Box<dyn Member>>>,

  /// Memoized tags, shared with every [`Tag`] handle of the same name.
  tags: BTreeMap<(MemberKind, String), Rc<RefCell<TagEntries>>>,

  /// Paths each macro definition has already been invoked at.
  macros: HashMap<MacroId, HashSet<String>>,
}

impl Namespace {
  pub fn new(name: impl Into<String>, pack_type: PackType, formats: PackFormats) -> Result<Self, RegistryError> {
    let name = name.into();
    validate_namespace(&name)?;
    Ok(Self {
      name,
      pack_type,
      formats,
      reserved: BTreeMap::new(),
      members: BTreeMap::new(),
      tags: BTreeMap::new(),
      macros: HashMap::new(),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn pack_type(&self) -> PackType {
    self.pack_type
  }

  pub fn formats(&self) -> PackFormats {
    self.formats
  }

  /// The format number of the pack this namespace is saved into.
  pub fn pack_format(&self) -> u32 {
    self.formats.for_pack(self.pack_type)
  }

  /// Promise that `path` will be defined as an `M` later.
  ///
  /// The returned identifier can be referenced immediately.
  ///
  /// # Errors
  ///
  /// `DuplicateReservation` if the path is already reserved or defined for
  /// this kind.
  pub fn reserve<M: MemberType>(&mut self, path: &str) -> Result<Identifier<M>, RegistryError> {
    self.check_registration(M::KIND, path)?;

    let defined = self.is_defined(M::KIND, path);
    if defined || !self.reserved.entry(M::KIND).or_default().insert(path.to_string()) {
      return Err(RegistryError::DuplicateReservation {
        identifier: self.qualify(path),
        kind: M::KIND,
      });
    }

    debug!(identifier = %self.qualify(path), kind = %M::KIND, "reserved");
    Ok(self.identifier(path))
  }

  /// Fulfil a reservation made by [`Namespace::reserve`].
  ///
  /// The member's [`Member::on_add`] hook runs here, exactly as it would for
  /// [`Namespace::add`].
  ///
  /// # Errors
  ///
  /// - `UnreservedInitialization` if the identifier was not reserved in this
  ///   namespace, or was already initialized.
  /// - `DuplicateMember` if a member already exists at that path.
  pub fn initialize<M: MemberType>(&mut self, identifier: &Identifier<M>, mut member: M) -> Result<(), RegistryError> {
    let path = identifier.path();
    let consumed = identifier.namespace() == self.name
      && self
        .reserved
        .get_mut(&M::KIND)
        .is_some_and(|reserved| reserved.remove(path));
    if !consumed {
      return Err(RegistryError::UnreservedInitialization {
        identifier: identifier.to_string(),
        kind: M::KIND,
      });
    }
    if self.is_defined(M::KIND, path) {
      return Err(RegistryError::DuplicateMember {
        identifier: identifier.to_string(),
        kind: M::KIND,
      });
    }

    member.on_add(self, path)?;
    self.insert(path, member)?;
    debug!(identifier = %identifier, kind = %M::KIND, "initialized");
    Ok(())
  }

  /// Register `member` at `path`.
  ///
  /// # Errors
  ///
  /// `DuplicateMember` if the path is already reserved or defined for this kind.
  pub fn add<M: MemberType>(&mut self, path: &str, mut member: M) -> Result<Identifier<M>, RegistryError> {
    self.check_registration(M::KIND, path)?;
    if self.is_taken(M::KIND, path) {
      return Err(RegistryError::DuplicateMember {
        identifier: self.qualify(path),
        kind: M::KIND,
      });
    }

    member.on_add(self, path)?;
    self.insert(path, member)?;
    debug!(identifier = %self.qualify(path), kind = %M::KIND, "added");
    Ok(self.identifier(path))
  }

  /// Merge `member` into the one already at `path`, or add it if there is none.
  ///
  /// The registration hook only runs when a new member is inserted.
  pub fn append_or_create<M: MemberType + Mergeable>(
    &mut self,
    path: &str,
    member: M,
  ) -> Result<Identifier<M>, RegistryError> {
    if !self.is_defined(M::KIND, path) {
      return self.add(path, member);
    }

    let identifier = self.identifier(path);
    let existing = self
      .members
      .get_mut(&M::KIND)
      .and_then(|bucket| bucket.get_mut(path))
      .and_then(|existing| AsAny::as_any_mut(&mut **existing).downcast_mut::<M>());
    match existing {
      Some(existing) => {
        existing.merge(member);
        debug!(identifier = %identifier, kind = %M::KIND, "merged");
        Ok(identifier)
      }
      // Another type registered under the same kind tag.
      None => Err(RegistryError::DuplicateMember {
        identifier: identifier.to_string(),
        kind: M::KIND,
      }),
    }
  }

  /// Invoke a macro at `path` and return whatever it produces.
  ///
  /// # Errors
  ///
  /// `DuplicateMacroInvocation` if the same macro definition already ran at
  /// `path` in this namespace, plus anything the macro itself returns.
  pub fn add_macro<R>(&mut self, path: &str, mac: Macro<R>) -> Result<R, RegistryError> {
    validate_path(path)?;

    let invoked = self.macros.entry(mac.id()).or_default();
    if !invoked.insert(path.to_string()) {
      return Err(RegistryError::DuplicateMacroInvocation {
        identifier: self.qualify(path),
        macro_id: mac.id(),
      });
    }

    debug!(identifier = %self.qualify(path), macro_id = %mac.id(), "invoking macro");
    mac.invoke(self, path)
  }

  /// The tag `path` for members of kind `K`.
  ///
  /// Repeated calls return handles to the same tag, so contributions from
  /// independent call sites accumulate into one manifest.
  pub fn tag<K: MemberType>(&mut self, path: &str) -> Result<Tag<K>, RegistryError> {
    self.check_registration(K::KIND, path)?;
    let entries = Rc::clone(self.tags.entry((K::KIND, path.to_string())).or_default());
    Ok(Tag::new(self.identifier(path), entries))
  }

  /// Whether a live member exists at `path` for kind `kind`.
  pub fn contains(&self, kind: MemberKind, path: &str) -> bool {
    self.is_defined(kind, path)
  }

  /// Number of live members across all kinds.
  pub fn member_count(&self) -> usize {
    self.members.values().map(BTreeMap::len).sum()
  }

  /// Reservations still waiting for [`Namespace::initialize`], as full
  /// identifiers.
  pub fn pending_reservations(&self) -> Vec<String> {
    self
      .reserved
      .values()
      .flatten()
      .map(|path| self.qualify(path))
      .collect()
  }

  /// Fail if any reservation was never initialized.
  ///
  /// Every leftover identifier is reported, not just the first.
  pub fn validate(&self) -> Result<(), RegistryError> {
    let unfulfilled = self.pending_reservations();
    if unfulfilled.is_empty() {
      return Ok(());
    }

    for identifier in &unfulfilled {
      error!(identifier = %identifier, "reserved but never initialized");
    }
    Err(RegistryError::UnfulfilledReservations(unfulfilled))
  }

  /// Validate, then buffer every member and tag into `output`, which should be
  /// rooted at this namespace's folder.
  pub fn save(&self, output: &mut SubOutput<'_>) -> Result<(), RegistryError> {
    self.validate()?;

    output.mkdir("", DirOptions::recursive());

    for (kind, bucket) in &self.members {
      let folder = kind.data_folder();
      if !folder.is_empty() {
        output.mkdir(folder, DirOptions::recursive());
      }

      for (path, member) in bucket {
        let location = member.location(path);
        mkdir_parent(output, &location);
        member
          .save(&mut output.file(&location))
          .map_err(|source| RegistryError::Save {
            identifier: self.qualify(path),
            source,
          })?;
      }
    }

    if !self.tags.is_empty() {
      output.mkdir("tags", DirOptions::recursive());
      for ((kind, path), entries) in &self.tags {
        let location = Path::new("tags")
          .join(kind.data_folder())
          .join(format!("{}.json", path));
        mkdir_parent(output, &location);
        output
          .file(&location)
          .write_json(&entries.borrow().manifest())
          .map_err(|source| RegistryError::Save {
            identifier: format!("#{}", self.qualify(path)),
            source,
          })?;
      }
    }

    info!(
      namespace = %self.name,
      members = self.member_count(),
      tags = self.tags.len(),
      "buffered namespace"
    );
    Ok(())
  }

  fn identifier<K: ?Sized>(&self, path: &str) -> Identifier<K> {
    Identifier::new(self.name.clone(), path)
  }

  fn qualify(&self, path: &str) -> String {
    format!("{}:{}", self.name, path)
  }

  fn check_registration(&self, kind: MemberKind, path: &str) -> Result<(), RegistryError> {
    validate_path(path)?;
    match kind.pack_type() {
      Some(expected) if expected != self.pack_type => Err(RegistryError::WrongPackType {
        identifier: self.qualify(path),
        kind,
        expected,
        actual: self.pack_type,
      }),
      _ => Ok(()),
    }
  }

  fn is_defined(&self, kind: MemberKind, path: &str) -> bool {
    self.members.get(&kind).is_some_and(|bucket| bucket.contains_key(path))
  }

  fn is_reserved(&self, kind: MemberKind, path: &str) -> bool {
    self.reserved.get(&kind).is_some_and(|reserved| reserved.contains(path))
  }

  fn is_taken(&self, kind: MemberKind, path: &str) -> bool {
    self.is_defined(kind, path) || self.is_reserved(kind, path)
  }

  fn insert<M: MemberType>(&mut self, path: &str, member: M) -> Result<(), RegistryError> {
    // The hook may have registered content of its own at this path.
    if self.is_defined(M::KIND, path) {
      return Err(RegistryError::DuplicateMember {
        identifier: self.qualify(path),
        kind: M::KIND,
      });
    }
    self
      .members
      .entry(M::KIND)
      .or_default()
      .insert(path.to_string(), Box::new(member));
    Ok(())
  }
}

fn mkdir_parent(output: &mut SubOutput<'_>, location: &Path) {
  if let Some(parent) = location.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    output.mkdir(parent, DirOptions::recursive());
  }
}

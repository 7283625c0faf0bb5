//! `SlotId` interning and the value union stored per slot (spec §9 Design
//! Notes: "Dynamic slot dicts" → interned integer keys instead of
//! string-keyed maps; spec §3 "a slot value is one of: a child Node, an
//! ordered sequence of child Nodes, a scalar, or absent").

use crate::arena::NodeId;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::RwLock;

/// Interned slot name. Assigned the first time a name is seen by
/// [`intern`]; stable for the process lifetime, never reused, same pattern
/// as `ast-grep-core`'s `KindId`/`FieldId` assigned by the `Language`'s
/// tree-sitter symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u16);

impl SlotId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

struct SlotInterner {
  names: Vec<&'static str>,
  ids: HashMap<&'static str, SlotId>,
}

impl SlotInterner {
  fn new() -> Self {
    Self { names: Vec::new(), ids: HashMap::new() }
  }

  fn intern(&mut self, name: &'static str) -> SlotId {
    if let Some(&id) = self.ids.get(name) {
      return id;
    }
    let id = SlotId(self.names.len() as u16);
    self.names.push(name);
    self.ids.insert(name, id);
    id
  }

  fn lookup(&self, name: &str) -> Option<SlotId> {
    self.ids.get(name).copied()
  }

  fn name(&self, id: SlotId) -> &'static str {
    self.names[id.index()]
  }
}

static INTERNER: once_cell::sync::Lazy<RwLock<SlotInterner>> =
  once_cell::sync::Lazy::new(|| RwLock::new(SlotInterner::new()));

/// Intern a slot name, assigning it a fresh [`SlotId`] the first time it is
/// seen. Called by the kind registry while it builds `KindInfo` entries;
/// outside of that bootstrap, call sites should already hold a `SlotId` from
/// a `KindInfo` lookup rather than interning ad hoc.
pub fn intern(name: &'static str) -> SlotId {
  INTERNER.write().unwrap().intern(name)
}

pub fn lookup(name: &str) -> Option<SlotId> {
  INTERNER.read().unwrap().lookup(name)
}

pub fn name_of(id: SlotId) -> &'static str {
  INTERNER.read().unwrap().name(id)
}

/// A scalar leaf value: everything a slot can hold that isn't a child node.
/// Numeric literals keep their original text (`Float`) so formatting
/// (`1.0` vs `1.00`) survives a round trip; `Int`/`Bool` are parsed because
/// the AST core itself compares and canonicalizes them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Str(String),
  Int(i64),
  Bool(bool),
}

impl Scalar {
  /// Structural comparison per spec §4.4: strings compare
  /// case-insensitively (ASCII lowercase), everything else compares by
  /// value.
  pub fn structurally_eq(&self, other: &Scalar) -> bool {
    match (self, other) {
      (Scalar::Str(a), Scalar::Str(b)) => a.to_ascii_lowercase() == b.to_ascii_lowercase(),
      (Scalar::Int(a), Scalar::Int(b)) => a == b,
      (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
      _ => false,
    }
  }
}

/// The value held in one argument slot of an [`crate::expr::Expression`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
  Node(NodeId),
  List(SmallVec<[NodeId; 4]>),
  Scalar(Scalar),
  Absent,
}

impl SlotValue {
  pub fn is_absent(&self) -> bool {
    matches!(self, SlotValue::Absent) || matches!(self, SlotValue::List(v) if v.is_empty())
  }

  pub fn as_node(&self) -> Option<NodeId> {
    match self {
      SlotValue::Node(id) => Some(*id),
      _ => None,
    }
  }

  pub fn as_list(&self) -> &[NodeId] {
    match self {
      SlotValue::List(v) => v,
      SlotValue::Node(id) => std::slice::from_ref(id),
      _ => &[],
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn interning_is_stable_and_deduplicates() {
    let a = intern("this");
    let b = intern("this");
    assert_eq!(a, b);
    assert_eq!(name_of(a), "this");
  }

  #[test]
  fn string_scalars_compare_case_insensitively() {
    let a = Scalar::Str("Foo".into());
    let b = Scalar::Str("foo".into());
    assert!(a.structurally_eq(&b));
  }

  #[test]
  fn empty_list_is_absent() {
    let v: SmallVec<[NodeId; 4]> = SmallVec::new();
    assert!(SlotValue::List(v).is_absent());
  }
}

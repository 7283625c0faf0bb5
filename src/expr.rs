//! The `Expression` node (C2) and its construction contract.
//!
//! Mirrors `ast-grep-core`'s `Node<'r, D>` split: storage (`Arena`) plays the
//! role of `Root<D>`, and [`NodeRef`] plays the role of `Node<'r, D>` — a
//! borrowed, read-only view pairing a reference to the owner with a handle
//! into it. Mutation goes through `mutate.rs`, which takes `&mut Arena`
//! directly rather than through `NodeRef`, the same way `ast-grep-core`
//! keeps `replace`/`replace_all` as methods that hand back a `Edit` rather
//! than mutating through a shared borrow.

use crate::arena::{Arena, NodeId};
use crate::error::{Error, Result};
use crate::kind::{self, Kind};
use crate::slot::{Scalar, SlotId, SlotValue};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::borrow::Cow;

/// Value stored in the open `meta` map: position keys, comment directives,
/// and whatever else a consumer stashes outside the structural args.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
  Null,
  Bool(bool),
  Int(i64),
  Str(String),
}

/// Input value for building a node, before it's resolved against a slot's
/// schema. Public construction surface — see [`build`].
#[derive(Debug, Clone)]
pub enum ArgValue {
  Node(NodeId),
  List(Vec<NodeId>),
  Str(String),
  Int(i64),
  Bool(bool),
}

/// A single AST node (spec §3). Args live in a small inline vector keyed by
/// interned `SlotId` rather than a string map — most kinds have at most a
/// handful of slots, so linear scan beats hashing.
#[derive(Debug, Clone)]
pub struct Expression {
  pub(crate) kind: Kind,
  pub(crate) args: SmallVec<[(SlotId, SlotValue); 4]>,
  pub parent: Option<NodeId>,
  pub(crate) arg_key: Option<SlotId>,
  pub(crate) index: Option<usize>,
  pub comments: Vec<String>,
  pub ty: Option<NodeId>,
  pub meta: IndexMap<String, MetaValue>,
  pub(crate) hash_cache: Option<u64>,
}

impl Expression {
  /// A node with no populated slots — used for kinds like `Null` that carry
  /// no argument, and as the allocation seed before [`build`] fills in args.
  pub fn leaf(kind: Kind) -> Self {
    Expression {
      kind,
      args: SmallVec::new(),
      parent: None,
      arg_key: None,
      index: None,
      comments: Vec::new(),
      ty: None,
      meta: IndexMap::new(),
      hash_cache: None,
    }
  }

  pub fn kind(&self) -> Kind {
    self.kind
  }

  /// The memoized structural hash, if one has survived since the last
  /// mutation that would invalidate it. `None` means the next [`crate::hash::hash`]
  /// call will recompute (and repopulate) it.
  pub fn cached_hash(&self) -> Option<u64> {
    self.hash_cache
  }

  fn slot_value(&self, name: &str) -> Option<&SlotValue> {
    let id = kind::kind_info(self.kind).slot_id(name)?;
    self.args.iter().find(|(sid, _)| *sid == id).map(|(_, v)| v)
  }

  /// The `this` slot as a node reference, if populated.
  pub fn this(&self) -> Option<NodeId> {
    self.slot_value("this").and_then(SlotValue::as_node)
  }

  pub fn expression(&self) -> Option<NodeId> {
    self.slot_value("expression").and_then(SlotValue::as_node)
  }

  /// The `expressions` slot as a list, defaulting to empty (spec §3:
  /// "absent and empty sequence are the same observable state").
  pub fn expressions(&self) -> &[NodeId] {
    self.slot_value("expressions").map(SlotValue::as_list).unwrap_or(&[])
  }

  pub fn slot(&self, name: &str) -> Option<&SlotValue> {
    self.slot_value(name)
  }

  /// Name of the slot this node currently occupies on its parent, and its
  /// position within that slot if it's list-valued. `None` iff `parent` is
  /// also `None`.
  pub fn slot_position(&self) -> Option<(&'static str, Option<usize>)> {
    let key = self.arg_key?;
    Some((kind::kind_info(self.kind).slot_name(key).unwrap_or(""), self.index))
  }

  pub fn scalar(&self, name: &str) -> Option<&Scalar> {
    match self.slot_value(name)? {
      SlotValue::Scalar(s) => Some(s),
      _ => None,
    }
  }

  pub fn bool_flag(&self, name: &str) -> bool {
    matches!(self.scalar(name), Some(Scalar::Bool(true)))
  }

  pub fn text(&self, name: &str) -> Cow<'_, str> {
    match self.scalar(name) {
      Some(Scalar::Str(s)) => Cow::Borrowed(s.as_str()),
      Some(Scalar::Int(i)) => Cow::Owned(i.to_string()),
      Some(Scalar::Bool(b)) => Cow::Borrowed(if *b { "true" } else { "false" }),
      None => Cow::Borrowed(""),
    }
  }

  /// Text of this node's own identity, following sqlglot's `Expression.name`:
  /// the `this` slot's text if it's a leaf carrying one, else the literal
  /// slot text on this node itself (`Literal`, `Identifier`, `Var`).
  pub fn name<'a>(&'a self, arena: &'a Arena) -> Cow<'a, str> {
    match self.kind {
      Kind::Literal | Kind::Var | Kind::HexString => self.text("this"),
      Kind::Identifier => self.text("this"),
      Kind::Column => self.this().map(|id| arena.get(id).name(arena)).unwrap_or(Cow::Borrowed("")),
      _ => self.this().map(|id| arena.get(id).name(arena)).unwrap_or(Cow::Borrowed("")),
    }
  }

  pub fn is_string(&self) -> bool {
    self.kind == Kind::Literal && self.bool_flag("is_string")
  }

  pub fn is_number(&self) -> bool {
    self.kind == Kind::Literal && !self.bool_flag("is_string")
  }

  pub fn is_int(&self) -> bool {
    self.is_number() && !self.text("this").contains('.')
  }

  pub fn is_star(&self) -> bool {
    self.kind == Kind::Star
  }

  /// True when every populated slot is a scalar (no child/list slots) —
  /// the structural notion of "leaf" (spec glossary), not merely "no
  /// arguments".
  pub fn is_leaf(&self) -> bool {
    self.args.iter().all(|(_, v)| matches!(v, SlotValue::Scalar(_) | SlotValue::Absent))
  }

  /// Output column name for a projection: an `Alias`'s own alias text, else
  /// the aliased expression's `output_name`, else empty for everything
  /// without one.
  pub fn output_name(&self, arena: &Arena) -> Cow<'_, str> {
    match self.kind {
      Kind::Alias => self.slot_value("alias").and_then(SlotValue::as_node).map(|id| arena.get(id).name(arena).into_owned().into()).unwrap_or(Cow::Borrowed("")),
      Kind::Column => self.name(arena),
      _ => Cow::Borrowed(""),
    }
  }

  pub fn alias(&self, arena: &Arena) -> Cow<'_, str> {
    self.slot_value("alias").and_then(SlotValue::as_node).map(|id| arena.get(id).name(arena).into_owned().into()).unwrap_or(Cow::Borrowed(""))
  }

  pub fn alias_or_name(&self, arena: &Arena) -> Cow<'_, str> {
    let a = self.alias(arena);
    if a.is_empty() {
      self.name(arena).into_owned().into()
    } else {
      a
    }
  }

  pub fn has_facet(&self, f: crate::kind::Facets) -> bool {
    kind::kind_info(self.kind).has_facet(f)
  }

  /// Every populated slot as `(name, value)`, skipping absent/empty ones and
  /// `False`-valued flags (spec §4.4: a `False` flag is treated as absent
  /// for hashing and structural comparison) — the iteration order `hash.rs`
  /// sorts for structural comparison.
  pub fn populated_args(&self) -> impl Iterator<Item = (&'static str, &SlotValue)> + '_ {
    let info = kind::kind_info(self.kind);
    self
      .args
      .iter()
      .filter(|(_, v)| !v.is_absent() && !matches!(v, SlotValue::Scalar(Scalar::Bool(false))))
      .map(move |(id, v)| (info.slot_name(*id).unwrap_or(""), v))
  }

  /// Validation messages (spec §4.1's `unittest-strict` checks): missing
  /// required slots. Does not itself error — callers decide whether an
  /// incomplete node is acceptable (e.g. mid-construction by a builder).
  pub fn error_messages(&self) -> Vec<String> {
    let info = kind::kind_info(self.kind);
    let mut errors = Vec::new();
    for (id, name) in info.required_slots() {
      let populated = self.args.iter().any(|(sid, v)| *sid == id && !v.is_absent());
      if !populated {
        errors.push(format!("Required slot `{name}` is missing for kind `{:?}`", self.kind));
      }
    }
    errors
  }

  pub fn validate(&self) -> Result<()> {
    let errors = self.error_messages();
    if errors.is_empty() {
      Ok(())
    } else {
      Err(Error::InvalidNode { kind: kind_name(self.kind), reason: errors.join("; ") })
    }
  }
}

/// Stable `&'static str` label for a kind, for error messages — `Kind`
/// itself only derives `Debug`, which is good enough but this keeps error
/// variants' `kind` field typed as `&'static str` without leaking `Debug`
/// formatting choices into the public error surface.
pub(crate) fn kind_name(kind: Kind) -> &'static str {
  kind::kind_info(kind).sql_names.first().copied().unwrap_or("<unnamed>")
}

pub(crate) fn arg_to_slot(arena: &mut Arena, owner: NodeId, slot_id: SlotId, value: ArgValue) -> SlotValue {
  match value {
    ArgValue::Node(child) => {
      wire_child(arena, owner, slot_id, child, None);
      SlotValue::Node(child)
    }
    ArgValue::List(children) => {
      for (i, child) in children.iter().enumerate() {
        wire_child(arena, owner, slot_id, *child, Some(i));
      }
      SlotValue::List(SmallVec::from_vec(children))
    }
    ArgValue::Str(s) => SlotValue::Scalar(Scalar::Str(s)),
    ArgValue::Int(i) => SlotValue::Scalar(Scalar::Int(i)),
    ArgValue::Bool(b) => SlotValue::Scalar(Scalar::Bool(b)),
  }
}

fn wire_child(arena: &mut Arena, owner: NodeId, slot_id: SlotId, child: NodeId, index: Option<usize>) {
  sever(arena, child);
  let node = arena.get_mut(child);
  node.parent = Some(owner);
  node.arg_key = Some(slot_id);
  node.index = index;
}

/// Detach `child` from whatever slot currently holds it, if any, fixing up
/// indices on the vacated list's remaining siblings. A node can occupy at
/// most one slot of at most one parent at a time (spec invariant 3) — every
/// path that attaches a node to a new owner calls this first so the old
/// owner never keeps a stale reference into a child that no longer points
/// back to it.
pub(crate) fn sever(arena: &mut Arena, child: NodeId) {
  let (parent, arg_key, index) = match arena.get(child).parent {
    Some(p) => (p, arena.get(child).arg_key, arena.get(child).index),
    None => return,
  };
  let Some(arg_key) = arg_key else {
    arena.get_mut(child).parent = None;
    return;
  };
  if let Some(i) = index {
    let remaining: Vec<NodeId> = {
      let parent_node = arena.get_mut(parent);
      match parent_node.args.iter_mut().find(|(sid, _)| *sid == arg_key) {
        Some((_, SlotValue::List(list))) => {
          if i < list.len() {
            list.remove(i);
          }
          list.to_vec()
        }
        _ => Vec::new(),
      }
    };
    for (new_idx, sibling) in remaining.iter().enumerate() {
      arena.get_mut(*sibling).index = Some(new_idx);
    }
  } else if let Some((_, v)) = arena.get_mut(parent).args.iter_mut().find(|(sid, _)| *sid == arg_key) {
    *v = SlotValue::Absent;
  }
  let node = arena.get_mut(child);
  node.parent = None;
  node.arg_key = None;
  node.index = None;
}

/// Build a node of `kind` from name-keyed args (C2's construction
/// contract), wiring parent/arg_key/index on any child args supplied.
///
/// Unknown slot names are dropped silently unless
/// [`crate::kind::strict_mode`] is set, in which case they raise
/// [`Error::InvalidNode`] — spec §4.1's debug-mode unknown-slot check.
/// Required slots are *not* checked here; call [`Expression::validate`]
/// once construction is complete.
pub fn build(arena: &mut Arena, kind: Kind, args: Vec<(&str, ArgValue)>) -> Result<NodeId> {
  let info = kind::kind_info(kind);
  let mut resolved: SmallVec<[(SlotId, SlotValue); 4]> = SmallVec::new();
  // Reserve the id up front so children can be wired to it as we go.
  let owner = arena.alloc(Expression::leaf(kind));
  for (name, value) in args {
    match info.slot_id(name) {
      Some(slot_id) => {
        let slot_value = arg_to_slot(arena, owner, slot_id, value);
        resolved.push((slot_id, slot_value));
      }
      None => {
        if kind::strict_mode() {
          return Err(Error::InvalidNode {
            kind: kind_name(kind),
            reason: format!("unknown slot `{name}`"),
          });
        }
      }
    }
  }
  arena.get_mut(owner).args = resolved;
  Ok(owner)
}

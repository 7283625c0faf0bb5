//! In-place mutation (C6): `set`/`append`/`replace`/`pop`, comment
//! directives, and the iterative `transform`.
//!
//! `replace`'s splice-immediately design and `transform`'s prune rule both
//! follow `original_source/sqlglot/expressions/core.py`'s `replace`/
//! `transform`: a node is pruned from further descent exactly when the
//! callback hands back a *different* node than the one it was given —
//! returning the same node back means "no replacement, keep descending".

use crate::arena::{Arena, NodeId};
use crate::error::{Error, Result};
use crate::expr::{self, kind_name, ArgValue, MetaValue};
use crate::hash;
use crate::kind;
use crate::slot::SlotValue;
use crate::traversal;

fn detach(arena: &mut Arena, value: &SlotValue) {
  match value {
    SlotValue::Node(id) => untether(arena, *id),
    SlotValue::List(ids) => {
      for id in ids {
        untether(arena, *id);
      }
    }
    _ => {}
  }
}

fn untether(arena: &mut Arena, id: NodeId) {
  let n = arena.get_mut(id);
  n.parent = None;
  n.arg_key = None;
  n.index = None;
}

fn slot_id_or_err(arena: &Arena, owner: NodeId, name: &str) -> Result<crate::slot::SlotId> {
  let k = arena.get(owner).kind();
  kind::kind_info(k).slot_id(name).ok_or_else(|| Error::InvalidNode { kind: kind_name(k), reason: format!("unknown slot `{name}`") })
}

/// Write `owner`'s `slot_name` slot (spec §4.6's core mutation primitive).
///
/// - `index` absent, `value` present: overwrites the slot wholesale. Any
///   child previously held there is detached (parent cleared) but not
///   removed from the arena — "orphan, don't deallocate".
/// - `index` absent, `value` `None`: removes the slot entirely (detaches
///   whatever was there, leaves it `Absent`).
/// - `index` present, `value` `None`: removes the list element at `index`,
///   renumbering the remaining siblings.
/// - `index` present, `value` a `List`: splices the given nodes into the
///   list slot starting at `index`.
/// - `index` present, `value` a single `Node`: replaces the element at
///   `index` when `overwrite` is true, otherwise inserts before it.
///
/// Always invalidates the hash cache on `owner` and its ancestors.
pub fn set(arena: &mut Arena, owner: NodeId, slot_name: &str, value: Option<ArgValue>, index: Option<usize>, overwrite: bool) -> Result<()> {
  let slot_id = slot_id_or_err(arena, owner, slot_name)?;
  match index {
    Some(i) => set_at_index(arena, owner, slot_id, value, i, overwrite),
    None => match value {
      Some(value) => set_whole(arena, owner, slot_id, value),
      None => clear_slot(arena, owner, slot_id),
    },
  }
  hash::invalidate(arena, owner);
  Ok(())
}

fn set_whole(arena: &mut Arena, owner: NodeId, slot_id: crate::slot::SlotId, value: ArgValue) {
  let old = arena.get(owner).args.iter().find(|(sid, _)| *sid == slot_id).map(|(_, v)| v.clone());
  if let Some(old_value) = old {
    detach(arena, &old_value);
  }
  let new_value = expr::arg_to_slot(arena, owner, slot_id, value);
  let owner_node = arena.get_mut(owner);
  match owner_node.args.iter_mut().find(|(sid, _)| *sid == slot_id) {
    Some(entry) => entry.1 = new_value,
    None => owner_node.args.push((slot_id, new_value)),
  }
}

fn clear_slot(arena: &mut Arena, owner: NodeId, slot_id: crate::slot::SlotId) {
  let old = arena.get(owner).args.iter().find(|(sid, _)| *sid == slot_id).map(|(_, v)| v.clone());
  if let Some(old_value) = old {
    detach(arena, &old_value);
  }
  if let Some(entry) = arena.get_mut(owner).args.iter_mut().find(|(sid, _)| *sid == slot_id) {
    entry.1 = SlotValue::Absent;
  }
}

/// Current contents of a list (or singleton-Node) slot as a plain `Vec`,
/// for index-based edits. Absent/scalar slots read as empty.
fn read_list(arena: &Arena, owner: NodeId, slot_id: crate::slot::SlotId) -> Vec<NodeId> {
  arena
    .get(owner)
    .args
    .iter()
    .find(|(sid, _)| *sid == slot_id)
    .map(|(_, v)| match v {
      SlotValue::List(list) => list.to_vec(),
      SlotValue::Node(id) => vec![*id],
      _ => Vec::new(),
    })
    .unwrap_or_default()
}

/// Store `new` as `slot_id`'s list value, untethering any `old` element not
/// present in `new` and re-wiring `parent`/`arg_key`/`index` on every
/// surviving or newly-added element to its position in `new`.
fn write_list(arena: &mut Arena, owner: NodeId, slot_id: crate::slot::SlotId, old: Vec<NodeId>, new: Vec<NodeId>) {
  for id in old {
    if !new.contains(&id) {
      untether(arena, id);
    }
  }
  let slot_value = SlotValue::List(smallvec::SmallVec::from_vec(new.clone()));
  let owner_node = arena.get_mut(owner);
  match owner_node.args.iter_mut().find(|(sid, _)| *sid == slot_id) {
    Some(entry) => entry.1 = slot_value,
    None => owner_node.args.push((slot_id, slot_value)),
  }
  for (i, child) in new.iter().enumerate() {
    let node = arena.get_mut(*child);
    node.parent = Some(owner);
    node.arg_key = Some(slot_id);
    node.index = Some(i);
  }
}

fn as_node_ids(value: ArgValue) -> Vec<NodeId> {
  match value {
    ArgValue::Node(id) => vec![id],
    ArgValue::List(ids) => ids,
    ArgValue::Str(_) | ArgValue::Int(_) | ArgValue::Bool(_) => Vec::new(),
  }
}

fn set_at_index(arena: &mut Arena, owner: NodeId, slot_id: crate::slot::SlotId, value: Option<ArgValue>, index: usize, overwrite: bool) {
  let old = read_list(arena, owner, slot_id);
  let mut new = old.clone();
  match value {
    None => {
      if index < new.len() {
        new.remove(index);
      }
    }
    Some(value) => {
      let incoming = as_node_ids(value);
      for &child in &incoming {
        expr::sever(arena, child);
      }
      if overwrite && incoming.len() == 1 && index < new.len() {
        new[index] = incoming[0];
      } else {
        let at = index.min(new.len());
        new.splice(at..at, incoming);
      }
    }
  }
  write_list(arena, owner, slot_id, old, new);
}

/// Append `child` to a list-valued slot, creating the slot if absent.
/// Errors if the slot currently holds a non-list value.
pub fn append(arena: &mut Arena, owner: NodeId, slot_name: &str, child: NodeId) -> Result<()> {
  let slot_id = slot_id_or_err(arena, owner, slot_name)?;
  // Check the slot shape before detaching `child` from wherever it sits now,
  // so an invalid-slot error leaves `child` exactly where it was.
  match arena.get(owner).args.iter().find(|(sid, _)| *sid == slot_id) {
    Some((_, v)) if !matches!(v, SlotValue::List(_) | SlotValue::Absent) => {
      return Err(Error::InvalidNode {
        kind: kind_name(arena.get(owner).kind()),
        reason: format!("slot `{slot_name}` is not list-valued"),
      })
    }
    _ => {}
  }
  expr::sever(arena, child);
  let idx;
  let owner_node = arena.get_mut(owner);
  match owner_node.args.iter_mut().find(|(sid, _)| *sid == slot_id) {
    Some((_, list @ SlotValue::List(_))) => {
      let SlotValue::List(list) = list else { unreachable!() };
      idx = list.len();
      list.push(child);
    }
    Some((_, v @ SlotValue::Absent)) => {
      idx = 0;
      *v = SlotValue::List(smallvec::smallvec![child]);
    }
    _ => {
      idx = 0;
      owner_node.args.push((slot_id, SlotValue::List(smallvec::smallvec![child])));
    }
  }
  let child_node = arena.get_mut(child);
  child_node.parent = Some(owner);
  child_node.arg_key = Some(slot_id);
  child_node.index = Some(idx);
  hash::invalidate(arena, owner);
  Ok(())
}

/// Swap `old` for `new` in whatever slot position `old` currently occupies.
/// A no-op (returns `Ok(())` without touching `new`) if `old` has no
/// parent — mirrors the original: replacing a detached node can't splice
/// anywhere.
pub fn replace(arena: &mut Arena, old: NodeId, new: NodeId) -> Result<()> {
  let (parent, arg_key, index) = {
    let n = arena.get(old);
    match n.parent {
      Some(p) => (p, n.arg_key, n.index),
      None => return Ok(()),
    }
  };
  let arg_key = match arg_key {
    Some(k) => k,
    None => return Ok(()),
  };
  {
    let parent_node = arena.get_mut(parent);
    match (index, parent_node.args.iter_mut().find(|(sid, _)| *sid == arg_key)) {
      (Some(i), Some((_, SlotValue::List(list)))) => list[i] = new,
      (None, Some((_, v))) => *v = SlotValue::Node(new),
      _ => {}
    }
  }
  {
    let new_node = arena.get_mut(new);
    new_node.parent = Some(parent);
    new_node.arg_key = Some(arg_key);
    new_node.index = index;
  }
  untether(arena, old);
  hash::invalidate(arena, parent);
  Ok(())
}

/// Detach `id` from its parent slot. For a list slot, removes the element
/// and reindexes the remaining siblings; for a scalar/node slot, leaves it
/// `Absent`. No-op if `id` has no parent.
pub fn pop(arena: &mut Arena, id: NodeId) {
  let (parent, arg_key, index) = {
    let n = arena.get(id);
    match n.parent {
      Some(p) => (p, n.arg_key, n.index),
      None => return,
    }
  };
  let Some(arg_key) = arg_key else { return };
  if let Some(i) = index {
    let remaining: Vec<NodeId> = {
      let parent_node = arena.get_mut(parent);
      if let Some((_, SlotValue::List(list))) = parent_node.args.iter_mut().find(|(sid, _)| *sid == arg_key) {
        list.remove(i);
        list.to_vec()
      } else {
        Vec::new()
      }
    };
    for (new_idx, sibling) in remaining.iter().enumerate() {
      arena.get_mut(*sibling).index = Some(new_idx);
    }
  } else if let Some((_, v)) = arena.get_mut(parent).args.iter_mut().find(|(sid, _)| *sid == arg_key) {
    *v = SlotValue::Absent;
  }
  untether(arena, id);
  hash::invalidate(arena, parent);
}

const META_DIRECTIVE_PREFIX: &str = "ast:meta";

/// Append (or, when `prepend` is true, prepend) comment strings to a node,
/// extracting any trailing directive of the form `ast:meta key=value, flag`
/// into `meta` instead of leaving it as free text (same split the original
/// makes for its own meta-comment convention, renamed here since it is this
/// crate's own format, not a borrowed one). A bare key with no `=` is a
/// boolean flag and is recorded as `true`.
pub fn add_comments(arena: &mut Arena, id: NodeId, comments: impl IntoIterator<Item = String>, prepend: bool) {
  let mut plain = Vec::new();
  for comment in comments {
    let text = comment.trim();
    if let Some(directive) = text.strip_prefix(META_DIRECTIVE_PREFIX) {
      for pair in directive.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
          continue;
        }
        let (key, value) = match pair.split_once('=') {
          Some((key, value)) => (key.trim().to_string(), parse_meta_literal(value.trim())),
          None => (pair.to_string(), MetaValue::Bool(true)),
        };
        arena.get_mut(id).meta.insert(key, value);
      }
    } else {
      plain.push(text.to_string());
    }
  }
  let node = arena.get_mut(id);
  if prepend {
    plain.extend(std::mem::take(&mut node.comments));
    node.comments = plain;
  } else {
    node.comments.extend(plain);
  }
}

fn parse_meta_literal(raw: &str) -> MetaValue {
  let unquoted = raw.trim_matches('"');
  if unquoted == "true" {
    MetaValue::Bool(true)
  } else if unquoted == "false" {
    MetaValue::Bool(false)
  } else if let Ok(i) = unquoted.parse::<i64>() {
    MetaValue::Int(i)
  } else {
    MetaValue::Str(unquoted.to_string())
  }
}

/// Remove and return every comment currently on `id`, leaving it with none.
pub fn pop_comments(arena: &mut Arena, id: NodeId) -> Vec<String> {
  std::mem::take(&mut arena.get_mut(id).comments)
}

/// Apply `fun` to every node of the subtree rooted at `root`, top-down and
/// iteratively. `fun` receives the current node and returns either the same
/// id (keep descending into its children) or a different id (the
/// replacement is spliced into the parent immediately and its subtree is
/// never visited). When `copy` is true, the whole subtree is deep-copied
/// first and the original is left untouched.
pub fn transform<F>(arena: &mut Arena, root: NodeId, copy: bool, mut fun: F) -> NodeId
where
  F: FnMut(&mut Arena, NodeId) -> NodeId,
{
  let root = if copy { crate::copy::deep_copy(arena, root) } else { root };
  let mut stack = vec![root];
  let mut result = root;
  while let Some(node) = stack.pop() {
    let replaced = fun(arena, node);
    if replaced != node {
      if node == root {
        result = replaced;
      } else {
        let _ = replace(arena, node, replaced);
      }
      continue;
    }
    if node == root {
      result = node;
    }
    for child in traversal::children(arena.get(node)) {
      stack.push(child);
    }
  }
  result
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::expr::build;
  use crate::kind::Kind;

  fn lit(arena: &mut Arena, text: &str) -> NodeId {
    build(arena, Kind::Literal, vec![("this", ArgValue::Str(text.into())), ("is_string", ArgValue::Bool(false))]).unwrap()
  }

  #[test]
  fn set_overwrites_and_detaches_old_child() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let paren = build(&mut arena, Kind::Paren, vec![("this", ArgValue::Node(a))]).unwrap();
    set(&mut arena, paren, "this", Some(ArgValue::Node(b)), None, true).unwrap();
    assert_eq!(arena.get(paren).this(), Some(b));
    assert_eq!(arena.get(a).parent, None);
    assert_eq!(arena.get(b).parent, Some(paren));
  }

  #[test]
  fn set_with_no_value_and_no_index_clears_the_slot() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let paren = build(&mut arena, Kind::Paren, vec![("this", ArgValue::Node(a))]).unwrap();
    set(&mut arena, paren, "this", None, None, true).unwrap();
    assert_eq!(arena.get(paren).this(), None);
    assert_eq!(arena.get(a).parent, None);
  }

  #[test]
  fn set_with_index_and_no_value_removes_and_renumbers() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let c = lit(&mut arena, "3");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b, c]))]).unwrap();
    set(&mut arena, tuple, "expressions", None, Some(1), true).unwrap();
    assert_eq!(arena.get(tuple).expressions(), &[a, c]);
    assert_eq!(arena.get(c).index, Some(1));
    assert_eq!(arena.get(b).parent, None);
  }

  #[test]
  fn set_with_index_and_overwrite_replaces_that_element() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b]))]).unwrap();
    let c = lit(&mut arena, "3");
    set(&mut arena, tuple, "expressions", Some(ArgValue::Node(c)), Some(0), true).unwrap();
    assert_eq!(arena.get(tuple).expressions(), &[c, b]);
    assert_eq!(arena.get(a).parent, None);
  }

  #[test]
  fn set_with_index_and_no_overwrite_inserts_before_that_element() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b]))]).unwrap();
    let c = lit(&mut arena, "3");
    set(&mut arena, tuple, "expressions", Some(ArgValue::Node(c)), Some(1), false).unwrap();
    assert_eq!(arena.get(tuple).expressions(), &[a, c, b]);
    assert_eq!(arena.get(b).index, Some(2));
  }

  #[test]
  fn set_with_index_and_sequence_splices_it_in() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b]))]).unwrap();
    let c = lit(&mut arena, "3");
    let d = lit(&mut arena, "4");
    set(&mut arena, tuple, "expressions", Some(ArgValue::List(vec![c, d])), Some(1), false).unwrap();
    assert_eq!(arena.get(tuple).expressions(), &[a, c, d, b]);
    assert_eq!(arena.get(b).index, Some(3));
  }

  #[test]
  fn append_creates_list_then_grows_it() {
    let mut arena = Arena::new();
    let tuple = build(&mut arena, Kind::Tuple, vec![]).unwrap();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    append(&mut arena, tuple, "expressions", a).unwrap();
    append(&mut arena, tuple, "expressions", b).unwrap();
    assert_eq!(arena.get(tuple).expressions(), &[a, b]);
    assert_eq!(arena.get(b).index, Some(1));
  }

  #[test]
  fn replace_swaps_node_in_its_slot_position() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let c = lit(&mut arena, "3");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b, c]))]).unwrap();
    replace(&mut arena, b, lit(&mut arena, "9")).unwrap();
    let new_b = arena.get(tuple).expressions()[1];
    assert_eq!(arena.get(new_b).text("this"), "9");
    assert_eq!(arena.get(b).parent, None);
  }

  #[test]
  fn replace_on_detached_node_is_a_no_op() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    replace(&mut arena, a, b).unwrap();
  }

  #[test]
  fn pop_reindexes_remaining_list_siblings() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let c = lit(&mut arena, "3");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b, c]))]).unwrap();
    pop(&mut arena, b);
    assert_eq!(arena.get(tuple).expressions(), &[a, c]);
    assert_eq!(arena.get(c).index, Some(1));
  }

  #[test]
  fn directive_comment_extracted_into_meta() {
    let mut arena = Arena::new();
    let id = lit(&mut arena, "1");
    add_comments(&mut arena, id, vec!["plain note".to_string(), "ast:meta source=cte_inline, cached".to_string()], false);
    assert_eq!(arena.get(id).comments, vec!["plain note".to_string()]);
    assert_eq!(arena.get(id).meta.get("source"), Some(&MetaValue::Str("cte_inline".to_string())));
    assert_eq!(arena.get(id).meta.get("cached"), Some(&MetaValue::Bool(true)), "a bare directive key is a boolean flag");
  }

  #[test]
  fn prepend_puts_new_comments_before_existing_ones() {
    let mut arena = Arena::new();
    let id = lit(&mut arena, "1");
    add_comments(&mut arena, id, vec!["second".to_string()], false);
    add_comments(&mut arena, id, vec!["first".to_string()], true);
    assert_eq!(arena.get(id).comments, vec!["first".to_string(), "second".to_string()]);
  }

  #[test]
  fn transform_prunes_descent_into_replaced_subtree() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b]))]).unwrap();
    let mut visits = Vec::new();
    let result = transform(&mut arena, tuple, false, |arena, node| {
      visits.push(node);
      if node == a {
        lit(arena, "99")
      } else {
        node
      }
    });
    assert_eq!(result, tuple);
    let new_first = arena.get(tuple).expressions()[0];
    assert_eq!(arena.get(new_first).text("this"), "99");
    assert_eq!(arena.get(a).parent, None, "replaced node is detached");
    // `a` itself was visited once; its freshly-built replacement never was.
    assert_eq!(visits.iter().filter(|id| **id == a).count(), 1);
    assert!(!visits.contains(&new_first));
  }
}

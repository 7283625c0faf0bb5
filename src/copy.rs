//! Deep copy (C7): clone an entire subtree into fresh arena slots with no
//! sharing with the original.
//!
//! Grounded in `original_source/sqlglot/expressions/core.py`'s
//! `__deepcopy__`, which walks an explicit `(node, copy)` stack rather than
//! recursing for the same reason `traversal.rs` does. The arena
//! representation needs one adjustment the pointer-based original doesn't:
//! a node's `parent` field can only be remapped once the parent's *new* id
//! exists, so cloning runs in two passes — children-first to build
//! `old -> new`, then a pass to fix up `parent` using that map.

use crate::arena::{Arena, NodeId};
use crate::expr::Expression;
use crate::slot::SlotValue;
use crate::traversal;
use std::collections::{HashMap, VecDeque};

/// Deep-copy the subtree rooted at `root`. The returned node is a detached
/// root (`parent == None`) even if `root` itself had a parent in the
/// source tree — copying a subtree always produces a standalone tree; the
/// caller decides whether/where to splice it back in via `mutate::replace`.
///
/// `ty` (the type annotation) is copied by reference, not by value: it is
/// metadata about a node, not a tree edge participating in parent/child
/// ownership, so aliasing it across the original and the copy is fine.
pub fn deep_copy(arena: &mut Arena, root: NodeId) -> NodeId {
  let mut queue = VecDeque::new();
  let mut order = Vec::new();
  queue.push_back(root);
  while let Some(id) = queue.pop_front() {
    order.push(id);
    queue.extend(traversal::children(arena.get(id)));
  }

  let mut old_to_new: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len());
  for &old_id in order.iter().rev() {
    let old = arena.get(old_id).clone();
    let mut new_args = smallvec::SmallVec::new();
    for (slot_id, value) in old.args.iter() {
      let new_value = match value {
        SlotValue::Node(c) => SlotValue::Node(old_to_new[c]),
        SlotValue::List(cs) => SlotValue::List(cs.iter().map(|c| old_to_new[c]).collect()),
        SlotValue::Scalar(s) => SlotValue::Scalar(s.clone()),
        SlotValue::Absent => SlotValue::Absent,
      };
      new_args.push((*slot_id, new_value));
    }
    let mut new_expr = Expression::leaf(old.kind());
    new_expr.args = new_args;
    new_expr.comments = old.comments.clone();
    new_expr.ty = old.ty;
    new_expr.meta = old.meta.clone();
    new_expr.arg_key = old.arg_key;
    new_expr.index = old.index;
    let new_id = arena.alloc(new_expr);
    old_to_new.insert(old_id, new_id);
  }

  for &old_id in &order {
    let new_id = old_to_new[&old_id];
    if old_id == root {
      let n = arena.get_mut(new_id);
      n.parent = None;
      n.arg_key = None;
      n.index = None;
    } else {
      let mapped_parent = arena.get(old_id).parent.map(|p| old_to_new[&p]);
      arena.get_mut(new_id).parent = mapped_parent;
    }
  }

  old_to_new[&root]
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::expr::{build, ArgValue};
  use crate::hash;
  use crate::kind::Kind;

  fn lit(arena: &mut Arena, text: &str) -> NodeId {
    build(arena, Kind::Literal, vec![("this", ArgValue::Str(text.into())), ("is_string", ArgValue::Bool(false))]).unwrap()
  }

  #[test]
  fn copy_is_structurally_equal_but_a_distinct_tree() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let b = lit(&mut arena, "2");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a, b]))]).unwrap();
    let copied = deep_copy(&mut arena, tuple);
    assert_ne!(copied, tuple);
    assert!(hash::structural_eq(&arena, tuple, copied));
    assert_eq!(hash::hash(&mut arena, tuple), hash::hash(&mut arena, copied));
  }

  #[test]
  fn copy_children_are_fresh_ids_not_shared_with_original() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a]))]).unwrap();
    let copied = deep_copy(&mut arena, tuple);
    let copied_child = arena.get(copied).expressions()[0];
    assert_ne!(copied_child, a);
    assert_eq!(arena.get(copied_child).parent, Some(copied));
  }

  #[test]
  fn copy_of_subtree_with_a_parent_is_detached() {
    let mut arena = Arena::new();
    let inner = lit(&mut arena, "1");
    let outer = build(&mut arena, Kind::Paren, vec![("this", ArgValue::Node(inner))]).unwrap();
    let copied_inner = deep_copy(&mut arena, inner);
    assert_eq!(arena.get(copied_inner).parent, None);
    // the original is untouched
    assert_eq!(arena.get(inner).parent, Some(outer));
  }

  #[test]
  fn mutating_the_copy_does_not_affect_the_original() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1");
    let tuple = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![a]))]).unwrap();
    let copied = deep_copy(&mut arena, tuple);
    let copied_child = arena.get(copied).expressions()[0];
    crate::mutate::set(&mut arena, copied_child, "this", Some(ArgValue::Str("changed".into())), None, true).unwrap();
    assert_eq!(arena.get(a).text("this"), "1");
    assert_eq!(arena.get(copied_child).text("this"), "changed");
  }
}

//! Structural identity (C4): a deterministic 64-bit hash and a matching
//! structural-equality predicate, computed bottom-up over populated slots
//! sorted by slot name.
//!
//! Grounded in `original_source/sqlglot/expressions/core.py`'s
//! `Expression.__hash__`/`__eq__`: collect every node whose cache is stale
//! in breadth-first order, then fold bottom-up in reverse so every child's
//! hash is already cached before its parent needs it. `hash_raw_args` kinds
//! (`Literal`, `Identifier`, `HexString`) skip the lowercasing step but are
//! still folded through the same sorted-slot-name loop — both branches sort,
//! only the per-scalar comparison differs.

use crate::arena::{Arena, NodeId};
use crate::kind;
use crate::slot::{Scalar, SlotValue};
use std::collections::VecDeque;
use xxhash_rust::xxh3::xxh3_64;

fn mix(a: u64, b: u64) -> u64 {
  let mut buf = [0u8; 16];
  buf[..8].copy_from_slice(&a.to_le_bytes());
  buf[8..].copy_from_slice(&b.to_le_bytes());
  xxh3_64(&buf)
}

fn hash_scalar(s: &Scalar, raw: bool) -> u64 {
  match s {
    Scalar::Str(text) => {
      if raw {
        xxh3_64(text.as_bytes())
      } else {
        xxh3_64(text.to_ascii_lowercase().as_bytes())
      }
    }
    Scalar::Int(i) => xxh3_64(&i.to_le_bytes()),
    Scalar::Bool(b) => xxh3_64(&[*b as u8]),
  }
}

/// Invalidate the cached hash of `start` and every ancestor, stopping as
/// soon as an already-cleared ancestor is reached — the original's
/// optimization: a stale subtree's ancestors are already stale too, so
/// there's no need to keep walking once we hit one.
pub fn invalidate(arena: &mut Arena, start: NodeId) {
  let mut cur = Some(start);
  while let Some(id) = cur {
    let node = arena.get_mut(id);
    if node.hash_cache.is_none() {
      break;
    }
    node.hash_cache = None;
    cur = node.parent;
  }
}

/// Compute (and cache) the structural hash of the subtree rooted at `root`.
/// Nodes whose cache is already populated are reused rather than recomputed.
pub fn hash(arena: &mut Arena, root: NodeId) -> u64 {
  let mut queue = VecDeque::new();
  let mut order = Vec::new();
  queue.push_back(root);
  while let Some(id) = queue.pop_front() {
    if arena.get(id).hash_cache.is_some() {
      continue;
    }
    order.push(id);
    for (_, value) in arena.get(id).populated_args() {
      match value {
        SlotValue::Node(child) => queue.push_back(*child),
        SlotValue::List(children) => queue.extend(children.iter().copied()),
        _ => {}
      }
    }
  }

  // Descendants were enqueued strictly after their ancestors, so reversing
  // the BFS order processes every child before its parent needs it.
  for id in order.into_iter().rev() {
    let kind = arena.get(id).kind();
    let info = kind::kind_info(kind);
    let raw = info.hash_raw_args;
    let mut pairs: Vec<(&'static str, u64)> = arena
      .get(id)
      .populated_args()
      .map(|(name, value)| {
        let h = match value {
          SlotValue::Node(child) => arena.get(*child).hash_cache.expect("child hash computed before parent"),
          SlotValue::List(children) => {
            let mut acc = 0u64;
            for child in children {
              acc = mix(acc, arena.get(*child).hash_cache.expect("child hash computed before parent"));
            }
            acc
          }
          SlotValue::Scalar(s) => hash_scalar(s, raw),
          SlotValue::Absent => 0,
        };
        (name, h)
      })
      .collect();
    pairs.sort_by_key(|(name, _)| *name);

    let mut acc = xxh3_64(format!("{kind:?}").as_bytes());
    for (name, h) in pairs {
      acc = mix(acc, xxh3_64(name.as_bytes()));
      acc = mix(acc, h);
    }
    arena.get_mut(id).hash_cache = Some(acc);
  }

  arena.get(root).hash_cache.expect("root hash computed")
}

fn raw_scalar_eq(a: &Scalar, b: &Scalar) -> bool {
  match (a, b) {
    (Scalar::Str(x), Scalar::Str(y)) => x == y,
    _ => a.structurally_eq(b),
  }
}

/// Structural equality (spec §4.4): same kind, same populated slots,
/// pairwise-equal values. Iterative (explicit worklist) to avoid recursing
/// through deep generated trees, the same way `traversal`/`copy` are.
pub fn structural_eq(arena: &Arena, a: NodeId, b: NodeId) -> bool {
  let mut stack = vec![(a, b)];
  while let Some((x, y)) = stack.pop() {
    let nx = arena.get(x);
    let ny = arena.get(y);
    if nx.kind() != ny.kind() {
      return false;
    }
    let raw = kind::kind_info(nx.kind()).hash_raw_args;
    let mut pa: Vec<_> = nx.populated_args().collect();
    let mut pb: Vec<_> = ny.populated_args().collect();
    if pa.len() != pb.len() {
      return false;
    }
    pa.sort_by_key(|(name, _)| *name);
    pb.sort_by_key(|(name, _)| *name);
    for ((na, va), (nb, vb)) in pa.iter().zip(pb.iter()) {
      if na != nb {
        return false;
      }
      match (va, vb) {
        (SlotValue::Node(x2), SlotValue::Node(y2)) => stack.push((*x2, *y2)),
        (SlotValue::List(xs), SlotValue::List(ys)) => {
          if xs.len() != ys.len() {
            return false;
          }
          for (cx, cy) in xs.iter().zip(ys.iter()) {
            stack.push((*cx, *cy));
          }
        }
        (SlotValue::Scalar(sx), SlotValue::Scalar(sy)) => {
          let eq = if raw { raw_scalar_eq(sx, sy) } else { sx.structurally_eq(sy) };
          if !eq {
            return false;
          }
        }
        (SlotValue::Absent, SlotValue::Absent) => {}
        _ => return false,
      }
    }
  }
  true
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::expr::{build, ArgValue};
  use crate::kind::Kind;

  fn lit(arena: &mut Arena, text: &str, is_string: bool) -> NodeId {
    build(arena, Kind::Literal, vec![("this", ArgValue::Str(text.to_string())), ("is_string", ArgValue::Bool(is_string))]).unwrap()
  }

  #[test]
  fn equal_trees_hash_equal() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1", false);
    let b = lit(&mut arena, "1", false);
    assert!(structural_eq(&arena, a, b));
    assert_eq!(hash(&mut arena, a), hash(&mut arena, b));
  }

  #[test]
  fn different_literal_text_hashes_differ() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1", false);
    let b = lit(&mut arena, "2", false);
    assert!(!structural_eq(&arena, a, b));
    assert_ne!(hash(&mut arena, a), hash(&mut arena, b));
  }

  #[test]
  fn identifier_text_compares_case_sensitively_via_hash_raw_args() {
    let mut arena = Arena::new();
    let a = build(&mut arena, Kind::Identifier, vec![("this", ArgValue::Str("Foo".into())), ("quoted", ArgValue::Bool(false))]).unwrap();
    let b = build(&mut arena, Kind::Identifier, vec![("this", ArgValue::Str("foo".into())), ("quoted", ArgValue::Bool(false))]).unwrap();
    assert!(!structural_eq(&arena, a, b));
  }

  #[test]
  fn ordinary_string_scalars_compare_case_insensitively() {
    let mut arena = Arena::new();
    let a = build(&mut arena, Kind::Var, vec![("this", ArgValue::Str("Foo".into()))]).unwrap();
    let b = build(&mut arena, Kind::Var, vec![("this", ArgValue::Str("foo".into()))]).unwrap();
    assert!(structural_eq(&arena, a, b));
  }

  #[test]
  fn absent_slot_equals_empty_list_slot() {
    let mut arena = Arena::new();
    let a = build(&mut arena, Kind::Tuple, vec![("expressions", ArgValue::List(vec![]))]).unwrap();
    let b = build(&mut arena, Kind::Tuple, vec![]).unwrap();
    assert!(structural_eq(&arena, a, b));
  }

  #[test]
  fn invalidate_stops_at_already_cleared_ancestor() {
    let mut arena = Arena::new();
    let a = lit(&mut arena, "1", false);
    let paren = build(&mut arena, Kind::Paren, vec![("this", ArgValue::Node(a))]).unwrap();
    hash(&mut arena, paren);
    assert!(arena.get(paren).hash_cache.is_some());
    assert!(arena.get(a).hash_cache.is_some());
    invalidate(&mut arena, a);
    assert!(arena.get(a).hash_cache.is_none());
    assert!(arena.get(paren).hash_cache.is_none());
    // second call: `a`'s cache is already cleared, so walking stops there
    // immediately without needing to touch `paren` again.
    invalidate(&mut arena, a);
    assert!(arena.get(a).hash_cache.is_none());
  }
}

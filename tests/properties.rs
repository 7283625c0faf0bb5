//! Property-based tests for the universal laws over arbitrary trees: copy
//! isomorphism, hash/equality agreement, serde round-tripping, the parent
//! invariant, acyclicity, hash cache invalidation, transform termination,
//! traversal coverage, and single-parent ownership.
//!
//! There is no parser or generator in this crate (that's a dialect layer's
//! job), so the "builder and parser agree" law has no counterpart here —
//! `structural_equality_implies_equal_hash` below checks the property that
//! *does* apply to a builder-only crate: building the same logical tree
//! twice from the same inputs produces structurally-equal, equal-hash
//! results.

use bit_set::BitSet;
use proptest::prelude::*;
use sqlxfrm_ast::arena::{Arena, NodeId};
use sqlxfrm_ast::builder::helpers;
use sqlxfrm_ast::expr::{self, ArgValue};
use sqlxfrm_ast::kind::Kind;
use sqlxfrm_ast::slot::SlotValue;
use sqlxfrm_ast::{copy, hash, mutate, persist, traversal};

#[derive(Debug, Clone)]
enum Recipe {
  Int(i64),
  Str(String),
  And(Box<Recipe>, Box<Recipe>),
  Or(Box<Recipe>, Box<Recipe>),
  Tuple(Vec<Recipe>),
}

fn arb_recipe() -> impl Strategy<Value = Recipe> {
  let leaf = prop_oneof![any::<i64>().prop_map(Recipe::Int), "[a-z]{1,6}".prop_map(Recipe::Str),];
  leaf.prop_recursive(4, 24, 4, |inner| {
    prop_oneof![
      (inner.clone(), inner.clone()).prop_map(|(a, b)| Recipe::And(Box::new(a), Box::new(b))),
      (inner.clone(), inner.clone()).prop_map(|(a, b)| Recipe::Or(Box::new(a), Box::new(b))),
      prop::collection::vec(inner, 1..4).prop_map(Recipe::Tuple),
    ]
  })
}

fn build_recipe(arena: &mut Arena, recipe: &Recipe) -> NodeId {
  match recipe {
    Recipe::Int(n) => helpers::literal_int(arena, *n).unwrap(),
    Recipe::Str(s) => expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(s.clone())), ("is_string", ArgValue::Bool(true))]).unwrap(),
    Recipe::And(a, b) => {
      let a = build_recipe(arena, a);
      let b = build_recipe(arena, b);
      helpers::and(arena, a, b).unwrap()
    }
    Recipe::Or(a, b) => {
      let a = build_recipe(arena, a);
      let b = build_recipe(arena, b);
      helpers::or(arena, a, b).unwrap()
    }
    Recipe::Tuple(items) => {
      let ids: Vec<_> = items.iter().map(|r| build_recipe(arena, r)).collect();
      expr::build(arena, Kind::Tuple, vec![("expressions", ArgValue::List(ids))]).unwrap()
    }
  }
}

/// Every node reachable from `root` via BFS, including `root` itself.
fn reachable(arena: &Arena, root: NodeId) -> Vec<NodeId> {
  traversal::bfs(arena, root).collect()
}

proptest! {
  #[test]
  fn copy_is_isomorphic_but_distinct(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    let before_len = arena.len();
    let copied = copy::deep_copy(&mut arena, root);

    prop_assert_ne!(root, copied);
    prop_assert!(hash::structural_eq(&arena, root, copied));
    prop_assert_eq!(hash::hash(&mut arena, root), hash::hash(&mut arena, copied));
    // the copy allocated exactly one fresh node per node in the original subtree
    prop_assert_eq!(arena.len(), before_len + reachable(&arena, root).len());
  }

  #[test]
  fn structural_equality_implies_equal_hash(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let a = build_recipe(&mut arena, &recipe);
    let b = build_recipe(&mut arena, &recipe);
    prop_assert!(hash::structural_eq(&arena, a, b));
    prop_assert_eq!(hash::hash(&mut arena, a), hash::hash(&mut arena, b));
  }

  #[test]
  fn serde_round_trip_preserves_identity(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    let json = persist::dump(&arena, root);
    let loaded = persist::load(&mut arena, &json).unwrap();
    prop_assert!(hash::structural_eq(&arena, root, loaded));
    prop_assert_eq!(hash::hash(&mut arena, root), hash::hash(&mut arena, loaded));
  }

  #[test]
  fn parent_slot_always_points_back_to_child(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    for id in reachable(&arena, root) {
      let Some(parent) = arena.get(id).parent else { continue };
      let Some((slot_name, pos)) = arena.get(id).slot_position() else {
        prop_assert!(false, "node with a parent must carry a slot position");
        unreachable!()
      };
      let found = match arena.get(parent).slot(slot_name) {
        Some(SlotValue::Node(c)) => *c == id,
        Some(SlotValue::List(cs)) => pos.and_then(|i| cs.get(i)).map(|c| *c == id).unwrap_or(false),
        _ => false,
      };
      prop_assert!(found, "child {:?} not found back in parent {:?}'s slot", id, parent);
    }
  }

  #[test]
  fn ancestor_walks_terminate_at_a_rootless_node(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    for id in reachable(&arena, root) {
      let mut seen = BitSet::with_capacity(arena.len());
      let mut last = id;
      for a in traversal::ancestors(&arena, id) {
        prop_assert!(!seen.contains(a.index()), "cycle detected walking ancestors of {:?}", id);
        seen.insert(a.index());
        last = a;
      }
      prop_assert_eq!(arena.get(last).parent, None);
      prop_assert_eq!(traversal::root(&arena, id), root);
    }
  }

  #[test]
  fn mutation_invalidates_hash_up_to_the_root(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    hash::hash(&mut arena, root);
    let leaf = *reachable(&arena, root).last().unwrap();
    let replacement = helpers::literal_int(&mut arena, 999).unwrap();
    if arena.get(leaf).parent.is_some() {
      mutate::replace(&mut arena, leaf, replacement).unwrap();
      for a in traversal::ancestors(&arena, replacement) {
        prop_assert!(arena.get(a).cached_hash().is_none());
      }
    }
  }

  #[test]
  fn transform_with_identity_is_a_no_op(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    let before = hash::hash(&mut arena, root);
    let result = mutate::transform(&mut arena, root, false, |_, n| n);
    prop_assert_eq!(result, root);
    prop_assert_eq!(hash::hash(&mut arena, result), before);
  }

  #[test]
  fn dfs_and_bfs_visit_the_same_node_set_exactly_once(recipe in arb_recipe()) {
    let mut arena = Arena::new();
    let root = build_recipe(&mut arena, &recipe);
    let mut via_dfs: Vec<_> = traversal::dfs(&arena, root).collect();
    let mut via_bfs: Vec<_> = traversal::bfs(&arena, root).collect();
    prop_assert_eq!(via_dfs.len(), via_bfs.len());
    prop_assert_eq!(via_dfs.len(), arena.len(), "every allocated node in this tree is reachable from its own root");
    via_dfs.sort();
    via_bfs.sort();
    prop_assert_eq!(via_dfs, via_bfs);
  }
}

#[test]
fn appending_an_attached_node_elsewhere_severs_its_old_slot() {
  let mut arena = Arena::new();
  let shared = helpers::literal_int(&mut arena, 1).unwrap();
  let first = expr::build(&mut arena, Kind::Tuple, vec![]).unwrap();
  let second = expr::build(&mut arena, Kind::Tuple, vec![]).unwrap();

  mutate::append(&mut arena, first, "expressions", shared).unwrap();
  assert_eq!(arena.get(first).expressions(), &[shared]);
  assert_eq!(arena.get(shared).parent, Some(first));

  mutate::append(&mut arena, second, "expressions", shared).unwrap();
  assert_eq!(arena.get(second).expressions(), &[shared]);
  assert_eq!(arena.get(shared).parent, Some(second));
  assert!(arena.get(first).expressions().is_empty(), "the old owner must no longer reference the reattached node");
}

#[test]
fn arena_acyclicity_holds_across_a_forest_of_recipes() {
  let mut arena = Arena::new();
  let mut roots = Vec::new();
  for n in 0..50i64 {
    roots.push(helpers::literal_int(&mut arena, n).unwrap());
  }
  let mut visited = BitSet::with_capacity(arena.len());
  for id in roots {
    for a in traversal::ancestors(&arena, id) {
      visited.insert(a.index());
    }
  }
  assert_eq!(visited.len(), 50);
}

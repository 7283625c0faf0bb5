//! Tree-rewriting helpers built on top of `transform` (C9 canonicalization
//! rules): table renaming, source expansion, column-table extraction, and
//! the array-index offset adjustment.
//!
//! Grounded in `original_source/sqlglot/expressions/builders.py`'s
//! `column_table_names`, `replace_tables`, `expand`, and
//! `apply_index_offset` — the optimizer-adjacent passes that still belong
//! at the AST-core layer because they only need traversal/mutation, not a
//! dialect or a parser.

use crate::arena::{Arena, NodeId};
use crate::builder::helpers;
use crate::expr::{self, ArgValue};
use crate::kind::Kind;
use crate::mutate;
use crate::slot::SlotValue;
use crate::traversal;
use std::collections::{BTreeSet, HashMap};

/// Dotted `catalog.db.this` name of a `Table` node, quoting rules aside —
/// the identity `replace_tables`/`expand` key tables by.
pub fn table_name(arena: &Arena, table: NodeId) -> String {
  let node = arena.get(table);
  let mut parts = Vec::new();
  if let Some(catalog) = node.slot("catalog").and_then(SlotValue::as_node) {
    parts.push(arena.get(catalog).text("this").into_owned());
  }
  if let Some(db) = node.slot("db").and_then(SlotValue::as_node) {
    parts.push(arena.get(db).text("this").into_owned());
  }
  parts.push(node.this().map(|id| arena.get(id).text("this").into_owned()).unwrap_or_default());
  parts.join(".")
}

/// Distinct table qualifiers referenced by `Column` nodes in `root`,
/// excluding `exclude` (use `""` to keep everything).
pub fn column_table_names(arena: &Arena, root: NodeId, exclude: &str) -> BTreeSet<String> {
  traversal::find_all(arena, root, false, |n| n.kind() == Kind::Column)
    .into_iter()
    .filter_map(|id| arena.get(id).slot("table").and_then(SlotValue::as_node))
    .map(|table_id| arena.get(table_id).text("this").into_owned())
    .filter(|name| !name.is_empty() && name != exclude)
    .collect()
}

/// Rewrite every `Table` reference in `root` per `mapping` (keyed by
/// [`table_name`]), attaching the original dotted name as a comment on the
/// replacement so a generator can re-emit it (S3: `SELECT * FROM c /* a.b */`).
pub fn replace_tables(arena: &mut Arena, root: NodeId, mapping: &HashMap<String, String>, copy: bool) -> NodeId {
  let mapping = mapping.clone();
  mutate::transform(arena, root, copy, move |arena, node| {
    if arena.get(node).kind() != Kind::Table {
      return node;
    }
    let original = table_name(arena, node);
    let Some(new_name) = mapping.get(&original) else { return node };
    let alias = arena.get(node).slot("alias").and_then(SlotValue::as_node);
    let replacement = helpers::table(arena, new_name, None).expect("table() with a valid name never fails");
    if let Some(alias_id) = alias {
      mutate::set(arena, replacement, "alias", Some(ArgValue::Node(alias_id)), None, true).expect("Table always has an `alias` slot");
    }
    mutate::add_comments(arena, replacement, vec![original], false);
    replacement
  })
}

fn expand_node(arena: &mut Arena, node: NodeId, sources: &HashMap<String, NodeId>) -> NodeId {
  if arena.get(node).kind() != Kind::Table {
    return node;
  }
  let name = table_name(arena, node);
  let Some(&source) = sources.get(&name) else { return node };
  let alias_text = {
    let current = arena.get(node).alias(arena);
    if current.is_empty() { name.clone() } else { current.into_owned() }
  };
  let copied_source = crate::copy::deep_copy(arena, source);
  let subquery = expr::build(arena, Kind::Subquery, vec![("this", ArgValue::Node(copied_source))]).expect("Subquery always has a `this` slot");
  let alias = helpers::table_alias(arena, &alias_text).expect("table_alias() never fails");
  mutate::set(arena, subquery, "alias", Some(ArgValue::Node(alias)), None, true).expect("Subquery always has an `alias` slot");
  mutate::add_comments(arena, subquery, vec![format!("source: {name}")], false);
  mutate::transform(arena, subquery, false, |arena, n| expand_node(arena, n, sources))
}

/// Replace each `Table` reference named in `sources` with a subquery over
/// the corresponding source query, recursing into freshly inserted
/// subqueries so chained sources (`x` expands to a query that itself
/// references `y`) are fully unfolded (S4).
pub fn expand(arena: &mut Arena, root: NodeId, sources: &HashMap<String, NodeId>, copy: bool) -> NodeId {
  let sources = sources.clone();
  mutate::transform(arena, root, copy, move |arena, node| expand_node(arena, node, &sources))
}

/// Shift a single array index by `offset`, constant-folding when the index
/// is itself an integer literal. A no-op unless `base`'s type annotation is
/// `ARRAY` — without that annotation this can't tell an array index from an
/// unrelated integer expression.
pub fn apply_index_offset(arena: &mut Arena, base: NodeId, index: NodeId, offset: i64) -> NodeId {
  if offset == 0 {
    return index;
  }
  let is_array = arena
    .get(base)
    .ty
    .map(|ty| arena.get(ty).text("this").eq_ignore_ascii_case("ARRAY"))
    .unwrap_or(false);
  if !is_array {
    return index;
  }
  if arena.get(index).is_int() {
    let n: i64 = arena.get(index).text("this").parse().unwrap_or(0);
    return helpers::literal_int(arena, n + offset).expect("literal_int never fails");
  }
  let offset_lit = helpers::literal_int(arena, offset).expect("literal_int never fails");
  expr::build(arena, Kind::Add, vec![("this", ArgValue::Node(index)), ("expression", ArgValue::Node(offset_lit))]).expect("Add always has `this`/`expression` slots")
}

//! DML entry points (C9): `insert`/`update`/`delete`/`merge`, plus the
//! `SET`/`RETURNING`/`WHEN` helpers they share with each other and with
//! `query.rs`'s `WITH` handling.

use super::helpers;
use crate::arena::{Arena, NodeId};
use crate::error::Result;
use crate::expr::{self, ArgValue};
use crate::kind::Kind;
use crate::mutate;

/// Source of rows for an `INSERT` — either a literal `VALUES (...)` list or
/// a `SELECT` to insert from.
pub enum InsertSource {
  Values(Vec<NodeId>),
  Query(NodeId),
}

pub fn insert(arena: &mut Arena, table: NodeId, columns: Vec<NodeId>, source: InsertSource) -> Result<NodeId> {
  let source_id = match source {
    InsertSource::Values(rows) => expr::build(arena, Kind::Values, vec![("expressions", ArgValue::List(rows))])?,
    InsertSource::Query(q) => q,
  };
  let mut args = vec![("this", ArgValue::Node(table)), ("expression", ArgValue::Node(source_id))];
  if !columns.is_empty() {
    args.push(("columns", ArgValue::List(columns)));
  }
  expr::build(arena, Kind::Insert, args)
}

/// One `column = value` pair of an `UPDATE ... SET` list.
pub fn set_item(arena: &mut Arena, column: NodeId, value: NodeId) -> Result<NodeId> {
  expr::build(arena, Kind::SetItem, vec![("this", ArgValue::Node(column)), ("expression", ArgValue::Node(value))])
}

pub fn update(arena: &mut Arena, table: NodeId, sets: Vec<NodeId>, where_cond: Option<NodeId>) -> Result<NodeId> {
  let mut args = vec![("this", ArgValue::Node(table)), ("expressions", ArgValue::List(sets))];
  if let Some(cond) = where_cond {
    let w = expr::build(arena, Kind::Where, vec![("this", ArgValue::Node(cond))])?;
    args.push(("where", ArgValue::Node(w)));
  }
  expr::build(arena, Kind::Update, args)
}

pub fn delete(arena: &mut Arena, table: NodeId, where_cond: Option<NodeId>) -> Result<NodeId> {
  let mut args = vec![("this", ArgValue::Node(table))];
  if let Some(cond) = where_cond {
    let w = expr::build(arena, Kind::Where, vec![("this", ArgValue::Node(cond))])?;
    args.push(("where", ArgValue::Node(w)));
  }
  expr::build(arena, Kind::Delete, args)
}

/// One `WHEN MATCHED [AND cond] THEN ...` / `WHEN NOT MATCHED THEN ...`
/// clause of a `MERGE`.
pub fn when(arena: &mut Arena, matched: bool, condition: Option<NodeId>, then: NodeId) -> Result<NodeId> {
  let mut args = vec![("matched", ArgValue::Bool(matched)), ("then", ArgValue::Node(then))];
  if let Some(cond) = condition {
    args.push(("condition", ArgValue::Node(cond)));
  }
  expr::build(arena, Kind::When, args)
}

pub fn merge(arena: &mut Arena, target: NodeId, source: NodeId, on: NodeId, whens: Vec<NodeId>) -> Result<NodeId> {
  expr::build(arena, Kind::Merge, vec![("this", ArgValue::Node(target)), ("using", ArgValue::Node(source)), ("on", ArgValue::Node(on)), ("whens", ArgValue::List(whens))])
}

/// Attach a `RETURNING` clause to an already-built `INSERT`/`UPDATE`/`DELETE`
/// node (all three share the same optional `returning` slot).
pub fn returning(arena: &mut Arena, dml: NodeId, projections: Vec<NodeId>) -> Result<()> {
  let r = expr::build(arena, Kind::Returning, vec![("expressions", ArgValue::List(projections))])?;
  mutate::set(arena, dml, "returning", Some(ArgValue::Node(r)), None, true)
}

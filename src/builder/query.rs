//! Fluent `SELECT`/set-op builder (C9). One [`Select`] wraps a single
//! `Kind::Select` node id and grows it in place; each method mirrors a
//! clause, appending to or creating the matching child slot the way
//! `mutate.rs` does everywhere else in this crate.

use super::helpers;
use crate::arena::{Arena, NodeId};
use crate::error::{Error, Result};
use crate::expr::{self, ArgValue};
use crate::kind::Kind;
use crate::mutate;
use crate::slot::SlotValue;

/// A `SELECT` under construction. Call [`Select::build`] (or fold it into a
/// set operation) to get the finished [`NodeId`] back.
pub struct Select(NodeId);

impl Select {
  pub fn new(arena: &mut Arena) -> Result<Self> {
    let id = expr::build(arena, Kind::Select, vec![("expressions", ArgValue::List(vec![]))])?;
    Ok(Self(id))
  }

  pub fn id(&self) -> NodeId {
    self.0
  }

  pub fn build(self) -> NodeId {
    self.0
  }

  pub fn select(self, arena: &mut Arena, projection: NodeId) -> Result<Self> {
    mutate::append(arena, self.0, "expressions", projection)?;
    Ok(self)
  }

  pub fn select_all(mut self, arena: &mut Arena, projections: impl IntoIterator<Item = NodeId>) -> Result<Self> {
    for p in projections {
      self = self.select(arena, p)?;
    }
    Ok(self)
  }

  pub fn from(self, arena: &mut Arena, source: NodeId) -> Result<Self> {
    let from_id = match self.existing_node(arena, "from") {
      Some(id) => id,
      None => {
        let id = expr::build(arena, Kind::From, vec![("expressions", ArgValue::List(vec![]))])?;
        mutate::set(arena, self.0, "from", Some(ArgValue::Node(id)), None, true)?;
        id
      }
    };
    mutate::append(arena, from_id, "expressions", source)?;
    Ok(self)
  }

  pub fn join(self, arena: &mut Arena, table: NodeId, on: Option<NodeId>, join_kind: Option<&str>) -> Result<Self> {
    let mut args = vec![("this", ArgValue::Node(table))];
    if let Some(kw) = join_kind {
      args.push(("kind", ArgValue::Str(kw.to_string())));
    }
    if let Some(on) = on {
      args.push(("on", ArgValue::Node(on)));
    }
    let join = expr::build(arena, Kind::Join, args)?;
    mutate::append(arena, self.0, "joins", join)?;
    Ok(self)
  }

  /// `LATERAL`/`UNNEST`-style join: same slot, spelled out separately since
  /// the source is usually a UDTF call rather than a bare table.
  pub fn lateral(self, arena: &mut Arena, source: NodeId, on: Option<NodeId>) -> Result<Self> {
    self.join(arena, source, on, Some("CROSS"))
  }

  pub fn where_(self, arena: &mut Arena, cond: NodeId) -> Result<Self> {
    match self.existing_node(arena, "where") {
      Some(existing) => {
        let existing_cond = arena.get(existing).this().expect("Where always carries `this`");
        let combined = helpers::and(arena, existing_cond, cond)?;
        mutate::set(arena, existing, "this", Some(ArgValue::Node(combined)), None, true)?;
      }
      None => {
        let w = expr::build(arena, Kind::Where, vec![("this", ArgValue::Node(cond))])?;
        mutate::set(arena, self.0, "where", Some(ArgValue::Node(w)), None, true)?;
      }
    }
    Ok(self)
  }

  pub fn group_by(self, arena: &mut Arena, key: NodeId) -> Result<Self> {
    let group_id = match self.existing_node(arena, "group") {
      Some(id) => id,
      None => {
        let id = expr::build(arena, Kind::Group, vec![("expressions", ArgValue::List(vec![]))])?;
        mutate::set(arena, self.0, "group", Some(ArgValue::Node(id)), None, true)?;
        id
      }
    };
    mutate::append(arena, group_id, "expressions", key)?;
    Ok(self)
  }

  pub fn having(self, arena: &mut Arena, cond: NodeId) -> Result<Self> {
    match self.existing_node(arena, "having") {
      Some(existing) => {
        let existing_cond = arena.get(existing).this().expect("Having always carries `this`");
        let combined = helpers::and(arena, existing_cond, cond)?;
        mutate::set(arena, existing, "this", Some(ArgValue::Node(combined)), None, true)?;
      }
      None => {
        let h = expr::build(arena, Kind::Having, vec![("this", ArgValue::Node(cond))])?;
        mutate::set(arena, self.0, "having", Some(ArgValue::Node(h)), None, true)?;
      }
    }
    Ok(self)
  }

  /// `ordered` should already be a `Kind::Ordered` node (or a bare
  /// expression, for `ASC NULLS LAST` default ordering).
  pub fn order_by(self, arena: &mut Arena, ordered: NodeId) -> Result<Self> {
    let order_id = match self.existing_node(arena, "order") {
      Some(id) => id,
      None => {
        let id = expr::build(arena, Kind::Order, vec![("expressions", ArgValue::List(vec![]))])?;
        mutate::set(arena, self.0, "order", Some(ArgValue::Node(id)), None, true)?;
        id
      }
    };
    mutate::append(arena, order_id, "expressions", ordered)?;
    Ok(self)
  }

  pub fn limit(self, arena: &mut Arena, n: i64) -> Result<Self> {
    let lit = helpers::literal_int(arena, n)?;
    let limit = expr::build(arena, Kind::Limit, vec![("this", ArgValue::Node(lit))])?;
    mutate::set(arena, self.0, "limit", Some(ArgValue::Node(limit)), None, true)?;
    Ok(self)
  }

  pub fn offset(self, arena: &mut Arena, n: i64) -> Result<Self> {
    let lit = helpers::literal_int(arena, n)?;
    let offset = expr::build(arena, Kind::Offset, vec![("this", ArgValue::Node(lit))])?;
    mutate::set(arena, self.0, "offset", Some(ArgValue::Node(offset)), None, true)?;
    Ok(self)
  }

  /// Plain `DISTINCT` (`on = None`) and `DISTINCT ON (...)` are mutually
  /// exclusive forms of the same clause — flipping between them on the
  /// same builder is almost certainly a mistake, not an override.
  pub fn distinct(self, arena: &mut Arena, on: Option<Vec<NodeId>>) -> Result<Self> {
    if let Some(existing) = self.existing_node(arena, "distinct") {
      let existing_has_on = !arena.get(existing).slot("on").map(SlotValue::as_list).unwrap_or(&[]).is_empty();
      if existing_has_on != on.is_some() {
        return Err(Error::AmbiguousBuilder("DISTINCT and DISTINCT ON cannot both be applied to the same SELECT".to_string()));
      }
    }
    let mut args = Vec::new();
    if let Some(cols) = on {
      args.push(("on", ArgValue::List(cols)));
    }
    let distinct = expr::build(arena, Kind::Distinct, args)?;
    mutate::set(arena, self.0, "distinct", Some(ArgValue::Node(distinct)), None, true)?;
    Ok(self)
  }

  pub fn lock(self, arena: &mut Arena, for_update: bool) -> Result<Self> {
    let lock = expr::build(arena, Kind::Lock, vec![("update", ArgValue::Bool(for_update))])?;
    mutate::append(arena, self.0, "locks", lock)?;
    Ok(self)
  }

  pub fn hint(self, arena: &mut Arena, hint: NodeId) -> Result<Self> {
    // Hints ride as leading comments on the Select node itself, the same
    // slot-free channel the comment-directive convention already uses.
    let text = arena.get(hint).text("this").into_owned();
    arena.get_mut(self.0).comments.push(text);
    Ok(self)
  }

  pub fn with(self, arena: &mut Arena, name: &str, query: NodeId, recursive: bool) -> Result<Self> {
    let with_id = match self.existing_node(arena, "with") {
      Some(id) => id,
      None => {
        let id = expr::build(arena, Kind::With, vec![("expressions", ArgValue::List(vec![])), ("recursive", ArgValue::Bool(recursive))])?;
        mutate::set(arena, self.0, "with", Some(ArgValue::Node(id)), None, true)?;
        id
      }
    };
    let alias = helpers::table_alias(arena, name)?;
    let cte = expr::build(arena, Kind::Cte, vec![("this", ArgValue::Node(query)), ("alias", ArgValue::Node(alias))])?;
    mutate::append(arena, with_id, "expressions", cte)?;
    Ok(self)
  }

  pub fn subquery(self, arena: &mut Arena, alias: Option<&str>) -> Result<NodeId> {
    let mut args = vec![("this", ArgValue::Node(self.0))];
    let alias_id = match alias {
      Some(a) => Some(helpers::table_alias(arena, a)?),
      None => None,
    };
    if let Some(alias_id) = alias_id {
      args.push(("alias", ArgValue::Node(alias_id)));
    }
    expr::build(arena, Kind::Subquery, args)
  }

  pub fn union(self, arena: &mut Arena, other: NodeId, distinct: bool) -> Result<NodeId> {
    expr::build(arena, Kind::Union, vec![("this", ArgValue::Node(self.0)), ("expression", ArgValue::Node(other)), ("distinct", ArgValue::Bool(distinct))])
  }

  pub fn intersect(self, arena: &mut Arena, other: NodeId, distinct: bool) -> Result<NodeId> {
    expr::build(arena, Kind::Intersect, vec![("this", ArgValue::Node(self.0)), ("expression", ArgValue::Node(other)), ("distinct", ArgValue::Bool(distinct))])
  }

  pub fn except(self, arena: &mut Arena, other: NodeId, distinct: bool) -> Result<NodeId> {
    expr::build(arena, Kind::Except, vec![("this", ArgValue::Node(self.0)), ("expression", ArgValue::Node(other)), ("distinct", ArgValue::Bool(distinct))])
  }

  /// `CREATE TABLE <table> AS <this select>`.
  pub fn ctas(self, arena: &mut Arena, table: NodeId, replace: bool) -> Result<NodeId> {
    expr::build(
      arena,
      Kind::Create,
      vec![
        ("this", ArgValue::Node(table)),
        ("kind", ArgValue::Str("TABLE".to_string())),
        ("expressions", ArgValue::List(vec![self.0])),
        ("replace", ArgValue::Bool(replace)),
      ],
    )
  }

  fn existing_node(&self, arena: &Arena, slot_name: &str) -> Option<NodeId> {
    arena.get(self.0).slot(slot_name).and_then(SlotValue::as_node)
  }
}

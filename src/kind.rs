//! Node-kind registry (C1) and facet bitmask (C3).
//!
//! The registry is a single process-wide, lazily-built, immutable table —
//! the same shape as `ast-grep-core`'s `Language` symbol tables
//! (`kind_to_id`/`field_id_for_name`), except here the "symbols" are the
//! closed set of SQL AST node kinds rather than a tree-sitter grammar's.

use crate::slot::{self, SlotId};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;

bitflags::bitflags! {
  /// Role facets (C3), replacing sqlglot's deep multiple inheritance
  /// (`Condition`, `Predicate`, `Func`, …) with a bitmask queried from the
  /// registry instead of `isinstance`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
  pub struct Facets: u32 {
    const CONDITION             = 1 << 0;
    const PREDICATE             = 1 << 1;
    const BINARY                = 1 << 2;
    const CONNECTOR             = 1 << 3;
    const FUNC                  = 1 << 4;
    const AGG_FUNC               = 1 << 5;
    const SUBQUERY_PREDICATE    = 1 << 6;
    const DERIVED_TABLE         = 1 << 7;
    const UDTF                  = 1 << 8;
    const QUERY                 = 1 << 9;
    const DML                   = 1 << 10;
    const DDL                   = 1 << 11;
    const COLUMN_CONSTRAINT_KIND = 1 << 12;
    const TIME_UNIT              = 1 << 13;
    const EXPLODE_OUTER          = 1 << 14;
  }
}

/// The closed node-kind set. Additive only — see `spec.md` §4.1's "New kind
/// variants may be added; no existing kind tag may be removed or repurposed."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Kind {
  Literal,
  Identifier,
  Var,
  Null,
  Boolean,
  Star,
  Parameter,
  Placeholder,
  HexString,

  Column,
  Table,
  TableAlias,
  Alias,
  Aliases,

  Select,
  Subquery,
  Union,
  Intersect,
  Except,
  With,
  Cte,
  From,
  Join,
  Where,
  Group,
  Having,
  Order,
  Ordered,
  Limit,
  Offset,
  Distinct,
  Lock,
  Window,
  Values,

  Returning,
  SetItem,
  Paren,
  Tuple,

  Bracket,
  Dot,

  Insert,
  Update,
  Delete,
  Merge,
  When,

  Create,
  Drop,
  AlterTable,
  ColumnDef,
  ColumnConstraint,
  PrimaryKeyColumnConstraint,
  NotNullColumnConstraint,
  DefaultColumnConstraint,

  And,
  Or,
  Xor,
  Not,
  Eq,
  Neq,
  Gt,
  Gte,
  Lt,
  Lte,
  Like,
  ILike,
  Between,
  In,
  Is,
  Exists,

  Add,
  Sub,
  Mul,
  Div,
  Neg,

  SubqueryAll,
  SubqueryAny,

  Anonymous,
  Case,
  If,
  Cast,
  Extract,
  Sum,
  Count,
  Avg,
  Min,
  Max,

  Array,
  Struct,
  Map,
  PropertyEQ,

  Interval,
  TimeStrToTime,
  DateStrToDate,
  TsOrDsToTime,

  Explode,
  Posexplode,
  ExplodeOuter,
  PosexplodeOuter,
  Unnest,

  DataType,
}

const KIND_COUNT: usize = 100;

/// Static declaration of one kind's argument schema. `slots` pairs a slot
/// name with whether it's required; `var_len` marks kinds whose argument
/// count is not fixed (`Func`-style kinds validated by arity elsewhere);
/// `hash_raw_args` marks kinds whose structural hash (C4) folds args by
/// identity rather than the usual sorted/lowercased comparison (`Literal`,
/// `Identifier` — mirrors `_hash_raw_args` in the original `Expression`).
struct KindSpec {
  kind: Kind,
  slots: &'static [(&'static str, bool)],
  var_len: bool,
  hash_raw_args: bool,
  sql_names: &'static [&'static str],
  facets: Facets,
}

const EMPTY: Facets = Facets::empty();

static KIND_SPECS: &[KindSpec] = &[
  KindSpec { kind: Kind::Literal, slots: &[("this", true), ("is_string", true)], var_len: false, hash_raw_args: true, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Identifier, slots: &[("this", true), ("quoted", true)], var_len: false, hash_raw_args: true, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Var, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Null, slots: &[], var_len: false, hash_raw_args: false, sql_names: &["NULL"], facets: EMPTY },
  KindSpec { kind: Kind::Boolean, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["TRUE", "FALSE"], facets: EMPTY },
  KindSpec { kind: Kind::Star, slots: &[("except", false), ("replace", false)], var_len: false, hash_raw_args: false, sql_names: &["*"], facets: EMPTY },
  KindSpec { kind: Kind::Parameter, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Placeholder, slots: &[("this", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::HexString, slots: &[("this", true)], var_len: false, hash_raw_args: true, sql_names: &[], facets: EMPTY },

  KindSpec { kind: Kind::Column, slots: &[("this", true), ("table", false), ("db", false), ("catalog", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Table, slots: &[("this", true), ("db", false), ("catalog", false), ("alias", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::TableAlias, slots: &[("this", true), ("columns", false)], var_len: false, hash_raw_args: false, sql_names: &["AS"], facets: EMPTY },
  KindSpec { kind: Kind::Alias, slots: &[("this", true), ("alias", true)], var_len: false, hash_raw_args: false, sql_names: &["AS"], facets: EMPTY },
  KindSpec { kind: Kind::Aliases, slots: &[("this", true), ("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },

  KindSpec { kind: Kind::Select, slots: &[("with", false), ("expressions", true), ("from", false), ("joins", false), ("where", false), ("group", false), ("having", false), ("order", false), ("limit", false), ("offset", false), ("distinct", false), ("locks", false), ("windows", false)], var_len: false, hash_raw_args: false, sql_names: &["SELECT"], facets: Facets::QUERY },
  KindSpec { kind: Kind::Subquery, slots: &[("this", true), ("alias", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::DERIVED_TABLE },
  KindSpec { kind: Kind::Union, slots: &[("this", true), ("expression", true), ("distinct", false)], var_len: false, hash_raw_args: false, sql_names: &["UNION"], facets: Facets::QUERY },
  KindSpec { kind: Kind::Intersect, slots: &[("this", true), ("expression", true), ("distinct", false)], var_len: false, hash_raw_args: false, sql_names: &["INTERSECT"], facets: Facets::QUERY },
  KindSpec { kind: Kind::Except, slots: &[("this", true), ("expression", true), ("distinct", false)], var_len: false, hash_raw_args: false, sql_names: &["EXCEPT"], facets: Facets::QUERY },
  KindSpec { kind: Kind::With, slots: &[("expressions", true), ("recursive", false)], var_len: false, hash_raw_args: false, sql_names: &["WITH"], facets: EMPTY },
  KindSpec { kind: Kind::Cte, slots: &[("this", true), ("alias", true), ("materialized", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::From, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["FROM"], facets: EMPTY },
  KindSpec { kind: Kind::Join, slots: &[("this", true), ("on", false), ("using", false), ("kind", false), ("side", false)], var_len: false, hash_raw_args: false, sql_names: &["JOIN"], facets: EMPTY },
  KindSpec { kind: Kind::Where, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["WHERE"], facets: EMPTY },
  KindSpec { kind: Kind::Group, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["GROUP BY"], facets: EMPTY },
  KindSpec { kind: Kind::Having, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["HAVING"], facets: EMPTY },
  KindSpec { kind: Kind::Order, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["ORDER BY"], facets: EMPTY },
  KindSpec { kind: Kind::Ordered, slots: &[("this", true), ("desc", false), ("nulls_first", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Limit, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["LIMIT"], facets: EMPTY },
  KindSpec { kind: Kind::Offset, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["OFFSET"], facets: EMPTY },
  KindSpec { kind: Kind::Distinct, slots: &[("expressions", false), ("on", false)], var_len: false, hash_raw_args: false, sql_names: &["DISTINCT"], facets: EMPTY },
  KindSpec { kind: Kind::Lock, slots: &[("update", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Window, slots: &[("this", true), ("partition_by", false), ("order", false), ("spec", false)], var_len: false, hash_raw_args: false, sql_names: &["OVER"], facets: EMPTY },
  KindSpec { kind: Kind::Values, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["VALUES"], facets: EMPTY },

  KindSpec { kind: Kind::Returning, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["RETURNING"], facets: EMPTY },
  KindSpec { kind: Kind::SetItem, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::Paren, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::CONDITION },
  KindSpec { kind: Kind::Tuple, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },

  KindSpec { kind: Kind::Bracket, slots: &[("this", true), ("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::CONDITION },
  KindSpec { kind: Kind::Dot, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["."], facets: Facets::BINARY },

  KindSpec { kind: Kind::Insert, slots: &[("this", true), ("columns", false), ("expression", false), ("returning", false)], var_len: false, hash_raw_args: false, sql_names: &["INSERT"], facets: Facets::DML },
  KindSpec { kind: Kind::Update, slots: &[("this", true), ("expressions", true), ("from", false), ("where", false), ("with", false), ("returning", false)], var_len: false, hash_raw_args: false, sql_names: &["UPDATE"], facets: Facets::DML },
  KindSpec { kind: Kind::Delete, slots: &[("this", true), ("where", false), ("using", false), ("returning", false), ("with", false)], var_len: false, hash_raw_args: false, sql_names: &["DELETE"], facets: Facets::DML },
  KindSpec { kind: Kind::Merge, slots: &[("this", true), ("using", true), ("on", true), ("whens", true), ("with", false)], var_len: false, hash_raw_args: false, sql_names: &["MERGE"], facets: Facets::DML },
  KindSpec { kind: Kind::When, slots: &[("matched", true), ("source", false), ("condition", false), ("then", true)], var_len: false, hash_raw_args: false, sql_names: &["WHEN"], facets: EMPTY },

  KindSpec { kind: Kind::Create, slots: &[("this", true), ("kind", true), ("expressions", false), ("properties", false), ("replace", false), ("exists", false)], var_len: false, hash_raw_args: false, sql_names: &["CREATE"], facets: Facets::DDL },
  KindSpec { kind: Kind::Drop, slots: &[("this", true), ("kind", true), ("exists", false)], var_len: false, hash_raw_args: false, sql_names: &["DROP"], facets: Facets::DDL },
  KindSpec { kind: Kind::AlterTable, slots: &[("this", true), ("actions", true)], var_len: false, hash_raw_args: false, sql_names: &["ALTER TABLE"], facets: Facets::DDL },
  KindSpec { kind: Kind::ColumnDef, slots: &[("this", true), ("kind", true), ("constraints", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
  KindSpec { kind: Kind::ColumnConstraint, slots: &[("this", false), ("kind", true)], var_len: false, hash_raw_args: false, sql_names: &["CONSTRAINT"], facets: EMPTY },
  KindSpec { kind: Kind::PrimaryKeyColumnConstraint, slots: &[("desc", false)], var_len: false, hash_raw_args: false, sql_names: &["PRIMARY KEY"], facets: Facets::COLUMN_CONSTRAINT_KIND },
  KindSpec { kind: Kind::NotNullColumnConstraint, slots: &[("allow_null", false)], var_len: false, hash_raw_args: false, sql_names: &["NOT NULL"], facets: Facets::COLUMN_CONSTRAINT_KIND },
  KindSpec { kind: Kind::DefaultColumnConstraint, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["DEFAULT"], facets: Facets::COLUMN_CONSTRAINT_KIND },

  KindSpec { kind: Kind::And, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["AND"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::CONNECTOR.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Or, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["OR"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::CONNECTOR.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Xor, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["XOR"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::CONNECTOR.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Not, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["NOT"], facets: Facets::CONDITION },
  KindSpec { kind: Kind::Eq, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["="], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Neq, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["<>", "!="], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Gt, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &[">"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Gte, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &[">="], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Lt, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["<"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Lte, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["<="], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Like, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["LIKE"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::ILike, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["ILIKE"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Between, slots: &[("this", true), ("low", true), ("high", true)], var_len: false, hash_raw_args: false, sql_names: &["BETWEEN"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits()) },
  KindSpec { kind: Kind::In, slots: &[("this", true), ("expressions", false), ("query", false), ("unnest", false)], var_len: false, hash_raw_args: false, sql_names: &["IN"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits()) },
  KindSpec { kind: Kind::Is, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["IS"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::BINARY.bits()) },
  KindSpec { kind: Kind::Exists, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["EXISTS"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::PREDICATE.bits() | Facets::SUBQUERY_PREDICATE.bits()) },

  KindSpec { kind: Kind::Add, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["+"], facets: Facets::BINARY },
  KindSpec { kind: Kind::Sub, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["-"], facets: Facets::BINARY },
  KindSpec { kind: Kind::Mul, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["*"], facets: Facets::BINARY },
  KindSpec { kind: Kind::Div, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["/"], facets: Facets::BINARY },
  KindSpec { kind: Kind::Neg, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["-"], facets: Facets::CONDITION },

  KindSpec { kind: Kind::SubqueryAll, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["ALL"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::SUBQUERY_PREDICATE.bits()) },
  KindSpec { kind: Kind::SubqueryAny, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["ANY", "SOME"], facets: Facets::from_bits_truncate(Facets::CONDITION.bits() | Facets::SUBQUERY_PREDICATE.bits()) },

  KindSpec { kind: Kind::Anonymous, slots: &[("this", true), ("expressions", false)], var_len: true, hash_raw_args: false, sql_names: &[], facets: Facets::FUNC },
  KindSpec { kind: Kind::Case, slots: &[("this", false), ("ifs", true), ("default", false)], var_len: false, hash_raw_args: false, sql_names: &["CASE"], facets: Facets::CONDITION },
  KindSpec { kind: Kind::If, slots: &[("this", true), ("true", true), ("false", false)], var_len: false, hash_raw_args: false, sql_names: &["IF"], facets: Facets::CONDITION },
  KindSpec { kind: Kind::Cast, slots: &[("this", true), ("to", true)], var_len: false, hash_raw_args: false, sql_names: &["CAST"], facets: Facets::FUNC },
  KindSpec { kind: Kind::Extract, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &["EXTRACT"], facets: Facets::FUNC },
  KindSpec { kind: Kind::Sum, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["SUM"], facets: Facets::from_bits_truncate(Facets::FUNC.bits() | Facets::AGG_FUNC.bits()) },
  KindSpec { kind: Kind::Count, slots: &[("this", false), ("big_int", false)], var_len: false, hash_raw_args: false, sql_names: &["COUNT"], facets: Facets::from_bits_truncate(Facets::FUNC.bits() | Facets::AGG_FUNC.bits()) },
  KindSpec { kind: Kind::Avg, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["AVG"], facets: Facets::from_bits_truncate(Facets::FUNC.bits() | Facets::AGG_FUNC.bits()) },
  KindSpec { kind: Kind::Min, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["MIN"], facets: Facets::from_bits_truncate(Facets::FUNC.bits() | Facets::AGG_FUNC.bits()) },
  KindSpec { kind: Kind::Max, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["MAX"], facets: Facets::from_bits_truncate(Facets::FUNC.bits() | Facets::AGG_FUNC.bits()) },

  KindSpec { kind: Kind::Array, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["ARRAY"], facets: EMPTY },
  KindSpec { kind: Kind::Struct, slots: &[("expressions", true)], var_len: false, hash_raw_args: false, sql_names: &["STRUCT"], facets: EMPTY },
  KindSpec { kind: Kind::Map, slots: &[("keys", true), ("values", true)], var_len: false, hash_raw_args: false, sql_names: &["MAP"], facets: EMPTY },
  KindSpec { kind: Kind::PropertyEQ, slots: &[("this", true), ("expression", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::BINARY },

  KindSpec { kind: Kind::Interval, slots: &[("this", true), ("unit", false)], var_len: false, hash_raw_args: false, sql_names: &["INTERVAL"], facets: Facets::TIME_UNIT },
  KindSpec { kind: Kind::TimeStrToTime, slots: &[("this", true), ("zone", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::FUNC },
  KindSpec { kind: Kind::DateStrToDate, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::FUNC },
  KindSpec { kind: Kind::TsOrDsToTime, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &[], facets: Facets::FUNC },

  KindSpec { kind: Kind::Explode, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["EXPLODE"], facets: Facets::UDTF },
  KindSpec { kind: Kind::Posexplode, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["POSEXPLODE"], facets: Facets::UDTF },
  KindSpec { kind: Kind::ExplodeOuter, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["EXPLODE_OUTER"], facets: Facets::from_bits_truncate(Facets::UDTF.bits() | Facets::EXPLODE_OUTER.bits()) },
  KindSpec { kind: Kind::PosexplodeOuter, slots: &[("this", true)], var_len: false, hash_raw_args: false, sql_names: &["POSEXPLODE_OUTER"], facets: Facets::from_bits_truncate(Facets::UDTF.bits() | Facets::EXPLODE_OUTER.bits()) },
  KindSpec { kind: Kind::Unnest, slots: &[("expressions", true), ("ordinality", false), ("alias", false)], var_len: false, hash_raw_args: false, sql_names: &["UNNEST"], facets: Facets::from_bits_truncate(Facets::UDTF.bits() | Facets::DERIVED_TABLE.bits()) },

  KindSpec { kind: Kind::DataType, slots: &[("this", true), ("expressions", false), ("nested", false)], var_len: false, hash_raw_args: false, sql_names: &[], facets: EMPTY },
];

/// Resolved, interned counterpart to [`KindSpec`] — what the registry
/// actually hands callers.
pub struct KindInfo {
  pub kind: Kind,
  slots: Vec<(SlotId, &'static str, bool)>,
  pub var_len: bool,
  pub hash_raw_args: bool,
  pub sql_names: &'static [&'static str],
  pub facets: Facets,
}

impl KindInfo {
  pub fn slot_id(&self, name: &str) -> Option<SlotId> {
    self.slots.iter().find(|(_, n, _)| *n == name).map(|(id, _, _)| *id)
  }

  pub fn slot_name(&self, id: SlotId) -> Option<&'static str> {
    self.slots.iter().find(|(sid, _, _)| *sid == id).map(|(_, n, _)| *n)
  }

  pub fn required_slots(&self) -> impl Iterator<Item = (SlotId, &'static str)> + '_ {
    self.slots.iter().filter(|(_, _, req)| *req).map(|(id, n, _)| (*id, *n))
  }

  pub fn all_slots(&self) -> impl Iterator<Item = (SlotId, &'static str)> + '_ {
    self.slots.iter().map(|(id, n, _)| (*id, *n))
  }

  pub fn has_facet(&self, f: Facets) -> bool {
    self.facets.contains(f)
  }
}

struct KindTable {
  by_kind: Vec<KindInfo>,
  by_sql_name: HashMap<String, Kind>,
}

fn build_registry() -> KindTable {
  assert_eq!(KIND_SPECS.len(), KIND_COUNT, "KIND_SPECS must cover every Kind exactly once");
  let mut by_kind = Vec::with_capacity(KIND_SPECS.len());
  let mut by_sql_name = HashMap::new();
  for (idx, spec) in KIND_SPECS.iter().enumerate() {
    assert_eq!(spec.kind as usize, idx, "KIND_SPECS order must match Kind declaration order");
    let slots = spec.slots.iter().map(|(name, req)| (slot::intern(name), *name, *req)).collect();
    for sql_name in spec.sql_names {
      by_sql_name.entry(sql_name.to_ascii_lowercase()).or_insert(spec.kind);
    }
    by_kind.push(KindInfo {
      kind: spec.kind,
      slots,
      var_len: spec.var_len,
      hash_raw_args: spec.hash_raw_args,
      sql_names: spec.sql_names,
      facets: spec.facets,
    });
  }
  KindTable { by_kind, by_sql_name }
}

static REGISTRY: Lazy<KindTable> = Lazy::new(build_registry);

pub fn kind_info(kind: Kind) -> &'static KindInfo {
  &REGISTRY.by_kind[kind as usize]
}

/// Case-insensitive lookup by SQL keyword/symbol, for a parser handing us a
/// token to route into a node.
pub fn lookup_by_sql_name(name: &str) -> Option<Kind> {
  REGISTRY.by_sql_name.get(&name.to_ascii_lowercase()).copied()
}

static STRICT_MODE: OnceCell<bool> = OnceCell::new();

/// Sets the registry's unittest-strict flag (spec §9 "Global mutable
/// state" / `spec.md` §4.1's `unittest-strict` validation mode). May only
/// be set once per process — later calls are ignored, same as
/// `ast-grep-core`'s immutable-after-init language tables.
pub fn set_strict_mode(enabled: bool) {
  let _ = STRICT_MODE.set(enabled);
}

pub fn strict_mode() -> bool {
  *STRICT_MODE.get().unwrap_or(&false)
}

/// Canonicalizes a `TimeUnit`-facet slot's unit text (e.g. `Interval`'s
/// `unit` slot) to its full name: `"D"` → `"DAY"`, `"Q"` → `"QUARTER"`.
/// Unknown abbreviations pass through uppercased unchanged.
pub fn canonicalize_time_unit(raw: &str) -> String {
  const TABLE: &[(&str, &str)] = &[
    ("Y", "YEAR"),
    ("Q", "QUARTER"),
    ("M", "MONTH"),
    ("W", "WEEK"),
    ("D", "DAY"),
    ("H", "HOUR"),
    ("MI", "MINUTE"),
    ("S", "SECOND"),
    ("MS", "MILLISECOND"),
    ("US", "MICROSECOND"),
    ("NS", "NANOSECOND"),
  ];
  let upper = raw.to_ascii_uppercase();
  TABLE.iter().find(|(abbrev, _)| *abbrev == upper).map(|(_, full)| full.to_string()).unwrap_or(upper)
}

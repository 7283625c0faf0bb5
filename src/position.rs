//! Source-span metadata (C11) and the `Token` carrier the external tokenizer
//! hands to the parser.
//!
//! Positions are not a dedicated field on [`crate::expr::Expression`]; they
//! live in its open `meta` map under the four well-known keys in
//! [`POSITION_META_KEYS`], exactly as sqlglot stores `line`/`col`/`start`/`end`
//! in `Expression.meta`. This keeps `update_positions` a meta-merge instead of
//! a special-cased struct field.

use crate::expr::MetaValue;

/// The four meta keys that carry source position.
pub const POSITION_META_KEYS: [&str; 4] = ["line", "col", "start", "end"];

/// Token emitted by the external tokenizer. The parser is the only consumer;
/// this crate only needs enough of its shape to propagate positions (C11)
/// and comments onto freshly built nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub kind: String,
  pub text: String,
  pub line: u32,
  pub col: u32,
  pub start: u32,
  pub end: u32,
  pub comments: Vec<String>,
}

impl Token {
  pub fn new(kind: impl Into<String>, text: impl Into<String>, line: u32, col: u32, start: u32, end: u32) -> Self {
    Self {
      kind: kind.into(),
      text: text.into(),
      line,
      col,
      start,
      end,
      comments: Vec::new(),
    }
  }
}

/// Either a [`Token`] or another node's `meta`, used as the source for
/// `update_positions`.
pub enum PositionSource<'a> {
  Token(&'a Token),
  Meta(&'a indexmap::IndexMap<String, MetaValue>),
  Explicit {
    line: Option<i64>,
    col: Option<i64>,
    start: Option<i64>,
    end: Option<i64>,
  },
}

/// Merge position keys from `source` into `target`, in place.
///
/// With a [`Token`] or another node's meta, the four position keys are copied
/// wholesale (for a node source, only keys actually present are copied — a
/// node that was never positioned leaves the target's existing position
/// alone). With `Explicit`, the four fields are written directly, even when
/// `None` (mirrors sqlglot's `update_positions(None, line=.., ...)` which
/// always writes all four).
pub fn update_positions(target: &mut indexmap::IndexMap<String, MetaValue>, source: PositionSource) {
  match source {
    PositionSource::Token(tok) => {
      target.insert("line".into(), MetaValue::Int(tok.line as i64));
      target.insert("col".into(), MetaValue::Int(tok.col as i64));
      target.insert("start".into(), MetaValue::Int(tok.start as i64));
      target.insert("end".into(), MetaValue::Int(tok.end as i64));
    }
    PositionSource::Meta(other) => {
      for key in POSITION_META_KEYS {
        if let Some(v) = other.get(key) {
          target.insert(key.to_string(), v.clone());
        }
      }
    }
    PositionSource::Explicit { line, col, start, end } => {
      target.insert("line".into(), opt_int(line));
      target.insert("col".into(), opt_int(col));
      target.insert("start".into(), opt_int(start));
      target.insert("end".into(), opt_int(end));
    }
  }
}

fn opt_int(v: Option<i64>) -> MetaValue {
  match v {
    Some(n) => MetaValue::Int(n),
    None => MetaValue::Null,
  }
}

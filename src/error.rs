//! Crate-wide error type (spec §7). One `thiserror`-derived enum colocated
//! at the crate root, in the same spirit as `ast-grep-core`'s per-file
//! `TSParseError` / `KindMatcherError` — here there is a single raising site
//! family (construction, mutation, conversion, builders) so one enum covers
//! all of it rather than one per module.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The external tokenizer/parser failed before this crate ever saw a node.
  /// This crate never raises this variant itself; it exists so a parser
  /// crate sitting on top of this one has a place to report failures through
  /// the same `Result` alias callers already use.
  #[error("parse failure: {message}")]
  ParseFailure { message: String },

  /// A node failed validation: an unknown slot name under strict mode, a
  /// required slot left absent, or an argument-count mismatch for a `Func`
  /// kind with a fixed arity.
  #[error("invalid node of kind `{kind}`: {reason}")]
  InvalidNode { kind: &'static str, reason: String },

  /// A serialized `kind` tag (C10 load path) does not match any entry in
  /// the registry.
  #[error("unknown node kind `{0}`")]
  UnknownKind(String),

  /// A host value passed to `convert` (C8) has no mapping into the node
  /// model (e.g. a float `NaN`, or a type with no literal representation).
  #[error("cannot convert value into an expression: {0}")]
  UnconvertibleValue(String),

  /// A builder method (C9) was given mutually exclusive or self-contradictory
  /// argument forms (e.g. both a raw SQL string and structured columns for
  /// the same clause).
  #[error("ambiguous builder input: {0}")]
  AmbiguousBuilder(String),
}

pub type Result<T> = std::result::Result<T, Error>;

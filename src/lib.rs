//! A dialect-agnostic SQL abstract syntax tree: a closed, arena-backed node
//! model (C1-C4) with iterative traversal and mutation (C5-C7), host-value
//! conversion (C8), a fluent query/DML builder (C9), and a JSON-shaped
//! serializer (C10), plus source-position bookkeeping (C11).
//!
//! This crate owns the tree and the operations over it. It does not parse
//! or generate SQL text itself — a tokenizer/parser and a per-dialect
//! generator are expected to sit on top of [`expr::build`] and
//! [`builder`], the same way this crate's `Error::ParseFailure` variant
//! exists for such a layer to report through without inventing its own
//! error type.

pub mod arena;
pub mod builder;
pub mod convert;
pub mod copy;
pub mod error;
pub mod expr;
pub mod hash;
pub mod kind;
pub mod mutate;
pub mod persist;
pub mod position;
pub mod rewrite;
pub mod slot;
pub mod traversal;

pub use arena::{Arena, NodeId};
pub use error::{Error, Result};
pub use expr::{ArgValue, Expression, MetaValue};
pub use kind::{Facets, Kind};
pub use slot::{Scalar, SlotId, SlotValue};

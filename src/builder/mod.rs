//! Fluent construction DSL (C9): builds well-formed trees directly, without
//! going through a parser. `helpers` holds the canonicalization rules
//! (identifier quoting, connector parenthesization, cast elision) shared by
//! the query and DML builders.

pub mod dml;
pub mod helpers;
pub mod query;

pub use dml::{delete, insert, merge, returning, set_item, update, when, InsertSource};
pub use query::Select;

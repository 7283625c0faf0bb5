//! Host-value conversion (C8): turn a Rust-native value into the
//! `Literal`/`Boolean`/`HexString`/`Array`/temporal-wrapper node that
//! represents it, the dispatch sqlglot's module-level `convert()` function
//! performs for values handed to builders from outside the AST.

use crate::arena::{Arena, NodeId};
use crate::error::{Error, Result};
use crate::expr::{self, ArgValue};
use crate::kind::Kind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A Rust-native value that can be lifted into the node model. `Node`
/// passes an already-built id through unchanged — the same "already an
/// Expression, leave it alone" branch sqlglot's `convert()` has for values
/// that are already `Expression` instances.
#[derive(Debug, Clone)]
pub enum HostValue {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  Bytes(Vec<u8>),
  Date(NaiveDate),
  DateTime(NaiveDateTime),
  /// Datetime with an explicit zone name/offset, e.g. `"UTC"` — distinct
  /// from [`HostValue::DateTime`] because it carries a separate `zone`
  /// literal (§4.8's `datetime with tz` row).
  DateTimeTz(NaiveDateTime, String),
  Time(NaiveTime),
  /// An ordered sequence with no fixed arity — converts to `Array`.
  List(Vec<HostValue>),
  /// A fixed-arity ordered group — converts to `Tuple`, distinct from
  /// `List`/`Array` per §4.8's table.
  Tuple(Vec<HostValue>),
  /// An unordered key/value collection — converts to
  /// `Map(Array(keys), Array(values))`.
  Mapping(Vec<(String, HostValue)>),
  /// A named-tuple-like or other object with named fields — converts to
  /// `Struct` with one `PropertyEQ` per field.
  Struct(Vec<(String, HostValue)>),
  Node(NodeId),
}

fn hex_encode(bytes: &[u8]) -> String {
  bytes.iter().map(|b| format!("{b:02X}")).collect()
}

fn format_float(f: f64) -> String {
  if f.fract() == 0.0 {
    format!("{f:.1}")
  } else {
    f.to_string()
  }
}

pub fn convert(arena: &mut Arena, value: HostValue) -> Result<NodeId> {
  match value {
    HostValue::Node(id) => Ok(id),
    HostValue::Null => expr::build(arena, Kind::Null, vec![]),
    HostValue::Bool(b) => expr::build(arena, Kind::Boolean, vec![("this", ArgValue::Bool(b))]),
    HostValue::Int(i) => expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(i.to_string())), ("is_string", ArgValue::Bool(false))]),
    HostValue::Float(f) => {
      if f.is_nan() || f.is_infinite() {
        return Err(Error::UnconvertibleValue(format!("non-finite float {f}")));
      }
      expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(format_float(f))), ("is_string", ArgValue::Bool(false))])
    }
    HostValue::Str(s) => expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(s)), ("is_string", ArgValue::Bool(true))]),
    HostValue::Bytes(bytes) => expr::build(arena, Kind::HexString, vec![("this", ArgValue::Str(hex_encode(&bytes)))]),
    HostValue::Date(date) => {
      let text = expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(date.format("%Y-%m-%d").to_string())), ("is_string", ArgValue::Bool(true))])?;
      expr::build(arena, Kind::DateStrToDate, vec![("this", ArgValue::Node(text))])
    }
    HostValue::DateTime(dt) => {
      let text = expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(dt.format("%Y-%m-%d %H:%M:%S").to_string())), ("is_string", ArgValue::Bool(true))])?;
      expr::build(arena, Kind::TimeStrToTime, vec![("this", ArgValue::Node(text))])
    }
    HostValue::DateTimeTz(dt, zone) => {
      let text = expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(dt.format("%Y-%m-%d %H:%M:%S").to_string())), ("is_string", ArgValue::Bool(true))])?;
      let zone = expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(zone)), ("is_string", ArgValue::Bool(true))])?;
      expr::build(arena, Kind::TimeStrToTime, vec![("this", ArgValue::Node(text)), ("zone", ArgValue::Node(zone))])
    }
    HostValue::Time(time) => {
      let text = expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(time.format("%H:%M:%S").to_string())), ("is_string", ArgValue::Bool(true))])?;
      expr::build(arena, Kind::TsOrDsToTime, vec![("this", ArgValue::Node(text))])
    }
    HostValue::List(items) => {
      let mut ids = Vec::with_capacity(items.len());
      for item in items {
        ids.push(convert(arena, item)?);
      }
      expr::build(arena, Kind::Array, vec![("expressions", ArgValue::List(ids))])
    }
    HostValue::Tuple(items) => {
      let mut ids = Vec::with_capacity(items.len());
      for item in items {
        ids.push(convert(arena, item)?);
      }
      expr::build(arena, Kind::Tuple, vec![("expressions", ArgValue::List(ids))])
    }
    HostValue::Mapping(pairs) => {
      let mut key_ids = Vec::with_capacity(pairs.len());
      let mut value_ids = Vec::with_capacity(pairs.len());
      for (key, value) in pairs {
        key_ids.push(expr::build(arena, Kind::Literal, vec![("this", ArgValue::Str(key)), ("is_string", ArgValue::Bool(true))])?);
        value_ids.push(convert(arena, value)?);
      }
      let keys = expr::build(arena, Kind::Array, vec![("expressions", ArgValue::List(key_ids))])?;
      let values = expr::build(arena, Kind::Array, vec![("expressions", ArgValue::List(value_ids))])?;
      expr::build(arena, Kind::Map, vec![("keys", ArgValue::Node(keys)), ("values", ArgValue::Node(values))])
    }
    HostValue::Struct(fields) => {
      let mut entries = Vec::with_capacity(fields.len());
      for (name, value) in fields {
        let field_name = expr::build(arena, Kind::Var, vec![("this", ArgValue::Str(name))])?;
        let field_value = convert(arena, value)?;
        entries.push(expr::build(arena, Kind::PropertyEQ, vec![("this", ArgValue::Node(field_name)), ("expression", ArgValue::Node(field_value))])?);
      }
      expr::build(arena, Kind::Struct, vec![("expressions", ArgValue::List(entries))])
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::slot::SlotValue;

  #[test]
  fn int_becomes_non_string_literal() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Int(42)).unwrap();
    let node = arena.get(id);
    assert!(node.is_number());
    assert!(node.is_int());
    assert_eq!(node.text("this"), "42");
  }

  #[test]
  fn float_keeps_a_decimal_point_even_when_whole() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Float(3.0)).unwrap();
    let node = arena.get(id);
    assert!(node.is_number());
    assert!(!node.is_int());
    assert_eq!(node.text("this"), "3.0");
  }

  #[test]
  fn nan_is_unconvertible() {
    let mut arena = Arena::new();
    assert!(convert(&mut arena, HostValue::Float(f64::NAN)).is_err());
  }

  #[test]
  fn string_becomes_string_literal() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Str("hi".into())).unwrap();
    assert!(arena.get(id).is_string());
  }

  #[test]
  fn bytes_become_hex_string() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Bytes(vec![0xDE, 0xAD])).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::HexString);
    assert_eq!(arena.get(id).text("this"), "DEAD");
  }

  #[test]
  fn list_becomes_array_of_converted_elements() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::List(vec![HostValue::Int(1), HostValue::Int(2)])).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::Array);
    assert_eq!(arena.get(id).expressions().len(), 2);
  }

  #[test]
  fn tuple_becomes_tuple_not_array() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Tuple(vec![HostValue::Int(1), HostValue::Str("a".into())])).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::Tuple);
    assert_eq!(arena.get(id).expressions().len(), 2);
  }

  #[test]
  fn mapping_becomes_map_of_key_and_value_arrays() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Mapping(vec![("a".into(), HostValue::Int(1)), ("b".into(), HostValue::Int(2))])).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::Map);
    let keys = arena.get(id).slot("keys").and_then(SlotValue::as_node).unwrap();
    let values = arena.get(id).slot("values").and_then(SlotValue::as_node).unwrap();
    assert_eq!(arena.get(keys).kind(), Kind::Array);
    assert_eq!(arena.get(values).kind(), Kind::Array);
    assert_eq!(arena.get(keys).expressions().len(), 2);
    assert_eq!(arena.get(arena.get(keys).expressions()[0]).text("this"), "a");
  }

  #[test]
  fn named_tuple_becomes_struct_with_one_property_eq_per_field() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Struct(vec![("x".into(), HostValue::Int(1)), ("y".into(), HostValue::Int(2))])).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::Struct);
    let fields = arena.get(id).expressions();
    assert_eq!(fields.len(), 2);
    assert_eq!(arena.get(fields[0]).kind(), Kind::PropertyEQ);
    let field_name = arena.get(fields[0]).this().unwrap();
    assert_eq!(arena.get(field_name).text("this"), "x");
  }

  #[test]
  fn time_becomes_ts_or_ds_to_time() {
    let mut arena = Arena::new();
    let id = convert(&mut arena, HostValue::Time(chrono::NaiveTime::from_hms_opt(13, 30, 0).unwrap())).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::TsOrDsToTime);
  }

  #[test]
  fn datetime_with_tz_wraps_an_iso_literal_and_a_zone_literal() {
    let mut arena = Arena::new();
    let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let id = convert(&mut arena, HostValue::DateTimeTz(dt, "UTC".into())).unwrap();
    assert_eq!(arena.get(id).kind(), Kind::TimeStrToTime);
    let zone = arena.get(id).slot("zone").and_then(SlotValue::as_node).unwrap();
    assert_eq!(arena.get(zone).text("this"), "UTC");
  }

  #[test]
  fn node_passes_through_unchanged() {
    let mut arena = Arena::new();
    let id = expr::build(&mut arena, Kind::Null, vec![]).unwrap();
    assert_eq!(convert(&mut arena, HostValue::Node(id)).unwrap(), id);
  }
}

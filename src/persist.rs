//! Serializer (C10): `dump`/`load` to and from a JSON-shaped
//! `serde_json::Value`, with the round-trip contract `equal(load(dump(n)),
//! n)` and hash-equality.
//!
//! Shape: `{"kind": "<Kind>", "args": {slot_name: value, ...}, "comments":
//! [...], "meta": {...}, "type": dump(ty)}`. Child slots nest the same
//! shape; list slots become JSON arrays of them. `comments`/`meta`/`type`
//! are omitted when absent to keep the common case compact.

use crate::arena::{Arena, NodeId};
use crate::error::{Error, Result};
use crate::expr::{self, ArgValue, MetaValue};
use crate::kind::Kind;
use crate::slot::{Scalar, SlotValue};
use serde_json::{Map, Value};

fn scalar_to_json(s: &Scalar) -> Value {
  match s {
    Scalar::Str(s) => Value::String(s.clone()),
    Scalar::Int(i) => Value::Number((*i).into()),
    Scalar::Bool(b) => Value::Bool(*b),
  }
}

pub fn dump(arena: &Arena, root: NodeId) -> Value {
  let node = arena.get(root);
  let mut args = Map::new();
  for (name, value) in node.populated_args() {
    let v = match value {
      SlotValue::Node(id) => dump(arena, *id),
      SlotValue::List(ids) => Value::Array(ids.iter().map(|id| dump(arena, *id)).collect()),
      SlotValue::Scalar(s) => scalar_to_json(s),
      SlotValue::Absent => Value::Null,
    };
    args.insert(name.to_string(), v);
  }
  let mut obj = Map::new();
  obj.insert("kind".to_string(), serde_json::to_value(node.kind()).expect("Kind always serializes"));
  obj.insert("args".to_string(), Value::Object(args));
  if !node.comments.is_empty() {
    obj.insert("comments".to_string(), Value::Array(node.comments.iter().cloned().map(Value::String).collect()));
  }
  if !node.meta.is_empty() {
    obj.insert("meta".to_string(), serde_json::to_value(&node.meta).expect("meta map always serializes"));
  }
  if let Some(ty) = node.ty {
    obj.insert("type".to_string(), dump(arena, ty));
  }
  Value::Object(obj)
}

fn json_to_arg(arena: &mut Arena, value: &Value) -> Result<ArgValue> {
  match value {
    Value::Object(_) => Ok(ArgValue::Node(load(arena, value)?)),
    Value::Array(items) => {
      let mut ids = Vec::with_capacity(items.len());
      for item in items {
        ids.push(load(arena, item)?);
      }
      Ok(ArgValue::List(ids))
    }
    Value::String(s) => Ok(ArgValue::Str(s.clone())),
    Value::Bool(b) => Ok(ArgValue::Bool(*b)),
    Value::Number(n) => {
      if let Some(i) = n.as_i64() {
        Ok(ArgValue::Int(i))
      } else {
        Ok(ArgValue::Str(n.to_string()))
      }
    }
    Value::Null => Ok(ArgValue::Str(String::new())),
  }
}

/// Parse a previously-[`dump`]ed value back into the arena. Fails with
/// [`Error::UnknownKind`] if the `kind` tag doesn't match a registered
/// kind, or [`Error::InvalidNode`] if the shape is missing required fields.
pub fn load(arena: &mut Arena, value: &Value) -> Result<NodeId> {
  let obj = value.as_object().ok_or_else(|| Error::InvalidNode { kind: "<unknown>", reason: "expected a JSON object".to_string() })?;
  let kind_value = obj.get("kind").ok_or_else(|| Error::InvalidNode { kind: "<unknown>", reason: "missing `kind` field".to_string() })?;
  let kind: Kind = serde_json::from_value(kind_value.clone()).map_err(|_| Error::UnknownKind(kind_value.to_string()))?;
  let args_obj = obj.get("args").and_then(Value::as_object);
  let mut args = Vec::new();
  if let Some(args_obj) = args_obj {
    for (name, v) in args_obj {
      args.push((name.as_str(), json_to_arg(arena, v)?));
    }
  }
  let id = expr::build(arena, kind, args)?;
  if let Some(Value::Array(comments)) = obj.get("comments") {
    let texts = comments.iter().filter_map(|c| c.as_str().map(str::to_string));
    arena.get_mut(id).comments.extend(texts);
  }
  if let Some(meta_value) = obj.get("meta") {
    let meta: std::collections::BTreeMap<String, MetaValue> = serde_json::from_value(meta_value.clone()).map_err(|e| Error::InvalidNode { kind: "<unknown>", reason: e.to_string() })?;
    for (k, v) in meta {
      arena.get_mut(id).meta.insert(k, v);
    }
  }
  if let Some(type_value) = obj.get("type") {
    let ty = load(arena, type_value)?;
    arena.get_mut(id).ty = Some(ty);
  }
  Ok(id)
}

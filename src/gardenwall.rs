//! The garden wall: the boundary that converts between host JSON values (`serde_json::Value`)
//! and runtime `Value`s.
//!
//! Input conversion never fails: anything that doesn't fit the value model (non-finite floats)
//! is silently rounded to `Null`, mirroring the value model's invariant that no runtime value
//! ever carries NaN or infinity. Output conversion can fail: a `Function` or `Regex` cannot
//! cross back out to JSON.
//!
//! `spec.md` §4.7 also describes converting host date/time values to an ISO-8601 `String`;
//! `serde_json::Value` has no date/time variant of its own; a caller with native datetimes is
//! expected to serialize them to RFC 3339 strings before they reach this boundary, the same way
//! `serde_json` itself treats dates as plain strings.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::value::Value;

#[derive(Debug, Clone)]
pub enum GardenWallError {
    Unrepresentable { type_name: &'static str },
    NonFiniteNumber(f64),
}

impl std::fmt::Display for GardenWallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GardenWallError::Unrepresentable { type_name } => {
                write!(f, "cannot convert a {type_name} value to JSON")
            }
            GardenWallError::NonFiniteNumber(n) => {
                write!(f, "cannot convert non-finite number {n} to JSON")
            }
        }
    }
}

impl std::error::Error for GardenWallError {}

/// Eagerly convert a host JSON value into a fully-materialized runtime `Value`.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Value::Number(f),
            _ => Value::Null,
        },
        Json::String(s) => Value::string(s.clone()),
        Json::Array(items) => Value::array(items.iter().map(from_json).collect()),
        Json::Object(map) => {
            let mut out = IndexMap::new();
            for (k, v) in map {
                out.insert(k.clone(), from_json(v));
            }
            Value::object(out)
        }
    }
}

/// Convert a host JSON value into a runtime `Value`, but keep any Array/Object unmaterialized:
/// only `len`/`keys` are available for free, and per-element access lazily converts and caches
/// one child at a time. Nested collections are themselves lazy — laziness is recursive.
pub fn from_json_lazy(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Value::Number(f),
            _ => Value::Null,
        },
        Json::String(s) => Value::string(s.clone()),
        Json::Array(items) => {
            let source: Rc<[Json]> = Rc::from(items.clone());
            Value::Array(Rc::new(crate::lazy::LazyArray::lazy(source)))
        }
        Json::Object(map) => {
            let source = Rc::new(map.clone());
            Value::Object(Rc::new(crate::lazy::LazyObject::lazy(source)))
        }
    }
}

/// Convert a runtime `Value` back out to a host JSON value. Functions and Regexes have no JSON
/// representation and are rejected.
pub fn to_json(value: &Value) -> Result<Json, GardenWallError> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Boolean(b) => Ok(Json::Bool(*b)),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(Json::Number)
            .ok_or(GardenWallError::NonFiniteNumber(*n)),
        Value::String(s) => Ok(Json::String(s.to_string())),
        Value::Array(arr) => {
            let items = arr.materialize().iter().map(to_json).collect::<Result<Vec<_>, _>>()?;
            Ok(Json::Array(items))
        }
        Value::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (k, v) in obj.materialize() {
                map.insert(k, to_json(&v)?);
            }
            Ok(Json::Object(map))
        }
        Value::Function(_) => Err(GardenWallError::Unrepresentable { type_name: "function" }),
        Value::Regex(_) => Err(GardenWallError::Unrepresentable { type_name: "regex" }),
    }
}

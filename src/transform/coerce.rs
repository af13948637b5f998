//! Schema coercion
//!
//! Forecast is loose about JSON types (numeric ids as strings, booleans as
//! `"true"`). Records are walked alongside their JSON schema and each value
//! is converted to the first declared type it can represent.

use crate::error::{Error, Result};
use crate::state::parse_instant;
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value};

/// Coerce `record` to `schema`, failing with [`Error::Transform`]
pub fn transform_record(stream: &str, record: &Value, schema: &Value) -> Result<Value> {
    coerce(record, schema, "$").map_err(|message| Error::transform(stream, message))
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ if schema.get("properties").is_some() => vec!["object"],
        _ => Vec::new(),
    }
}

fn allows_null(schema: &Value) -> bool {
    let types = declared_types(schema);
    types.is_empty() || types.contains(&"null")
}

fn coerce(value: &Value, schema: &Value, path: &str) -> std::result::Result<Value, String> {
    if let Some(options) = schema.get("anyOf").and_then(Value::as_array) {
        return options
            .iter()
            .find_map(|option| coerce(value, option, path).ok())
            .ok_or_else(|| format!("{path}: no anyOf branch accepts {value}"));
    }

    let types = declared_types(schema);
    if types.is_empty() {
        return Ok(value.clone());
    }

    if value.is_null() {
        return if types.contains(&"null") {
            Ok(Value::Null)
        } else {
            Err(format!("{path}: null is not allowed"))
        };
    }

    let mut last_error = None;
    for ty in types.iter().filter(|t| **t != "null") {
        match coerce_as(ty, value, schema, path) {
            Ok(v) => return Ok(v),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| format!("{path}: {value} does not match {types:?}")))
}

fn coerce_as(
    ty: &str,
    value: &Value,
    schema: &Value,
    path: &str,
) -> std::result::Result<Value, String> {
    let mismatch = || format!("{path}: cannot read {value} as {ty}");
    match ty {
        "object" => {
            let obj = value.as_object().ok_or_else(mismatch)?;
            coerce_object(obj, schema, path)
        }
        "array" => {
            let items = value.as_array().ok_or_else(mismatch)?;
            let item_schema = schema.get("items").unwrap_or(&Value::Null);
            items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce(item, item_schema, &format!("{path}[{i}]")))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "integer" => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| Value::from(f as i64))
                .ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        "number" => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        "boolean" => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        "string" => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(mismatch()),
            };
            if schema.get("format").and_then(Value::as_str) == Some("date-time") {
                let instant = parse_instant(&text).ok_or_else(mismatch)?;
                return Ok(Value::String(
                    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ));
            }
            Ok(Value::String(text))
        }
        other => Err(format!("{path}: unsupported schema type '{other}'")),
    }
}

fn coerce_object(
    obj: &Map<String, Value>,
    schema: &Value,
    path: &str,
) -> std::result::Result<Value, String> {
    let properties = schema.get("properties").and_then(Value::as_object);
    let mut out = Map::with_capacity(obj.len());

    for (key, value) in obj {
        let field_path = format!("{path}.{key}");
        let coerced = match properties.and_then(|p| p.get(key)) {
            Some(field_schema) => coerce(value, field_schema, &field_path)?,
            None => value.clone(),
        };
        out.insert(key.clone(), coerced);
    }

    // Absent optional fields are written as explicit nulls
    if let Some(properties) = properties {
        for (key, field_schema) in properties {
            if !out.contains_key(key) && allows_null(field_schema) {
                out.insert(key.clone(), Value::Null);
            }
        }
    }

    Ok(Value::Object(out))
}

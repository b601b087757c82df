// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive value coercion.

use serde_json::{Number, Value};

use crate::definition::PrimitiveType;
use crate::value::ModelValue;

/// Converts raw JSON into a value of the given primitive kind.
///
/// - Numbers keep numeric input, parse numeric strings and map booleans to
///   `1`/`0`. Integer kinds truncate fractional input toward zero.
/// - Booleans map the string `"true"` (any case) to `true` and every other
///   string to `false`; other input goes by truthiness.
/// - Strings take the natural text of the input; arrays and objects become
///   JSON text.
/// - [`PrimitiveType::Any`] passes the input through.
///
/// Returns `None` when the input cannot be read as the requested kind. Only
/// numeric kinds can fail.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{ModelValue, PrimitiveType, coerce_primitive};
/// use serde_json::json;
///
/// assert_eq!(coerce_primitive(PrimitiveType::Integer, &json!("42.9")), Some(ModelValue::from(42_i64)));
/// assert_eq!(coerce_primitive(PrimitiveType::Boolean, &json!("TRUE")), Some(ModelValue::Bool(true)));
/// assert_eq!(coerce_primitive(PrimitiveType::String, &json!(7)), Some(ModelValue::from("7")));
/// assert_eq!(coerce_primitive(PrimitiveType::Number, &json!("seven")), None);
/// ```
#[must_use]
pub fn coerce_primitive(kind: PrimitiveType, raw: &Value) -> Option<ModelValue> {
    match kind {
        PrimitiveType::Number => to_number(raw).map(ModelValue::Number),
        PrimitiveType::Integer => to_number(raw).and_then(truncate).map(ModelValue::Number),
        PrimitiveType::Boolean => Some(ModelValue::Bool(to_bool(raw))),
        PrimitiveType::String => Some(ModelValue::String(to_text(raw))),
        PrimitiveType::Any => Some(ModelValue::from(raw)),
    }
}

fn to_number(raw: &Value) -> Option<Number> {
    match raw {
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::String(s) => parse_number(s.trim()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(int.into());
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "truncation toward zero is the integer conversion rule"
)]
fn truncate(number: Number) -> Option<Number> {
    if number.is_i64() || number.is_u64() {
        return Some(number);
    }
    let float = number.as_f64()?.trunc();
    if float < i64::MIN as f64 || float > i64::MAX as f64 {
        return None;
    }
    Some(Number::from(float as i64))
}

fn to_bool(raw: &Value) -> bool {
    match raw {
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        other => ModelValue::from(other).is_truthy(),
    }
}

fn to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

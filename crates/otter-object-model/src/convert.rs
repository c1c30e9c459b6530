//! Type conversion abstract operations
//!
//! Conversions that reach objects go through `@@toPrimitive` or
//! `valueOf`/`toString`, so they can run host code and fail.

use crate::error::{ObjectResult, TypeInvariant};
use crate::object::{InternalMethods, ObjectRef};
use crate::operations::get_method;
use crate::property::PropertyKey;
use crate::string::JsString;
use crate::value::{Symbol, Value};
use std::sync::Arc;

/// Largest safe integer, the upper bound of `ToLength`
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Hint passed to `ToPrimitive`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No preference (`"default"`)
    Default,
    /// `"number"`
    Number,
    /// `"string"`
    String,
}

impl PreferredType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

/// ToPrimitive
pub fn to_primitive(value: &Value, hint: PreferredType) -> ObjectResult<Value> {
    let Value::Object(obj) = value else {
        return Ok(value.clone());
    };
    if let Some(exotic) = get_method(value, &PropertyKey::Symbol(Symbol::to_primitive()))? {
        let result = exotic.call(value, &[Value::string(hint.as_str())])?;
        if result.is_object() {
            return Err(
                TypeInvariant::ConversionFailed("Cannot convert object to primitive value").into(),
            );
        }
        return Ok(result);
    }
    ordinary_to_primitive(obj, hint)
}

/// OrdinaryToPrimitive
pub fn ordinary_to_primitive(obj: &ObjectRef, hint: PreferredType) -> ObjectResult<Value> {
    let order = if hint == PreferredType::String {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    let receiver = Value::Object(obj.clone());
    for name in order {
        let method = obj.get(&PropertyKey::from(name), &receiver)?;
        if let Value::Object(method) = method
            && method.is_callable()
        {
            let result = method.call(&receiver, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(TypeInvariant::ConversionFailed("Cannot convert object to primitive value").into())
}

/// ToNumber
pub fn to_number(value: &Value) -> ObjectResult<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::String(s) => Ok(string_to_number(s.as_str())),
        Value::Symbol(_) => {
            Err(TypeInvariant::ConversionFailed("Cannot convert a Symbol value to a number").into())
        }
        Value::Object(_) => to_number(&to_primitive(value, PreferredType::Number)?),
    }
}

/// StringToNumber
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if s.len() > 2 && s.as_bytes()[0] == b'0' {
        let radix = match s.as_bytes()[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&s[2..], radix);
        }
    }
    if !is_decimal_literal(s) {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

fn is_js_whitespace(c: char) -> bool {
    matches!(c, '\u{FEFF}' | '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}'
        | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}')
        || c.is_ascii_whitespace()
        || c == '\u{000B}'
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut result = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => result = result * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    result
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// ToIntegerOrInfinity on an already-converted number
pub fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        return 0.0;
    }
    if n.is_infinite() {
        return n;
    }
    n.trunc()
}

/// ToUint32 on an already-converted number
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// ToInt32 on an already-converted number
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToLength
pub fn to_length(value: &Value) -> ObjectResult<u64> {
    let len = to_integer_or_infinity(to_number(value)?);
    if len <= 0.0 {
        return Ok(0);
    }
    Ok(len.min(MAX_SAFE_INTEGER) as u64)
}

/// ToString
pub fn to_string(value: &Value) -> ObjectResult<Arc<JsString>> {
    match value {
        Value::Undefined => Ok(JsString::intern("undefined")),
        Value::Null => Ok(JsString::intern("null")),
        Value::Boolean(b) => Ok(JsString::intern(if *b { "true" } else { "false" })),
        Value::Number(n) => Ok(JsString::intern(&number_to_string(*n))),
        Value::String(s) => Ok(s.clone()),
        Value::Symbol(_) => {
            Err(TypeInvariant::ConversionFailed("Cannot convert a Symbol value to a string").into())
        }
        Value::Object(_) => to_string(&to_primitive(value, PreferredType::String)?),
    }
}

/// ToPropertyKey
pub fn to_property_key(value: &Value) -> ObjectResult<PropertyKey> {
    match to_primitive(value, PreferredType::String)? {
        Value::Symbol(sym) => Ok(PropertyKey::Symbol(sym)),
        Value::Number(n)
            if n >= 0.0 && n.fract() == 0.0 && n <= crate::property::MAX_INDEX as f64 =>
        {
            Ok(PropertyKey::Index(n as u64))
        }
        primitive => Ok(PropertyKey::from_js_string(to_string(&primitive)?)),
    }
}

/// Number::toString(10)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(n).to_string()
}

/// CanonicalNumericIndexString
pub fn canonical_numeric_index_string(s: &str) -> Option<f64> {
    if s == "-0" {
        return Some(-0.0);
    }
    let n = string_to_number(s);
    (number_to_string(n) == s).then_some(n)
}

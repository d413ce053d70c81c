//! SDL token formatting

use crate::value::Value;

/// Numbers use Rust's shortest round-trip representation.
pub fn number(n: f64) -> String {
    if n == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    n.to_string()
}

/// `<a, b, c>`
pub fn vector(components: &[String]) -> String {
    format!("<{}>", components.join(", "))
}

pub fn quoted(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

pub fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

/// Formats a plain value. Numeric lists become vectors; strings pass
/// through unquoted since they are identifiers or keywords. Entity
/// references have no plain form and yield `None`.
pub fn value(v: &Value) -> Option<String> {
    Some(match v {
        Value::Bool(b) => on_off(*b).to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => number(*f),
        Value::Str(s) => s.clone(),
        Value::List(items) if items.iter().all(Value::is_finite_number) => {
            vector(&items.iter().map(value).collect::<Option<Vec<_>>>()?)
        }
        Value::List(items) => items.iter().map(value).collect::<Option<Vec<_>>>()?.join(", "),
        Value::Entity(_) => return None,
    })
}

/// Color keyword: `rgb`, optionally sRGB-prefixed and suffixed with
/// filter and transmit markers.
pub fn color_keyword(base: &str, srgb: bool, filter: bool, transmit: bool) -> String {
    let mut keyword = String::new();
    if srgb {
        keyword.push('s');
    }
    keyword.push_str(base);
    if filter {
        keyword.push('f');
    }
    if transmit {
        keyword.push('t');
    }
    keyword
}

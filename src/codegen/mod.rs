//! Source-code backend.
//!
//! Turns values into PHP literals and models the generated class. The
//! statement compiler produces expressions with the helpers here; the emitter
//! assembles them into a [`GeneratedClass`].

mod class;

pub use class::{GeneratedClass, Method, MethodParameter, Property, Visibility};

use crate::value::Value;

/// Inline arrays longer than this are written one item per line.
const INLINE_LIMIT: usize = 60;

/// True for names usable as a bare PHP identifier.
///
/// ```rust
/// use ferrous_di_compiler::codegen::is_identifier;
///
/// assert!(is_identifier("createServiceLogger"));
/// assert!(!is_identifier("9lives"));
/// assert!(!is_identifier("db.main"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

/// Member name after `->` or `::$`, braced when it is not an identifier.
pub fn format_member(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("{{{}}}", dump_string(name))
    }
}

/// PHP literal for a value.
///
/// ```rust
/// use ferrous_di_compiler::{codegen::dump, Value};
///
/// assert_eq!(dump(&Value::Null), "NULL");
/// assert_eq!(dump(&Value::Float(2.0)), "2.0");
/// assert_eq!(dump(&Value::from("it's")), "'it\\'s'");
/// assert_eq!(dump(&Value::List(vec![Value::Int(1), Value::Bool(true)])), "array(1, TRUE)");
/// ```
pub fn dump(value: &Value) -> String {
    dump_level(value, 0)
}

/// Comma separated literals, for call argument lists.
pub fn dump_args(values: &[Value]) -> String {
    values.iter().map(dump).collect::<Vec<_>>().join(", ")
}

fn dump_level(value: &Value, level: usize) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => dump_float(*f),
        Value::String(s) => dump_string(s),
        Value::Literal(code) => code.clone(),
        Value::Reference(reference) => dump_string(&reference.to_string()),
        Value::Statement(statement) => dump_string(&statement.entity.to_string()),
        Value::List(items) => {
            let entries: Vec<(Option<String>, &Value)> = items.iter().map(|item| (None, item)).collect();
            dump_array(&entries, level)
        }
        Value::Map(map) => {
            let entries: Vec<(Option<String>, &Value)> =
                map.iter().map(|(key, item)| (Some(dump_key(key)), item)).collect();
            dump_array(&entries, level)
        }
    }
}

fn dump_key(key: &str) -> String {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => key.to_string(),
        _ => dump_string(key),
    }
}

fn dump_array(entries: &[(Option<String>, &Value)], level: usize) -> String {
    if entries.is_empty() {
        return "array()".to_string();
    }

    let render = |level: usize| -> Vec<String> {
        entries
            .iter()
            .map(|(key, item)| match key {
                Some(key) => format!("{} => {}", key, dump_level(item, level)),
                None => dump_level(item, level),
            })
            .collect()
    };

    let inline = render(level).join(", ");
    let has_comment = entries
        .iter()
        .any(|(_, item)| matches!(item, Value::Literal(code) if code.contains("//")));
    if !has_comment && inline.len() <= INLINE_LIMIT && !inline.contains('\n') {
        return format!("array({})", inline);
    }

    let indent = "\t".repeat(level + 1);
    let mut out = String::from("array(\n");
    for item in render(level + 1) {
        out.push_str(&indent);
        out.push_str(&item);
        out.push_str(",\n");
    }
    out.push_str(&"\t".repeat(level));
    out.push(')');
    out
}

fn dump_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let s = format!("{:?}", f);
    if s.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Quoted PHP string; double quotes only when control characters need escapes.
pub fn dump_string(s: &str) -> String {
    if s.chars().any(|c| c.is_control()) {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '$' => out.push_str("\\$"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\x1b' => out.push_str("\\e"),
                '\x0b' => out.push_str("\\v"),
                '\x0c' => out.push_str("\\f"),
                c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

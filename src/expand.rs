//! `%placeholder%` expansion against a parameter table.
//!
//! Expansion is a pure, recursive substitution applied to definition fields
//! before any resolution runs:
//!
//! - `%name%` looks `name` up in the table, `%a.b%` walks nested maps and lists;
//! - a placeholder spanning the whole string yields the parameter value itself,
//!   keeping its type;
//! - a placeholder embedded in longer text must resolve to a scalar;
//! - `%%` produces a literal `%`;
//! - parameter values are themselves expanded, loops are reported.
//!
//! ```rust
//! use ferrous_di_compiler::{expand, Value};
//! use indexmap::IndexMap;
//!
//! let mut params = IndexMap::new();
//! params.insert("host".to_string(), Value::from("localhost"));
//! params.insert("dsn".to_string(), Value::from("mysql:host=%host%"));
//! params.insert("port".to_string(), Value::Int(3306));
//!
//! assert_eq!(expand(&Value::from("%dsn%;port=%port%"), &params).unwrap(),
//!            Value::from("mysql:host=localhost;port=3306"));
//! assert_eq!(expand(&Value::from("%port%"), &params).unwrap(), Value::Int(3306));
//! assert_eq!(expand(&Value::from("100%%"), &params).unwrap(), Value::from("100%"));
//! ```

use indexmap::IndexMap;

use crate::error::{DiError, DiResult};
use crate::statement::{Entity, Statement};
use crate::value::Value;

/// Expands placeholders in `value`, descending into lists, maps and statements.
pub fn expand(value: &Value, params: &IndexMap<String, Value>) -> DiResult<Value> {
    expand_value(value, params, &[])
}

/// Expands placeholders in a statement's entity and arguments.
pub fn expand_statement(statement: &Statement, params: &IndexMap<String, Value>) -> DiResult<Statement> {
    expand_statement_inner(statement, params, &[])
}

/// Expands placeholders in a single string.
pub fn expand_text(text: &str, params: &IndexMap<String, Value>) -> DiResult<Value> {
    expand_str(text, params, &[])
}

fn expand_value(value: &Value, params: &IndexMap<String, Value>, stack: &[String]) -> DiResult<Value> {
    match value {
        Value::String(text) => expand_str(text, params, stack),
        Value::List(items) => items
            .iter()
            .map(|item| expand_value(item, params, stack))
            .collect::<DiResult<Vec<_>>>()
            .map(Value::List),
        Value::Map(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), expand_value(item, params, stack)?);
            }
            Ok(Value::Map(out))
        }
        Value::Statement(statement) => Ok(Value::Statement(Box::new(expand_statement_inner(
            statement, params, stack,
        )?))),
        other => Ok(other.clone()),
    }
}

fn expand_statement_inner(
    statement: &Statement,
    params: &IndexMap<String, Value>,
    stack: &[String],
) -> DiResult<Statement> {
    let entity = match &statement.entity {
        Entity::Code(_) | Entity::Not => statement.entity.clone(),
        other => {
            let text = other.to_string();
            if text.contains('%') {
                Entity::parse(&expand_to_string(&text, params, stack)?)?
            } else {
                other.clone()
            }
        }
    };
    let arguments = statement
        .arguments
        .map_values(|value| expand_value(value, params, stack))?;
    Ok(Statement { entity, arguments })
}

fn expand_to_string(text: &str, params: &IndexMap<String, Value>, stack: &[String]) -> DiResult<String> {
    match expand_str(text, params, stack)? {
        Value::String(s) => Ok(s),
        other => other
            .scalar_string()
            .ok_or_else(|| DiError::InvalidStatement(text.to_string())),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn expand_str(text: &str, params: &IndexMap<String, Value>, stack: &[String]) -> DiResult<Value> {
    if !text.contains('%') {
        return Ok(Value::String(text.to_string()));
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let (start, c) = chars[i];
        if c != '%' {
            out.push(c);
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && is_name_char(chars[j].1) {
            j += 1;
        }
        if j >= chars.len() || chars[j].1 != '%' {
            out.push('%');
            i += 1;
            continue;
        }
        let name_start = start + 1;
        let name_end = chars[j].0;
        let name = &text[name_start..name_end];
        i = j + 1;
        if name.is_empty() {
            out.push('%');
            continue;
        }

        let value = lookup(name, params, stack)?;
        if name.len() + 2 == text.len() {
            return Ok(value);
        }
        match value.scalar_string() {
            Some(s) => out.push_str(&s),
            None => {
                return Err(DiError::NonScalarParameter {
                    parameter: name.to_string(),
                    input: text.to_string(),
                })
            }
        }
    }
    Ok(Value::String(out))
}

fn lookup(name: &str, params: &IndexMap<String, Value>, stack: &[String]) -> DiResult<Value> {
    if stack.iter().any(|entry| entry == name) {
        let mut path = stack.to_vec();
        path.push(name.to_string());
        return Err(DiError::CircularParameter(path));
    }

    let mut segments = name.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = params
        .get(first)
        .ok_or_else(|| DiError::MissingParameter(name.to_string()))?;
    for segment in segments {
        current = match current {
            Value::Map(map) => map.get(segment),
            Value::List(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
            _ => None,
        }
        .ok_or_else(|| DiError::MissingParameter(name.to_string()))?;
    }

    let mut nested = stack.to_vec();
    nested.push(name.to_string());
    expand_value(current, params, &nested)
}

//! Argument and parameter values.

use indexmap::IndexMap;

use crate::statement::{Reference, Statement};

/// A value appearing as a statement argument, tag value or container parameter.
///
/// Strings of the form `@name` are turned into [`Reference`]s by the `From<&str>`
/// conversion, so definitions can be written the way they appear in configuration
/// files:
///
/// ```rust
/// use ferrous_di_compiler::{Reference, Value};
///
/// assert_eq!(Value::from("@logger"), Value::Reference(Reference::Service("logger".into())));
/// assert_eq!(Value::from("plain text"), Value::String("plain text".into()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// Reference to another service, resolved at compile time
    Reference(Reference),
    /// Nested call description, compiled recursively
    Statement(Box<Statement>),
    /// Raw source fragment emitted verbatim
    Literal(String),
}

impl Value {
    /// Creates a raw source fragment.
    pub fn literal(code: impl Into<String>) -> Self {
        Value::Literal(code.into())
    }

    /// Returns true for values that can be concatenated into a string.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_))
    }

    /// String form used when a scalar is embedded into a longer string.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        match Reference::parse(s) {
            Some(reference) => Value::Reference(reference),
            None => Value::String(s.to_string()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from(s.as_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Reference(r)
    }
}

impl From<Statement> for Value {
    fn from(s: Statement) -> Self {
        Value::Statement(Box::new(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Positional and named arguments of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: IndexMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a positional-only argument list.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: IndexMap::new(),
        }
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.positional.push(value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// True when no argument is passed by name.
    pub fn is_list(&self) -> bool {
        self.named.is_empty()
    }

    /// Returns the positional values, or `None` if named arguments are present.
    pub fn into_list(self) -> Option<Vec<Value>> {
        if self.named.is_empty() {
            Some(self.positional)
        } else {
            None
        }
    }

    /// Iterates over all values, positional first.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.positional.iter().chain(self.named.values())
    }

    pub fn map_values<F>(&self, mut f: F) -> crate::DiResult<Self>
    where
        F: FnMut(&Value) -> crate::DiResult<Value>,
    {
        let positional = self.positional.iter().map(&mut f).collect::<Result<Vec<_>, _>>()?;
        let mut named = IndexMap::with_capacity(self.named.len());
        for (name, value) in &self.named {
            named.insert(name.clone(), f(value)?);
        }
        Ok(Self { positional, named })
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: IndexMap::new(),
        }
    }
}

/// Empty argument list for calls that take no arguments.
pub const NO_ARGS: [Value; 0] = [];

//! Call descriptions: entities, references and statements.
//!
//! A [`Statement`] is "what to call" ([`Entity`]) plus the arguments to call it
//! with. Statements form trees; arguments may contain nested statements and
//! service references which the compiler turns into source expressions.

use std::fmt;

use crate::error::{DiError, DiResult};
use crate::value::{Arguments, Value};

/// Reserved name of the service currently being emitted.
pub const CREATED_SERVICE: &str = "self";

/// Reserved name of the container itself.
pub const THIS_CONTAINER: &str = "container";

/// Reference to a service, written `@name` in configuration.
///
/// References carry no identity of their own; they are resolved to a service
/// name when a statement is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// `@name`
    Service(String),
    /// `@\Some\Type`: the single autowired service of that type
    ByType(String),
    /// `@self`: the service whose body is being generated
    SelfService,
    /// `@container`: the container instance
    Container,
}

impl Reference {
    /// Parses `@name`, `@\Type`, `@self` or `@container`.
    ///
    /// Returns `None` for anything that is not a reference token.
    ///
    /// ```rust
    /// use ferrous_di_compiler::Reference;
    ///
    /// assert_eq!(Reference::parse("@self"), Some(Reference::SelfService));
    /// assert_eq!(Reference::parse("@\\App\\Mailer"), Some(Reference::ByType("App\\Mailer".into())));
    /// assert_eq!(Reference::parse("@db.main"), None);
    /// assert_eq!(Reference::parse("logger"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Reference> {
        let name = token.strip_prefix('@')?;
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\') {
            return None;
        }
        Some(if name.contains('\\') {
            Reference::ByType(name.trim_start_matches('\\').to_string())
        } else if name == CREATED_SERVICE {
            Reference::SelfService
        } else if name == THIS_CONTAINER {
            Reference::Container
        } else {
            Reference::Service(name.to_string())
        })
    }

    pub fn service(name: impl Into<String>) -> Self {
        Reference::Service(name.into())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Service(name) => write!(f, "@{}", name),
            Reference::ByType(ty) => write!(f, "@\\{}", ty),
            Reference::SelfService => write!(f, "@{}", CREATED_SERVICE),
            Reference::Container => write!(f, "@{}", THIS_CONTAINER),
        }
    }
}

/// Left-hand side of a member access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Instance member of a service
    Service(Reference),
    /// Static member of a class
    Type(String),
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Service(reference) => reference.fmt(f),
            Receiver::Type(ty) => f.write_str(ty),
        }
    }
}

/// What a statement calls or constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// `Class`: constructor call
    Type(String),
    /// `@service`: service retrieval or factory call
    Service(Reference),
    /// `::function`: free function call
    Function(String),
    /// `Class::method` or `@service::method`
    Method { receiver: Receiver, method: String },
    /// `Class::$prop` or `@service::$prop`: property assignment
    Property { receiver: Receiver, property: String },
    /// Raw callable expression
    Code(String),
    /// Logical negation of the single argument
    Not,
}

impl Entity {
    /// Parses the textual entity forms used in definitions.
    ///
    /// ```rust
    /// use ferrous_di_compiler::{Entity, Receiver, Reference};
    ///
    /// assert_eq!(Entity::parse("Widget").unwrap(), Entity::Type("Widget".into()));
    /// assert_eq!(
    ///     Entity::parse("@mailer::$from").unwrap(),
    ///     Entity::Property {
    ///         receiver: Receiver::Service(Reference::Service("mailer".into())),
    ///         property: "from".into(),
    ///     }
    /// );
    /// assert_eq!(Entity::parse("::strlen").unwrap(), Entity::Function("strlen".into()));
    /// assert!(Entity::parse("A::b::c").is_err());
    /// ```
    pub fn parse(input: &str) -> DiResult<Entity> {
        let invalid = || DiError::InvalidStatement(input.to_string());

        if input == "not" {
            return Ok(Entity::Not);
        }
        if let Some(reference) = Reference::parse(input) {
            return Ok(Entity::Service(reference));
        }
        if let Some((left, member)) = input.split_once("::") {
            if member.is_empty() || member.contains("::") {
                return Err(invalid());
            }
            if left.is_empty() {
                return Ok(Entity::Function(member.to_string()));
            }
            let receiver = match Reference::parse(left) {
                Some(reference) => Receiver::Service(reference),
                None if left.starts_with('@') => return Err(invalid()),
                None => Receiver::Type(left.to_string()),
            };
            return Ok(match member.strip_prefix('$') {
                Some("") => return Err(invalid()),
                Some(property) => Entity::Property {
                    receiver,
                    property: property.to_string(),
                },
                None => Entity::Method {
                    receiver,
                    method: member.to_string(),
                },
            });
        }
        if input.is_empty() || input.starts_with('@') {
            return Err(invalid());
        }
        Ok(Entity::Type(input.to_string()))
    }

    /// Raw callable expression, emitted verbatim.
    pub fn code(raw: impl Into<String>) -> Self {
        Entity::Code(raw.into())
    }

    /// The literal class name when the entity is a plain type.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Entity::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Type(ty) => f.write_str(ty),
            Entity::Service(reference) => reference.fmt(f),
            Entity::Function(name) => write!(f, "::{}", name),
            Entity::Method { receiver, method } => write!(f, "{}::{}", receiver, method),
            Entity::Property { receiver, property } => write!(f, "{}::${}", receiver, property),
            Entity::Code(raw) => f.write_str(raw),
            Entity::Not => f.write_str("not"),
        }
    }
}

/// An entity plus the arguments to invoke it with.
///
/// # Examples
///
/// ```rust
/// use ferrous_di_compiler::{Statement, Value};
///
/// let statement = Statement::parse("Mailer::create")
///     .unwrap()
///     .arg("smtp")
///     .named_arg("logger", "@logger");
/// assert_eq!(statement.arguments.positional, vec![Value::String("smtp".into())]);
/// assert_eq!(statement.arguments.named.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub entity: Entity,
    pub arguments: Arguments,
}

impl Statement {
    pub fn new(entity: Entity, arguments: impl Into<Arguments>) -> Self {
        Self {
            entity,
            arguments: arguments.into(),
        }
    }

    /// Statement without arguments.
    pub fn of(entity: Entity) -> Self {
        Self::new(entity, Arguments::new())
    }

    /// Parses the entity from its textual form, see [`Entity::parse`].
    pub fn parse(entity: &str) -> DiResult<Self> {
        Ok(Self::of(Entity::parse(entity)?))
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value);
        self
    }

    /// Adds a named argument.
    pub fn named_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name, value);
        self
    }
}

impl From<Entity> for Statement {
    fn from(entity: Entity) -> Self {
        Statement::of(entity)
    }
}

//! Service definitions.

use indexmap::IndexMap;

use crate::error::DiResult;
use crate::statement::{Entity, Statement};
use crate::value::{Arguments, Value};

/// Declarative description of one service.
///
/// Definitions are created through [`ContainerBuilder::add_definition`](crate::ContainerBuilder::add_definition)
/// and configured with the chaining setters below. They stay mutable until the
/// class list is resolved; after that the resolved container only reads them.
///
/// # Examples
///
/// ```rust
/// use ferrous_di_compiler::{ContainerBuilder, StaticOracle};
///
/// let mut builder = ContainerBuilder::new(StaticOracle::new());
/// builder
///     .add_definition("mailer")
///     .unwrap()
///     .set_class("App\\Mailer")
///     .add_setup("setFrom", ["noreply@example.com"])
///     .unwrap()
///     .add_tag("transport", true)
///     .set_shared(false);
///
/// let mailer = builder.definition("mailer").unwrap();
/// assert_eq!(mailer.class.as_deref(), Some("App\\Mailer"));
/// assert!(!mailer.shared);
/// assert_eq!(mailer.setup.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefinition {
    /// Concrete implementation type; filled in by class resolution when empty
    pub class: Option<String>,
    /// How the service is constructed
    pub factory: Option<Statement>,
    /// Calls run on the constructed service, in order
    pub setup: Vec<Statement>,
    /// Parameters of the generated factory method
    pub parameters: Vec<ServiceParameter>,
    /// Tag name to tag value
    pub tags: IndexMap<String, Value>,
    /// Singleton (true) or fresh instance per call (false)
    pub shared: bool,
    /// Eligible as an autowiring candidate
    pub autowired: bool,
    /// Generated accessor is not public
    pub internal: bool,
}

impl Default for ServiceDefinition {
    fn default() -> Self {
        Self {
            class: None,
            factory: None,
            setup: Vec::new(),
            parameters: Vec::new(),
            tags: IndexMap::new(),
            shared: true,
            autowired: true,
            internal: false,
        }
    }
}

impl ServiceDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = Some(class.into());
        self
    }

    /// Sets the class and a constructor call with the given arguments.
    pub fn set_class_with_args<I, V>(&mut self, class: impl Into<String>, args: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let class = class.into();
        self.factory = Some(Statement::new(Entity::Type(class.clone()), Arguments::list(args)));
        self.class = Some(class);
        self
    }

    /// Sets the factory from its textual entity form, e.g. `Widget::create` or `@other`.
    pub fn set_factory<I, V>(&mut self, entity: &str, args: I) -> DiResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.factory = Some(Statement::new(Entity::parse(entity)?, Arguments::list(args)));
        Ok(self)
    }

    pub fn set_factory_statement(&mut self, statement: Statement) -> &mut Self {
        self.factory = Some(statement);
        self
    }

    /// Appends a setup call; bare method names target the service itself.
    pub fn add_setup<I, V>(&mut self, entity: &str, args: I) -> DiResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.setup.push(Statement::new(Entity::parse(entity)?, Arguments::list(args)));
        Ok(self)
    }

    pub fn add_setup_statement(&mut self, statement: Statement) -> &mut Self {
        self.setup.push(statement);
        self
    }

    /// Declares a factory-method parameter, `"name"` or `"Type name"`.
    pub fn add_parameter(&mut self, declaration: &str) -> &mut Self {
        self.parameters.push(ServiceParameter::parse(declaration, None));
        self
    }

    /// Declares an optional factory-method parameter with a default value.
    pub fn add_parameter_with_default(&mut self, declaration: &str, default: impl Into<Value>) -> &mut Self {
        self.parameters.push(ServiceParameter::parse(declaration, Some(default.into())));
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.tags.insert(tag.into(), value.into());
        self
    }

    pub fn set_shared(&mut self, shared: bool) -> &mut Self {
        self.shared = shared;
        self
    }

    pub fn set_autowired(&mut self, autowired: bool) -> &mut Self {
        self.autowired = autowired;
        self
    }

    pub fn set_internal(&mut self, internal: bool) -> &mut Self {
        self.internal = internal;
        self
    }
}

/// Parameter of a generated factory method.
///
/// Inside the service's factory and setup statements the parameter is
/// available as the placeholder `%name%`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceParameter {
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<Value>,
}

impl ServiceParameter {
    /// Parses `"name"` or `"Type name"`; the last word is the name.
    ///
    /// ```rust
    /// use ferrous_di_compiler::ServiceParameter;
    ///
    /// let p = ServiceParameter::parse("App\\Locale locale", None);
    /// assert_eq!(p.name, "locale");
    /// assert_eq!(p.type_hint.as_deref(), Some("App\\Locale"));
    /// ```
    pub fn parse(declaration: &str, default: Option<Value>) -> Self {
        let words: Vec<&str> = declaration.split_whitespace().collect();
        let name = words.last().copied().unwrap_or_default().trim_start_matches('$').to_string();
        let type_hint = if words.len() > 1 {
            Some(words[0].to_string())
        } else {
            None
        };
        Self {
            name,
            type_hint,
            default,
        }
    }
}

//! Error types for the container compiler.

use thiserror::Error;

/// Container compilation errors
///
/// Represents the various error conditions that can occur while registering
/// definitions, resolving classes, autowiring arguments or emitting the
/// container source.
///
/// # Examples
///
/// ```rust
/// use ferrous_di_compiler::{ContainerBuilder, DiError, StaticOracle};
///
/// let mut builder = ContainerBuilder::new(StaticOracle::new());
/// builder.add_definition("logger").unwrap();
/// match builder.add_definition("logger") {
///     Err(DiError::DuplicateService(name)) => assert_eq!(name, "logger"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_di_compiler::DiError;
///
/// let circular = DiError::Circular(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(circular.to_string(), "Circular reference detected for services: a -> b -> a");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiError {
    /// A definition with this name already exists
    #[error("Service '{0}' has already been added")]
    DuplicateService(String),
    /// Lookup or reference by an unknown name
    #[error("Reference to missing service '{0}'")]
    MissingService(String),
    /// `@\Type` reference with no autowired service of that type
    #[error("Reference to missing service of type {0}")]
    MissingServiceOfType(String),
    /// Cycle in alias or factory receiver chains (includes path)
    #[error("Circular reference detected for services: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max resolution depth {0} exceeded")]
    DepthExceeded(usize),
    /// Autowiring found more than one candidate
    #[error("Multiple services of type {type_name} found: {}", .candidates.join(", "))]
    AmbiguousType {
        type_name: String,
        candidates: Vec<String>,
    },
    /// Autowiring found no candidate and the parameter has no default
    #[error("No service of type {type_name} found, required by parameter ${parameter} of {target}")]
    MissingDependency {
        type_name: String,
        parameter: String,
        target: String,
    },
    /// No usable type could be determined for a definition
    #[error("Unable to resolve class for service '{service}': {reason}")]
    UnresolvableClass { service: String, reason: String },
    /// A resolved class is unknown to the type oracle
    #[error("Class {0} has not been found")]
    ClassNotFound(String),
    /// Statement entity has an unsupported shape
    #[error("Expected class, method or property, '{0}' given")]
    InvalidStatement(String),
    /// Factory or setup target is not invocable
    #[error("{0} is not callable")]
    UncallableTarget(String),
    /// Arguments passed to a shared service reference
    #[error("Unable to call shared service '{0}' with arguments")]
    SharedReferenceArguments(String),
    /// Arguments that cannot be mapped onto the target signature
    #[error("Unable to pass arguments to {target}: {reason}")]
    UnableToPassArguments { target: String, reason: String },
    /// Arguments supplied to a class without a constructor
    #[error("Unable to pass arguments, class {0} has no constructor")]
    NoConstructor(String),
    /// Service name cannot be turned into a method name
    #[error("Name '{0}' contains invalid characters")]
    InvalidServiceName(String),
    /// `%placeholder%` names an unknown parameter
    #[error("Missing parameter '{0}'")]
    MissingParameter(String),
    /// `%placeholder%` expansion loops
    #[error("Circular reference detected for parameters: {}", .0.join(", "))]
    CircularParameter(Vec<String>),
    /// Non-scalar parameter embedded into a longer string
    #[error("Unable to concatenate non-scalar parameter '{parameter}' into '{input}'")]
    NonScalarParameter { parameter: String, input: String },
    /// Error raised while processing a single definition
    #[error("Service '{name}': {source}")]
    Service {
        name: String,
        #[source]
        source: Box<DiError>,
    },
    /// Options or oracle registrations could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Wraps this error with the name of the definition being processed.
    pub fn in_service(self, name: impl Into<String>) -> Self {
        DiError::Service {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping service context.
    pub fn root(&self) -> &DiError {
        match self {
            DiError::Service { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for container compilation
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;

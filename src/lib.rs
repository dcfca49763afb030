//! # ferrous-di-compiler
//!
//! Build-time dependency injection: compiles declarative service definitions
//! into the source of a container class that creates and wires every service
//! without any reflection at runtime.
//!
//! ## Features
//!
//! - **Class resolution**: each service's concrete type is derived from its class,
//!   its factory's declared return type or the service it aliases
//! - **Autowiring**: unbound constructor and method parameters are filled by type,
//!   matching classes, ancestors and implemented interfaces
//! - **Circular reference detection**: alias and factory chains report the full path
//! - **Parameters**: `%placeholder%` expansion with nested paths and type preservation
//! - **Dependency tracking**: every source file the generated code depends on
//! - **Graph export**: DOT and Mermaid, JSON and YAML with the `graph-export` feature
//!
//! Type information comes from a [`TypeOracle`]. [`StaticOracle`] is filled by
//! explicit registration or, with the `config` feature, from a JSON or YAML
//! manifest.
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_di_compiler::{
//!     ClassInfo, ContainerBuilder, EmitOptions, Parameter, Signature, StaticOracle,
//! };
//!
//! let mut oracle = StaticOracle::new();
//! oracle.add_class(ClassInfo::new("App\\Logger").file("src/Logger.php"));
//! oracle.add_class(
//!     ClassInfo::new("App\\Mailer")
//!         .file("src/Mailer.php")
//!         .constructor(
//!             Signature::new()
//!                 .param(Parameter::new("from").builtin("string"))
//!                 .param(Parameter::new("logger").class("App\\Logger")),
//!         ),
//! );
//!
//! let mut builder = ContainerBuilder::new(oracle);
//! builder.set_parameter("sender", "noreply@example.com");
//! builder.add_definition("logger").unwrap().set_class("App\\Logger");
//! builder
//!     .add_definition("mailer")
//!     .unwrap()
//!     .set_class_with_args("App\\Mailer", ["%sender%"]);
//!
//! let compiled = builder.build_container(&EmitOptions::new("AppContainer")).unwrap();
//! let source = compiled.source();
//!
//! assert!(source.contains("class AppContainer extends DI\\Container"));
//! assert!(source.contains("$service = new App\\Mailer('noreply@example.com', $this->logger);"));
//! assert!(compiled.dependencies.contains("src/Logger.php"));
//! ```
//!
//! ## Two phases
//!
//! [`ContainerBuilder`] is the mutable phase. [`ContainerBuilder::resolve_class_list`]
//! consumes it and yields a [`ResolvedContainer`] with frozen definitions, which
//! can answer type queries, compile single statements or emit the class:
//!
//! ```rust
//! use ferrous_di_compiler::{ClassInfo, ContainerBuilder, StaticOracle, Statement};
//!
//! let mut oracle = StaticOracle::new();
//! oracle.add_class(ClassInfo::new("Cache"));
//!
//! let mut builder = ContainerBuilder::new(oracle);
//! builder.add_definition("cache").unwrap().set_class("Cache");
//!
//! let mut resolved = builder.resolve_class_list().unwrap();
//! assert_eq!(resolved.by_type("cache").unwrap(), Some("cache"));
//! assert_eq!(resolved.compile(&Statement::parse("@\\Cache").unwrap(), None).unwrap(), "$this->cache");
//! ```

// Module declarations
pub mod autowire;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod definition;
pub mod dependencies;
pub mod error;
pub mod expand;
pub mod graph_export;
pub mod observer;
pub mod oracle;
pub mod registry;
pub mod statement;
pub mod value;

// Internal modules
mod compiler;
mod emitter;
mod internal;
mod resolver;

// Re-export core types
pub use autowire::{AutowiringIndex, Autowirer};
pub use builder::{CompiledContainer, ContainerBuilder, ResolvedContainer};
pub use compiler::factory_method_name;
pub use config::{ConfigSource, ConfigValue, EmitOptions, EnvironmentConfigSource};
pub use definition::{ServiceDefinition, ServiceParameter};
pub use dependencies::DependencySet;
pub use emitter::TAGS;
pub use error::{DiError, DiResult};
pub use expand::{expand, expand_statement, expand_text};
pub use graph_export::{DependencyGraph, DependencyType, ExportFormat, GraphEdge, GraphMetadata, GraphNode};
pub use observer::{BuildObserver, StatsObserver, TracingObserver};
pub use oracle::{Callable, ClassInfo, Parameter, ParameterType, Signature, StaticOracle, TypeOracle};
pub use registry::Registry;
pub use statement::{Entity, Receiver, Reference, Statement, CREATED_SERVICE, THIS_CONTAINER};
pub use value::{Arguments, Value, NO_ARGS};

#[cfg(feature = "config")]
pub use config::{
    parameters_from_json, parameters_from_yaml, ClassManifest, OracleManifest, ParameterManifest, SignatureManifest,
};

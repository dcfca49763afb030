//! Container builder and the resolved container it produces.
//!
//! Building happens in two phases. [`ContainerBuilder`] owns the mutable
//! registry: definitions and parameters are added and edited freely.
//! [`ContainerBuilder::resolve_class_list`] consumes the builder and returns a
//! [`ResolvedContainer`] whose definitions are frozen; it answers type queries
//! and compiles statements and the container class.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::autowire::AutowiringIndex;
use crate::codegen::GeneratedClass;
use crate::compiler::StatementCompiler;
use crate::config::EmitOptions;
use crate::definition::ServiceDefinition;
use crate::dependencies::DependencySet;
use crate::emitter::ContainerEmitter;
use crate::error::DiResult;
use crate::graph_export::DependencyGraph;
use crate::observer::{BuildObserver, Observers};
use crate::oracle::TypeOracle;
use crate::registry::Registry;
use crate::resolver::ClassResolver;
use crate::statement::{Entity, Statement, THIS_CONTAINER};
use crate::value::{Arguments, Value};

/// Mutable phase of a container build.
///
/// # Examples
///
/// ```rust
/// use ferrous_di_compiler::{ClassInfo, ContainerBuilder, EmitOptions, Parameter, Signature, StaticOracle};
///
/// let mut oracle = StaticOracle::new();
/// oracle.add_class(ClassInfo::new("Logger"));
/// oracle.add_class(
///     ClassInfo::new("Service")
///         .constructor(Signature::new().param(Parameter::new("logger").class("Logger"))),
/// );
///
/// let mut builder = ContainerBuilder::new(oracle);
/// builder.add_definition("a").unwrap().set_class("Logger");
/// builder.add_definition("b").unwrap().set_class("Service");
///
/// let compiled = builder.build_container(&EmitOptions::default()).unwrap();
/// let method = compiled.class.method("createServiceB").unwrap();
/// assert!(method.body.contains("$service = new Service($this->a);"));
/// ```
pub struct ContainerBuilder {
    registry: Registry,
    parameters: IndexMap<String, Value>,
    oracle: Arc<dyn TypeOracle>,
    observers: Observers,
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("registry", &self.registry)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl ContainerBuilder {
    pub fn new(oracle: impl TypeOracle + 'static) -> Self {
        Self::with_oracle(Arc::new(oracle))
    }

    /// Creates a builder sharing an oracle with other builds.
    pub fn with_oracle(oracle: Arc<dyn TypeOracle>) -> Self {
        Self {
            registry: Registry::new(),
            parameters: IndexMap::new(),
            oracle,
            observers: Observers::new(),
        }
    }

    /// Adds an empty definition; fails if the name is taken.
    pub fn add_definition(&mut self, name: impl Into<String>) -> DiResult<&mut ServiceDefinition> {
        self.registry.add(name)
    }

    pub fn remove_definition(&mut self, name: &str) -> Option<ServiceDefinition> {
        self.registry.remove(name)
    }

    pub fn definition(&self, name: &str) -> DiResult<&ServiceDefinition> {
        self.registry.get(name)
    }

    pub fn definition_mut(&mut self, name: &str) -> DiResult<&mut ServiceDefinition> {
        self.registry.get_mut(name)
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &ServiceDefinition)> {
        self.registry.iter()
    }

    /// Service name to tag value for every definition carrying `tag`.
    pub fn find_by_tag(&self, tag: &str) -> IndexMap<String, Value> {
        self.registry.find_by_tag(tag)
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.parameters
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn BuildObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Resolves every definition's class and builds the autowiring index.
    pub fn resolve_class_list(mut self) -> DiResult<ResolvedContainer> {
        let resolution = ClassResolver::new(
            &mut self.registry,
            &self.parameters,
            self.oracle.as_ref(),
            &self.observers,
        )
        .resolve()
        .map_err(|error| self.observers.failed(error))?;

        Ok(ResolvedContainer {
            registry: self.registry,
            parameters: self.parameters,
            oracle: self.oracle,
            observers: self.observers,
            index: resolution.index,
            dependencies: resolution.dependencies,
            references: IndexMap::new(),
        })
    }

    /// Adds the `container` service, resolves and emits in one go.
    ///
    /// The `container` definition is typed with the parent class when that
    /// class is known to the oracle and left untyped otherwise.
    pub fn build_container(mut self, options: &EmitOptions) -> DiResult<CompiledContainer> {
        if !self.registry.contains(THIS_CONTAINER) {
            let parent = options.parent_class.trim_start_matches('\\');
            let container = self.registry.add(THIS_CONTAINER)?;
            if self.oracle.class_exists(parent) {
                container.set_class(parent);
            } else {
                container.set_factory_statement(Statement::of(Entity::code("$this")));
            }
        }

        let mut resolved = self.resolve_class_list()?;
        let class = resolved.emit(options)?;
        Ok(CompiledContainer {
            class,
            dependencies: resolved.dependencies.clone(),
            graph: resolved.graph(),
        })
    }
}

/// Output of [`ContainerBuilder::build_container`].
#[derive(Debug, Clone)]
pub struct CompiledContainer {
    pub class: GeneratedClass,
    /// Files the generated class depends on
    pub dependencies: DependencySet,
    /// Service graph including autowired references
    pub graph: DependencyGraph,
}

impl CompiledContainer {
    /// Complete PHP source of the container class.
    pub fn source(&self) -> String {
        self.class.source()
    }
}

/// Frozen phase of a container build.
///
/// Definitions can no longer change. Only the dependency set grows while
/// statements are compiled.
pub struct ResolvedContainer {
    registry: Registry,
    parameters: IndexMap<String, Value>,
    oracle: Arc<dyn TypeOracle>,
    observers: Observers,
    index: AutowiringIndex,
    dependencies: DependencySet,
    references: IndexMap<String, IndexSet<String>>,
}

impl std::fmt::Debug for ResolvedContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedContainer")
            .field("registry", &self.registry)
            .field("index", &self.index)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl ResolvedContainer {
    pub fn definition(&self, name: &str) -> DiResult<&ServiceDefinition> {
        self.registry.get(name)
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&str, &ServiceDefinition)> {
        self.registry.iter()
    }

    pub fn find_by_tag(&self, tag: &str) -> IndexMap<String, Value> {
        self.registry.find_by_tag(tag)
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// The single autowired service of a type.
    ///
    /// `Ok(None)` when no service qualifies, an ambiguity error when several do.
    pub fn by_type(&self, ty: &str) -> DiResult<Option<&str>> {
        self.index.get_by_type(ty)
    }

    pub fn autowiring_index(&self) -> &AutowiringIndex {
        &self.index
    }

    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Expands `%placeholders%` against the container parameters.
    pub fn expand(&self, value: &Value) -> DiResult<Value> {
        crate::expand::expand(value, &self.parameters)
    }

    /// Binds arguments for `class::method`, autowiring what is missing.
    pub fn autowire_arguments(&mut self, class: &str, method: &str, arguments: Arguments) -> DiResult<Vec<Value>> {
        StatementCompiler::new(&self.registry, &self.index, self.oracle.as_ref(), &mut self.dependencies)
            .autowire_method(class, method, arguments)
    }

    /// Compiles a statement into a source expression.
    ///
    /// `current` names the service whose body the statement belongs to.
    pub fn compile(&mut self, statement: &Statement, current: Option<&str>) -> DiResult<String> {
        StatementCompiler::new(&self.registry, &self.index, self.oracle.as_ref(), &mut self.dependencies)
            .compile(statement, current)
    }

    /// Generates the container class.
    pub fn emit(&mut self, options: &EmitOptions) -> DiResult<GeneratedClass> {
        ContainerEmitter {
            registry: &self.registry,
            parameters: &self.parameters,
            index: &self.index,
            oracle: self.oracle.as_ref(),
            dependencies: &mut self.dependencies,
            references: &mut self.references,
            observers: &self.observers,
        }
        .emit(options)
        .map_err(|error| self.observers.failed(error))
    }

    /// Service graph; autowired references appear once the class is emitted.
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::build(&self.registry, &self.index, &self.references)
    }
}

//! Class resolution and autowiring index construction.
//!
//! Every definition ends a resolution pass with either a concrete class or
//! no class at all (an object of unknown type). Classes are derived from the
//! factory: constructors name the class directly, aliases inherit it from
//! their target, factory methods and functions contribute their declared
//! return type.

use indexmap::{IndexMap, IndexSet};

use crate::autowire::AutowiringIndex;
use crate::dependencies::DependencySet;
use crate::error::{DiError, DiResult};
use crate::expand::{expand_statement, expand_text};
use crate::internal::ResolutionStack;
use crate::observer::Observers;
use crate::oracle::{Callable, TypeOracle};
use crate::registry::Registry;
use crate::statement::{Entity, Receiver, Reference, Statement, CREATED_SERVICE, THIS_CONTAINER};
use crate::value::Value;

/// Output of a resolution pass.
pub(crate) struct Resolution {
    pub(crate) index: AutowiringIndex,
    pub(crate) dependencies: DependencySet,
}

pub(crate) struct ClassResolver<'a> {
    registry: &'a mut Registry,
    parameters: &'a IndexMap<String, Value>,
    oracle: &'a dyn TypeOracle,
    observers: &'a Observers,
    // finished services, including those left without a class
    resolved: IndexSet<String>,
}

impl<'a> ClassResolver<'a> {
    pub(crate) fn new(
        registry: &'a mut Registry,
        parameters: &'a IndexMap<String, Value>,
        oracle: &'a dyn TypeOracle,
        observers: &'a Observers,
    ) -> Self {
        Self {
            registry,
            parameters,
            oracle,
            observers,
            resolved: IndexSet::new(),
        }
    }

    /// Resolves every definition, then builds the autowiring index.
    pub(crate) fn resolve(mut self) -> DiResult<Resolution> {
        self.prepare()?;

        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        let mut stack = ResolutionStack::new();
        for name in &names {
            let class = self.resolve_class(name, &mut stack)?;
            tracing::debug!(service = %name, class = class.as_deref().unwrap_or("?"), "class resolved");
            self.observers.class_resolved(name, class.as_deref());
        }

        self.build_index()
    }

    /// Normalizes class and factory before any lookup happens.
    fn prepare(&mut self) -> DiResult<()> {
        let parameters = self.parameters;
        for (name, definition) in self.registry.iter_mut() {
            if let Some(class) = definition.class.take() {
                let class = if class == CREATED_SERVICE {
                    name.to_string()
                } else {
                    match expand_text(&class, parameters)? {
                        Value::String(expanded) => expanded,
                        _ => {
                            return Err(DiError::UnresolvableClass {
                                service: name.to_string(),
                                reason: format!("class '{}' does not expand to a name", class),
                            })
                        }
                    }
                };
                if definition.factory.is_none() {
                    definition.factory = Some(Statement::of(Entity::Type(class.clone())));
                }
                definition.class = Some(class);
            } else if definition.factory.is_none() {
                return Err(DiError::UnresolvableClass {
                    service: name.to_string(),
                    reason: "class and factory are missing".to_string(),
                });
            }

            if let Some(factory) = &mut definition.factory {
                if factory.entity == Entity::Type(CREATED_SERVICE.to_string()) {
                    factory.entity = Entity::Type(name.to_string());
                }
            }
        }
        Ok(())
    }

    fn resolve_class(&mut self, name: &str, stack: &mut ResolutionStack) -> DiResult<Option<String>> {
        if self.resolved.contains(name) {
            return Ok(self.registry.get(name)?.class.clone());
        }
        stack.guarded(name, |stack| {
            let definition = self.registry.get(name)?;
            if let Some(class) = &definition.class {
                return Ok(Some(class.clone()));
            }
            let Some(factory) = &definition.factory else {
                return Ok(None);
            };
            let entity = expand_statement(&Statement::of(factory.entity.clone()), self.parameters)?.entity;

            let class = match entity {
                Entity::Type(class) => Some(class),
                Entity::Code(_) | Entity::Not => None,
                Entity::Property { .. } => return Err(DiError::UncallableTarget(entity.to_string())),
                Entity::Function(function) => self.return_type(&Callable::Function(function))?,
                Entity::Method { receiver, method } => {
                    let class = match receiver {
                        Receiver::Type(class) => Some(class),
                        Receiver::Service(Reference::ByType(ty)) => {
                            return Err(DiError::UnresolvableClass {
                                service: name.to_string(),
                                reason: format!("factory receiver @\\{} cannot be resolved before autowiring", ty),
                            })
                        }
                        Receiver::Service(reference) => {
                            let target = self.service_name(&reference)?;
                            self.resolve_class(&target, stack)?
                        }
                    };
                    match class {
                        Some(class) => self.return_type(&Callable::method(class, method))?,
                        None => None,
                    }
                }
                Entity::Service(Reference::ByType(ty)) => {
                    self.registry.get_mut(name)?.autowired = false;
                    Some(ty)
                }
                Entity::Service(reference) => {
                    let target = self.service_name(&reference)?;
                    if self.registry.get(&target)?.shared {
                        self.registry.get_mut(name)?.autowired = false;
                    }
                    self.resolve_class(&target, stack)?
                }
            };

            self.registry.get_mut(name)?.class = class.clone();
            self.resolved.insert(name.to_string());
            Ok(class)
        })
    }

    fn service_name(&self, reference: &Reference) -> DiResult<String> {
        let name = match reference {
            Reference::Service(name) => name.as_str(),
            Reference::Container => THIS_CONTAINER,
            // no service is being emitted during resolution
            Reference::SelfService => CREATED_SERVICE,
            Reference::ByType(ty) => return Err(DiError::MissingServiceOfType(ty.clone())),
        };
        if self.registry.contains(name) {
            Ok(name.to_string())
        } else {
            Err(DiError::MissingService(name.to_string()))
        }
    }

    /// Declared return type of a factory callable.
    fn return_type(&self, callable: &Callable) -> DiResult<Option<String>> {
        let signature = self
            .oracle
            .signature(callable)
            .filter(|signature| signature.is_callable())
            .ok_or_else(|| DiError::UncallableTarget(callable.to_string()))?;

        let Some(declared) = &signature.return_type else {
            return Ok(None);
        };
        let ty = declared
            .split(|c: char| c == '|' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        if ty.is_empty() {
            return Ok(None);
        }
        if ty.starts_with('\\') || self.oracle.class_exists(ty) {
            return Ok(Some(ty.trim_start_matches('\\').to_string()));
        }

        // relative to the declaring class's namespace
        let qualified = signature
            .declaring_class
            .as_deref()
            .and_then(|class| class.trim_start_matches('\\').rsplit_once('\\'))
            .map(|(namespace, _)| format!("{}\\{}", namespace, ty))
            .unwrap_or_else(|| ty.to_string());
        Ok(Some(qualified))
    }

    fn build_index(self) -> DiResult<Resolution> {
        let mut index = AutowiringIndex::new();
        let mut indexed: IndexMap<String, String> = IndexMap::new();

        for (name, definition) in self.registry.iter_mut() {
            let Some(class) = definition.class.take() else {
                continue;
            };
            if !self.oracle.class_exists(&class) {
                return Err(DiError::ClassNotFound(class));
            }
            let class = self.oracle.canonical_name(&class).unwrap_or(class);
            definition.class = Some(class.clone());

            if !definition.autowired {
                continue;
            }
            let mut types = self.oracle.ancestors_and_capabilities(&class);
            types.push(class);
            for ty in types {
                index.register(&ty, name);
                indexed.entry(ty.to_lowercase()).or_insert(ty);
            }
        }

        let mut dependencies = DependencySet::new();
        for ty in indexed.values() {
            dependencies.add(self.oracle.class_file(ty));
        }

        tracing::debug!(types = index.len(), services = self.registry.len(), "autowiring index built");
        self.observers.index_built(index.len(), self.registry.len());
        Ok(Resolution { index, dependencies })
    }
}

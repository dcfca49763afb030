//! Type-based autowiring of constructor and method arguments.

use indexmap::IndexMap;

use crate::dependencies::DependencySet;
use crate::error::{DiError, DiResult};
use crate::oracle::{Callable, Signature, TypeOracle};
use crate::statement::Reference;
use crate::value::{Arguments, Value};

/// Lower-cased type name to the autowired services of that type.
///
/// A service is listed under its class, every ancestor class and every
/// implemented interface. The index is rebuilt wholesale by each resolution
/// pass and never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutowiringIndex {
    types: IndexMap<String, Vec<String>>,
}

fn index_key(ty: &str) -> String {
    ty.trim_start_matches('\\').to_lowercase()
}

impl AutowiringIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, ty: &str, service: &str) {
        let services = self.types.entry(index_key(ty)).or_default();
        if !services.iter().any(|s| s == service) {
            services.push(service.to_string());
        }
    }

    /// All autowired services of a type, in registration order.
    pub fn candidates(&self, ty: &str) -> &[String] {
        self.types.get(&index_key(ty)).map(Vec::as_slice).unwrap_or_default()
    }

    /// The single service of a type.
    ///
    /// Returns `Ok(None)` when there is none and an ambiguity error when there
    /// is more than one.
    pub fn get_by_type(&self, ty: &str) -> DiResult<Option<&str>> {
        match self.candidates(ty) {
            [] => Ok(None),
            [single] => Ok(Some(single)),
            many => Err(DiError::AmbiguousType {
                type_name: ty.trim_start_matches('\\').to_string(),
                candidates: many.to_vec(),
            }),
        }
    }

    /// Lower-cased type names with their services.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.types.iter().map(|(ty, services)| (ty.as_str(), services.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Fills unbound parameters from the autowiring index.
///
/// Type lookups record the declaring file of the looked-up type in the
/// dependency set.
pub struct Autowirer<'a> {
    index: &'a AutowiringIndex,
    oracle: &'a dyn TypeOracle,
    dependencies: &'a mut DependencySet,
}

impl<'a> Autowirer<'a> {
    pub fn new(index: &'a AutowiringIndex, oracle: &'a dyn TypeOracle, dependencies: &'a mut DependencySet) -> Self {
        Self {
            index,
            oracle,
            dependencies,
        }
    }

    /// Binds `arguments` against a method of `class`.
    ///
    /// A method the oracle does not know accepts a plain positional list
    /// verbatim. Known methods must be public and not abstract.
    pub fn bind_method(&mut self, class: &str, method: &str, arguments: Arguments) -> DiResult<Vec<Value>> {
        let callable = Callable::method(class, method);
        match self.oracle.signature(&callable) {
            None => self.bind(&callable.to_string(), None, arguments),
            Some(signature) => {
                if !signature.is_callable() {
                    return Err(DiError::UncallableTarget(callable.to_string()));
                }
                self.dependencies.add(signature.file.clone());
                self.bind(&callable.to_string(), Some(&signature), arguments)
            }
        }
    }

    /// Produces the ordered argument list for `signature`.
    ///
    /// Explicit arguments win, positional before named. Unbound class-typed
    /// parameters get the single autowired service of that type. Trailing
    /// parameters left at their defaults are dropped from the result.
    pub fn bind(&mut self, target: &str, signature: Option<&Signature>, arguments: Arguments) -> DiResult<Vec<Value>> {
        let Some(signature) = signature else {
            return arguments.into_list().ok_or_else(|| DiError::UnableToPassArguments {
                target: target.to_string(),
                reason: "named arguments need a declared signature".to_string(),
            });
        };

        let Arguments { positional, mut named } = arguments;
        let mut positional: Vec<Option<Value>> = positional.into_iter().map(Some).collect();
        let mut bound = Vec::with_capacity(signature.parameters.len());
        let mut optional_tail = 0;
        let mut next = 0;

        for (num, parameter) in signature.parameters.iter().enumerate() {
            next = num + 1;
            if let Some(value) = positional.get_mut(num).and_then(Option::take) {
                bound.push(value);
                optional_tail = 0;
            } else if let Some(value) = named.shift_remove(&parameter.name) {
                bound.push(value);
                optional_tail = 0;
            } else if parameter.variadic {
                next = num;
                break;
            } else if let Some(class) = parameter.class_name() {
                self.dependencies.add(self.oracle.class_file(class));
                match self.index.get_by_type(class)? {
                    Some(service) => {
                        tracing::trace!(target_fn = target, parameter = %parameter.name, service, "autowired");
                        bound.push(Value::Reference(Reference::service(service)));
                        optional_tail = 0;
                    }
                    None if parameter.is_optional() => {
                        bound.push(parameter.default.clone().unwrap_or(Value::Null));
                        optional_tail += 1;
                    }
                    None => {
                        return Err(DiError::MissingDependency {
                            type_name: class.trim_start_matches('\\').to_string(),
                            parameter: parameter.name.clone(),
                            target: target.to_string(),
                        })
                    }
                }
            } else if parameter.is_optional() {
                bound.push(parameter.default.clone().unwrap_or(Value::Null));
                optional_tail += 1;
            } else {
                return Err(DiError::UnableToPassArguments {
                    target: target.to_string(),
                    reason: format!(
                        "parameter ${} has no class type, so its value must be specified",
                        parameter.name
                    ),
                });
            }
        }

        // extra positional arguments (variadic or undeclared)
        for value in positional.into_iter().skip(next).flatten() {
            bound.push(value);
            optional_tail = 0;
        }

        if !named.is_empty() {
            return Err(DiError::UnableToPassArguments {
                target: target.to_string(),
                reason: format!(
                    "unknown named arguments: {}",
                    named.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        bound.truncate(bound.len() - optional_tail);
        Ok(bound)
    }
}

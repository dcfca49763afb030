//! Generation of the container class from a resolved registry.

use indexmap::{IndexMap, IndexSet};

use crate::autowire::AutowiringIndex;
use crate::codegen::{dump, dump_string, is_identifier, GeneratedClass, Visibility};
use crate::compiler::{factory_method_name, sanitize, StatementCompiler};
use crate::config::EmitOptions;
use crate::definition::ServiceDefinition;
use crate::dependencies::DependencySet;
use crate::error::{DiError, DiResult};
use crate::expand::{expand, expand_statement};
use crate::observer::Observers;
use crate::oracle::TypeOracle;
use crate::registry::Registry;
use crate::statement::{Entity, Receiver, Reference, THIS_CONTAINER};
use crate::value::Value;

/// Key of the tag table inside a service's `$meta` entry.
pub const TAGS: &str = "tags";

pub(crate) struct ContainerEmitter<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) parameters: &'a IndexMap<String, Value>,
    pub(crate) index: &'a AutowiringIndex,
    pub(crate) oracle: &'a dyn TypeOracle,
    pub(crate) dependencies: &'a mut DependencySet,
    pub(crate) references: &'a mut IndexMap<String, IndexSet<String>>,
    pub(crate) observers: &'a Observers,
}

impl ContainerEmitter<'_> {
    pub(crate) fn emit(mut self, options: &EmitOptions) -> DiResult<GeneratedClass> {
        options.validate()?;
        let mut class = GeneratedClass::new(&options.class_name);
        class.set_extends(&options.parent_class);

        let parameters = expand(&Value::Map(self.parameters.clone()), self.parameters)?;
        class
            .add_method("__construct")
            .set_body(format!("parent::__construct({});", dump(&parameters)));

        class.add_property("classes", self.classes_table());
        class.add_property("meta", self.meta_table()?);

        self.references.clear();
        let registry = self.registry;
        for (name, definition) in registry.iter() {
            self.emit_service(&mut class, name, definition)
                .map_err(|error| error.in_service(name))?;
        }

        tracing::debug!(
            class = %options.class_name,
            services = self.registry.len(),
            dependencies = self.dependencies.len(),
            "container emitted"
        );
        Ok(class)
    }

    /// Lower-cased type to the service to inject; ambiguity is written down
    /// as a `FALSE` entry carrying the diagnostic.
    fn classes_table(&self) -> Value {
        let mut table = IndexMap::new();
        for (ty, _) in self.index.iter() {
            let entry = match self.index.get_by_type(ty) {
                Ok(Some(service)) => Value::String(sanitize(service)),
                Ok(None) => continue,
                Err(error) => Value::literal(format!("FALSE, // {}", error)),
            };
            table.insert(ty.to_string(), entry);
        }
        Value::Map(table)
    }

    fn meta_table(&self) -> DiResult<Value> {
        let mut meta = IndexMap::new();
        for (name, definition) in self.registry.iter() {
            if definition.tags.is_empty() {
                continue;
            }
            let tags = expand(&Value::Map(definition.tags.clone()), self.parameters)
                .map_err(|error| error.in_service(name))?;
            let mut entry = IndexMap::new();
            entry.insert(TAGS.to_string(), tags);
            meta.insert(name.to_string(), Value::Map(entry));
        }
        Ok(Value::Map(meta))
    }

    fn emit_service(&mut self, class: &mut GeneratedClass, name: &str, definition: &ServiceDefinition) -> DiResult<()> {
        let sanitized = sanitize(name);
        if !is_identifier(&sanitized) {
            return Err(DiError::InvalidServiceName(name.to_string()));
        }
        let ty = definition.class.as_deref().unwrap_or("object");

        let body = if name == THIS_CONTAINER {
            "return $this;".to_string()
        } else {
            self.service_body(name, definition)?
        };

        let mut parameters = Vec::with_capacity(definition.parameters.len());
        for parameter in &definition.parameters {
            let default = match &parameter.default {
                Some(value) => Some(expand(value, self.parameters)?),
                None => None,
            };
            parameters.push((parameter.name.clone(), parameter.type_hint.clone(), default));
        }

        if definition.shared && name == sanitized {
            class.add_document(format!("@property {} ${}", ty, name));
        }

        let method_name = factory_method_name(name, definition.shared);
        let visibility = if definition.shared || definition.internal {
            Visibility::Protected
        } else {
            Visibility::Public
        };
        let method = class.add_method(method_name.clone());
        method
            .set_visibility(visibility)
            .add_document(format!("@return {}", ty))
            .set_body(body);
        for (parameter, hint, default) in parameters {
            method.add_parameter(parameter, hint, default);
        }

        tracing::trace!(service = name, method = %method_name, "factory method generated");
        self.observers.service_emitted(name, &method_name);
        Ok(())
    }

    fn service_body(&mut self, name: &str, definition: &ServiceDefinition) -> DiResult<String> {
        let mut parameters = self.parameters.clone();
        for parameter in &definition.parameters {
            parameters.insert(parameter.name.clone(), Value::literal(format!("${}", parameter.name)));
        }

        let factory = definition.factory.as_ref().ok_or_else(|| DiError::UnresolvableClass {
            service: name.to_string(),
            reason: "class and factory are missing".to_string(),
        })?;
        let factory = expand_statement(factory, &parameters)?;

        let references = self.references.entry(name.to_string()).or_default();
        let mut compiler =
            StatementCompiler::new(self.registry, self.index, self.oracle, self.dependencies).tracking(references);

        let mut code = format!("$service = {};\n", compiler.compile(&factory, None)?);

        if let Some(class) = &definition.class {
            let constructed = factory
                .entity
                .type_name()
                .is_some_and(|ty| ty.trim_start_matches('\\').eq_ignore_ascii_case(class));
            if !constructed {
                let message = format!(
                    "Unable to create service '{}', value returned by factory is not {} type.",
                    name, class
                );
                code.push_str(&format!(
                    "if (!$service instanceof {}) {{\n\tthrow new \\UnexpectedValueException({});\n}}\n",
                    class,
                    dump_string(&message)
                ));
            }
        }

        for setup in &definition.setup {
            let mut setup = expand_statement(setup, &parameters)?;
            if let Entity::Type(member) = &setup.entity {
                let receiver = Receiver::Service(Reference::service(name));
                setup.entity = match member.strip_prefix('$') {
                    Some("") => return Err(DiError::InvalidStatement(member.clone())),
                    Some(property) => Entity::Property {
                        receiver,
                        property: property.to_string(),
                    },
                    None => Entity::Method {
                        receiver,
                        method: member.clone(),
                    },
                };
            }
            code.push_str(&compiler.compile(&setup, Some(name))?);
            code.push_str(";\n");
        }

        code.push_str("return $service;");
        Ok(code)
    }
}

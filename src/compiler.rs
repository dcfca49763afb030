//! Statement compilation into source expressions.

use indexmap::{IndexMap, IndexSet};

use crate::autowire::{AutowiringIndex, Autowirer};
use crate::codegen::{dump, dump_args, format_member};
use crate::definition::{ServiceDefinition, ServiceParameter};
use crate::dependencies::DependencySet;
use crate::error::{DiError, DiResult};
use crate::oracle::{Callable, Parameter, Signature, TypeOracle};
use crate::registry::Registry;
use crate::statement::{Entity, Receiver, Reference, Statement, CREATED_SERVICE, THIS_CONTAINER};
use crate::value::{Arguments, Value};

/// Parameter type hints that are not classes and never autowire.
const BUILTIN_TYPES: &[&str] = &[
    "array", "callable", "bool", "int", "float", "string", "iterable", "object", "mixed", "self",
];

/// Service name with namespace separators made method-safe.
pub(crate) fn sanitize(name: &str) -> String {
    name.replace('\\', "__")
}

fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Name of the generated factory method of a service.
///
/// ```rust
/// use ferrous_di_compiler::factory_method_name;
///
/// assert_eq!(factory_method_name("logger", true), "createServiceLogger");
/// assert_eq!(factory_method_name("App\\mailer", false), "createApp__mailer");
/// ```
pub fn factory_method_name(service: &str, shared: bool) -> String {
    let prefix = if shared { "createService" } else { "create" };
    format!("{}{}", prefix, ucfirst(&sanitize(service)))
}

/// Signature of a generated factory method, built from the declared parameters.
pub(crate) fn factory_signature(definition: &ServiceDefinition) -> Signature {
    definition
        .parameters
        .iter()
        .fold(Signature::new(), |signature, parameter| signature.param(to_parameter(parameter)))
}

fn to_parameter(declared: &ServiceParameter) -> Parameter {
    let mut parameter = Parameter::new(declared.name.clone());
    if let Some(hint) = &declared.type_hint {
        parameter = if BUILTIN_TYPES.contains(&hint.to_lowercase().as_str()) {
            parameter.builtin(hint.clone())
        } else {
            parameter.class(hint.clone())
        };
    }
    if let Some(default) = &declared.default {
        parameter = parameter.default(default.clone());
    }
    parameter
}

/// Service a reference points to at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Container,
    Service(String),
}

/// Compiles statements of a resolved registry.
///
/// `current` names the service whose body is being generated; references to
/// it compile to the local `$service` variable.
pub(crate) struct StatementCompiler<'a> {
    registry: &'a Registry,
    index: &'a AutowiringIndex,
    oracle: &'a dyn TypeOracle,
    dependencies: &'a mut DependencySet,
    references: Option<&'a mut IndexSet<String>>,
}

impl<'a> StatementCompiler<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        index: &'a AutowiringIndex,
        oracle: &'a dyn TypeOracle,
        dependencies: &'a mut DependencySet,
    ) -> Self {
        Self {
            registry,
            index,
            oracle,
            dependencies,
            references: None,
        }
    }

    /// Records every service the compiled code refers to into `references`.
    pub(crate) fn tracking(mut self, references: &'a mut IndexSet<String>) -> Self {
        self.references = Some(references);
        self
    }

    fn autowirer(&mut self) -> Autowirer<'_> {
        Autowirer::new(self.index, self.oracle, self.dependencies)
    }

    fn track(&mut self, service: &str) {
        if let Some(references) = self.references.as_deref_mut() {
            references.insert(service.to_string());
        }
    }

    pub(crate) fn compile(&mut self, statement: &Statement, current: Option<&str>) -> DiResult<String> {
        let arguments = statement.arguments.clone();
        match &statement.entity {
            Entity::Code(raw) => {
                let arguments = if arguments.named.is_empty() {
                    Value::List(arguments.positional)
                } else {
                    let mut map: IndexMap<String, Value> = arguments
                        .positional
                        .into_iter()
                        .enumerate()
                        .map(|(i, value)| (i.to_string(), value))
                        .collect();
                    map.extend(arguments.named);
                    Value::Map(map)
                };
                Ok(format!(
                    "call_user_func_array({}, {})",
                    raw,
                    dump(&self.compile_value(&arguments, current)?)
                ))
            }

            Entity::Not => {
                let value = match arguments.into_list().as_deref() {
                    Some([value]) => value.clone(),
                    _ => return Err(DiError::InvalidStatement(statement.entity.to_string())),
                };
                Ok(format!("!{}", dump(&self.compile_value(&value, current)?)))
            }

            Entity::Service(reference) => match self.target(reference, current)? {
                Target::Container if arguments.is_empty() => Ok("$this".to_string()),
                Target::Container => Err(DiError::SharedReferenceArguments(THIS_CONTAINER.to_string())),
                Target::Service(name) => self.compile_service_call(&name, arguments, current),
            },

            Entity::Type(class) => {
                let callable = Callable::Constructor(class.clone());
                match self.oracle.signature(&callable) {
                    Some(signature) => {
                        self.dependencies.add(signature.file.clone());
                        let bound = self.autowirer().bind(&callable.to_string(), Some(&signature), arguments)?;
                        if bound.is_empty() {
                            Ok(format!("new {}", class))
                        } else {
                            Ok(format!("new {}({})", class, self.compile_args(bound, current)?))
                        }
                    }
                    None if !arguments.is_empty() => Err(DiError::NoConstructor(class.clone())),
                    None => Ok(format!("new {}", class)),
                }
            }

            Entity::Function(function) => {
                let callable = Callable::Function(function.clone());
                let signature = self.oracle.signature(&callable);
                if let Some(signature) = &signature {
                    self.dependencies.add(signature.file.clone());
                }
                let bound = self.autowirer().bind(&callable.to_string(), signature.as_ref(), arguments)?;
                Ok(format!("{}({})", function, self.compile_args(bound, current)?))
            }

            Entity::Property { receiver, property } => {
                let value = match arguments.into_list().as_deref() {
                    Some([value]) => value.clone(),
                    _ => return Err(DiError::InvalidStatement(statement.entity.to_string())),
                };
                let value = dump(&self.compile_value(&value, current)?);
                match receiver {
                    Receiver::Service(reference) => Ok(format!(
                        "{}->{} = {}",
                        self.compile_reference(reference, current)?,
                        format_member(property),
                        value
                    )),
                    Receiver::Type(class) => Ok(format!("{}::${} = {}", class, format_member(property), value)),
                }
            }

            Entity::Method {
                receiver: Receiver::Type(class),
                method,
            } => {
                let bound = self.autowirer().bind_method(class, method, arguments)?;
                Ok(format!("{}::{}({})", class, method, self.compile_args(bound, current)?))
            }

            Entity::Method {
                receiver: Receiver::Service(reference),
                method,
            } => {
                let class = match self.target(reference, current)? {
                    Target::Service(name) => self.registry.get(&name)?.class.clone(),
                    Target::Container => self
                        .registry
                        .get(THIS_CONTAINER)
                        .ok()
                        .and_then(|definition| definition.class.clone()),
                };
                let bound = match class {
                    Some(class) => self.autowirer().bind_method(&class, method, arguments)?,
                    None => self.autowirer().bind(&format!("{}::{}()", reference, method), None, arguments)?,
                };
                Ok(format!(
                    "{}->{}({})",
                    self.compile_reference(reference, current)?,
                    format_member(method),
                    self.compile_args(bound, current)?
                ))
            }
        }
    }

    /// Accessor of a shared service or factory call of a transient one.
    fn compile_service_call(&mut self, name: &str, arguments: Arguments, current: Option<&str>) -> DiResult<String> {
        let definition = self.registry.get(name)?;
        self.track(name);
        if definition.shared {
            if !arguments.is_empty() {
                return Err(DiError::SharedReferenceArguments(name.to_string()));
            }
            return Ok(format!("$this->{}", format_member(&sanitize(name))));
        }

        let method = factory_method_name(name, false);
        let signature = factory_signature(definition);
        let bound = self.autowirer().bind(&format!("{}()", method), Some(&signature), arguments)?;
        Ok(format!("$this->{}({})", method, self.compile_args(bound, current)?))
    }

    /// Expression evaluating to the referenced service instance.
    fn compile_reference(&mut self, reference: &Reference, current: Option<&str>) -> DiResult<String> {
        match self.target(reference, current)? {
            Target::Container => Ok("$this".to_string()),
            Target::Service(name) if Some(name.as_str()) == current => Ok("$service".to_string()),
            Target::Service(name) => self.compile_service_call(&name, Arguments::new(), current),
        }
    }

    fn target(&self, reference: &Reference, current: Option<&str>) -> DiResult<Target> {
        match reference {
            Reference::Container => Ok(Target::Container),
            Reference::SelfService => current
                .map(|name| Target::Service(name.to_string()))
                .ok_or_else(|| DiError::MissingService(CREATED_SERVICE.to_string())),
            Reference::ByType(ty) => self
                .index
                .get_by_type(ty)?
                .map(|name| Target::Service(name.to_string()))
                .ok_or_else(|| DiError::MissingServiceOfType(ty.clone())),
            Reference::Service(name) if self.registry.contains(name) => Ok(Target::Service(name.clone())),
            Reference::Service(name) => Err(DiError::MissingService(name.clone())),
        }
    }

    /// Replaces references and statements in a value with source literals.
    pub(crate) fn compile_value(&mut self, value: &Value, current: Option<&str>) -> DiResult<Value> {
        Ok(match value {
            Value::Statement(statement) => Value::Literal(self.compile(statement, current)?),
            Value::Reference(reference) => Value::Literal(self.compile_reference(reference, current)?),
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.compile_value(item, current))
                    .collect::<DiResult<_>>()?,
            ),
            Value::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.compile_value(item, current)?);
                }
                Value::Map(out)
            }
            other => other.clone(),
        })
    }

    fn compile_args(&mut self, values: Vec<Value>, current: Option<&str>) -> DiResult<String> {
        let compiled = values
            .iter()
            .map(|value| self.compile_value(value, current))
            .collect::<DiResult<Vec<_>>>()?;
        Ok(dump_args(&compiled))
    }

    /// Binds arguments of `class::method` without compiling them.
    pub(crate) fn autowire_method(&mut self, class: &str, method: &str, arguments: Arguments) -> DiResult<Vec<Value>> {
        self.autowirer().bind_method(class, method, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ClassInfo, StaticOracle};

    struct Fixture {
        registry: Registry,
        index: AutowiringIndex,
        oracle: StaticOracle,
        dependencies: DependencySet,
    }

    impl Fixture {
        fn new() -> Self {
            let mut oracle = StaticOracle::new();
            oracle.add_class(ClassInfo::new("Logger").file("/src/Logger.php"));
            oracle.add_class(
                ClassInfo::new("Mailer")
                    .constructor(Signature::new().param(Parameter::new("logger").class("Logger")))
                    .method("setFrom", Signature::new().param(Parameter::new("from"))),
            );

            let mut registry = Registry::new();
            registry.add("logger").unwrap().set_class("Logger");
            registry.add("mailer").unwrap().set_class("Mailer").set_shared(false);

            let mut index = AutowiringIndex::new();
            index.register("Logger", "logger");

            Self {
                registry,
                index,
                oracle,
                dependencies: DependencySet::new(),
            }
        }

        fn compile(&mut self, statement: &Statement, current: Option<&str>) -> DiResult<String> {
            StatementCompiler::new(&self.registry, &self.index, &self.oracle, &mut self.dependencies)
                .compile(statement, current)
        }
    }

    #[test]
    fn test_constructor_is_autowired() {
        let mut fixture = Fixture::new();
        let out = fixture.compile(&Statement::parse("Mailer").unwrap(), None).unwrap();
        assert_eq!(out, "new Mailer($this->logger)");
        assert!(fixture.dependencies.contains("/src/Logger.php"));
    }

    #[test]
    fn test_transient_reference_calls_factory() {
        let mut fixture = Fixture::new();
        let out = fixture.compile(&Statement::parse("@mailer").unwrap(), None).unwrap();
        assert_eq!(out, "$this->createMailer()");
    }

    #[test]
    fn test_self_receiver() {
        let mut fixture = Fixture::new();
        let setup = Statement::parse("@self::setFrom").unwrap().arg("a@b.c");
        assert_eq!(fixture.compile(&setup, Some("mailer")).unwrap(), "$service->setFrom('a@b.c')");
        assert_eq!(
            fixture.compile(&setup, None),
            Err(DiError::MissingService("self".into()))
        );
    }

    #[test]
    fn test_property_needs_single_value() {
        let mut fixture = Fixture::new();
        let statement = Statement::parse("@logger::$level").unwrap().arg(3);
        assert_eq!(fixture.compile(&statement, None).unwrap(), "$this->logger->level = 3");

        let statement = Statement::parse("Logger::$level").unwrap();
        assert!(matches!(fixture.compile(&statement, None), Err(DiError::InvalidStatement(_))));
    }

    #[test]
    fn test_code_and_not() {
        let mut fixture = Fixture::new();
        let code = Statement::of(Entity::code("'trim'")).arg(" x ");
        assert_eq!(fixture.compile(&code, None).unwrap(), "call_user_func_array('trim', array(' x '))");

        let not = Statement::parse("not").unwrap().arg(Value::Reference(Reference::Container));
        assert_eq!(fixture.compile(&not, None).unwrap(), "!$this");
    }

    #[test]
    fn test_by_type_reference_missing() {
        let mut fixture = Fixture::new();
        let statement = Statement::parse("@\\Cache").unwrap();
        assert_eq!(
            fixture.compile(&statement, None),
            Err(DiError::MissingServiceOfType("Cache".into()))
        );
    }

    #[test]
    fn test_nested_statement_argument() {
        let mut fixture = Fixture::new();
        let inner = Statement::parse("Logger").unwrap();
        let outer = Statement::parse("Mailer").unwrap().arg(inner);
        assert_eq!(fixture.compile(&outer, None).unwrap(), "new Mailer(new Logger)");
    }
}

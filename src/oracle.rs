//! Type oracle: the source of signatures, ancestry and declaring files.
//!
//! The compiler never inspects code itself. Everything it needs to know about
//! classes, methods and functions is asked of a [`TypeOracle`]. The bundled
//! [`StaticOracle`] answers from explicitly registered metadata; build tools can
//! plug in an implementation backed by static analysis instead.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::value::Value;

/// Something that can be invoked: a constructor, a method or a free function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callable {
    Constructor(String),
    Method { class: String, method: String },
    Function(String),
}

impl Callable {
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Callable::Method {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Constructor(class) => write!(f, "{}::__construct()", class),
            Callable::Method { class, method } => write!(f, "{}::{}()", class, method),
            Callable::Function(name) => write!(f, "{}()", name),
        }
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    /// Class or interface: eligible for autowiring
    Class(String),
    /// Builtin type such as `int` or `array`
    Builtin(String),
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Option<ParameterType>,
    pub default: Option<Value>,
    /// Optional without a reflectable default (passes `NULL`)
    pub optional: bool,
    pub variadic: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            optional: false,
            variadic: false,
        }
    }

    pub fn class(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ParameterType::Class(ty.into()));
        self
    }

    pub fn builtin(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ParameterType::Builtin(ty.into()));
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// Class name when the parameter is class-typed.
    pub fn class_name(&self) -> Option<&str> {
        match &self.ty {
            Some(ParameterType::Class(ty)) => Some(ty),
            _ => None,
        }
    }
}

/// Signature and metadata of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub public: bool,
    pub is_abstract: bool,
    /// File declaring the callable, recorded as a build dependency
    pub file: Option<PathBuf>,
    /// Declared return type annotation
    pub return_type: Option<String>,
    /// Class declaring a method, used to qualify relative return types
    pub declaring_class: Option<String>,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            public: true,
            is_abstract: false,
            file: None,
            return_type: None,
            declaring_class: None,
        }
    }
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Public and not abstract.
    pub fn is_callable(&self) -> bool {
        self.public && !self.is_abstract
    }
}

/// Source of type metadata for class resolution and autowiring.
pub trait TypeOracle: Send + Sync {
    /// True if a class or interface of that name exists.
    fn class_exists(&self, name: &str) -> bool;

    /// Canonical spelling of a type name.
    fn canonical_name(&self, name: &str) -> Option<String> {
        if self.class_exists(name) {
            Some(name.trim_start_matches('\\').to_string())
        } else {
            None
        }
    }

    /// Every parent class and implemented interface, transitively.
    fn ancestors_and_capabilities(&self, class: &str) -> Vec<String>;

    /// File declaring the class.
    fn class_file(&self, class: &str) -> Option<PathBuf>;

    /// Signature of a callable, `None` if it does not exist.
    fn signature(&self, callable: &Callable) -> Option<Signature>;
}

/// Metadata of one class or interface registered with a [`StaticOracle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub parents: Vec<String>,
    pub interfaces: Vec<String>,
    pub file: Option<PathBuf>,
    pub constructor: Option<Signature>,
    pub methods: IndexMap<String, Signature>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn constructor(mut self, signature: Signature) -> Self {
        self.constructor = Some(signature);
        self
    }

    pub fn method(mut self, name: impl Into<String>, signature: Signature) -> Self {
        self.methods.insert(name.into(), signature);
        self
    }
}

/// [`TypeOracle`] answering from explicitly registered metadata.
///
/// Type and function names are matched case-insensitively; methods and
/// constructors are inherited from parents.
///
/// # Examples
///
/// ```rust
/// use ferrous_di_compiler::{Callable, ClassInfo, Parameter, Signature, StaticOracle, TypeOracle};
///
/// let mut oracle = StaticOracle::new();
/// oracle.add_class(ClassInfo::new("Psr\\Log\\LoggerInterface"));
/// oracle.add_class(ClassInfo::new("App\\FileLogger").implements("Psr\\Log\\LoggerInterface"));
/// oracle.add_class(
///     ClassInfo::new("App\\Service")
///         .constructor(Signature::new().param(Parameter::new("logger").class("Psr\\Log\\LoggerInterface"))),
/// );
///
/// assert!(oracle.class_exists("app\\filelogger"));
/// assert_eq!(oracle.ancestors_and_capabilities("App\\FileLogger"), vec!["Psr\\Log\\LoggerInterface"]);
/// assert!(oracle.signature(&Callable::Constructor("App\\Service".into())).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    classes: IndexMap<String, ClassInfo>,
    functions: IndexMap<String, Signature>,
}

fn type_key(name: &str) -> String {
    name.trim_start_matches('\\').to_lowercase()
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, mut info: ClassInfo) -> &mut Self {
        info.name = info.name.trim_start_matches('\\').to_string();
        self.classes.insert(type_key(&info.name), info);
        self
    }

    pub fn add_function(&mut self, name: impl Into<String>, signature: Signature) -> &mut Self {
        self.functions.insert(type_key(&name.into()), signature);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(&type_key(name))
    }

    /// Looks a member up on the class and then its parents, depth first.
    fn find_member<F>(&self, class: &str, mut lookup: F) -> Option<Signature>
    where
        F: FnMut(&ClassInfo) -> Option<Signature>,
    {
        let mut seen = HashSet::new();
        let mut pending = vec![class.to_string()];
        while let Some(current) = pending.pop() {
            if !seen.insert(type_key(&current)) {
                continue;
            }
            let Some(info) = self.class(&current) else {
                continue;
            };
            if let Some(mut signature) = lookup(info) {
                if signature.declaring_class.is_none() {
                    signature.declaring_class = Some(info.name.clone());
                }
                if signature.file.is_none() {
                    signature.file = info.file.clone();
                }
                return Some(signature);
            }
            pending.extend(info.parents.iter().rev().cloned());
        }
        None
    }
}

impl TypeOracle for StaticOracle {
    fn class_exists(&self, name: &str) -> bool {
        self.classes.contains_key(&type_key(name))
    }

    fn canonical_name(&self, name: &str) -> Option<String> {
        self.class(name).map(|info| info.name.clone())
    }

    fn ancestors_and_capabilities(&self, class: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(type_key(class));
        let mut pending = vec![class.to_string()];
        while let Some(current) = pending.pop() {
            let Some(info) = self.class(&current) else {
                continue;
            };
            for related in info.parents.iter().chain(&info.interfaces) {
                if seen.insert(type_key(related)) {
                    let name = self.canonical_name(related).unwrap_or_else(|| related.clone());
                    found.push(name.clone());
                    pending.push(name);
                }
            }
        }
        found
    }

    fn class_file(&self, class: &str) -> Option<PathBuf> {
        self.class(class).and_then(|info| info.file.clone())
    }

    fn signature(&self, callable: &Callable) -> Option<Signature> {
        match callable {
            Callable::Constructor(class) => self.find_member(class, |info| info.constructor.clone()),
            Callable::Method { class, method } => {
                let wanted = method.to_lowercase();
                self.find_member(class, |info| {
                    info.methods
                        .iter()
                        .find(|(name, _)| name.to_lowercase() == wanted)
                        .map(|(_, signature)| signature.clone())
                })
            }
            Callable::Function(name) => self.functions.get(&type_key(name)).cloned(),
        }
    }
}

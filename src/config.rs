//! Build configuration: emission options, parameter tables and oracle manifests.
//!
//! Options come from a [`ConfigSource`]; the environment source is always
//! available. With the `config` feature options, parameters and a
//! [`StaticOracle`](crate::StaticOracle) manifest can also be read from JSON or
//! YAML documents.

use std::env;

use indexmap::IndexMap;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Default name of the generated class.
pub const DEFAULT_CLASS_NAME: &str = "Container";

/// Default runtime base container the generated class extends.
pub const DEFAULT_PARENT_CLASS: &str = "DI\\Container";

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum ConfigValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ConfigValue>),
    Object(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_string(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            other => Err(DiError::Config(format!("expected a string, got {:?}", other))),
        }
    }

    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            other => Err(DiError::Config(format!("expected a boolean, got {:?}", other))),
        }
    }
}

/// Strings of the form `@name` become service references.
impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Null => Value::Null,
            ConfigValue::Boolean(b) => Value::Bool(b),
            ConfigValue::Integer(i) => Value::Int(i),
            ConfigValue::Float(f) => Value::Float(f),
            ConfigValue::String(s) => Value::from(s.as_str()),
            ConfigValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            ConfigValue::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

/// Trait for configuration sources
pub trait ConfigSource: std::fmt::Debug {
    /// Get a configuration value by key
    fn get(&self, key: &str) -> Option<ConfigValue>;
}

/// Environment variable configuration source
///
/// Keys are upper-cased and joined to the prefix with `_`, so `class_name`
/// with prefix `di` reads `DI_CLASS_NAME`.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        env::var(self.env_key(key)).ok().map(|value| {
            if let Ok(int_val) = value.parse::<i64>() {
                ConfigValue::Integer(int_val)
            } else if let Ok(bool_val) = value.parse::<bool>() {
                ConfigValue::Boolean(bool_val)
            } else {
                ConfigValue::String(value)
            }
        })
    }
}

/// Options of the emitted container class.
///
/// ```rust
/// use ferrous_di_compiler::EmitOptions;
///
/// let options = EmitOptions::new("AppContainer").with_parent("App\\BaseContainer");
/// assert_eq!(options.class_name, "AppContainer");
/// assert_eq!(EmitOptions::default().class_name, "Container");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EmitOptions {
    /// Name of the generated class
    pub class_name: String,
    /// Runtime base container the class extends
    pub parent_class: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            parent_class: DEFAULT_PARENT_CLASS.to_string(),
        }
    }
}

impl EmitOptions {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_class: impl Into<String>) -> Self {
        self.parent_class = parent_class.into();
        self
    }

    /// Reads `class_name` and `parent_class`, keeping defaults for missing keys.
    pub fn load(source: &dyn ConfigSource) -> DiResult<Self> {
        let mut options = Self::default();
        if let Some(value) = source.get("class_name") {
            options.class_name = value.as_string()?.to_string();
        }
        if let Some(value) = source.get("parent_class") {
            options.parent_class = value.as_string()?.to_string();
        }
        options.validate()?;
        Ok(options)
    }

    /// Reads `<PREFIX>_CLASS_NAME` and `<PREFIX>_PARENT_CLASS`.
    pub fn from_env(prefix: &str) -> DiResult<Self> {
        Self::load(&EnvironmentConfigSource::with_prefix(prefix))
    }

    /// Checks the class name is a valid identifier and the parent is set.
    pub fn validate(&self) -> DiResult<()> {
        if !crate::codegen::is_identifier(&self.class_name) {
            return Err(DiError::Config(format!("invalid class name '{}'", self.class_name)));
        }
        if self.parent_class.trim_start_matches('\\').is_empty() {
            return Err(DiError::Config("parent class must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl EmitOptions {
    pub fn from_json(text: &str) -> DiResult<Self> {
        let options: Self = serde_json::from_str(text).map_err(|e| DiError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml(text: &str) -> DiResult<Self> {
        let options: Self = serde_yaml::from_str(text).map_err(|e| DiError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

/// Parses a JSON object of container parameters.
#[cfg(feature = "config")]
pub fn parameters_from_json(text: &str) -> DiResult<IndexMap<String, Value>> {
    let raw: IndexMap<String, ConfigValue> = serde_json::from_str(text).map_err(|e| DiError::Config(e.to_string()))?;
    Ok(raw.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

/// Parses a YAML mapping of container parameters.
#[cfg(feature = "config")]
pub fn parameters_from_yaml(text: &str) -> DiResult<IndexMap<String, Value>> {
    let raw: IndexMap<String, ConfigValue> = serde_yaml::from_str(text).map_err(|e| DiError::Config(e.to_string()))?;
    Ok(raw.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

#[cfg(feature = "config")]
pub use manifest::{ClassManifest, OracleManifest, ParameterManifest, SignatureManifest};

#[cfg(feature = "config")]
mod manifest {
    use std::path::PathBuf;

    use indexmap::IndexMap;
    use serde::{Deserialize, Serialize};

    use super::ConfigValue;
    use crate::error::{DiError, DiResult};
    use crate::oracle::{ClassInfo, Parameter, Signature, StaticOracle};
    use crate::value::Value;

    /// Serialized form of a [`StaticOracle`].
    ///
    /// ```rust
    /// use ferrous_di_compiler::{OracleManifest, TypeOracle};
    ///
    /// let oracle = OracleManifest::from_yaml(r#"
    /// classes:
    ///   - name: App\Logger
    ///     file: src/Logger.php
    ///   - name: App\Mailer
    ///     constructor:
    ///       parameters:
    ///         - { name: logger, class: App\Logger }
    /// "#).unwrap().into_oracle();
    ///
    /// assert!(oracle.class_exists("App\\Mailer"));
    /// ```
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct OracleManifest {
        pub classes: Vec<ClassManifest>,
        pub functions: IndexMap<String, SignatureManifest>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ClassManifest {
        pub name: String,
        #[serde(default)]
        pub extends: Vec<String>,
        #[serde(default)]
        pub implements: Vec<String>,
        #[serde(default)]
        pub file: Option<PathBuf>,
        #[serde(default)]
        pub constructor: Option<SignatureManifest>,
        #[serde(default)]
        pub methods: IndexMap<String, SignatureManifest>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct SignatureManifest {
        pub parameters: Vec<ParameterManifest>,
        pub public: bool,
        #[serde(rename = "abstract")]
        pub is_abstract: bool,
        pub returns: Option<String>,
        pub file: Option<PathBuf>,
    }

    impl Default for SignatureManifest {
        fn default() -> Self {
            Self {
                parameters: Vec::new(),
                public: true,
                is_abstract: false,
                returns: None,
                file: None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ParameterManifest {
        pub name: String,
        #[serde(default)]
        pub class: Option<String>,
        #[serde(default)]
        pub builtin: Option<String>,
        #[serde(default)]
        pub default: Option<ConfigValue>,
        #[serde(default)]
        pub optional: bool,
        #[serde(default)]
        pub variadic: bool,
    }

    impl OracleManifest {
        pub fn from_json(text: &str) -> DiResult<Self> {
            serde_json::from_str(text).map_err(|e| DiError::Config(e.to_string()))
        }

        pub fn from_yaml(text: &str) -> DiResult<Self> {
            serde_yaml::from_str(text).map_err(|e| DiError::Config(e.to_string()))
        }

        pub fn into_oracle(self) -> StaticOracle {
            let mut oracle = StaticOracle::new();
            for class in self.classes {
                let mut info = ClassInfo::new(class.name);
                for parent in class.extends {
                    info = info.extends(parent);
                }
                for interface in class.implements {
                    info = info.implements(interface);
                }
                if let Some(file) = class.file {
                    info = info.file(file);
                }
                if let Some(constructor) = class.constructor {
                    info = info.constructor(constructor.into_signature());
                }
                for (name, method) in class.methods {
                    info = info.method(name, method.into_signature());
                }
                oracle.add_class(info);
            }
            for (name, function) in self.functions {
                oracle.add_function(name, function.into_signature());
            }
            oracle
        }
    }

    impl SignatureManifest {
        fn into_signature(self) -> Signature {
            let mut signature = Signature::new();
            for parameter in self.parameters {
                signature = signature.param(parameter.into_parameter());
            }
            if let Some(ty) = self.returns {
                signature = signature.returns(ty);
            }
            if let Some(file) = self.file {
                signature = signature.file(file);
            }
            if !self.public {
                signature = signature.private();
            }
            if self.is_abstract {
                signature = signature.abstract_method();
            }
            signature
        }
    }

    impl ParameterManifest {
        fn into_parameter(self) -> Parameter {
            let mut parameter = Parameter::new(self.name);
            if let Some(class) = self.class {
                parameter = parameter.class(class);
            } else if let Some(builtin) = self.builtin {
                parameter = parameter.builtin(builtin);
            }
            if let Some(default) = self.default {
                parameter = parameter.default(Value::from(default));
            }
            if self.optional {
                parameter = parameter.optional();
            }
            if self.variadic {
                parameter = parameter.variadic();
            }
            parameter
        }
    }
}

//! Model and renderer of the generated container class.

use std::fmt;

use super::dump;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub documents: Vec<String>,
    pub parameters: Vec<MethodParameter>,
    pub body: String,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            documents: Vec::new(),
            parameters: Vec::new(),
            body: String::new(),
        }
    }

    pub fn add_document(&mut self, line: impl Into<String>) -> &mut Self {
        self.documents.push(line.into());
        self
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, type_hint: Option<String>, default: Option<Value>) -> &mut Self {
        self.parameters.push(MethodParameter {
            name: name.into(),
            type_hint,
            default,
        });
        self
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub visibility: Visibility,
    pub value: Value,
}

/// The generated container class.
///
/// `Display` renders the class declaration; [`GeneratedClass::source`] wraps
/// it into a complete PHP file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClass {
    pub name: String,
    pub extends: Option<String>,
    pub documents: Vec<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
}

impl GeneratedClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            documents: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn set_extends(&mut self, parent: impl Into<String>) -> &mut Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn add_document(&mut self, line: impl Into<String>) -> &mut Self {
        self.documents.push(line.into());
        self
    }

    pub fn add_property(&mut self, name: impl Into<String>, value: Value) -> &mut Property {
        self.properties.push(Property {
            name: name.into(),
            visibility: Visibility::Public,
            value,
        });
        let last = self.properties.len() - 1;
        &mut self.properties[last]
    }

    pub fn add_method(&mut self, name: impl Into<String>) -> &mut Method {
        self.methods.push(Method::new(name));
        let last = self.methods.len() - 1;
        &mut self.methods[last]
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Complete source file with the opening tag.
    pub fn source(&self) -> String {
        format!("<?php\n\n{}", self)
    }
}

fn write_documents(f: &mut fmt::Formatter<'_>, lines: &[String], indent: &str) -> fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}/**", indent)?;
    for line in lines {
        writeln!(f, "{} * {}", indent, line)?;
    }
    writeln!(f, "{} */", indent)
}

fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", indent, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(hint) = &self.type_hint {
            write!(f, "{} ", hint)?;
        }
        write!(f, "${}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", dump(default))?;
        }
        Ok(())
    }
}

impl fmt::Display for GeneratedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_documents(f, &self.documents, "")?;
        write!(f, "class {}", self.name)?;
        if let Some(parent) = &self.extends {
            write!(f, " extends {}", parent)?;
        }
        writeln!(f, "\n{{")?;

        for property in &self.properties {
            let value = indent_lines(&dump(&property.value), "\t");
            writeln!(f, "\n\t{} ${} = {};", property.visibility, property.name, value.trim_start())?;
        }

        for method in &self.methods {
            writeln!(f, "\n")?;
            write_documents(f, &method.documents, "\t")?;
            let params = method
                .parameters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "\t{} function {}({})", method.visibility, method.name, params)?;
            writeln!(f, "\t{{")?;
            if !method.body.is_empty() {
                writeln!(f, "{}", indent_lines(&method.body, "\t\t"))?;
            }
            writeln!(f, "\t}}")?;
        }

        writeln!(f, "\n}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_class() {
        let mut class = GeneratedClass::new("Container");
        class.set_extends("BaseContainer").add_document("@property Foo $foo");
        class.add_property("classes", Value::List(vec![Value::Int(1)]));
        class
            .add_method("createServiceFoo")
            .set_visibility(Visibility::Protected)
            .add_document("@return Foo")
            .add_parameter("name", Some("Bar".into()), Some(Value::Null))
            .set_body("$service = new Foo;\nreturn $service;");

        let out = class.to_string();
        assert!(out.starts_with("/**\n * @property Foo $foo\n */\nclass Container extends BaseContainer\n{\n"));
        assert!(out.contains("\tpublic $classes = array(1);\n"));
        assert!(out.contains("\t/**\n\t * @return Foo\n\t */\n\tprotected function createServiceFoo(Bar $name = NULL)\n\t{\n\t\t$service = new Foo;\n\t\treturn $service;\n\t}\n"));
        assert!(out.ends_with("\n}\n"));
        assert!(class.source().starts_with("<?php\n\nclass") || class.source().starts_with("<?php\n\n/**"));
    }
}

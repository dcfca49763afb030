//! Service graph export for inspecting a resolved container.
//!
//! Nodes are service definitions, edges are references between them. Edges
//! come from two places: references written explicitly in factories and
//! setups, and references produced by autowiring, which are only known once
//! the container has been emitted.

use indexmap::{IndexMap, IndexSet};

#[cfg(feature = "graph-export")]
use serde::{Deserialize, Serialize};

use crate::autowire::AutowiringIndex;
use crate::error::{DiError, DiResult};
use crate::registry::Registry;
use crate::statement::{Entity, Receiver, Reference, Statement, THIS_CONTAINER};
use crate::value::Value;

/// A service in the graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphNode {
    /// Service name
    pub id: String,
    /// Resolved class, `object` when unknown
    pub class: String,
    pub shared: bool,
    pub autowired: bool,
    pub internal: bool,
    /// Tag names attached to the definition
    pub tags: Vec<String>,
}

/// A reference from one service to another.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    /// Service holding the reference
    pub from: String,
    /// Referenced service
    pub to: String,
    pub dependency_type: DependencyType,
}

/// How a service refers to another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub enum DependencyType {
    /// Factory is the other service itself
    Alias,
    /// Factory or setup calls a method on the other service
    Receiver,
    /// Explicit `@name` or `@\Type` argument
    Argument,
    /// Injected by autowiring during emission
    Autowired,
}

/// Metadata about the entire graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphMetadata {
    pub service_count: usize,
    pub shared_count: usize,
    pub transient_count: usize,
    pub autowired_count: usize,
    /// Whether autowired edges are included
    pub emitted: bool,
    /// Export timestamp
    pub exported_at: String,
    /// Export format version
    pub version: String,
}

/// Complete service graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

/// Export formats supported for dependency graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON, needs the `graph-export` feature
    Json,
    /// YAML, needs the `graph-export` feature
    Yaml,
    /// DOT format for Graphviz
    Dot,
    /// Mermaid flowchart
    Mermaid,
}

impl DependencyGraph {
    pub(crate) fn build(
        registry: &Registry,
        index: &AutowiringIndex,
        emitted: &IndexMap<String, IndexSet<String>>,
    ) -> Self {
        let mut nodes = Vec::with_capacity(registry.len());
        let mut edges: Vec<GraphEdge> = Vec::new();

        for (name, definition) in registry.iter() {
            nodes.push(GraphNode {
                id: name.to_string(),
                class: definition.class.clone().unwrap_or_else(|| "object".to_string()),
                shared: definition.shared,
                autowired: definition.autowired,
                internal: definition.internal,
                tags: definition.tags.keys().cloned().collect(),
            });

            let mut collector = EdgeCollector {
                from: name,
                registry,
                index,
                edges: &mut edges,
            };
            if let Some(factory) = &definition.factory {
                if let Entity::Service(reference) = &factory.entity {
                    collector.reference(reference, DependencyType::Alias);
                    collector.arguments(factory);
                } else {
                    collector.statement(factory);
                }
            }
            for setup in &definition.setup {
                collector.statement(setup);
            }
        }

        for (from, targets) in emitted {
            for to in targets {
                if !edges.iter().any(|edge| &edge.from == from && &edge.to == to) {
                    edges.push(GraphEdge {
                        from: from.clone(),
                        to: to.clone(),
                        dependency_type: DependencyType::Autowired,
                    });
                }
            }
        }

        let shared_count = nodes.iter().filter(|node| node.shared).count();
        let metadata = GraphMetadata {
            service_count: nodes.len(),
            shared_count,
            transient_count: nodes.len() - shared_count,
            autowired_count: nodes.iter().filter(|node| node.autowired).count(),
            emitted: !emitted.is_empty(),
            exported_at: {
                #[cfg(feature = "graph-export")]
                {
                    chrono::Utc::now().to_rfc3339()
                }
                #[cfg(not(feature = "graph-export"))]
                {
                    String::from("unknown")
                }
            },
            version: "1.0.0".to_string(),
        };

        DependencyGraph { nodes, edges, metadata }
    }

    /// Edges leaving `service`.
    pub fn dependencies_of<'a>(&'a self, service: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.from == service)
    }

    pub fn export(&self, format: ExportFormat) -> DiResult<String> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Yaml => self.to_yaml(),
            ExportFormat::Dot => Ok(self.to_dot()),
            ExportFormat::Mermaid => Ok(self.to_mermaid()),
        }
    }

    #[cfg(feature = "graph-export")]
    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Config(format!("JSON serialization failed: {}", e)))
    }

    #[cfg(not(feature = "graph-export"))]
    pub fn to_json(&self) -> DiResult<String> {
        Err(DiError::Config("JSON export needs the graph-export feature".to_string()))
    }

    #[cfg(feature = "graph-export")]
    pub fn to_yaml(&self) -> DiResult<String> {
        serde_yaml::to_string(self).map_err(|e| DiError::Config(format!("YAML serialization failed: {}", e)))
    }

    #[cfg(not(feature = "graph-export"))]
    pub fn to_yaml(&self) -> DiResult<String> {
        Err(DiError::Config("YAML export needs the graph-export feature".to_string()))
    }

    /// Graphviz DOT; transient services are drawn with a dashed border.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Container {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for node in &self.nodes {
            let style = if node.shared { "filled" } else { "\"filled,dashed\"" };
            let color = if node.autowired { "lightblue" } else { "lightgrey" };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\", style={}, fillcolor={}];\n",
                dot_escape(&node.id),
                dot_escape(&node.id),
                dot_escape(&node.class),
                style,
                color
            ));
        }

        output.push('\n');
        for edge in &self.edges {
            let style = match edge.dependency_type {
                DependencyType::Alias => "bold",
                DependencyType::Receiver => "solid",
                DependencyType::Argument => "solid",
                DependencyType::Autowired => "dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                dot_escape(&edge.from),
                dot_escape(&edge.to),
                style
            ));
        }

        output.push_str("}\n");
        output
    }

    /// Mermaid flowchart; node ids are positional since service names may
    /// contain characters Mermaid does not accept.
    pub fn to_mermaid(&self) -> String {
        let ids: IndexMap<&str, String> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), format!("s{}", i)))
            .collect();

        let mut output = String::from("graph TD\n");
        for node in &self.nodes {
            output.push_str(&format!(
                "  {}[\"{}: {}\"]\n",
                ids[node.id.as_str()],
                mermaid_escape(&node.id),
                mermaid_escape(&node.class)
            ));
        }
        for edge in &self.edges {
            let (Some(from), Some(to)) = (ids.get(edge.from.as_str()), ids.get(edge.to.as_str())) else {
                continue;
            };
            let arrow = match edge.dependency_type {
                DependencyType::Alias => "==>",
                DependencyType::Autowired => "-.->",
                _ => "-->",
            };
            output.push_str(&format!("  {} {} {}\n", from, arrow, to));
        }

        output.push_str("\n  classDef transient stroke-dasharray: 5 5\n");
        for node in self.nodes.iter().filter(|node| !node.shared) {
            output.push_str(&format!("  class {} transient\n", ids[node.id.as_str()]));
        }
        output
    }
}

fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn mermaid_escape(text: &str) -> String {
    text.replace('"', "#quot;")
}

struct EdgeCollector<'a> {
    from: &'a str,
    registry: &'a Registry,
    index: &'a AutowiringIndex,
    edges: &'a mut Vec<GraphEdge>,
}

impl EdgeCollector<'_> {
    fn push(&mut self, to: String, dependency_type: DependencyType) {
        if to == self.from {
            return;
        }
        let edge = GraphEdge {
            from: self.from.to_string(),
            to,
            dependency_type,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    fn reference(&mut self, reference: &Reference, dependency_type: DependencyType) {
        let target = match reference {
            Reference::Service(name) => Some(name.clone()),
            Reference::ByType(ty) => self.index.get_by_type(ty).ok().flatten().map(str::to_string),
            Reference::Container => Some(THIS_CONTAINER.to_string()),
            Reference::SelfService => None,
        };
        if let Some(target) = target.filter(|name| self.registry.contains(name)) {
            self.push(target, dependency_type);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match &statement.entity {
            Entity::Service(reference) => self.reference(reference, DependencyType::Argument),
            Entity::Method {
                receiver: Receiver::Service(reference),
                ..
            }
            | Entity::Property {
                receiver: Receiver::Service(reference),
                ..
            } => self.reference(reference, DependencyType::Receiver),
            _ => {}
        }
        self.arguments(statement);
    }

    fn arguments(&mut self, statement: &Statement) {
        for value in statement.arguments.values() {
            self.value(value);
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Reference(reference) => self.reference(reference, DependencyType::Argument),
            Value::Statement(statement) => self.statement(statement),
            Value::List(items) => items.iter().for_each(|item| self.value(item)),
            Value::Map(map) => map.values().for_each(|item| self.value(item)),
            _ => {}
        }
    }
}

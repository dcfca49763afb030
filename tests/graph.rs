use ferrous_di_compiler::{
    ClassInfo, ContainerBuilder, DependencyType, EmitOptions, ExportFormat, Parameter, Signature, StaticOracle,
    NO_ARGS,
};

fn builder() -> ContainerBuilder {
    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("Logger"));
    oracle.add_class(ClassInfo::new("Cache").method("warm", Signature::new()));
    oracle.add_class(
        ClassInfo::new("Service")
            .constructor(Signature::new().param(Parameter::new("logger").class("Logger")))
            .method("setCache", Signature::new().param(Parameter::new("cache").class("Cache"))),
    );

    let mut builder = ContainerBuilder::new(oracle);
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder
        .add_definition("cache")
        .unwrap()
        .set_class("Cache")
        .set_shared(false)
        .add_tag("warmup", true);
    builder
        .add_definition("service")
        .unwrap()
        .set_class("Service")
        .add_setup("setCache", ["@cache"])
        .unwrap();
    builder
        .add_definition("log")
        .unwrap()
        .set_factory("@logger", NO_ARGS)
        .unwrap();
    builder
        .add_definition("warmer")
        .unwrap()
        .set_factory("@cache::warm", NO_ARGS)
        .unwrap();
    builder
}

#[test]
fn test_explicit_edges_before_emission() {
    let resolved = builder().resolve_class_list().unwrap();
    let graph = resolved.graph();

    assert_eq!(graph.metadata.service_count, 5);
    assert_eq!(graph.metadata.transient_count, 1);
    assert!(!graph.metadata.emitted);

    let edge = |from: &str| -> Vec<(String, DependencyType)> {
        graph
            .dependencies_of(from)
            .map(|edge| (edge.to.clone(), edge.dependency_type))
            .collect()
    };
    assert_eq!(edge("service"), vec![("cache".to_string(), DependencyType::Argument)]);
    assert_eq!(edge("log"), vec![("logger".to_string(), DependencyType::Alias)]);
    assert_eq!(edge("warmer"), vec![("cache".to_string(), DependencyType::Receiver)]);

    let cache = graph.nodes.iter().find(|node| node.id == "cache").unwrap();
    assert_eq!(cache.tags, vec!["warmup".to_string()]);
    assert!(!cache.shared);
}

#[test]
fn test_autowired_edges_after_emission() {
    let compiled = builder().build_container(&EmitOptions::default()).unwrap();
    let graph = &compiled.graph;

    assert!(graph.metadata.emitted);
    let service: Vec<_> = graph
        .dependencies_of("service")
        .map(|edge| (edge.to.as_str(), edge.dependency_type))
        .collect();
    assert!(service.contains(&("logger", DependencyType::Autowired)));
    assert!(service.contains(&("cache", DependencyType::Argument)));
}

#[test]
fn test_dot_and_mermaid_output() {
    let graph = builder().resolve_class_list().unwrap().graph();

    let dot = graph.export(ExportFormat::Dot).unwrap();
    assert!(dot.starts_with("digraph Container {"));
    assert!(dot.contains("\"cache\" [label=\"cache\\nCache\", style=\"filled,dashed\", fillcolor=lightblue];"));
    assert!(dot.contains("\"log\" -> \"logger\" [style=bold];"));

    let mermaid = graph.export(ExportFormat::Mermaid).unwrap();
    assert!(mermaid.starts_with("graph TD\n"));
    assert!(mermaid.contains("  s0[\"logger: Logger\"]"));
    assert!(mermaid.contains("  s3 ==> s0"));
    assert!(mermaid.contains("  class s1 transient"));
}

#[cfg(feature = "graph-export")]
#[test]
fn test_serialized_exports() {
    let graph = builder().resolve_class_list().unwrap().graph();

    let json = graph.export(ExportFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["metadata"]["service_count"], 5);
    assert_eq!(parsed["edges"][0]["dependency_type"], "Argument");

    let yaml = graph.to_yaml().unwrap();
    assert!(yaml.contains("service_count: 5"));
}

#[cfg(not(feature = "graph-export"))]
#[test]
fn test_serialized_exports_need_the_feature() {
    let graph = builder().resolve_class_list().unwrap().graph();
    assert!(graph.to_json().is_err());
    assert_eq!(graph.metadata.exported_at, "unknown");
}

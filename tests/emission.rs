/// Generated container source: factory methods, tables and error context.
use ferrous_di_compiler::{
    ClassInfo, CompiledContainer, ContainerBuilder, DiError, EmitOptions, Entity, Parameter, Signature,
    Statement, StaticOracle, Value, NO_ARGS,
};

fn oracle() -> StaticOracle {
    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("DI\\Container").file("/vendor/Container.php"));
    oracle.add_class(ClassInfo::new("Logger").file("/src/Logger.php"));
    oracle.add_class(
        ClassInfo::new("Service")
            .file("/src/Service.php")
            .constructor(Signature::new().param(Parameter::new("logger").class("Logger")))
            .method("setLogger", Signature::new().param(Parameter::new("logger").class("Logger")))
            .method("setName", Signature::new().param(Parameter::new("name").builtin("string"))),
    );
    oracle.add_class(
        ClassInfo::new("Mailer")
            .constructor(Signature::new().param(Parameter::new("from").builtin("string"))),
    );
    oracle.add_class(
        ClassInfo::new("MailerFactory").method(
            "create",
            Signature::new()
                .param(Parameter::new("from").builtin("string"))
                .returns("Mailer"),
        ),
    );
    oracle
}

fn build(builder: ContainerBuilder) -> CompiledContainer {
    builder.build_container(&EmitOptions::default()).unwrap()
}

fn body<'a>(compiled: &'a CompiledContainer, method: &str) -> &'a str {
    &compiled
        .class
        .method(method)
        .unwrap_or_else(|| panic!("method {} missing", method))
        .body
}

#[test]
fn test_logger_scenario() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("a").unwrap().set_class("Logger");
    builder.add_definition("b").unwrap().set_class("Service");

    let compiled = build(builder);
    assert_eq!(body(&compiled, "createServiceA"), "$service = new Logger;\nreturn $service;");
    assert_eq!(
        body(&compiled, "createServiceB"),
        "$service = new Service($this->a);\nreturn $service;"
    );
    assert!(compiled.dependencies.contains("/src/Logger.php"));
    assert!(compiled.dependencies.contains("/src/Service.php"));
}

#[test]
fn test_source_has_class_header_and_documents() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder.add_definition("App\\mailer").unwrap().set_class_with_args("Mailer", ["x"]);

    let compiled = builder
        .build_container(&EmitOptions::new("AppContainer").with_parent("\\DI\\Container"))
        .unwrap();
    let source = compiled.source();
    assert!(source.starts_with("<?php\n"));
    assert!(source.contains("class AppContainer extends \\DI\\Container"));
    assert!(source.contains(" * @property Logger $logger"));
    // names with namespace separators are only reachable through the accessor
    assert!(!source.contains("@property Mailer"));
    assert!(source.contains("protected function createServiceApp__mailer()"));
    assert!(source.contains("\t * @return Mailer"));
}

#[test]
fn test_constructor_passes_expanded_parameters() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.set_parameter("appDir", "/srv/app").set_parameter("debug", true);
    builder.add_definition("logger").unwrap().set_class("Logger");

    let compiled = build(builder);
    assert_eq!(
        body(&compiled, "__construct"),
        "parent::__construct(array('appDir' => '/srv/app', 'debug' => TRUE));"
    );
}

#[test]
fn test_factory_result_is_type_checked() {
    let mut builder = ContainerBuilder::new(oracle());
    builder
        .add_definition("mailer")
        .unwrap()
        .set_factory("MailerFactory::create", ["noreply@example.com"])
        .unwrap();

    let compiled = build(builder);
    assert_eq!(
        body(&compiled, "createServiceMailer"),
        "$service = MailerFactory::create('noreply@example.com');\n\
         if (!$service instanceof Mailer) {\n\
         \tthrow new \\UnexpectedValueException('Unable to create service \\'mailer\\', value returned by factory is not Mailer type.');\n\
         }\n\
         return $service;"
    );
}

#[test]
fn test_transient_services_are_public_unless_internal() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger").set_shared(false);
    builder
        .add_definition("hidden")
        .unwrap()
        .set_class("Logger")
        .set_shared(false)
        .set_internal(true)
        .set_autowired(false);
    builder.add_definition("service").unwrap().set_class("Service");

    let compiled = build(builder);
    let source = compiled.source();
    assert!(source.contains("public function createLogger()"));
    assert!(source.contains("protected function createHidden()"));
    assert!(!source.contains("@property Logger $logger"));
    assert!(body(&compiled, "createServiceService").contains("new Service($this->createLogger())"));
}

#[test]
fn test_factory_parameters_become_method_parameters() {
    let mut builder = ContainerBuilder::new(oracle());
    builder
        .add_definition("mailer")
        .unwrap()
        .set_class_with_args("Mailer", ["%from%"])
        .set_shared(false)
        .add_parameter_with_default("string from", "root@localhost");
    builder
        .add_definition("alerts")
        .unwrap()
        .set_factory("@mailer", ["alerts@example.com"])
        .unwrap();

    let compiled = build(builder);
    assert!(compiled
        .source()
        .contains("public function createMailer(string $from = 'root@localhost')"));
    assert_eq!(
        body(&compiled, "createMailer"),
        "$service = new Mailer($from);\nreturn $service;"
    );
    assert!(body(&compiled, "createServiceAlerts")
        .starts_with("$service = $this->createMailer('alerts@example.com');\n"));
}

#[test]
fn test_setup_calls_run_on_the_created_service() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder
        .add_definition("service")
        .unwrap()
        .set_class("Service")
        .add_setup("setLogger", NO_ARGS)
        .unwrap()
        .add_setup("@self::setName", ["main"])
        .unwrap()
        .add_setup("@self::$enabled", [true])
        .unwrap()
        .add_setup("$level", [3])
        .unwrap();

    let compiled = build(builder);
    assert_eq!(
        body(&compiled, "createServiceService"),
        "$service = new Service($this->logger);\n\
         $service->setLogger($this->logger);\n\
         $service->setName('main');\n\
         $service->enabled = TRUE;\n\
         $service->level = 3;\n\
         return $service;"
    );
}

#[test]
fn test_shared_reference_with_arguments_fails() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder
        .add_definition("copy")
        .unwrap()
        .set_factory("@logger", ["x"])
        .unwrap();

    let err = builder.build_container(&EmitOptions::default()).unwrap_err();
    assert_eq!(err.root(), &DiError::SharedReferenceArguments("logger".into()));
    assert_eq!(
        err.to_string(),
        "Service 'copy': Unable to call shared service 'logger' with arguments"
    );
}

#[test]
fn test_container_service_returns_itself() {
    let mut builder = ContainerBuilder::new(oracle());
    builder
        .add_definition("service")
        .unwrap()
        .set_class("Service")
        .add_setup("@container::$name", ["x"])
        .unwrap();
    builder.add_definition("logger").unwrap().set_class("Logger");

    let compiled = build(builder);
    assert_eq!(body(&compiled, "createServiceContainer"), "return $this;");
    assert!(compiled.source().contains("@property DI\\Container $container"));
    assert!(body(&compiled, "createServiceService").contains("$this->name = 'x';"));
}

#[test]
fn test_untyped_container_when_parent_is_unknown() {
    let mut builder = ContainerBuilder::new(StaticOracle::new());
    builder
        .add_definition("now")
        .unwrap()
        .set_factory_statement(Statement::of(Entity::code("'time'")));

    let compiled = build(builder);
    assert_eq!(body(&compiled, "createServiceContainer"), "return $this;");
    assert!(compiled.source().contains("@property object $container"));
    assert_eq!(
        body(&compiled, "createServiceNow"),
        "$service = call_user_func_array('time', array());\nreturn $service;"
    );
}

#[test]
fn test_raw_code_keeps_percent_signs() {
    let mut builder = ContainerBuilder::new(StaticOracle::new());
    builder.add_definition("label").unwrap().set_factory_statement(Statement::of(Entity::code(
        "function ($a) { return sprintf('%s%s 100%%', $a, 'x'); }",
    )));

    let compiled = build(builder);
    assert_eq!(
        body(&compiled, "createServiceLabel"),
        "$service = call_user_func_array(function ($a) { return sprintf('%s%s 100%%', $a, 'x'); }, array());\n\
         return $service;"
    );
}

#[test]
fn test_tags_are_written_to_meta() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.set_parameter("cmd", "app:run");
    builder
        .add_definition("logger")
        .unwrap()
        .set_class("Logger")
        .add_tag("console.command", "%cmd%")
        .add_tag("inject", true);

    let compiled = build(builder);
    let meta = &compiled.class.property("meta").unwrap().value;
    let Value::Map(services) = meta else {
        panic!("meta is not a map: {:?}", meta);
    };
    let Value::Map(entry) = &services["logger"] else {
        panic!("logger meta missing");
    };
    let Value::Map(tags) = &entry[ferrous_di_compiler::TAGS] else {
        panic!("tags missing");
    };
    assert_eq!(tags["console.command"], Value::from("app:run"));
    assert_eq!(tags["inject"], Value::Bool(true));
}

#[test]
fn test_classes_table_maps_types_to_services() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger");

    let compiled = build(builder);
    let Value::Map(classes) = &compiled.class.property("classes").unwrap().value else {
        panic!("classes is not a map");
    };
    assert_eq!(classes["logger"], Value::from("logger"));
    assert_eq!(classes["di\\container"], Value::from("container"));
}

#[test]
fn test_invalid_service_name() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("my-logger").unwrap().set_class("Logger");

    let err = builder.build_container(&EmitOptions::default()).unwrap_err();
    assert_eq!(err.root(), &DiError::InvalidServiceName("my-logger".into()));
    assert_eq!(
        err.to_string(),
        "Service 'my-logger': Name 'my-logger' contains invalid characters"
    );
}

#[test]
fn test_constructor_arguments_without_constructor() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class_with_args("Logger", [1]);

    let err = builder.build_container(&EmitOptions::default()).unwrap_err();
    assert_eq!(err.root(), &DiError::NoConstructor("Logger".into()));
}

#[test]
fn test_missing_parameter_is_reported_with_service() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("mailer").unwrap().set_class_with_args("Mailer", ["%sender%"]);

    let err = builder.build_container(&EmitOptions::default()).unwrap_err();
    assert_eq!(err.root(), &DiError::MissingParameter("sender".into()));
    assert_eq!(err.to_string(), "Service 'mailer': Missing parameter 'sender'");
}

#[test]
fn test_invalid_options_are_rejected() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("logger").unwrap().set_class("Logger");

    let mut options = EmitOptions::new("Bad Name");
    assert!(matches!(options.validate(), Err(DiError::Config(_))));
    options.class_name = "Good".into();
    assert!(options.validate().is_ok());
    assert!(builder.build_container(&options).is_ok());
}

#[test]
fn test_emitted_references_feed_the_graph() {
    let mut builder = ContainerBuilder::new(oracle());
    builder.add_definition("a").unwrap().set_class("Logger");
    builder.add_definition("b").unwrap().set_class("Service");

    let mut resolved = builder.resolve_class_list().unwrap();
    assert_eq!(resolved.graph().dependencies_of("b").count(), 0);

    resolved.emit(&EmitOptions::default()).unwrap();
    let graph = resolved.graph();
    let edges: Vec<_> = graph.dependencies_of("b").map(|edge| edge.to.as_str()).collect();
    assert_eq!(edges, vec!["a"]);
    assert!(graph.metadata.emitted);
}

//! Emit options from the environment, and with the `config` feature from
//! JSON/YAML documents together with parameters and oracle manifests.

use ferrous_di_compiler::{ConfigSource, ConfigValue, DiError, EmitOptions, EnvironmentConfigSource};
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_environment_values_are_typed() {
    env::set_var("DITEST_PORT", "8080");
    env::set_var("DITEST_DEBUG", "true");
    env::set_var("DITEST_NAME", "Container2");

    let source = EnvironmentConfigSource::with_prefix("ditest");
    assert_eq!(source.get("port"), Some(ConfigValue::Integer(8080)));
    assert_eq!(source.get("debug"), Some(ConfigValue::Boolean(true)));
    assert_eq!(source.get("name"), Some(ConfigValue::String("Container2".into())));
    assert_eq!(source.get("missing"), None);

    env::remove_var("DITEST_PORT");
    env::remove_var("DITEST_DEBUG");
    env::remove_var("DITEST_NAME");
}

#[test]
#[serial]
fn test_environment_without_values_gives_defaults() {
    env::remove_var("DIEMPTY_CLASS_NAME");
    env::remove_var("DIEMPTY_PARENT_CLASS");

    assert_eq!(EmitOptions::from_env("diempty").unwrap(), EmitOptions::default());
}

#[test]
#[serial]
fn test_environment_with_invalid_class_name() {
    env::set_var("DIBAD_CLASS_NAME", "not a class");
    let result = EmitOptions::from_env("dibad");
    env::remove_var("DIBAD_CLASS_NAME");

    assert!(matches!(result, Err(DiError::Config(message)) if message.contains("not a class")));
}

#[cfg(feature = "config")]
mod documents {
    use ferrous_di_compiler::{
        parameters_from_json, parameters_from_yaml, ContainerBuilder, DiError, EmitOptions, OracleManifest,
        Reference, TypeOracle, Value,
    };

    #[test]
    fn test_options_from_json_and_yaml() {
        let json = EmitOptions::from_json(r#"{ "class_name": "AppContainer" }"#).unwrap();
        assert_eq!(json, EmitOptions::new("AppContainer"));

        let yaml = EmitOptions::from_yaml("class_name: AppContainer\nparent_class: App\\Base\n").unwrap();
        assert_eq!(yaml, EmitOptions::new("AppContainer").with_parent("App\\Base"));

        assert!(matches!(EmitOptions::from_json("{"), Err(DiError::Config(_))));
    }

    #[test]
    fn test_parameters_keep_order_and_references() {
        let params = parameters_from_json(r#"{ "b": 1, "a": [true, null], "mailer": "@mailer" }"#).unwrap();
        let keys: Vec<&String> = params.keys().collect();
        assert_eq!(keys, vec!["b", "a", "mailer"]);
        assert_eq!(params["a"], Value::List(vec![Value::Bool(true), Value::Null]));
        assert_eq!(params["mailer"], Value::Reference(Reference::service("mailer")));

        let params = parameters_from_yaml("database:\n  user: root\n  port: 5432\n").unwrap();
        let Value::Map(database) = &params["database"] else {
            panic!("database is not a map");
        };
        assert_eq!(database["port"], Value::Int(5432));
    }

    #[test]
    fn test_manifest_drives_a_build() {
        let oracle = OracleManifest::from_json(
            r#"{
                "classes": [
                    { "name": "App\\Logger", "file": "src/Logger.php" },
                    {
                        "name": "App\\Mailer",
                        "constructor": {
                            "parameters": [
                                { "name": "from", "builtin": "string" },
                                { "name": "logger", "class": "App\\Logger" }
                            ]
                        },
                        "methods": { "hidden": { "public": false } }
                    }
                ]
            }"#,
        )
        .unwrap()
        .into_oracle();
        assert!(oracle.class_exists("app\\mailer"));

        let mut builder = ContainerBuilder::new(oracle);
        builder.set_parameter("from", "noreply@example.com");
        builder.add_definition("logger").unwrap().set_class("App\\Logger");
        builder
            .add_definition("mailer")
            .unwrap()
            .set_class_with_args("App\\Mailer", ["%from%"]);

        let compiled = builder.build_container(&EmitOptions::default()).unwrap();
        let body = &compiled.class.method("createServiceMailer").unwrap().body;
        assert!(body.contains("new App\\Mailer('noreply@example.com', $this->logger)"));
        assert!(compiled.dependencies.contains("src/Logger.php"));
    }

    #[test]
    fn test_private_manifest_method_is_not_callable() {
        let oracle = OracleManifest::from_yaml(
            "classes:\n  - name: Factory\n    methods:\n      build: { public: false, returns: Factory }\n",
        )
        .unwrap()
        .into_oracle();

        let mut builder = ContainerBuilder::new(oracle);
        builder
            .add_definition("thing")
            .unwrap()
            .set_factory("Factory::build", ferrous_di_compiler::NO_ARGS)
            .unwrap();
        assert_eq!(
            builder.resolve_class_list().unwrap_err(),
            DiError::UncallableTarget("Factory::build()".into())
        );
    }
}

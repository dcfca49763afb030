use std::sync::{Arc, Mutex};

use ferrous_di_compiler::{
    BuildObserver, ClassInfo, ContainerBuilder, DiError, EmitOptions, StaticOracle, StatsObserver, TracingObserver,
    NO_ARGS,
};
use tracing_subscriber::EnvFilter;

fn builder() -> ContainerBuilder {
    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("Logger"));

    let mut builder = ContainerBuilder::new(oracle);
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder
        .add_definition("clock")
        .unwrap()
        .set_factory("::time", NO_ARGS)
        .unwrap();
    builder
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl BuildObserver for Recorder {
    fn class_resolved(&self, service: &str, class: Option<&str>) {
        self.0
            .lock()
            .unwrap()
            .push(format!("resolved {} {}", service, class.unwrap_or("?")));
    }

    fn index_built(&self, types: usize, services: usize) {
        self.0.lock().unwrap().push(format!("index {} {}", types, services));
    }

    fn service_emitted(&self, service: &str, method: &str) {
        self.0.lock().unwrap().push(format!("emitted {} {}", service, method));
    }

    fn build_failed(&self, error: &DiError) {
        self.0.lock().unwrap().push(format!("failed {}", error));
    }
}

#[test]
fn test_events_arrive_in_build_order() {
    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("Logger"));
    oracle.add_function("time", ferrous_di_compiler::Signature::new());

    let mut builder = ContainerBuilder::new(oracle);
    builder.add_definition("logger").unwrap().set_class("Logger");
    builder
        .add_definition("clock")
        .unwrap()
        .set_factory("::time", NO_ARGS)
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    builder.add_observer(recorder.clone());
    builder.build_container(&EmitOptions::default()).unwrap();

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "resolved logger Logger",
            "resolved clock ?",
            "resolved container ?",
            "index 1 3",
            "emitted logger createServiceLogger",
            "emitted clock createServiceClock",
            "emitted container createServiceContainer",
        ]
    );
}

#[test]
fn test_stats_count_failures() {
    // `time` is not known to the oracle, so the factory is not callable
    let stats = Arc::new(StatsObserver::new());
    let mut builder = builder();
    builder.add_observer(stats.clone());

    let err = builder.build_container(&EmitOptions::default()).unwrap_err();
    assert_eq!(err, DiError::UncallableTarget("time()".into()));
    assert_eq!(stats.failure_count(), 1);
    assert_eq!(stats.resolved_count(), 1);
    assert_eq!(stats.emitted_count(), 0);

    stats.reset();
    assert_eq!(stats.resolved_count(), 0);
}

#[test]
fn test_tracing_observer_under_a_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut oracle = StaticOracle::new();
        oracle.add_class(ClassInfo::new("Logger"));

        let mut builder = ContainerBuilder::new(oracle);
        builder.add_definition("logger").unwrap().set_class("Logger");
        builder.add_observer(Arc::new(TracingObserver::with_label("test")));

        let compiled = builder.build_container(&EmitOptions::default()).unwrap();
        assert!(compiled.class.method("createServiceLogger").is_some());
    });
}

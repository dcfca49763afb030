//! Build observers for container compilation.
//!
//! Observers receive hooks while the class list is resolved and the container
//! source is emitted. They are meant for diagnostics: structured logging,
//! counting, or collecting the emitted method names in tests. Observers never
//! influence the build result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::DiError;

/// Hook trait for build events.
///
/// Every method has an empty default so implementors only override the
/// events they care about.
///
/// # Examples
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use ferrous_di_compiler::{BuildObserver, ClassInfo, ContainerBuilder, EmitOptions, StaticOracle};
///
/// #[derive(Default)]
/// struct Collect(Mutex<Vec<String>>);
///
/// impl BuildObserver for Collect {
///     fn service_emitted(&self, _service: &str, method: &str) {
///         self.0.lock().unwrap().push(method.to_string());
///     }
/// }
///
/// let mut oracle = StaticOracle::new();
/// oracle.add_class(ClassInfo::new("Logger"));
///
/// let collect = Arc::new(Collect::default());
/// let mut builder = ContainerBuilder::new(oracle);
/// builder.add_definition("logger").unwrap().set_class("Logger");
/// builder.add_observer(collect.clone());
/// builder.build_container(&EmitOptions::default()).unwrap();
///
/// assert!(collect.0.lock().unwrap().contains(&"createServiceLogger".to_string()));
/// ```
pub trait BuildObserver: Send + Sync {
    /// A definition's class has been resolved; `None` means unknown type.
    fn class_resolved(&self, _service: &str, _class: Option<&str>) {}

    /// The autowiring index has been rebuilt.
    fn index_built(&self, _types: usize, _services: usize) {}

    /// A factory method has been generated for a service.
    fn service_emitted(&self, _service: &str, _method: &str) {}

    /// A build step failed; the error is returned to the caller afterwards.
    fn build_failed(&self, _error: &DiError) {}
}

/// Registered observers of one builder.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn BuildObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn BuildObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn class_resolved(&self, service: &str, class: Option<&str>) {
        for observer in &self.observers {
            observer.class_resolved(service, class);
        }
    }

    #[inline]
    pub(crate) fn index_built(&self, types: usize, services: usize) {
        for observer in &self.observers {
            observer.index_built(types, services);
        }
    }

    #[inline]
    pub(crate) fn service_emitted(&self, service: &str, method: &str) {
        for observer in &self.observers {
            observer.service_emitted(service, method);
        }
    }

    /// Reports a failure and hands the error back for propagation.
    pub(crate) fn failed(&self, error: DiError) -> DiError {
        for observer in &self.observers {
            observer.build_failed(&error);
        }
        error
    }
}

/// Observer that forwards every event to `tracing`.
///
/// Resolution events are logged at `debug`, emission at `trace` and failures
/// at `warn`.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    label: Option<String>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `build` field to every event, to tell several builds apart.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}

impl BuildObserver for TracingObserver {
    fn class_resolved(&self, service: &str, class: Option<&str>) {
        tracing::debug!(build = self.label(), service, class = class.unwrap_or("object"), "service class");
    }

    fn index_built(&self, types: usize, services: usize) {
        tracing::debug!(build = self.label(), types, services, "autowiring index");
    }

    fn service_emitted(&self, service: &str, method: &str) {
        tracing::trace!(build = self.label(), service, method, "factory method");
    }

    fn build_failed(&self, error: &DiError) {
        tracing::warn!(build = self.label(), %error, "container build failed");
    }
}

/// Observer counting build events.
#[derive(Debug, Default)]
pub struct StatsObserver {
    resolved: AtomicU64,
    untyped: AtomicU64,
    emitted: AtomicU64,
    failures: AtomicU64,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definitions whose class was resolved.
    pub fn resolved_count(&self) -> u64 {
        self.resolved.load(Ordering::Relaxed)
    }

    /// Definitions left without a known class.
    pub fn untyped_count(&self) -> u64 {
        self.untyped.load(Ordering::Relaxed)
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.resolved.store(0, Ordering::Relaxed);
        self.untyped.store(0, Ordering::Relaxed);
        self.emitted.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

impl BuildObserver for StatsObserver {
    fn class_resolved(&self, _service: &str, class: Option<&str>) {
        if class.is_some() {
            self.resolved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.untyped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn service_emitted(&self, _service: &str, _method: &str) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    fn build_failed(&self, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Property-based tests for class resolution and autowiring
///
/// These tests verify that resolution behavior follows expected patterns
/// regardless of the specific names and counts used.

use ferrous_di_compiler::{
    ClassInfo, ContainerBuilder, DiError, EmitOptions, Parameter, Signature, StaticOracle, NO_ARGS,
};
use proptest::prelude::*;

fn oracle() -> StaticOracle {
    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("Contract"));
    oracle.add_class(ClassInfo::new("Impl").implements("Contract"));
    oracle.add_class(
        ClassInfo::new("Consumer").constructor(Signature::new().param(Parameter::new("dep").class("Contract"))),
    );
    oracle
}

// Property: autowiring succeeds with one candidate, fails cleanly with none or several
proptest! {
    #[test]
    fn autowiring_depends_on_candidate_count(count in 0usize..5) {
        let mut builder = ContainerBuilder::new(oracle());
        for i in 0..count {
            builder.add_definition(format!("impl{}", i)).unwrap().set_class("Impl");
        }
        builder.add_definition("consumer").unwrap().set_class("Consumer");

        let result = builder.build_container(&EmitOptions::default());
        match count {
            0 => prop_assert!(matches!(
                result.unwrap_err().root(),
                DiError::MissingDependency { type_name, .. } if type_name == "Contract"
            ), "expected MissingDependency for Contract"),
            1 => {
                let compiled = result.unwrap();
                let body = &compiled.class.method("createServiceConsumer").unwrap().body;
                prop_assert!(body.contains("new Consumer($this->impl0)"));
            }
            _ => match result.unwrap_err().root() {
                DiError::AmbiguousType { candidates, .. } => prop_assert_eq!(candidates.len(), count),
                other => prop_assert!(false, "unexpected error {:?}", other),
            },
        }
    }
}

// Property: every service in an alias chain resolves to the class at its end
proptest! {
    #[test]
    fn alias_chains_resolve_to_terminal_class(length in 1usize..30) {
        let mut builder = ContainerBuilder::new(oracle());
        for i in 0..length {
            builder
                .add_definition(format!("a{}", i))
                .unwrap()
                .set_factory(&format!("@a{}", i + 1), NO_ARGS)
                .unwrap();
        }
        builder.add_definition(format!("a{}", length)).unwrap().set_class("Impl");

        let resolved = builder.resolve_class_list().unwrap();
        for i in 0..=length {
            let name = format!("a{}", i);
            prop_assert_eq!(resolved.definition(&name).unwrap().class.as_deref(), Some("Impl"));
        }
        // aliases of a shared service stay out of the index
        let terminal = format!("a{}", length);
        prop_assert_eq!(resolved.by_type("Contract").unwrap(), Some(terminal.as_str()));
    }
}

// Property: closing an alias chain into a ring is always reported with the full path
proptest! {
    #[test]
    fn alias_rings_are_circular(length in 1usize..30) {
        let mut builder = ContainerBuilder::new(oracle());
        for i in 0..length {
            builder
                .add_definition(format!("r{}", i))
                .unwrap()
                .set_factory(&format!("@r{}", (i + 1) % length), NO_ARGS)
                .unwrap();
        }

        match builder.resolve_class_list() {
            Err(DiError::Circular(path)) => {
                prop_assert_eq!(path.len(), length + 1);
                prop_assert_eq!(path.first(), path.last());
            }
            other => prop_assert!(false, "expected circular error, got {:?}", other),
        }
    }
}

// Property: type lookups ignore case
proptest! {
    #[test]
    fn index_lookup_ignores_case(upper in any::<bool>()) {
        let mut builder = ContainerBuilder::new(oracle());
        builder.add_definition("impl").unwrap().set_class("Impl");
        let resolved = builder.resolve_class_list().unwrap();

        let query = if upper { "CONTRACT" } else { "contract" };
        prop_assert_eq!(resolved.by_type(query).unwrap(), Some("impl"));
    }
}

#![no_main]

use ferrous_di_compiler::{ClassInfo, ContainerBuilder, EmitOptions, Parameter, Signature, StaticOracle, NO_ARGS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut oracle = StaticOracle::new();
    oracle.add_class(ClassInfo::new("Logger"));
    oracle.add_class(
        ClassInfo::new("Service").constructor(Signature::new().param(Parameter::new("logger").class("Logger"))),
    );

    // Each byte pair adds one definition: a class or an alias of an earlier index
    let mut builder = ContainerBuilder::new(oracle);
    for (i, pair) in data.chunks_exact(2).take(64).enumerate() {
        let name = format!("s{}", i);
        let Ok(definition) = builder.add_definition(name) else {
            return;
        };
        match pair[0] % 4 {
            0 => {
                definition.set_class("Logger");
            }
            1 => {
                definition.set_class("Service").set_shared(pair[1] % 2 == 0);
            }
            2 => {
                let target = format!("@s{}", pair[1] as usize % (i + 1));
                if definition.set_factory(&target, NO_ARGS).is_err() {
                    return;
                }
            }
            _ => {
                definition.set_class("Logger").set_autowired(false);
            }
        }
    }

    // Any outcome is fine as long as it is an error value and not a panic
    if let Ok(compiled) = builder.build_container(&EmitOptions::default()) {
        assert!(compiled.source().contains("class Container"));
    }
});

#![no_main]

use ferrous_di_compiler::Entity;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Whatever parses must print back to text that parses to the same entity
    if let Ok(entity) = Entity::parse(input) {
        let printed = entity.to_string();
        let reparsed = Entity::parse(&printed).expect("printed entity must parse");
        assert_eq!(entity, reparsed);
    }
});
